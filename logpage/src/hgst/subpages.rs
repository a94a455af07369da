//! Decoders for the subpages nested in the HGST extra info page.
//!
//! Subpage layouts follow appendix A of the HGST Ultrastar SN100/SN150
//! product manuals.

use crate::cursor::Cursor;
use crate::error::Anomaly;
use crate::klv::{self, KlvList};
use crate::names::KeyNameTable;
use log::debug;
use nvme_logpage_derive::LogRecord;
use std::fmt;
use std::io::Write;

pub const WRITE_ERRORS: u8 = 0x02;
pub const READ_ERRORS: u8 = 0x03;
pub const VERIFY_ERRORS: u8 = 0x05;
pub const SELF_TEST: u8 = 0x10;
pub const BACKGROUND_SCAN: u8 = 0x15;
pub const ERASE_ERRORS: u8 = 0x30;
pub const ERASE_COUNTS: u8 = 0x31;
pub const TEMP_HISTORY: u8 = 0x32;
pub const SSD_PERF: u8 = 0x37;
pub const FIRMWARE_LOAD: u8 = 0x38;

const WRITE_ERROR_NAMES: &KeyNameTable = &[
    (0x0000, "Corrected Without Delay"),
    (0x0001, "Corrected Maybe Delayed"),
    (0x0002, "Re-Writes"),
    (0x0003, "Errors Corrected"),
    (0x0004, "Correct Algorithm Used"),
    (0x0005, "Bytes Processed"),
    (0x0006, "Uncorrected Errors"),
    (0x8000, "Flash Write Commands"),
    (0x8001, "HGST Special"),
];

const READ_ERROR_NAMES: &KeyNameTable = &[
    (0x0000, "Corrected Without Delay"),
    (0x0001, "Corrected Maybe Delayed"),
    (0x0002, "Re-Reads"),
    (0x0003, "Errors Corrected"),
    (0x0004, "Correct Algorithm Used"),
    (0x0005, "Bytes Processed"),
    (0x0006, "Uncorrected Errors"),
    (0x8000, "Flash Read Commands"),
    (0x8001, "XOR Recovered"),
    (0x8002, "Total Corrected Bits"),
];

const VERIFY_ERROR_NAMES: &KeyNameTable = &[
    (0x0000, "Corrected Without Delay"),
    (0x0001, "Corrected Maybe Delayed"),
    (0x0002, "Re-Reads"),
    (0x0003, "Errors Corrected"),
    (0x0004, "Correct Algorithm Used"),
    (0x0005, "Bytes Processed"),
    (0x0006, "Uncorrected Errors"),
    (0x8000, "Commands Processed"),
];

const ERASE_ERROR_NAMES: &KeyNameTable = &[
    (0x0000, "Corrected Without Delay"),
    (0x0001, "Corrected Maybe Delayed"),
    (0x0002, "Re-Erase"),
    (0x0003, "Errors Corrected"),
    (0x0004, "Correct Algorithm Used"),
    (0x0005, "Bytes Processed"),
    (0x0006, "Uncorrected Errors"),
    (0x8000, "Flash Erase Commands"),
    (0x8001, "Mfg Defect Count"),
    (0x8002, "Grown Defect Count"),
    (0x8003, "Erase Count -- User"),
    (0x8004, "Erase Count -- System"),
];

/// A decoded subpage. Anything that went wrong inside it is kept alongside
/// whatever could be decoded before the problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subpage {
    WriteErrors(KlvList),
    ReadErrors(KlvList),
    VerifyErrors(KlvList),
    EraseErrors(KlvList),
    SelfTest(SelfTestLog),
    BackgroundScan(BackgroundScan),
    EraseCounts { length: usize },
    TemperatureHistory(Result<TemperatureHistory, Anomaly>),
    SsdPerformance {
        kind: u8,
        counters: Result<PerfCounters, Anomaly>,
    },
    FirmwareLoad(Result<u32, Anomaly>),
    Unhandled { subtype: u8 },
}

/// Picks the decoder for `subtype` and runs it over `payload`.
pub fn decode(subtype: u8, reserved: u8, payload: &[u8]) -> Subpage {
    match subtype {
        WRITE_ERRORS => Subpage::WriteErrors(klv::decode(payload, WRITE_ERROR_NAMES)),
        READ_ERRORS => Subpage::ReadErrors(klv::decode(payload, READ_ERROR_NAMES)),
        VERIFY_ERRORS => Subpage::VerifyErrors(klv::decode(payload, VERIFY_ERROR_NAMES)),
        SELF_TEST => Subpage::SelfTest(SelfTestLog::from_bytes(payload)),
        BACKGROUND_SCAN => Subpage::BackgroundScan(BackgroundScan::from_bytes(payload)),
        ERASE_ERRORS => Subpage::EraseErrors(klv::decode(payload, ERASE_ERROR_NAMES)),
        ERASE_COUNTS => Subpage::EraseCounts {
            length: payload.len(),
        },
        TEMP_HISTORY => Subpage::TemperatureHistory(
            TemperatureHistory::from_bytes(payload).map_err(Anomaly::from),
        ),
        SSD_PERF => Subpage::SsdPerformance {
            kind: reserved,
            counters: PerfCounters::from_bytes(payload).map_err(Anomaly::from),
        },
        FIRMWARE_LOAD => Subpage::FirmwareLoad(
            Cursor::new(payload)
                .read_u32_le()
                .map_err(Anomaly::from),
        ),
        _ => Subpage::Unhandled { subtype },
    }
}

impl Subpage {
    pub fn dump(&self, writer: &mut impl Write) -> std::io::Result<()> {
        match self {
            Subpage::WriteErrors(list) => {
                writer.write_fmt(format_args!("Write Errors Subpage:\n"))?;
                list.dump(writer)
            }
            Subpage::ReadErrors(list) => {
                writer.write_fmt(format_args!("Read Errors Subpage:\n"))?;
                list.dump(writer)
            }
            Subpage::VerifyErrors(list) => {
                writer.write_fmt(format_args!("Verify Errors Subpage:\n"))?;
                list.dump(writer)
            }
            Subpage::EraseErrors(list) => {
                writer.write_fmt(format_args!("Erase Errors Subpage:\n"))?;
                list.dump(writer)
            }
            Subpage::SelfTest(log) => log.dump(writer),
            Subpage::BackgroundScan(scan) => scan.dump(writer),
            Subpage::EraseCounts { length } => writer.write_fmt(format_args!(
                "Erase Counts Subpage: not decoded (subtype {:#x}, {} bytes)\n",
                ERASE_COUNTS, length
            )),
            Subpage::TemperatureHistory(history) => {
                writer.write_fmt(format_args!("Temperature History:\n"))?;
                match history {
                    Ok(history) => history.dump(writer),
                    Err(e) => writer.write_fmt(format_args!("  {}\n", e)),
                }
            }
            Subpage::SsdPerformance { kind, counters } => {
                writer.write_fmt(format_args!("SSD Performance Subpage Type {}:\n", kind))?;
                match counters {
                    Ok(counters) => counters.dump(writer),
                    Err(e) => writer.write_fmt(format_args!("  {}\n", e)),
                }
            }
            Subpage::FirmwareLoad(downloads) => {
                writer.write_fmt(format_args!("Firmware Load Subpage:\n"))?;
                match downloads {
                    Ok(n) => writer.write_fmt(format_args!("  {:<30}: {}\n", "Firmware Downloads", n)),
                    Err(e) => writer.write_fmt(format_args!("  {}\n", e)),
                }
            }
            Subpage::Unhandled { subtype } => {
                writer.write_fmt(format_args!("No handler for page type {:x}\n", subtype))
            }
        }
    }
}

const SELF_TEST_PARAM_LEN: u8 = 0x10;

/// One self-test result parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, LogRecord)]
pub struct SelfTestRecord {
    code: u16,
    flags: u8,
    length: u8,
    results: u8,
    number: u8,
    power_on_hours: u16,
    lba: u64,
    sense: u8,
    asc: u8,
    ascq: u8,
    vendor_detail: u8,
}

impl SelfTestRecord {
    pub fn self_test_result(&self) -> u8 {
        self.results & 0xf
    }

    pub fn self_test_code(&self) -> u8 {
        (self.results >> 5) & 0x7
    }

    pub fn sense_key(&self) -> u8 {
        self.sense & 0xf
    }

    fn dump(&self, writer: &mut impl Write) -> std::io::Result<()> {
        writer.write_fmt(format_args!("  {:<30}: {}\n", "Recent Test", self.code))?;
        writer.write_fmt(format_args!(
            "    {:<28}: {:#x}\n",
            "Self-Test Results",
            self.self_test_result()
        ))?;
        writer.write_fmt(format_args!(
            "    {:<28}: {:#x}\n",
            "Self-Test Code",
            self.self_test_code()
        ))?;
        writer.write_fmt(format_args!("    {:<28}: {:#x}\n", "Self-Test Number", self.number))?;
        writer.write_fmt(format_args!(
            "    {:<28}: {}\n",
            "Total Power On Hrs", self.power_on_hours
        ))?;
        writer.write_fmt(format_args!(
            "    {:<28}: {:#x} ({})\n",
            "LBA", self.lba, self.lba
        ))?;
        writer.write_fmt(format_args!("    {:<28}: {:#x}\n", "Sense Key", self.sense_key()))?;
        writer.write_fmt(format_args!(
            "    {:<28}: {:#x}\n",
            "Additional Sense Code", self.asc
        ))?;
        writer.write_fmt(format_args!(
            "    {:<28}: {:#x}\n",
            "Additional Sense Qualifier", self.ascq
        ))?;
        writer.write_fmt(format_args!(
            "    {:<28}: {:#x}\n",
            "Vendor Specific Detail", self.vendor_detail
        ))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfTestLog {
    pub records: Vec<SelfTestRecord>,
    pub fault: Option<Anomaly>,
}

impl SelfTestLog {
    /// Reads records until one with a zero length. A record with any other
    /// unexpected length ends the subpage with a fault.
    pub fn from_bytes(payload: &[u8]) -> Self {
        let mut records = vec![];
        let fault = Self::walk(payload, &mut records).err();
        SelfTestLog { records, fault }
    }

    fn walk(payload: &[u8], records: &mut Vec<SelfTestRecord>) -> Result<(), Anomaly> {
        let mut cursor = Cursor::new(payload);

        while cursor.remaining() >= SelfTestRecord::SIZE {
            let record = SelfTestRecord::decode(&mut cursor)?;
            match record.length {
                0 => break,
                SELF_TEST_PARAM_LEN => records.push(record),
                length => return Err(Anomaly::SelfTestLength { length }),
            }
        }

        Ok(())
    }

    fn dump(&self, writer: &mut impl Write) -> std::io::Result<()> {
        writer.write_fmt(format_args!("Self Test Subpage:\n"))?;
        for record in &self.records {
            record.dump(writer)?;
        }
        if let Some(fault) = &self.fault {
            writer.write_fmt(format_args!("{}\n", fault))?;
        }
        Ok(())
    }
}

const SCAN_HEADER_LEN: u8 = 0x10;
const RETIREMENT_LEN: u8 = 0x14;

/// Fixed bytes the manual documents for every NAND retirement parameter.
pub const RETIREMENT_MAGIC: [u8; 8] = [0x41, 0x0b, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    Idle,
    Active,
    Suspended,
    Unknown(u8),
}

impl From<u8> for ScanStatus {
    fn from(value: u8) -> Self {
        match value {
            0 => ScanStatus::Idle,
            1 => ScanStatus::Active,
            8 => ScanStatus::Suspended,
            v => ScanStatus::Unknown(v),
        }
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanStatus::Idle => f.write_str("idle"),
            ScanStatus::Active => f.write_str("active"),
            ScanStatus::Suspended => f.write_str("suspended"),
            ScanStatus::Unknown(_) => f.write_str("unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, LogRecord)]
#[record(size = 20)]
pub struct ScanHeader {
    code: u16,
    flags: u8,
    length: u8,
    power_on_minutes: u32,
    #[record(skip = 1)]
    status: u8,
    scan_count: u16,
    progress: u16,
}

impl ScanHeader {
    pub fn scan_status(&self) -> ScanStatus {
        self.status.into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, LogRecord)]
pub struct RetirementRecord {
    code: u16,
    flags: u8,
    length: u8,
    power_on_minutes: u32,
    magic: [u8; 8],
    #[record(skip = 4)]
    nand: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retirement {
    Valid { number: u16, nand: u32 },
    Corrupt { code: u16 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackgroundScan {
    pub header: Option<ScanHeader>,
    /// Whole retirement records the payload has room for.
    pub slots: usize,
    pub retirements: Vec<Retirement>,
    pub fault: Option<Anomaly>,
}

impl BackgroundScan {
    pub fn from_bytes(payload: &[u8]) -> Self {
        let mut scan = BackgroundScan::default();
        scan.fault = scan.walk(payload).err();
        scan
    }

    fn walk(&mut self, payload: &[u8]) -> Result<(), Anomaly> {
        let mut cursor = Cursor::new(payload);

        let header = ScanHeader::decode(&mut cursor)?;
        if header.length != SCAN_HEADER_LEN {
            return Err(Anomaly::ScanHeaderLength {
                length: header.length,
            });
        }
        if header.code != 0 {
            return Err(Anomaly::ScanHeaderCode { code: header.code });
        }
        self.header = Some(header);
        self.slots = cursor.remaining() / RetirementRecord::SIZE;

        while cursor.remaining() >= RetirementRecord::SIZE {
            let record = RetirementRecord::decode(&mut cursor)?;
            if record.length != RETIREMENT_LEN {
                return Err(Anomaly::RetirementLength {
                    code: record.code,
                    length: record.length,
                });
            }

            // A mismatch is reported as is; the next record starts at the
            // next fixed stride regardless of what this one contained.
            if record.magic == RETIREMENT_MAGIC {
                self.retirements.push(Retirement::Valid {
                    number: record.code,
                    nand: record.nand,
                });
            } else {
                self.retirements.push(Retirement::Corrupt { code: record.code });
            }
        }

        if !cursor.is_empty() {
            debug!("{} bytes left after retirement records", cursor.remaining());
        }

        Ok(())
    }

    fn dump(&self, writer: &mut impl Write) -> std::io::Result<()> {
        writer.write_fmt(format_args!("Background Media Scan Subpage:\n"))?;

        if let Some(header) = &self.header {
            writer.write_fmt(format_args!(
                "  {:<30}: {}\n",
                "Power On Minutes", header.power_on_minutes
            ))?;
            writer.write_fmt(format_args!(
                "  {:<30}: {:x} ({})\n",
                "BMS Status",
                header.status,
                header.scan_status()
            ))?;
            writer.write_fmt(format_args!("  {:<30}: {}\n", "Number of BMS", header.scan_count))?;
            writer.write_fmt(format_args!(
                "  {:<30}: {}\n",
                "Progress Current BMS", header.progress
            ))?;
            writer.write_fmt(format_args!("  {:<30}: {}\n", "BMS retirements", self.slots))?;
        }

        for retirement in &self.retirements {
            match retirement {
                Retirement::Valid { number, nand } => {
                    writer.write_fmt(format_args!("  {:<30}: {}\n", "Retirement number", number))?;
                    writer.write_fmt(format_args!("    {:<28}: {:#x}\n", "NAND (C/T)BBBPPP", nand))?;
                }
                Retirement::Corrupt { code } => {
                    writer.write_fmt(format_args!("Parameter {:#x} entry corrupt\n", code))?;
                }
            }
        }

        if let Some(fault) = &self.fault {
            writer.write_fmt(format_args!("{}\n", fault))?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, LogRecord)]
pub struct TemperatureHistory {
    current: u8,
    reference: u8,
    max: u8,
    min: u8,
    max_temp_time: u32,
    over_temp_duration: u32,
    min_temp_time: u32,
}

struct Minutes(u32);

impl fmt::Display for Minutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}:00", self.0 / 60, self.0 % 60)
    }
}

impl TemperatureHistory {
    fn dump(&self, writer: &mut impl Write) -> std::io::Result<()> {
        writer.write_fmt(format_args!("  {:<30}: {} C\n", "Current Temperature", self.current))?;
        writer.write_fmt(format_args!(
            "  {:<30}: {} C\n",
            "Reference Temperature", self.reference
        ))?;
        writer.write_fmt(format_args!("  {:<30}: {} C\n", "Maximum Temperature", self.max))?;
        writer.write_fmt(format_args!("  {:<30}: {} C\n", "Minimum Temperature", self.min))?;
        writer.write_fmt(format_args!(
            "  {:<30}: {}\n",
            "Max Temperature Time",
            Minutes(self.max_temp_time)
        ))?;
        writer.write_fmt(format_args!(
            "  {:<30}: {}\n",
            "Over Temperature Duration",
            Minutes(self.over_temp_duration)
        ))?;
        writer.write_fmt(format_args!(
            "  {:<30}: {}\n",
            "Min Temperature Time",
            Minutes(self.min_temp_time)
        ))?;
        Ok(())
    }
}

const PERF_COUNTER_NAMES: [&str; 16] = [
    "Host Read Commands",
    "Host Read Blocks",
    "Host Cache Read Hits Commands",
    "Host Cache Read Hits Blocks",
    "Host Read Commands Stalled",
    "Host Write Commands",
    "Host Write Blocks",
    "Host Write Odd Start Commands",
    "Host Write Odd End Commands",
    "Host Write Commands Stalled",
    "NAND Read Commands",
    "NAND Read Blocks",
    "NAND Write Commands",
    "NAND Write Blocks",
    "NAND Read Before Writes",
    "Reserved",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, LogRecord)]
pub struct PerfCounters {
    counters: [u64; 16],
}

impl PerfCounters {
    pub fn named(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        PERF_COUNTER_NAMES.iter().copied().zip(self.counters.iter().copied())
    }

    fn dump(&self, writer: &mut impl Write) -> std::io::Result<()> {
        for (name, value) in self.named() {
            writer.write_fmt(format_args!("  {:<30}: {}\n", name, value))?;
        }
        Ok(())
    }
}
