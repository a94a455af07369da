//! Intel vendor pages, as documented in the SSD DC P3700 product
//! specification. That document gives log 0xCA offset 147 a 6 byte size;
//! it is a single byte.

use crate::cursor::Cursor;
use crate::error::DecodeError;
use crate::names::{self, AttributeName, KeyNameTable};
use crate::temperature::Kelvin;
use nvme_logpage_derive::LogRecord;
use std::io::Write;

/// Temperature statistics (page 0xC5). All fields are 64-bit; the
/// temperatures only use the low 16 bits.
#[derive(Debug, Clone, Copy, LogRecord)]
pub struct TemperatureStats {
    current: u64,
    overtemp_flag_last: u64,
    overtemp_flag_life: u64,
    max_temp: u64,
    min_temp: u64,
    #[record(skip = 40)]
    max_oper_temp: u64,
    min_oper_temp: u64,
    est_offset: u64,
}

fn kelvin(raw: u64) -> Kelvin {
    Kelvin((raw & 0xFFFF) as u16)
}

impl TemperatureStats {
    pub fn dump(&self, writer: &mut impl Write) -> std::io::Result<()> {
        writer.write_fmt(format_args!("Intel Temperature Log\n"))?;
        writer.write_fmt(format_args!("=====================\n"))?;

        writer.write_fmt(format_args!(
            "Current:                        {}\n",
            kelvin(self.current)
        ))?;
        writer.write_fmt(format_args!(
            "Overtemp Last Flags             {:#x}\n",
            self.overtemp_flag_last
        ))?;
        writer.write_fmt(format_args!(
            "Overtemp Lifetime Flags         {:#x}\n",
            self.overtemp_flag_life
        ))?;
        writer.write_fmt(format_args!(
            "Max Temperature                 {}\n",
            kelvin(self.max_temp)
        ))?;
        writer.write_fmt(format_args!(
            "Min Temperature                 {}\n",
            kelvin(self.min_temp)
        ))?;
        writer.write_fmt(format_args!(
            "Max Operating Temperature       {}\n",
            kelvin(self.max_oper_temp)
        ))?;
        writer.write_fmt(format_args!(
            "Min Operating Temperature       {}\n",
            kelvin(self.min_oper_temp)
        ))?;
        writer.write_fmt(format_args!(
            "Estimated Temperature Offset:   {} C/K\n",
            self.est_offset
        ))?;

        Ok(())
    }
}

const ADD_SMART_NAMES: &KeyNameTable = &[
    (0xab, "Program Fail Count"),
    (0xac, "Erase Fail Count"),
    (0xad, "Wear Leveling Count"),
    (0xb8, "End to End Error Count"),
    (0xc7, "CRC Error Count"),
    (0xe2, "Timed: Media Wear"),
    (0xe3, "Timed: Host Read %"),
    (0xe4, "Timed: Elapsed Time"),
    (0xea, "Thermal Throttle Status"),
    (0xf0, "Retry Buffer Overflows"),
    (0xf3, "PLL Lock Loss Count"),
    (0xf4, "NAND Bytes Written"),
    (0xf5, "Host Bytes Written"),
];

const WEAR_LEVELING: u8 = 0xad;
const MEDIA_WEAR: u8 = 0xe2;
const THERMAL_THROTTLE: u8 = 0xea;

/// Attributes live in the first 150 bytes of the page.
const ADD_SMART_AREA: usize = 150;

/// One 12 byte additional SMART attribute:
///
/// ```text
/// +0      key
/// +1..2   reserved
/// +3      normalized value
/// +4      reserved
/// +5..10  raw value, little endian (or key specific sub-fields)
/// +11     reserved
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, LogRecord)]
#[record(size = 12)]
pub struct SmartAttribute {
    key: u8,
    #[record(skip = 2)]
    normalized: u8,
    #[record(skip = 1)]
    raw_bytes: [u8; 6],
}

impl SmartAttribute {
    pub fn name(&self) -> AttributeName {
        names::lookup(ADD_SMART_NAMES, self.key.into())
    }

    /// The 48-bit raw counter.
    pub fn raw(&self) -> u64 {
        self.raw_bytes
            .iter()
            .enumerate()
            .fold(0, |acc, (i, b)| acc | (u64::from(*b) << (8 * i)))
    }

    fn raw_u16(&self, at: usize) -> u16 {
        u16::from_le_bytes([self.raw_bytes[at], self.raw_bytes[at + 1]])
    }

    fn raw_u32(&self, at: usize) -> u32 {
        let mut bytes = [0; 4];
        bytes.copy_from_slice(&self.raw_bytes[at..at + 4]);
        u32::from_le_bytes(bytes)
    }

    pub fn dump(&self, writer: &mut impl Write) -> std::io::Result<()> {
        let name = self.name();
        match self.key {
            WEAR_LEVELING => writer.write_fmt(format_args!(
                "{:<32}: {:>3} min: {} max: {} ave: {}\n",
                name,
                self.normalized,
                self.raw_u16(0),
                self.raw_u16(2),
                self.raw_u16(4)
            )),
            MEDIA_WEAR => writer.write_fmt(format_args!(
                "{:<32}: {:>3} {:.3}%\n",
                name,
                self.normalized,
                self.raw() as f64 / 1024.0
            )),
            THERMAL_THROTTLE => writer.write_fmt(format_args!(
                "{:<32}: {:>3} {}% {} times\n",
                name,
                self.normalized,
                self.raw_bytes[0],
                self.raw_u32(1)
            )),
            _ => writer.write_fmt(format_args!(
                "{:<32}: {:>3} {}\n",
                name,
                self.normalized,
                self.raw()
            )),
        }
    }
}

/// Additional SMART attributes (page 0xCA).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdditionalSmart {
    pub attributes: Vec<SmartAttribute>,
}

impl AdditionalSmart {
    /// Reads attributes until a zero key, the end of the attribute area or
    /// the end of the buffer, whichever comes first.
    pub fn from_bytes(buf: &[u8]) -> Result<Self, DecodeError> {
        let mut cursor = Cursor::new(buf);
        let mut attributes = vec![];

        while cursor.offset() < ADD_SMART_AREA && cursor.remaining() >= SmartAttribute::SIZE {
            let attr = SmartAttribute::decode(&mut cursor)?;
            if attr.key == 0 {
                break;
            }
            attributes.push(attr);
        }

        Ok(AdditionalSmart { attributes })
    }

    pub fn dump(&self, writer: &mut impl Write) -> std::io::Result<()> {
        writer.write_fmt(format_args!("Additional SMART Data Log\n"))?;
        writer.write_fmt(format_args!("=========================\n"))?;

        for attr in &self.attributes {
            attr.dump(writer)?;
        }

        Ok(())
    }
}
