use crate::cursor::Cursor;
use crate::error::DecodeError;
use nvme_logpage_derive::LogRecord;
use std::io::Write;

/// Status field of a completion queue entry (DW3 bits 31:16).
///
/// ```text
/// bit  0      phase tag
/// bits 8:1    status code
/// bits 11:9   status code type
/// bits 13:12  command retry delay (not rendered)
/// bit  14     more
/// bit  15     do not retry
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Status(pub u16);

impl Status {
    pub fn phase_tag(self) -> u8 {
        (self.0 & 0x1) as u8
    }

    pub fn status_code(self) -> u8 {
        ((self.0 >> 1) & 0xFF) as u8
    }

    pub fn status_code_type(self) -> u8 {
        ((self.0 >> 9) & 0x7) as u8
    }

    pub fn more(self) -> u8 {
        ((self.0 >> 14) & 0x1) as u8
    }

    pub fn do_not_retry(self) -> u8 {
        ((self.0 >> 15) & 0x1) as u8
    }
}

#[derive(Debug, Clone, Copy, LogRecord)]
#[record(size = 64)]
pub struct ErrorInformationEntry {
    error_count: u64,
    sqid: u16,
    cid: u16,
    status: u16,
    error_location: u16,
    lba: u64,
    nsid: u32,
    vendor_specific: u8,
}

impl ErrorInformationEntry {
    pub fn status_field(&self) -> Status {
        Status(self.status)
    }
}

/// Error Information log (page 0x01).
#[derive(Debug, Clone)]
pub struct ErrorLog {
    pub entries: Vec<ErrorInformationEntry>,
}

impl ErrorLog {
    /// Reads entries until the first one with a zero error count.
    pub fn from_bytes(buf: &[u8]) -> Result<Self, DecodeError> {
        let mut cursor = Cursor::new(buf);
        let mut entries = vec![];

        while cursor.remaining() >= ErrorInformationEntry::SIZE {
            let entry = ErrorInformationEntry::decode(&mut cursor)?;
            if entry.error_count() == 0 {
                break;
            }
            entries.push(entry);
        }

        Ok(ErrorLog { entries })
    }

    pub fn dump(&self, writer: &mut impl Write) -> std::io::Result<()> {
        writer.write_fmt(format_args!("Error Information Log\n"))?;
        writer.write_fmt(format_args!("=====================\n"))?;

        if self.entries.is_empty() {
            writer.write_fmt(format_args!("No error entries found\n"))?;
            return Ok(());
        }

        for (i, entry) in self.entries.iter().enumerate() {
            let status = entry.status_field();

            writer.write_fmt(format_args!("Entry {:02}\n", i + 1))?;
            writer.write_fmt(format_args!("=========\n"))?;
            writer.write_fmt(format_args!(" Error count:          {}\n", entry.error_count()))?;
            writer.write_fmt(format_args!(" Submission queue ID:  {}\n", entry.sqid()))?;
            writer.write_fmt(format_args!(" Command ID:           {}\n", entry.cid()))?;
            writer.write_fmt(format_args!(" Status:\n"))?;
            writer.write_fmt(format_args!("  Phase tag:           {}\n", status.phase_tag()))?;
            writer.write_fmt(format_args!("  Status code:         {}\n", status.status_code()))?;
            writer.write_fmt(format_args!(
                "  Status code type:    {}\n",
                status.status_code_type()
            ))?;
            writer.write_fmt(format_args!("  More:                {}\n", status.more()))?;
            writer.write_fmt(format_args!("  DNR:                 {}\n", status.do_not_retry()))?;
            writer.write_fmt(format_args!(
                " Error location:       {}\n",
                entry.error_location()
            ))?;
            writer.write_fmt(format_args!(" LBA:                  {}\n", entry.lba()))?;
            writer.write_fmt(format_args!(" Namespace ID:         {}\n", entry.nsid()))?;
            writer.write_fmt(format_args!(
                " Vendor specific info: {}\n",
                entry.vendor_specific()
            ))?;
        }

        Ok(())
    }
}
