use nvme_logpage_derive::LogRecord;
use std::fmt;
use std::io::Write;

pub const MAX_FW_SLOTS: usize = 7;

/// Firmware Slot Information log (page 0x03).
#[derive(Debug, Clone, Copy, LogRecord)]
#[record(size = 512)]
pub struct FirmwareSlots {
    afi: u8,
    #[record(skip = 7)]
    revision: [[u8; 8]; MAX_FW_SLOTS],
}

/// How a slot's 8 revision bytes are shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    Empty,
    Text(String),
    Binary(u64),
}

impl Revision {
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        if bytes == [0; 8] {
            return Revision::Empty;
        }

        let len = bytes.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
        let text = &bytes[..len];
        if text.iter().all(|b| (0x20..=0x7e).contains(b)) {
            Revision::Text(String::from_utf8_lossy(text).into_owned())
        } else {
            Revision::Binary(u64::from_le_bytes(bytes))
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Revision::Empty => f.write_str("Empty"),
            Revision::Text(s) => f.write_str(s),
            Revision::Binary(v) => write!(f, "{:016x}", v),
        }
    }
}

impl FirmwareSlots {
    /// Slot the running firmware was loaded from (AFI bits 2:0).
    pub fn active_slot(&self) -> u8 {
        self.afi & 0x7
    }

    /// Slot that will be activated at the next reset (AFI bits 6:4), 0 if
    /// the controller has not chosen one.
    pub fn next_slot(&self) -> u8 {
        (self.afi >> 4) & 0x7
    }

    pub fn slots(&self) -> impl Iterator<Item = (usize, Revision)> + '_ {
        self.revision
            .iter()
            .enumerate()
            .map(|(i, r)| (i + 1, Revision::from_bytes(*r)))
    }

    pub fn dump(&self, writer: &mut impl Write) -> std::io::Result<()> {
        writer.write_fmt(format_args!("Firmware Slot Log\n"))?;
        writer.write_fmt(format_args!("=================\n"))?;

        for (slot, revision) in self.slots() {
            writer.write_fmt(format_args!("Slot {}: ", slot))?;
            if revision == Revision::Empty {
                writer.write_fmt(format_args!("{}\n", revision))?;
                continue;
            }

            let status = if usize::from(self.active_slot()) == slot {
                "Active"
            } else {
                "Inactive"
            };
            writer.write_fmt(format_args!("[{}] {}\n", status, revision))?;
        }

        if self.next_slot() != 0 {
            writer.write_fmt(format_args!("Next reset slot: {}\n", self.next_slot()))?;
        }

        Ok(())
    }
}
