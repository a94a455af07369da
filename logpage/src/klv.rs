//! Key/length/value parameter lists.
//!
//! Several vendor subpages are nothing more than a run of parameters:
//!
//! ```text
//! +0  u16  parameter code
//! +2  u8   flags (ignored)
//! +3  u8   value length L
//! +4  L    value, little endian
//! ```

use crate::cursor::Cursor;
use crate::error::DecodeError;
use crate::names::{self, AttributeName, KeyNameTable};
use log::warn;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KlvEntry {
    pub code: u16,
    pub name: AttributeName,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KlvList {
    pub entries: Vec<KlvEntry>,
    /// Bytes of the window covered by complete entries.
    pub consumed: usize,
    /// Set when the last entry ran past the window.
    pub fault: Option<DecodeError>,
}

impl KlvList {
    pub fn dump(&self, writer: &mut impl Write) -> std::io::Result<()> {
        for entry in &self.entries {
            writer.write_fmt(format_args!("  {:<30}: {}\n", entry.name, entry.value))?;
        }

        if let Some(fault) = &self.fault {
            writer.write_fmt(format_args!("  Parameter list corrupt: {}\n", fault))?;
        }

        Ok(())
    }
}

/// Walks `window` as parameters until it is used up.
///
/// Values longer than eight bytes keep only their low eight bytes.
pub fn decode(window: &[u8], table: &KeyNameTable) -> KlvList {
    let mut cursor = Cursor::new(window);
    let mut entries = vec![];
    let mut fault = None;

    while !cursor.is_empty() {
        let mut probe = cursor.clone();
        match read_entry(&mut probe, table) {
            Ok(entry) => {
                entries.push(entry);
                cursor = probe;
            }
            Err(e) => {
                warn!("parameter at offset {} overruns its list: {}", cursor.offset(), e);
                fault = Some(e);
                break;
            }
        }
    }

    KlvList {
        entries,
        consumed: cursor.offset(),
        fault,
    }
}

fn read_entry(cursor: &mut Cursor<'_>, table: &KeyNameTable) -> Result<KlvEntry, DecodeError> {
    let code = cursor.read_u16_le()?;
    cursor.skip(1)?;
    let len = cursor.read_u8()? as usize;

    let mut value = 0u64;
    for (i, byte) in cursor.read_bytes(len)?.iter().enumerate() {
        if i < 8 {
            value |= u64::from(*byte) << (8 * i);
        }
    }

    Ok(KlvEntry {
        code,
        name: names::lookup(table, code.into()),
        value,
    })
}
