//! HGST extra info page (0xC1): a header followed by a list of
//! self-describing subpages.
//!
//! ```text
//! +0  u8   subpage count
//! +1  u8   reserved
//! +2  u16  length of the subpage list
//! +4       subpages: u8 type (low 6 bits), u8 reserved, u16 length, payload
//! ```

pub mod subpages;

use crate::cursor::Cursor;
use crate::error::{Anomaly, DecodeError};
use log::{debug, warn};
use std::io::Write;

pub use self::subpages::Subpage;

const SUBTYPE_MASK: u8 = 0x3f;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubpageEntry {
    pub subtype: u8,
    pub reserved: u8,
    pub length: u16,
    /// Offset of the subpage header within the page.
    pub offset: usize,
    pub body: Subpage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoLog {
    pub pages: u8,
    pub length: u16,
    pub subpages: Vec<SubpageEntry>,
    /// Set when a subpage claimed more bytes than the list has left.
    pub overrun: Option<Anomaly>,
}

impl InfoLog {
    pub fn from_bytes(buf: &[u8]) -> Result<Self, DecodeError> {
        let mut cursor = Cursor::new(buf);

        let pages = cursor.read_u8()?;
        cursor.skip(1)?;
        let length = cursor.read_u16_le()?;

        let claimed = usize::from(length);
        let available = claimed.min(cursor.remaining());
        if available < claimed {
            warn!(
                "subpage list claims {} bytes, only {} in the buffer",
                claimed, available
            );
        }
        let mut list = cursor.window(available)?;

        let mut subpages = vec![];
        let mut overrun = None;

        while !list.is_empty() {
            let offset = list.position();
            match read_subpage(&mut list) {
                Ok(entry) => subpages.push(entry),
                Err(e) => {
                    warn!("subpage at offset {} runs off the list: {}", offset, e);
                    overrun = Some(Anomaly::SubpageOverrun { offset });
                    break;
                }
            }
        }

        Ok(InfoLog {
            pages,
            length,
            subpages,
            overrun,
        })
    }

    pub fn dump(&self, writer: &mut impl Write) -> std::io::Result<()> {
        writer.write_fmt(format_args!("HGST Extra Info Log\n"))?;
        writer.write_fmt(format_args!("===================\n"))?;
        writer.write_fmt(format_args!(
            "Subpages: {}, list length: {}\n",
            self.pages, self.length
        ))?;

        for entry in &self.subpages {
            entry.body.dump(writer)?;
        }

        if let Some(overrun) = &self.overrun {
            writer.write_fmt(format_args!("{}\n", overrun))?;
        }

        Ok(())
    }
}

/// Reads one subpage. The list cursor only moves when the whole subpage fits.
fn read_subpage(list: &mut Cursor<'_>) -> Result<SubpageEntry, DecodeError> {
    let offset = list.position();
    let mut probe = list.clone();

    let subtype = probe.read_u8()? & SUBTYPE_MASK;
    let reserved = probe.read_u8()?;
    let length = probe.read_u16_le()?;
    let payload = probe.read_bytes(length.into())?;
    *list = probe;

    debug!(
        "subpage {:#04x} at offset {}, {} bytes",
        subtype, offset, length
    );

    Ok(SubpageEntry {
        subtype,
        reserved,
        length,
        offset,
        body: subpages::decode(subtype, reserved, payload),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn subpage(kind: u8, payload: &[u8]) -> Vec<u8> {
        let mut s = vec![kind, 0];
        s.extend((payload.len() as u16).to_le_bytes());
        s.extend_from_slice(payload);
        s
    }

    fn page(pages: u8, list: &[u8]) -> Vec<u8> {
        let mut p = vec![pages, 0];
        p.extend((list.len() as u16).to_le_bytes());
        p.extend_from_slice(list);
        p.resize(4096, 0);
        p
    }

    fn render(log: &InfoLog) -> String {
        let mut out = vec![];
        log.dump(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn walks_subpages_in_order() {
        let mut list = subpage(0x38, &5u32.to_le_bytes());
        list.extend(subpage(0x3f, &[1, 2, 3]));
        list.extend(subpage(0x82, &[0x00, 0x80, 0x00, 0x01, 0x07]));

        let log = InfoLog::from_bytes(&page(3, &list)).unwrap();
        assert_eq!(log.pages, 3);
        assert_eq!(log.overrun, None);

        let kinds: Vec<_> = log.subpages.iter().map(|s| s.subtype).collect();
        assert_eq!(kinds, vec![0x38, 0x3f, 0x02]);
        assert_eq!(log.subpages[1].offset, 12);
        assert_eq!(log.subpages[1].body, Subpage::Unhandled { subtype: 0x3f });

        let out = render(&log);
        assert!(out.starts_with("HGST Extra Info Log\n===================\n"));
        assert!(out.contains("No handler for page type 3f\n"));
        assert!(out.contains("Write Errors Subpage:\n"));
        assert!(out.contains(&format!("  {:<30}: 7\n", "Flash Write Commands")));
    }

    #[test]
    fn overrun_halts_processing() {
        let mut list = subpage(0x38, &1u32.to_le_bytes());
        let mut bad = subpage(0x38, &2u32.to_le_bytes());
        bad[2] = 0x40;
        list.extend(bad);
        list.extend(subpage(0x38, &3u32.to_le_bytes()));

        let log = InfoLog::from_bytes(&page(3, &list)).unwrap();
        assert_eq!(log.subpages.len(), 1);
        assert_eq!(log.overrun, Some(Anomaly::SubpageOverrun { offset: 12 }));

        let out = render(&log);
        assert!(out.ends_with("Ooops! Off the end of the list (subpage at offset 12)\n"));
    }

    #[test]
    fn partial_subpage_header_is_an_overrun() {
        let mut list = subpage(0x38, &1u32.to_le_bytes());
        list.extend([0x38, 0x00]);

        let log = InfoLog::from_bytes(&page(2, &list)).unwrap();
        assert_eq!(log.subpages.len(), 1);
        assert_eq!(log.overrun, Some(Anomaly::SubpageOverrun { offset: 12 }));
    }

    #[test]
    fn list_length_is_clamped_to_buffer() {
        let mut buf = vec![1, 0];
        buf.extend(0xffffu16.to_le_bytes());
        buf.extend(subpage(0x38, &9u32.to_le_bytes()));

        let log = InfoLog::from_bytes(&buf).unwrap();
        assert_eq!(log.length, 0xffff);
        assert_eq!(log.subpages.len(), 1);
        assert_eq!(log.overrun, None);
    }

    #[test]
    fn empty_list() {
        let log = InfoLog::from_bytes(&page(0, &[])).unwrap();
        assert!(log.subpages.is_empty());
        assert_eq!(log.overrun, None);
    }

    #[test]
    fn header_needs_four_bytes() {
        assert!(InfoLog::from_bytes(&[1, 0, 4]).is_err());
    }
}
