//! Maps a log page identifier to the decoder that understands it and the
//! buffer size the retrieval should ask for.

use crate::error::{Error, Result};
use crate::hgst::InfoLog;
use crate::pages::{
    hexdump, AdditionalSmart, ErrorInformationEntry, ErrorLog, FirmwareSlots,
    HealthInformation, TemperatureStats,
};
use log::debug;
use std::io::Write;

/// Buffer size for pages without a documented one.
pub const DEFAULT_SIZE: usize = 4096;

/// Namespace identifier addressing the controller as a whole.
pub const GLOBAL_NAMESPACE: u32 = 0xFFFF_FFFF;

pub mod page {
    pub const ERROR_INFORMATION: u8 = 0x01;
    pub const HEALTH_INFORMATION: u8 = 0x02;
    pub const FIRMWARE_SLOT: u8 = 0x03;
    pub const CHANGED_NAMESPACE: u8 = 0x04;
    pub const COMMAND_EFFECTS: u8 = 0x05;
    pub const DEVICE_SELF_TEST: u8 = 0x06;
    pub const RESERVATION_NOTIFICATION: u8 = 0x80;
    pub const SANITIZE_STATUS: u8 = 0x81;
    pub const HGST_INFO: u8 = 0xC1;
    pub const INTEL_TEMPERATURE: u8 = 0xC5;
    pub const INTEL_ADD_SMART: u8 = 0xCA;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoder {
    ErrorLog,
    Health,
    FirmwareSlot,
    HgstInfo,
    IntelTemperature,
    IntelAdditionalSmart,
    Hex,
}

impl Decoder {
    /// Decodes `buf` as page `page` and renders it to `writer`.
    pub fn decode(self, page: u8, buf: &[u8], writer: &mut impl Write) -> Result<()> {
        let decode_err = |source| Error::Decode { page, source };

        match self {
            Decoder::ErrorLog => ErrorLog::from_bytes(buf).map_err(decode_err)?.dump(writer)?,
            Decoder::Health => HealthInformation::from_bytes(buf)
                .map_err(decode_err)?
                .dump(writer)?,
            Decoder::FirmwareSlot => FirmwareSlots::from_bytes(buf)
                .map_err(decode_err)?
                .dump(writer)?,
            Decoder::HgstInfo => InfoLog::from_bytes(buf).map_err(decode_err)?.dump(writer)?,
            Decoder::IntelTemperature => TemperatureStats::from_bytes(buf)
                .map_err(decode_err)?
                .dump(writer)?,
            Decoder::IntelAdditionalSmart => AdditionalSmart::from_bytes(buf)
                .map_err(decode_err)?
                .dump(writer)?,
            Decoder::Hex => hexdump::dump(page, buf, writer)?,
        }

        Ok(())
    }
}

/// Decoder and buffer size for pages with a dedicated decoder.
///
/// The error log size returned here covers a single entry; the real size
/// depends on the controller and comes from [`error_log_size`].
pub fn lookup(id: u8) -> Option<(Decoder, usize)> {
    match id {
        page::ERROR_INFORMATION => Some((Decoder::ErrorLog, ErrorInformationEntry::SIZE)),
        page::HEALTH_INFORMATION => Some((Decoder::Health, HealthInformation::SIZE)),
        page::FIRMWARE_SLOT => Some((Decoder::FirmwareSlot, FirmwareSlots::SIZE)),
        page::HGST_INFO => Some((Decoder::HgstInfo, DEFAULT_SIZE)),
        page::INTEL_TEMPERATURE => Some((Decoder::IntelTemperature, TemperatureStats::SIZE)),
        page::INTEL_ADD_SMART => Some((Decoder::IntelAdditionalSmart, DEFAULT_SIZE)),
        _ => None,
    }
}

/// Picks the decoder for `id`. Unknown pages, and every page when `hex` is
/// set, fall back to a hex dump of [`DEFAULT_SIZE`] bytes.
pub fn dispatch(id: u8, hex: bool) -> (Decoder, usize) {
    let found = if hex { None } else { lookup(id) };
    let (decoder, size) = found.unwrap_or((Decoder::Hex, DEFAULT_SIZE));

    debug!(
        "page {:#04x}: {:?} decoder, {} byte buffer",
        id, decoder, size
    );

    (decoder, size)
}

/// Size of the error information page for a zero based entry count.
pub fn error_log_size(elpe: u8) -> usize {
    ErrorInformationEntry::SIZE * (usize::from(elpe) + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn known_pages() {
        assert_eq!(dispatch(0x02, false), (Decoder::Health, 512));
        assert_eq!(dispatch(0x03, false), (Decoder::FirmwareSlot, 512));
        assert_eq!(dispatch(0xC1, false), (Decoder::HgstInfo, 4096));
        assert_eq!(dispatch(0xC5, false), (Decoder::IntelTemperature, 104));
        assert_eq!(dispatch(0xCA, false), (Decoder::IntelAdditionalSmart, 4096));
        assert_eq!(dispatch(0x01, false).0, Decoder::ErrorLog);
    }

    #[test]
    fn unknown_page_is_hex() {
        assert_eq!(dispatch(0x7f, false), (Decoder::Hex, DEFAULT_SIZE));
        assert_eq!(dispatch(0x06, false), (Decoder::Hex, DEFAULT_SIZE));
        assert_eq!(lookup(0xff), None);
    }

    #[test]
    fn hex_override_wins() {
        assert_eq!(dispatch(0x02, true), (Decoder::Hex, DEFAULT_SIZE));
        assert_eq!(dispatch(0xC1, true), (Decoder::Hex, DEFAULT_SIZE));
    }

    #[test]
    fn error_log_sizing() {
        assert_eq!(error_log_size(0), 64);
        assert_eq!(error_log_size(63), 4096);
        assert_eq!(error_log_size(255), 16384);
    }

    #[test]
    fn short_buffer_is_a_decode_error() {
        let mut out = vec![];
        let err = Decoder::Health.decode(0x02, &[0; 100], &mut out).unwrap_err();
        match err {
            Error::Decode { page, source } => {
                assert_eq!(page, 0x02);
                assert_eq!(source.needed, 512);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn hex_decoder_renders_any_page() {
        let mut out = vec![];
        Decoder::Hex.decode(0x02, &[1, 2], &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "SMART / Health Information (page 0x02), 2 bytes\n0x0000: 01 02\n"
        );
    }
}
