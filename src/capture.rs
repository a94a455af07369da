use anyhow::{Context, Result};
use log::debug;
use nvme_logpage::{Controller, TransportError};
use std::fs;
use std::path::PathBuf;

/// A controller whose every log page is the content of one file.
///
/// The file is read afresh for each request and zero padded or truncated to
/// the size the decoder asked for.
pub struct CaptureController {
    path: PathBuf,
    ns_smart: bool,
    elpe: u8,
}

impl CaptureController {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let len = fs::metadata(&path)
            .with_context(|| format!("cannot open capture file {}", path.display()))?
            .len();

        Ok(CaptureController {
            path,
            ns_smart: false,
            elpe: elpe_for_len(len),
        })
    }

    pub fn namespace_smart(mut self, supported: bool) -> Self {
        self.ns_smart = supported;
        self
    }

    /// Overrides the entry count derived from the file length.
    pub fn error_log_entries(mut self, elpe: Option<u8>) -> Self {
        if let Some(elpe) = elpe {
            self.elpe = elpe;
        }
        self
    }
}

/// Zero based count of the 64 byte error entries a file of `len` bytes holds.
fn elpe_for_len(len: u64) -> u8 {
    let entries = (len / 64).max(1) - 1;
    u8::try_from(entries).unwrap_or(u8::MAX)
}

impl Controller for CaptureController {
    fn read_log_page(&mut self, page: u8, nsid: u32, size: usize) -> Result<Vec<u8>, TransportError> {
        let mut buf = fs::read(&self.path)?;
        debug!(
            "page {:#04x} nsid {:#x} from {}: {} bytes captured, {} requested",
            page,
            nsid,
            self.path.display(),
            buf.len(),
            size
        );
        buf.resize(size, 0);
        Ok(buf)
    }

    fn namespace_smart_supported(&self) -> bool {
        self.ns_smart
    }

    fn max_error_log_entries(&self) -> u8 {
        self.elpe
    }
}
