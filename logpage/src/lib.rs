pub mod controller;
pub mod cursor;
pub mod dispatch;
pub mod error;
pub mod hgst;
pub mod klv;
pub mod names;
pub mod pages;
pub mod temperature;
pub mod wide;

pub use self::controller::{logpage, Controller, LogPageRequest};
pub use self::dispatch::{dispatch, error_log_size, Decoder, DEFAULT_SIZE, GLOBAL_NAMESPACE};
pub use self::error::{Anomaly, DecodeError, Error, Result, TransportError};
use once_cell::sync::Lazy;
use std::collections::HashMap;

static PAGE_NAMES: Lazy<HashMap<u8, &'static str>> = Lazy::new(|| {
    let mut names = HashMap::new();
    names.insert(0x01, "Error Information");
    names.insert(0x02, "SMART / Health Information");
    names.insert(0x03, "Firmware Slot Information");
    names.insert(0x04, "Changed Namespace List");
    names.insert(0x05, "Commands Supported and Effects");
    names.insert(0x06, "Device Self-test");
    names.insert(0x80, "Reservation Notification");
    names.insert(0x81, "Sanitize Status");
    names.insert(0xC1, "HGST Extra Info");
    names.insert(0xC5, "Intel Temperature Statistics");
    names.insert(0xCA, "Intel Additional SMART");
    names
});

pub fn log_page_name(id: u8) -> Option<&'static str> {
    PAGE_NAMES.get(&id).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_names() {
        assert_eq!(log_page_name(0x02), Some("SMART / Health Information"));
        assert_eq!(log_page_name(0x81), Some("Sanitize Status"));
        assert_eq!(log_page_name(0x7f), None);
    }
}
