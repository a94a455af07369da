//! 128-bit lifetime counters and their decimal rendering.
//!
//! Health page counters are 16 bytes wide. By default they are kept as
//! `u128`. With the `narrow-counters` feature only the low 8 bytes are kept
//! and anything above them is dropped, so a counter past `u64::MAX` renders
//! as its value modulo 2^64.

use crate::cursor::{Cursor, Wire};
use crate::error::DecodeError;
use std::fmt;

#[cfg(not(feature = "narrow-counters"))]
pub type Magnitude = u128;
#[cfg(feature = "narrow-counters")]
pub type Magnitude = u64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WideCounter(Magnitude);

impl WideCounter {
    /// Decimal digits needed for the largest magnitude of this build.
    #[cfg(not(feature = "narrow-counters"))]
    pub const MAX_DIGITS: usize = 39;
    #[cfg(feature = "narrow-counters")]
    pub const MAX_DIGITS: usize = 20;

    #[cfg(not(feature = "narrow-counters"))]
    pub fn from_le_bytes(bytes: [u8; 16]) -> Self {
        WideCounter(u128::from_le_bytes(bytes))
    }

    #[cfg(feature = "narrow-counters")]
    pub fn from_le_bytes(bytes: [u8; 16]) -> Self {
        let mut low = [0; 8];
        low.copy_from_slice(&bytes[..8]);
        WideCounter(u64::from_le_bytes(low))
    }

    pub fn get(&self) -> Magnitude {
        self.0
    }
}

impl From<u64> for WideCounter {
    fn from(value: u64) -> Self {
        WideCounter(value.into())
    }
}

impl Wire for WideCounter {
    const SIZE: usize = 16;

    fn read(cursor: &mut Cursor<'_>) -> Result<Self, DecodeError> {
        cursor.read_array::<16>().map(WideCounter::from_le_bytes)
    }
}

impl fmt::Display for WideCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = [0; WideCounter::MAX_DIGITS];
        match format_decimal(*self, &mut buf) {
            Some(digits) => f.pad(digits),
            None => Err(fmt::Error),
        }
    }
}

/// Writes `value` in decimal into the tail of `buf`.
///
/// Returns the digits actually written, which start somewhere inside `buf`,
/// or `None` when `buf` is too small to hold every digit. Nothing is written
/// outside `buf` in either case.
pub fn format_decimal(value: WideCounter, buf: &mut [u8]) -> Option<&str> {
    let mut start = buf.len();
    let mut rest = value.0;

    if rest == 0 {
        start = start.checked_sub(1)?;
        buf[start] = b'0';
    }

    while rest != 0 {
        start = start.checked_sub(1)?;
        buf[start] = b'0' + (rest % 10) as u8;
        rest /= 10;
    }

    std::str::from_utf8(&buf[start..]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn zero_is_a_single_digit() {
        let mut buf = [b'x'; 8];
        assert_eq!(format_decimal(WideCounter::default(), &mut buf), Some("0"));
        assert_eq!(&buf[..7], b"xxxxxxx");
    }

    #[test]
    fn u64_max_has_twenty_digits() {
        let mut buf = [0; WideCounter::MAX_DIGITS];
        let digits = format_decimal(WideCounter::from(u64::MAX), &mut buf);
        assert_eq!(digits, Some("18446744073709551615"));
    }

    #[test]
    fn too_small_buffer_fails() {
        let mut buf = [b'x'; 19];
        assert_eq!(format_decimal(WideCounter::from(u64::MAX), &mut buf), None);

        let mut empty: [u8; 0] = [];
        assert_eq!(format_decimal(WideCounter::default(), &mut empty), None);
    }

    #[test]
    fn exact_fit_uses_whole_buffer() {
        let mut buf = [0; 3];
        assert_eq!(format_decimal(WideCounter::from(999), &mut buf), Some("999"));

        let mut buf = [0; 3];
        assert_eq!(format_decimal(WideCounter::from(1000), &mut buf), None);
    }

    #[cfg(not(feature = "narrow-counters"))]
    #[test]
    fn full_width_counter() {
        let counter = WideCounter::from_le_bytes([0xFF; 16]);
        assert_eq!(
            counter.to_string(),
            "340282366920938463463374607431768211455"
        );

        let mut bytes = [0; 16];
        bytes[8] = 1;
        assert_eq!(
            WideCounter::from_le_bytes(bytes).to_string(),
            "18446744073709551616"
        );
    }

    #[cfg(feature = "narrow-counters")]
    #[test]
    fn narrow_counter_drops_high_bytes() {
        let mut bytes = [0; 16];
        bytes[0] = 7;
        bytes[8] = 1;
        assert_eq!(WideCounter::from_le_bytes(bytes).to_string(), "7");
    }

    #[test]
    fn display_honours_width() {
        assert_eq!(format!("{:>5}", WideCounter::from(42)), "   42");
    }
}
