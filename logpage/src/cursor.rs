//! Bounds-checked little-endian reads over a borrowed page buffer.

use crate::error::DecodeError;
use bytes::Buf;

/// Read position inside a window of a log page.
///
/// Every read checks the window first, so a short or hostile buffer turns
/// into a [`DecodeError`] rather than a panic from the underlying [`Buf`].
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    rest: &'a [u8],
    len: usize,
    base: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Cursor {
            rest: data,
            len: data.len(),
            base: 0,
        }
    }

    /// Offset from the start of this window.
    pub fn offset(&self) -> usize {
        self.len - self.rest.len()
    }

    /// Offset from the start of the page the window was carved from.
    pub fn position(&self) -> usize {
        self.base + self.offset()
    }

    pub fn remaining(&self) -> usize {
        self.rest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rest.is_empty()
    }

    pub fn ensure(&self, needed: usize) -> Result<(), DecodeError> {
        if self.rest.len() < needed {
            return Err(DecodeError {
                offset: self.position(),
                needed,
                available: self.rest.len(),
            });
        }

        Ok(())
    }

    pub fn skip(&mut self, n: usize) -> Result<(), DecodeError> {
        self.ensure(n)?;
        self.rest.advance(n);
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        self.ensure(1)?;
        Ok(self.rest.get_u8())
    }

    pub fn read_u16_le(&mut self) -> Result<u16, DecodeError> {
        self.ensure(2)?;
        Ok(self.rest.get_u16_le())
    }

    pub fn read_u32_le(&mut self) -> Result<u32, DecodeError> {
        self.ensure(4)?;
        Ok(self.rest.get_u32_le())
    }

    pub fn read_u64_le(&mut self) -> Result<u64, DecodeError> {
        self.ensure(8)?;
        Ok(self.rest.get_u64_le())
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        self.ensure(n)?;
        let (head, tail) = self.rest.split_at(n);
        self.rest = tail;
        Ok(head)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut arr = [0; N];
        arr.copy_from_slice(self.read_bytes(N)?);
        Ok(arr)
    }

    /// Splits the next `n` bytes off as their own window and moves past them.
    pub fn window(&mut self, n: usize) -> Result<Cursor<'a>, DecodeError> {
        let base = self.position();
        let data = self.read_bytes(n)?;
        Ok(Cursor {
            rest: data,
            len: data.len(),
            base,
        })
    }
}

/// A value with a fixed little-endian encoding.
pub trait Wire: Copy {
    const SIZE: usize;

    fn read(cursor: &mut Cursor<'_>) -> Result<Self, DecodeError>;
}

impl Wire for u8 {
    const SIZE: usize = 1;

    fn read(cursor: &mut Cursor<'_>) -> Result<Self, DecodeError> {
        cursor.read_u8()
    }
}

impl Wire for u16 {
    const SIZE: usize = 2;

    fn read(cursor: &mut Cursor<'_>) -> Result<Self, DecodeError> {
        cursor.read_u16_le()
    }
}

impl Wire for u32 {
    const SIZE: usize = 4;

    fn read(cursor: &mut Cursor<'_>) -> Result<Self, DecodeError> {
        cursor.read_u32_le()
    }
}

impl Wire for u64 {
    const SIZE: usize = 8;

    fn read(cursor: &mut Cursor<'_>) -> Result<Self, DecodeError> {
        cursor.read_u64_le()
    }
}

impl<T: Wire + Default, const N: usize> Wire for [T; N] {
    const SIZE: usize = T::SIZE * N;

    fn read(cursor: &mut Cursor<'_>) -> Result<Self, DecodeError> {
        cursor.ensure(Self::SIZE)?;
        let mut arr = [T::default(); N];
        for slot in arr.iter_mut() {
            *slot = T::read(cursor)?;
        }
        Ok(arr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_little_endian() {
        let data = [0x01, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12, 0xAA];
        let mut cursor = Cursor::new(&data);

        assert_eq!(cursor.read_u8().unwrap(), 0x01);
        assert_eq!(cursor.read_u16_le().unwrap(), 0x1234);
        assert_eq!(cursor.read_u32_le().unwrap(), 0x1234_5678);
        assert_eq!(cursor.offset(), 7);
        assert_eq!(cursor.remaining(), 1);
    }

    #[test]
    fn short_read_does_not_advance() {
        let data = [0x01, 0x02, 0x03];
        let mut cursor = Cursor::new(&data);
        cursor.skip(1).unwrap();

        let err = cursor.read_u32_le().unwrap_err();
        assert_eq!(
            err,
            DecodeError {
                offset: 1,
                needed: 4,
                available: 2
            }
        );
        assert_eq!(cursor.offset(), 1);
        assert_eq!(cursor.read_u16_le().unwrap(), 0x0302);
        assert!(cursor.is_empty());
    }

    #[test]
    fn window_is_bounded_and_keeps_page_offsets() {
        let data = [0u8, 1, 2, 3, 4, 5, 6, 7];
        let mut cursor = Cursor::new(&data);
        cursor.skip(2).unwrap();

        let mut window = cursor.window(3).unwrap();
        assert_eq!(cursor.offset(), 5);
        assert_eq!(window.position(), 2);
        assert_eq!(window.read_bytes(3).unwrap(), &[2, 3, 4]);

        let err = window.read_u8().unwrap_err();
        assert_eq!(err.offset, 5);
        assert!(cursor.window(4).is_err());
    }

    #[test]
    fn arrays_read_element_by_element() {
        let data = [0x01, 0x00, 0x02, 0x00, 0x03, 0x00];
        let mut cursor = Cursor::new(&data);

        let values = <[u16; 3]>::read(&mut cursor).unwrap();
        assert_eq!(values, [1, 2, 3]);
        assert_eq!(<[u16; 3] as Wire>::SIZE, 6);
    }
}
