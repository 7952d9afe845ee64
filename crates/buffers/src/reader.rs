//! Bounds-checked binary reader with cursor tracking.

use std::str;

use crate::BufferError;

/// Reads big-endian values from a borrowed byte slice.
///
/// The reader keeps a cursor position; every read advances it. All reads are
/// bounds-checked and leave the cursor in place on failure, so a caller can
/// report the error without losing its position.
///
/// # Example
///
/// ```
/// use refstream_buffers::Reader;
///
/// let data = [0x01, 0x02, 0x03];
/// let mut reader = Reader::new(&data);
/// assert_eq!(reader.u8(), Ok(0x01));
/// assert_eq!(reader.u16(), Ok(0x0203));
/// ```
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Creates a reader over the given byte slice.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Returns `true` when every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    #[inline]
    fn check(&self, n: usize) -> Result<(), BufferError> {
        if self.pos + n > self.buf.len() {
            Err(BufferError::EndOfBuffer)
        } else {
            Ok(())
        }
    }

    /// Peeks at the next byte without advancing the cursor.
    pub fn peek(&self) -> Result<u8, BufferError> {
        self.check(1)?;
        Ok(self.buf[self.pos])
    }

    /// Reads an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self) -> Result<u8, BufferError> {
        self.check(1)?;
        let val = self.buf[self.pos];
        self.pos += 1;
        Ok(val)
    }

    /// Reads a signed 8-bit integer.
    #[inline]
    pub fn i8(&mut self) -> Result<i8, BufferError> {
        Ok(self.u8()? as i8)
    }

    /// Reads an unsigned 16-bit integer.
    #[inline]
    pub fn u16(&mut self) -> Result<u16, BufferError> {
        self.check(2)?;
        let val = u16::from_be_bytes([self.buf[self.pos], self.buf[self.pos + 1]]);
        self.pos += 2;
        Ok(val)
    }

    /// Reads a signed 16-bit integer.
    #[inline]
    pub fn i16(&mut self) -> Result<i16, BufferError> {
        Ok(self.u16()? as i16)
    }

    /// Reads an unsigned 32-bit integer.
    #[inline]
    pub fn u32(&mut self) -> Result<u32, BufferError> {
        self.check(4)?;
        let end = self.pos + 4;
        let val = u32::from_be_bytes(self.buf[self.pos..end].try_into().unwrap());
        self.pos = end;
        Ok(val)
    }

    /// Reads a signed 32-bit integer.
    #[inline]
    pub fn i32(&mut self) -> Result<i32, BufferError> {
        Ok(self.u32()? as i32)
    }

    /// Reads an unsigned 64-bit integer.
    #[inline]
    pub fn u64(&mut self) -> Result<u64, BufferError> {
        self.check(8)?;
        let end = self.pos + 8;
        let val = u64::from_be_bytes(self.buf[self.pos..end].try_into().unwrap());
        self.pos = end;
        Ok(val)
    }

    /// Reads a signed 64-bit integer.
    #[inline]
    pub fn i64(&mut self) -> Result<i64, BufferError> {
        Ok(self.u64()? as i64)
    }

    /// Reads `size` raw bytes.
    pub fn bytes(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        self.check(size)?;
        let start = self.pos;
        self.pos += size;
        Ok(&self.buf[start..self.pos])
    }

    /// Reads a UTF-8 string span of `size` bytes.
    pub fn utf8(&mut self, size: usize) -> Result<&'a str, BufferError> {
        self.check(size)?;
        let span = &self.buf[self.pos..self.pos + size];
        let s = str::from_utf8(span).map_err(|_| BufferError::InvalidUtf8)?;
        self.pos += size;
        Ok(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_unsigned_widths() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.u8(), Ok(0x01));
        assert_eq!(reader.u16(), Ok(0x0203));
        assert_eq!(reader.u32(), Ok(0x04050607));
        assert!(reader.is_empty());
    }

    #[test]
    fn reads_signed_negative() {
        let data = [0xfe, 0xfc, 0x18];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.i8(), Ok(-2));
        assert_eq!(reader.i16(), Ok(-1000));
    }

    #[test]
    fn u64_roundtrip() {
        let mut writer = crate::Writer::new();
        writer.u64(0x0102030405060708);
        let data = writer.into_bytes();
        let mut reader = Reader::new(&data);
        assert_eq!(reader.u64(), Ok(0x0102030405060708));
    }

    #[test]
    fn i64_roundtrip() {
        let mut writer = crate::Writer::new();
        writer.i64(-9_999_999_999);
        let data = writer.into_bytes();
        let mut reader = Reader::new(&data);
        assert_eq!(reader.i64(), Ok(-9_999_999_999));
    }

    #[test]
    fn end_of_buffer_leaves_cursor() {
        let data = [0x01];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.u16(), Err(BufferError::EndOfBuffer));
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.u8(), Ok(0x01));
    }

    #[test]
    fn peek_does_not_advance() {
        let data = [0x55];
        let reader = Reader::new(&data);
        assert_eq!(reader.peek(), Ok(0x55));
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn peek_empty() {
        let reader = Reader::new(&[]);
        assert_eq!(reader.peek(), Err(BufferError::EndOfBuffer));
    }

    #[test]
    fn utf8_valid_and_invalid() {
        let mut reader = Reader::new(b"hello");
        assert_eq!(reader.utf8(5), Ok("hello"));

        let data = [0xff, 0xfe];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.utf8(2), Err(BufferError::InvalidUtf8));
    }

    #[test]
    fn utf8_past_end() {
        let mut reader = Reader::new(b"hi");
        assert_eq!(reader.utf8(10), Err(BufferError::EndOfBuffer));
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn bytes_span() {
        let data = [1u8, 2, 3, 4, 5];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.bytes(3), Ok([1u8, 2, 3].as_ref()));
        assert_eq!(reader.remaining(), 2);
    }
}
