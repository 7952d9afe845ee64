//! Auto-growing binary writer.

/// Writes big-endian values into a growable byte buffer.
///
/// # Example
///
/// ```
/// use refstream_buffers::Writer;
///
/// let mut writer = Writer::new();
/// writer.u8(0x01);
/// writer.u16(0x0203);
/// assert_eq!(writer.into_bytes(), [0x01, 0x02, 0x03]);
/// ```
#[derive(Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer with the given initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` when nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consumes the writer and returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Borrows the written bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Writes an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self, val: u8) {
        self.buf.push(val);
    }

    /// Writes a signed 8-bit integer.
    #[inline]
    pub fn i8(&mut self, val: i8) {
        self.buf.push(val as u8);
    }

    /// Writes an unsigned 16-bit integer.
    #[inline]
    pub fn u16(&mut self, val: u16) {
        self.buf.extend_from_slice(&val.to_be_bytes());
    }

    /// Writes a signed 16-bit integer.
    #[inline]
    pub fn i16(&mut self, val: i16) {
        self.buf.extend_from_slice(&val.to_be_bytes());
    }

    /// Writes an unsigned 32-bit integer.
    #[inline]
    pub fn u32(&mut self, val: u32) {
        self.buf.extend_from_slice(&val.to_be_bytes());
    }

    /// Writes a signed 32-bit integer.
    #[inline]
    pub fn i32(&mut self, val: i32) {
        self.buf.extend_from_slice(&val.to_be_bytes());
    }

    /// Writes an unsigned 64-bit integer.
    #[inline]
    pub fn u64(&mut self, val: u64) {
        self.buf.extend_from_slice(&val.to_be_bytes());
    }

    /// Writes a signed 64-bit integer.
    #[inline]
    pub fn i64(&mut self, val: i64) {
        self.buf.extend_from_slice(&val.to_be_bytes());
    }

    /// Writes raw bytes.
    pub fn bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes a UTF-8 string span. Returns the number of bytes written.
    pub fn utf8(&mut self, s: &str) -> usize {
        let bytes = s.as_bytes();
        self.buf.extend_from_slice(bytes);
        bytes.len()
    }
}
