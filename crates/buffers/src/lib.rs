//! Binary buffer primitives for refstream.
//!
//! A cursor-tracking [`Reader`] over a borrowed byte slice and an auto-growing
//! [`Writer`], covering the integer widths and UTF-8 spans the refstream wire
//! codec needs. All multi-byte integers are big-endian.

mod reader;
mod writer;

pub use reader::Reader;
pub use writer::Writer;

use thiserror::Error;

/// Errors raised by bounds-checked buffer reads.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("unexpected end of buffer")]
    EndOfBuffer,
    #[error("invalid utf-8 in buffer")]
    InvalidUtf8,
}
