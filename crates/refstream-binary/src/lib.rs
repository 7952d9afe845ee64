//! refstream-binary — compact binary token encoding of the stream contract.
//!
//! The stream is a flat sequence of self-delimiting tokens ([`Token`]). Node
//! and attribute names are interned into a shared id dictionary as the stream
//! is written, so repeated names cost a couple of bytes after their first
//! occurrence. [`BinaryWriter`] and [`BinaryReader`] implement the core
//! stream traits over this encoding; any marshalling strategy from
//! `refstream-core` runs on top unchanged.
//!
//! # Example
//!
//! ```
//! use refstream_binary::{BinaryReader, BinaryWriter};
//! use refstream_core::{StreamReader, StreamWriter};
//!
//! # fn main() -> Result<(), refstream_core::StreamError> {
//! let mut writer = BinaryWriter::new();
//! writer.start_node("greeting", None)?;
//! writer.set_value("hello")?;
//! writer.end_node()?;
//! let bytes = writer.finish()?;
//!
//! let mut reader = BinaryReader::from_bytes(&bytes)?;
//! assert_eq!(reader.node_name(), "greeting");
//! assert_eq!(reader.value()?.as_deref(), Some("hello"));
//! # Ok(()) }
//! ```

mod reader;
pub mod token;
mod writer;

pub use reader::BinaryReader;
pub use token::Token;
pub use writer::BinaryWriter;
