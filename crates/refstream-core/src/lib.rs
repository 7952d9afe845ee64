//! refstream-core — hierarchical stream serialization with reference tracking.
//!
//! This crate defines the event contract every stream backend implements
//! ([`StreamWriter`]/[`StreamReader`]), an in-memory [`Node`] backend, the path
//! algebra used for relative addressing, the identity dictionary used to detect
//! already-visited instances, and the three interchangeable marshalling
//! strategies ([`MarshallingStrategy`]). Concrete wire encodings (such as the
//! binary token codec) live in sibling crates and plug in through the stream
//! traits.
//!
//! # Example
//!
//! ```
//! use refstream_core::{MarshallingStrategy, NodeReader, NodeWriter};
//! # use refstream_core::{ConverterRegistry, Converter, Handle, MarshalContext,
//! #     UnmarshalContext, StreamError};
//! # use std::any::TypeId;
//! # struct UnitConverter;
//! # impl Converter for UnitConverter {
//! #     fn can_convert(&self, ty: TypeId) -> bool { ty == TypeId::of::<String>() }
//! #     fn can_unmarshal(&self, hint: &str) -> bool { hint == "string" }
//! #     fn marshal(&self, item: &Handle, ctx: &mut dyn MarshalContext)
//! #         -> Result<(), StreamError> {
//! #         let s = item.clone().downcast::<String>()
//! #             .map_err(|_| StreamError::Custom("expected string".into()))?;
//! #         ctx.writer().set_value(&s)
//! #     }
//! #     fn unmarshal(&self, ctx: &mut dyn UnmarshalContext)
//! #         -> Result<Handle, StreamError> {
//! #         let text = ctx.reader().value()?.unwrap_or_default();
//! #         Ok(std::rc::Rc::new(text))
//! #     }
//! # }
//! # fn main() -> Result<(), StreamError> {
//! let mut registry = ConverterRegistry::new();
//! registry.register(0, Box::new(UnitConverter));
//!
//! let item: Handle = std::rc::Rc::new("hello".to_string());
//! let mut writer = NodeWriter::new();
//! MarshallingStrategy::ReferenceById.marshal(&item, "string", &mut writer, &registry)?;
//! let tree = writer.finish()?;
//!
//! let mut reader = NodeReader::new(&tree);
//! let restored = MarshallingStrategy::ReferenceById.unmarshal(&mut reader, &registry)?;
//! assert_eq!(*restored.downcast::<String>().unwrap(), "hello");
//! # Ok(()) }
//! ```

pub mod convert;
pub mod error;
pub mod identity;
pub mod marshal;
pub mod node;
pub mod path;
pub mod stream;

pub use convert::{Converter, ConverterLookup, ConverterRegistry, MarshalContext, UnmarshalContext};
pub use error::StreamError;
pub use identity::{Handle, ObjectIdDictionary};
pub use marshal::{MarshallingStrategy, ID_ATTRIBUTE, REFERENCE_ATTRIBUTE};
pub use node::{Node, NodeReader, NodeWriter};
pub use path::{Path, PathSegment, PathTracker, PathTrackingReader, PathTrackingWriter};
pub use stream::{StreamReader, StreamWriter, CLASS_ATTRIBUTE};
