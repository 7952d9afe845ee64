//! Marshalling strategies.
//!
//! A strategy decides, for every object encountered during one session, whether
//! to emit it in full or as a back-reference to an earlier emission, and
//! resolves the symmetric question when reading. Three interchangeable
//! policies exist; one is selected per session and all per-session state
//! (identity dictionary, path tracker, values table) is constructed fresh for
//! each call.

mod by_id;
mod by_path;
mod reference;
mod tree;

use crate::convert::ConverterLookup;
use crate::identity::Handle;
use crate::stream::{StreamReader, StreamWriter};
use crate::StreamError;

/// Attribute naming an object's assigned identifier (identifier-based mode).
pub const ID_ATTRIBUTE: &str = "id";

/// Attribute holding a back-reference to a previously emitted object.
pub const REFERENCE_ATTRIBUTE: &str = "reference";

/// The reference-tracking policy for one marshal/unmarshal session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarshallingStrategy {
    /// No identity tracking; every object is converted afresh. A cyclic graph
    /// recurses until the stack is exhausted.
    Tree,
    /// Objects are anchored with monotonically assigned decimal `id`
    /// attributes and referenced by id.
    ReferenceById,
    /// Objects are anchored by their document path and referenced by relative
    /// path.
    ReferenceByPath,
}

impl MarshallingStrategy {
    /// Serializes `item` as a document rooted at `root_name`.
    pub fn marshal(
        &self,
        item: &Handle,
        root_name: &str,
        writer: &mut dyn StreamWriter,
        lookup: &dyn ConverterLookup,
    ) -> Result<(), StreamError> {
        match self {
            MarshallingStrategy::Tree => tree::marshal(item, root_name, writer, lookup),
            MarshallingStrategy::ReferenceById => {
                reference::marshal(item, root_name, writer, lookup, by_id::IdKeys::new())
            }
            MarshallingStrategy::ReferenceByPath => {
                reference::marshal(item, root_name, writer, lookup, by_path::PathKeys)
            }
        }
    }

    /// Reconstructs the object graph from a reader positioned on the root.
    pub fn unmarshal(
        &self,
        reader: &mut dyn StreamReader,
        lookup: &dyn ConverterLookup,
    ) -> Result<Handle, StreamError> {
        match self {
            MarshallingStrategy::Tree => tree::unmarshal(reader, lookup),
            MarshallingStrategy::ReferenceById => {
                reference::unmarshal(reader, lookup, by_id::IdKeys::new())
            }
            MarshallingStrategy::ReferenceByPath => {
                reference::unmarshal(reader, lookup, by_path::PathKeys)
            }
        }
    }
}
