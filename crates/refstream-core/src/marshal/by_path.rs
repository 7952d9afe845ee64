//! Path-based key scheme: an object's anchor is the document path where it
//! first appeared, so no extra attribute is written; back-references are
//! rendered relative to the referring node.

use crate::path::Path;
use crate::stream::StreamReader;
use crate::StreamError;

use super::reference::ReferenceKeys;

pub(crate) struct PathKeys;

impl ReferenceKeys for PathKeys {
    type Key = Path;

    fn create_key(&mut self, current: &Path) -> Path {
        current.clone()
    }

    fn reference_text(&self, current: &Path, target: &Path) -> String {
        current.relative_to(target).to_string()
    }

    fn anchor_attribute(&self, _key: &Path) -> Option<(&'static str, String)> {
        None
    }

    fn key_of_node(&self, current: &Path, _reader: &dyn StreamReader) -> Option<Path> {
        Some(current.clone())
    }

    fn dereference(&self, current: &Path, text: &str) -> Result<Path, StreamError> {
        current.apply(&Path::parse(text)?)
    }
}
