//! Identifier-based key scheme: anchors carry a monotonically assigned
//! decimal `id` attribute, and back-references quote that id verbatim.

use crate::path::Path;
use crate::stream::StreamReader;
use crate::StreamError;

use super::reference::ReferenceKeys;
use super::ID_ATTRIBUTE;

pub(crate) struct IdKeys {
    next: u64,
}

impl IdKeys {
    pub(crate) fn new() -> Self {
        IdKeys { next: 1 }
    }
}

impl ReferenceKeys for IdKeys {
    type Key = String;

    fn create_key(&mut self, _current: &Path) -> String {
        let id = self.next;
        self.next += 1;
        id.to_string()
    }

    fn reference_text(&self, _current: &Path, target: &String) -> String {
        target.clone()
    }

    fn anchor_attribute(&self, key: &String) -> Option<(&'static str, String)> {
        Some((ID_ATTRIBUTE, key.clone()))
    }

    fn key_of_node(&self, _current: &Path, reader: &dyn StreamReader) -> Option<String> {
        reader.attribute(ID_ATTRIBUTE).map(str::to_owned)
    }

    fn dereference(&self, _current: &Path, text: &str) -> Result<String, StreamError> {
        Ok(text.to_owned())
    }
}
