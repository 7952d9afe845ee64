//! Identity-tracking marshaller/unmarshaller, generic over the key scheme.
//!
//! The identifier-based and path-based strategies run the same algorithm and
//! differ only in what an identity key looks like and how a back-reference is
//! written as text; [`ReferenceKeys`] captures that difference.

use std::collections::HashMap;
use std::hash::Hash;

use crate::convert::{ConverterLookup, MarshalContext, UnmarshalContext};
use crate::identity::{Handle, ObjectIdDictionary};
use crate::path::{Path, PathTrackingReader, PathTrackingWriter};
use crate::stream::{StreamReader, StreamWriter};
use crate::StreamError;

use super::REFERENCE_ATTRIBUTE;

/// Key scheme of a reference-tracking strategy.
pub(crate) trait ReferenceKeys {
    type Key: Clone + Eq + Hash;

    /// Issues the key anchoring a newly visited object at `current`.
    fn create_key(&mut self, current: &Path) -> Self::Key;

    /// Renders a back-reference from `current` to the object anchored at
    /// `target` as attribute text.
    fn reference_text(&self, current: &Path, target: &Self::Key) -> String;

    /// The attribute announcing a valid anchor, if the scheme needs one.
    fn anchor_attribute(&self, key: &Self::Key) -> Option<(&'static str, String)>;

    /// Reads the key under which the current node's object will be recorded.
    fn key_of_node(&self, current: &Path, reader: &dyn StreamReader) -> Option<Self::Key>;

    /// Parses reference text back into a key, relative to `current`.
    fn dereference(&self, current: &Path, text: &str) -> Result<Self::Key, StreamError>;
}

pub(crate) fn marshal<P: ReferenceKeys>(
    item: &Handle,
    root_name: &str,
    writer: &mut dyn StreamWriter,
    lookup: &dyn ConverterLookup,
    keys: P,
) -> Result<(), StreamError> {
    let mut marshaller = ReferenceMarshaller {
        writer: PathTrackingWriter::new(writer),
        lookup,
        keys,
        references: ObjectIdDictionary::new(),
        last_path: None,
    };
    marshaller.writer.start_node(root_name, None)?;
    marshaller.convert_another(item)?;
    marshaller.writer.end_node()
}

pub(crate) fn unmarshal<P: ReferenceKeys>(
    reader: &mut dyn StreamReader,
    lookup: &dyn ConverterLookup,
    keys: P,
) -> Result<Handle, StreamError> {
    let mut unmarshaller = ReferenceUnmarshaller {
        reader: PathTrackingReader::new(reader),
        lookup,
        keys,
        values: HashMap::new(),
        parents: Vec::new(),
    };
    unmarshaller.convert_another(None)
}

#[derive(Clone)]
struct Anchor<K> {
    key: K,
    path: Path,
    implicit: bool,
}

struct ReferenceMarshaller<'a, P: ReferenceKeys> {
    writer: PathTrackingWriter<'a>,
    lookup: &'a dyn ConverterLookup,
    keys: P,
    references: ObjectIdDictionary<Anchor<P::Key>>,
    last_path: Option<Path>,
}

impl<P: ReferenceKeys> MarshalContext for ReferenceMarshaller<'_, P> {
    fn writer(&mut self) -> &mut dyn StreamWriter {
        &mut self.writer
    }

    fn convert_another(&mut self, item: &Handle) -> Result<(), StreamError> {
        let lookup = self.lookup;
        let converter = lookup.converter_for_type((**item).type_id())?;
        let current = self.writer.tracker().current_path();

        let prior = self.references.lookup(item).cloned();
        if let Some(anchor) = &prior {
            if anchor.path != current {
                if anchor.implicit {
                    return Err(StreamError::ImplicitReference {
                        path: current.to_string(),
                    });
                }
                let text = self.keys.reference_text(&current, &anchor.key);
                return self.writer.add_attribute(REFERENCE_ATTRIBUTE, &text);
            }
        }

        let key = match prior {
            Some(anchor) => anchor.key,
            None => self.keys.create_key(&current),
        };
        // An object visited at or above the last anchored path opened no node
        // of its own; it is unaddressable from outside and marked implicit.
        let implicit = self
            .last_path
            .as_ref()
            .is_some_and(|last| current.is_ancestor(last));
        if !implicit {
            if let Some((name, value)) = self.keys.anchor_attribute(&key) {
                self.writer.add_attribute(name, &value)?;
            }
            self.last_path = Some(current.clone());
        }
        self.references.associate(
            item,
            Anchor {
                key,
                path: current.clone(),
                implicit,
            },
        );
        converter
            .marshal(item, self)
            .map_err(|err| err.with_path(current.to_string()))
    }
}

struct ReferenceUnmarshaller<'a, P: ReferenceKeys> {
    reader: PathTrackingReader<'a>,
    lookup: &'a dyn ConverterLookup,
    keys: P,
    values: HashMap<P::Key, Handle>,
    parents: Vec<Option<P::Key>>,
}

impl<P: ReferenceKeys> UnmarshalContext for ReferenceUnmarshaller<'_, P> {
    fn reader(&mut self) -> &mut dyn StreamReader {
        &mut self.reader
    }

    fn convert_another(&mut self, parent: Option<&Handle>) -> Result<Handle, StreamError> {
        // Record the partially built parent under its key before recursing, so
        // a child referencing an ancestor under construction finds it. Only
        // the first binding per key is kept.
        if let (Some(parent), Some(Some(parent_key))) = (parent, self.parents.last()) {
            if !self.values.contains_key(parent_key) {
                self.values.insert(parent_key.clone(), parent.clone());
            }
        }

        let current = self.reader.tracker().current_path();
        if let Some(text) = self.reader.attribute(REFERENCE_ATTRIBUTE).map(str::to_owned) {
            let key = self.keys.dereference(&current, &text)?;
            return self
                .values
                .get(&key)
                .cloned()
                .ok_or(StreamError::UnknownReference { key: text });
        }

        let node_key = self.keys.key_of_node(&current, &self.reader);
        self.parents.push(node_key.clone());
        let hint = self
            .reader
            .type_hint()
            .map(str::to_owned)
            .unwrap_or_else(|| self.reader.node_name().to_owned());
        let lookup = self.lookup;
        let outcome = match lookup.converter_for_hint(&hint) {
            Ok(converter) => converter.unmarshal(self),
            Err(err) => Err(err),
        }
        .map_err(|err| err.with_path(current.to_string()));
        self.parents.pop();

        let value = outcome?;
        if let Some(key) = node_key {
            self.values.entry(key).or_insert_with(|| value.clone());
        }
        Ok(value)
    }
}
