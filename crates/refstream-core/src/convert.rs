//! The converter collaborator contract and registry.
//!
//! Converters turn objects into events and back; the core never inspects
//! runtime types itself beyond asking the registry. The registry is a
//! priority-ordered list tried front to back, so callers can override default
//! converters by registering at a higher priority.

use std::any::TypeId;

use crate::identity::Handle;
use crate::stream::{StreamReader, StreamWriter};
use crate::StreamError;

/// Turns objects of some set of types into stream events and back.
pub trait Converter {
    /// Whether this converter handles the given runtime type (writing side).
    fn can_convert(&self, ty: TypeId) -> bool;

    /// Whether this converter handles the given type hint (reading side). The
    /// hint is the node's `class` attribute when present, the node name
    /// otherwise.
    fn can_unmarshal(&self, hint: &str) -> bool;

    /// Writes `item` into the stream. Child objects go through
    /// [`MarshalContext::convert_another`] so the session strategy can track
    /// identity.
    fn marshal(&self, item: &Handle, ctx: &mut dyn MarshalContext) -> Result<(), StreamError>;

    /// Reconstructs an object from the current node. Child objects go through
    /// [`UnmarshalContext::convert_another`], passing the partially built
    /// instance so reference cycles resolve to it.
    fn unmarshal(&self, ctx: &mut dyn UnmarshalContext) -> Result<Handle, StreamError>;
}

/// What a converter sees of the marshalling session.
pub trait MarshalContext {
    fn writer(&mut self) -> &mut dyn StreamWriter;

    /// Converts a child object under the currently open node, applying the
    /// session's reference-tracking policy.
    fn convert_another(&mut self, item: &Handle) -> Result<(), StreamError>;
}

/// What a converter sees of the unmarshalling session.
pub trait UnmarshalContext {
    fn reader(&mut self) -> &mut dyn StreamReader;

    /// Converts the current node into an object. `parent` is the partially
    /// constructed instance the caller is filling in; a child node referencing
    /// an ancestor under construction resolves to that instance.
    fn convert_another(&mut self, parent: Option<&Handle>) -> Result<Handle, StreamError>;
}

/// Resolves converters for the marshalling strategies.
pub trait ConverterLookup {
    fn converter_for_type(&self, ty: TypeId) -> Result<&dyn Converter, StreamError>;
    fn converter_for_hint(&self, hint: &str) -> Result<&dyn Converter, StreamError>;
}

struct Entry {
    priority: i32,
    converter: Box<dyn Converter>,
}

/// A priority-ordered converter registry.
#[derive(Default)]
pub struct ConverterRegistry {
    entries: Vec<Entry>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a converter. Higher priorities are tried first; within one
    /// priority the most recently registered converter wins.
    pub fn register(&mut self, priority: i32, converter: Box<dyn Converter>) {
        let position = self
            .entries
            .iter()
            .position(|entry| entry.priority <= priority)
            .unwrap_or(self.entries.len());
        self.entries.insert(
            position,
            Entry {
                priority,
                converter,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ConverterLookup for ConverterRegistry {
    fn converter_for_type(&self, ty: TypeId) -> Result<&dyn Converter, StreamError> {
        self.entries
            .iter()
            .map(|entry| entry.converter.as_ref())
            .find(|converter| converter.can_convert(ty))
            .ok_or_else(|| StreamError::NoConverter(format!("{ty:?}")))
    }

    fn converter_for_hint(&self, hint: &str) -> Result<&dyn Converter, StreamError> {
        self.entries
            .iter()
            .map(|entry| entry.converter.as_ref())
            .find(|converter| converter.can_unmarshal(hint))
            .ok_or_else(|| StreamError::NoConverter(hint.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tagged(&'static str, TypeId);

    impl Converter for Tagged {
        fn can_convert(&self, ty: TypeId) -> bool {
            ty == self.1
        }
        fn can_unmarshal(&self, hint: &str) -> bool {
            hint == self.0
        }
        fn marshal(&self, _: &Handle, _: &mut dyn MarshalContext) -> Result<(), StreamError> {
            Ok(())
        }
        fn unmarshal(&self, _: &mut dyn UnmarshalContext) -> Result<Handle, StreamError> {
            Err(StreamError::Custom(self.0.into()))
        }
    }

    #[test]
    fn higher_priority_wins() {
        let mut registry = ConverterRegistry::new();
        registry.register(0, Box::new(Tagged("low", TypeId::of::<u32>())));
        registry.register(10, Box::new(Tagged("high", TypeId::of::<u32>())));
        let found = registry.converter_for_type(TypeId::of::<u32>()).unwrap();
        assert!(found.can_unmarshal("high"));
    }

    #[test]
    fn later_registration_wins_within_priority() {
        let mut registry = ConverterRegistry::new();
        registry.register(0, Box::new(Tagged("first", TypeId::of::<u32>())));
        registry.register(0, Box::new(Tagged("second", TypeId::of::<u32>())));
        let found = registry.converter_for_type(TypeId::of::<u32>()).unwrap();
        assert!(found.can_unmarshal("second"));
    }

    #[test]
    fn missing_converter_reported() {
        let registry = ConverterRegistry::new();
        assert!(matches!(
            registry.converter_for_type(TypeId::of::<u32>()),
            Err(StreamError::NoConverter(_))
        ));
        assert!(matches!(
            registry.converter_for_hint("nope"),
            Err(StreamError::NoConverter(_))
        ));
    }
}
