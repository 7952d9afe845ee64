//! Instance-identity dictionary.
//!
//! Marshalling strategies need to answer "have I already visited this exact
//! object", where two value-equal but distinct instances must not collide.
//! Objects are passed around as [`Handle`]s; identity is the address of the
//! shared `Rc` allocation, so clones of one handle collapse to one entry while
//! equal-by-value instances stay apart.

use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

/// A shared, dynamically typed object handle.
pub type Handle = Rc<dyn Any>;

fn address(item: &Handle) -> usize {
    Rc::as_ptr(item) as *const () as usize
}

/// Maps object identity to an associated value.
///
/// Each association keeps a clone of the handle so the allocation cannot be
/// freed and its address reused while the dictionary is alive. Lifetime is one
/// marshal/unmarshal call; there is no eviction.
pub struct ObjectIdDictionary<V> {
    entries: HashMap<usize, (Handle, V)>,
}

impl<V> Default for ObjectIdDictionary<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<V> ObjectIdDictionary<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Associates a value with the object's identity, replacing any previous
    /// association for the same instance.
    pub fn associate(&mut self, item: &Handle, value: V) {
        self.entries.insert(address(item), (item.clone(), value));
    }

    /// Looks up the value associated with this exact instance.
    pub fn lookup(&self, item: &Handle) -> Option<&V> {
        self.entries.get(&address(item)).map(|(_, value)| value)
    }

    pub fn contains(&self, item: &Handle) -> bool {
        self.entries.contains_key(&address(item))
    }
}
