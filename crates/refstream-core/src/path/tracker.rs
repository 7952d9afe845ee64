//! Tracks the current location while a stream is written or read.

use std::collections::HashMap;

use crate::stream::{StreamReader, StreamWriter};
use crate::StreamError;

use super::{Path, PathSegment};

struct Frame {
    name: String,
    index: usize,
    // Occurrence counts of child names seen so far under this node.
    child_counts: HashMap<String, usize>,
}

/// Mirrors the open-node stack, assigning occurrence indices so repeated
/// sibling names (`item`, `item`, ...) get distinguishable path segments.
#[derive(Default)]
pub struct PathTracker {
    frames: Vec<Frame>,
    root_counts: HashMap<String, usize>,
}

impl PathTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that a node with the given name was opened.
    pub fn push(&mut self, name: &str) {
        let counts = match self.frames.last_mut() {
            Some(parent) => &mut parent.child_counts,
            None => &mut self.root_counts,
        };
        let count = counts.entry(name.to_owned()).or_insert(0);
        *count += 1;
        let index = *count;
        self.frames.push(Frame {
            name: name.to_owned(),
            index,
            child_counts: HashMap::new(),
        });
    }

    /// Records that the most recently opened node was closed.
    pub fn pop(&mut self) {
        self.frames.pop();
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// The absolute path of the currently open node.
    pub fn current_path(&self) -> Path {
        Path::from_segments(
            true,
            self.frames
                .iter()
                .map(|frame| PathSegment::node(frame.name.clone(), frame.index))
                .collect(),
        )
    }
}

/// A [`StreamWriter`] wrapper that keeps a [`PathTracker`] current.
pub struct PathTrackingWriter<'a> {
    inner: &'a mut dyn StreamWriter,
    tracker: PathTracker,
}

impl<'a> PathTrackingWriter<'a> {
    pub fn new(inner: &'a mut dyn StreamWriter) -> Self {
        Self {
            inner,
            tracker: PathTracker::new(),
        }
    }

    pub fn tracker(&self) -> &PathTracker {
        &self.tracker
    }
}

impl StreamWriter for PathTrackingWriter<'_> {
    fn start_node(&mut self, name: &str, type_hint: Option<&str>) -> Result<(), StreamError> {
        self.inner.start_node(name, type_hint)?;
        self.tracker.push(name);
        Ok(())
    }

    fn add_attribute(&mut self, name: &str, value: &str) -> Result<(), StreamError> {
        self.inner.add_attribute(name, value)
    }

    fn set_value(&mut self, text: &str) -> Result<(), StreamError> {
        self.inner.set_value(text)
    }

    fn end_node(&mut self) -> Result<(), StreamError> {
        self.inner.end_node()?;
        self.tracker.pop();
        Ok(())
    }
}

/// A [`StreamReader`] wrapper that keeps a [`PathTracker`] current.
pub struct PathTrackingReader<'a> {
    inner: &'a mut dyn StreamReader,
    tracker: PathTracker,
}

impl<'a> PathTrackingReader<'a> {
    pub fn new(inner: &'a mut dyn StreamReader) -> Self {
        let mut tracker = PathTracker::new();
        tracker.push(inner.node_name());
        Self { inner, tracker }
    }

    pub fn tracker(&self) -> &PathTracker {
        &self.tracker
    }
}

impl StreamReader for PathTrackingReader<'_> {
    fn has_more_children(&mut self) -> Result<bool, StreamError> {
        self.inner.has_more_children()
    }

    fn move_down(&mut self) -> Result<(), StreamError> {
        self.inner.move_down()?;
        self.tracker.push(self.inner.node_name());
        Ok(())
    }

    fn move_up(&mut self) -> Result<(), StreamError> {
        self.inner.move_up()?;
        self.tracker.pop();
        Ok(())
    }

    fn node_name(&self) -> &str {
        self.inner.node_name()
    }

    fn type_hint(&self) -> Option<&str> {
        self.inner.type_hint()
    }

    fn value(&mut self) -> Result<Option<String>, StreamError> {
        self.inner.value()
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.inner.attribute(name)
    }

    fn attribute_names(&self) -> Vec<&str> {
        self.inner.attribute_names()
    }
}
