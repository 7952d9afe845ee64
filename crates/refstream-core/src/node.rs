//! In-memory tree backend for the event contract.
//!
//! [`NodeWriter`] materializes the event sequence as an owned [`Node`] tree and
//! [`NodeReader`] replays one. This is the transport-free backend used in tests
//! and by callers that want to inspect or build documents directly.

use indexmap::IndexMap;

use crate::stream::{StreamReader, StreamWriter};
use crate::StreamError;

/// One node of an in-memory document tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Node {
    pub name: String,
    pub type_hint: Option<String>,
    pub attributes: IndexMap<String, String>,
    pub value: Option<String>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Builds a [`Node`] tree from writer events, enforcing the event contract.
#[derive(Default)]
pub struct NodeWriter {
    stack: Vec<Node>,
    root: Option<Node>,
}

impl NodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes the writer and returns the finished tree.
    pub fn finish(self) -> Result<Node, StreamError> {
        if !self.stack.is_empty() {
            return Err(StreamError::Malformed("unclosed node at end of document".into()));
        }
        self.root
            .ok_or_else(|| StreamError::Malformed("no root node written".into()))
    }
}

impl StreamWriter for NodeWriter {
    fn start_node(&mut self, name: &str, type_hint: Option<&str>) -> Result<(), StreamError> {
        if self.root.is_some() && self.stack.is_empty() {
            return Err(StreamError::Malformed("document already closed".into()));
        }
        if let Some(parent) = self.stack.last() {
            if parent.value.is_some() {
                return Err(StreamError::Malformed(
                    "node already has a text value, cannot add children".into(),
                ));
            }
        }
        let mut node = Node::new(name);
        node.type_hint = type_hint.map(str::to_owned);
        self.stack.push(node);
        Ok(())
    }

    fn add_attribute(&mut self, name: &str, value: &str) -> Result<(), StreamError> {
        let node = self
            .stack
            .last_mut()
            .ok_or_else(|| StreamError::Malformed("add_attribute with no open node".into()))?;
        if node.value.is_some() || !node.children.is_empty() {
            return Err(StreamError::Malformed(
                "attributes must precede the node value and children".into(),
            ));
        }
        node.attributes.insert(name.to_owned(), value.to_owned());
        Ok(())
    }

    fn set_value(&mut self, text: &str) -> Result<(), StreamError> {
        let node = self
            .stack
            .last_mut()
            .ok_or_else(|| StreamError::Malformed("set_value with no open node".into()))?;
        if !node.children.is_empty() {
            return Err(StreamError::Malformed(
                "node already has children, cannot set a text value".into(),
            ));
        }
        if node.value.is_some() {
            return Err(StreamError::Malformed("node value already set".into()));
        }
        node.value = Some(text.to_owned());
        Ok(())
    }

    fn end_node(&mut self) -> Result<(), StreamError> {
        let node = self
            .stack
            .pop()
            .ok_or_else(|| StreamError::Malformed("end_node with no open node".into()))?;
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root = Some(node),
        }
        Ok(())
    }
}

struct Cursor<'a> {
    node: &'a Node,
    next_child: usize,
}

/// Replays a [`Node`] tree as reader events, positioned on the root at
/// construction.
pub struct NodeReader<'a> {
    stack: Vec<Cursor<'a>>,
}

impl<'a> NodeReader<'a> {
    pub fn new(root: &'a Node) -> Self {
        Self {
            stack: vec![Cursor {
                node: root,
                next_child: 0,
            }],
        }
    }

    fn current(&self) -> &Cursor<'a> {
        // The stack is never empty: the root cursor is pushed at construction
        // and move_up refuses to pop it.
        self.stack.last().expect("reader stack is never empty")
    }
}

impl StreamReader for NodeReader<'_> {
    fn has_more_children(&mut self) -> Result<bool, StreamError> {
        let cursor = self.current();
        Ok(cursor.next_child < cursor.node.children.len())
    }

    fn move_down(&mut self) -> Result<(), StreamError> {
        let cursor = self.current();
        let child = cursor
            .node
            .children
            .get(cursor.next_child)
            .ok_or_else(|| StreamError::Malformed("move_down past the last child".into()))?;
        let top = self.stack.len() - 1;
        self.stack[top].next_child += 1;
        self.stack.push(Cursor {
            node: child,
            next_child: 0,
        });
        Ok(())
    }

    fn move_up(&mut self) -> Result<(), StreamError> {
        assert!(
            self.stack.len() > 1,
            "move_up without a matching move_down"
        );
        self.stack.pop();
        Ok(())
    }

    fn node_name(&self) -> &str {
        &self.current().node.name
    }

    fn type_hint(&self) -> Option<&str> {
        self.current().node.type_hint.as_deref()
    }

    fn value(&mut self) -> Result<Option<String>, StreamError> {
        Ok(self.current().node.value.clone())
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.current().node.attributes.get(name).map(String::as_str)
    }

    fn attribute_names(&self) -> Vec<&str> {
        self.current()
            .node
            .attributes
            .keys()
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> Node {
        let mut w = NodeWriter::new();
        w.start_node("root", Some("doc")).unwrap();
        w.add_attribute("id", "1").unwrap();
        w.start_node("item", None).unwrap();
        w.set_value("first").unwrap();
        w.end_node().unwrap();
        w.start_node("item", None).unwrap();
        w.set_value("second").unwrap();
        w.end_node().unwrap();
        w.end_node().unwrap();
        w.finish().unwrap()
    }

    #[test]
    fn writer_builds_tree() {
        let tree = sample_tree();
        assert_eq!(tree.name, "root");
        assert_eq!(tree.type_hint.as_deref(), Some("doc"));
        assert_eq!(tree.attributes.get("id").map(String::as_str), Some("1"));
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[1].value.as_deref(), Some("second"));
    }

    #[test]
    fn reader_walks_tree() {
        let tree = sample_tree();
        let mut r = NodeReader::new(&tree);
        assert_eq!(r.node_name(), "root");
        assert_eq!(r.attribute("id"), Some("1"));
        assert!(r.has_more_children().unwrap());
        r.move_down().unwrap();
        assert_eq!(r.node_name(), "item");
        assert_eq!(r.value().unwrap().as_deref(), Some("first"));
        r.move_up().unwrap();
        r.move_down().unwrap();
        assert_eq!(r.value().unwrap().as_deref(), Some("second"));
        r.move_up().unwrap();
        assert!(!r.has_more_children().unwrap());
    }

    #[test]
    fn attributes_after_content_rejected() {
        let mut w = NodeWriter::new();
        w.start_node("root", None).unwrap();
        w.set_value("text").unwrap();
        assert!(matches!(
            w.add_attribute("id", "1"),
            Err(StreamError::Malformed(_))
        ));
    }

    #[test]
    fn value_and_children_exclusive() {
        let mut w = NodeWriter::new();
        w.start_node("root", None).unwrap();
        w.start_node("child", None).unwrap();
        w.end_node().unwrap();
        assert!(matches!(w.set_value("text"), Err(StreamError::Malformed(_))));

        let mut w = NodeWriter::new();
        w.start_node("root", None).unwrap();
        w.set_value("text").unwrap();
        assert!(matches!(
            w.start_node("child", None),
            Err(StreamError::Malformed(_))
        ));
    }

    #[test]
    fn end_without_start_rejected() {
        let mut w = NodeWriter::new();
        assert!(matches!(w.end_node(), Err(StreamError::Malformed(_))));
    }

    #[test]
    fn unclosed_node_rejected() {
        let mut w = NodeWriter::new();
        w.start_node("root", None).unwrap();
        assert!(matches!(w.finish(), Err(StreamError::Malformed(_))));
    }

    #[test]
    #[should_panic(expected = "move_up without a matching move_down")]
    fn move_up_at_root_panics() {
        let tree = sample_tree();
        let mut r = NodeReader::new(&tree);
        let _ = r.move_up();
    }
}
