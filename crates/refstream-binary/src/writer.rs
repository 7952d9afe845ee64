//! [`StreamWriter`] producing the binary token stream.

use std::collections::HashMap;

use refstream_buffers::Writer;
use refstream_core::{StreamError, StreamWriter, CLASS_ATTRIBUTE};

use crate::token::{encode, Token};

#[derive(Clone, Copy, PartialEq)]
enum NodeState {
    Fresh,
    HasValue,
    HasChildren,
}

/// Serializes writer events as binary tokens.
///
/// Node and attribute names share one id dictionary; a [`Token::NameEntry`]
/// is emitted immediately before a name's first use, so the dictionary never
/// needs to be transmitted separately.
pub struct BinaryWriter {
    out: Writer,
    names: HashMap<String, u64>,
    next_name: u64,
    stack: Vec<NodeState>,
    closed_root: bool,
}

impl Default for BinaryWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self {
            out: Writer::new(),
            names: HashMap::new(),
            next_name: 1,
            stack: Vec::new(),
            closed_root: false,
        }
    }

    /// Consumes the writer and returns the encoded stream.
    pub fn finish(self) -> Result<Vec<u8>, StreamError> {
        if !self.stack.is_empty() {
            return Err(StreamError::Malformed(
                "unclosed node at end of document".into(),
            ));
        }
        if !self.closed_root {
            return Err(StreamError::Malformed("no root node written".into()));
        }
        Ok(self.out.into_bytes())
    }

    /// Resolves a name to its dictionary id, emitting the binding token the
    /// first time the name occurs.
    fn name_id(&mut self, name: &str) -> u64 {
        if let Some(id) = self.names.get(name) {
            return *id;
        }
        let id = self.next_name;
        self.next_name += 1;
        self.names.insert(name.to_owned(), id);
        encode(
            &Token::NameEntry {
                id,
                name: name.to_owned(),
            },
            &mut self.out,
        );
        id
    }

    fn emit_attribute(&mut self, name: &str, value: &str) {
        let id = self.name_id(name);
        encode(
            &Token::Attribute {
                id,
                value: value.to_owned(),
            },
            &mut self.out,
        );
    }
}

impl StreamWriter for BinaryWriter {
    fn start_node(&mut self, name: &str, type_hint: Option<&str>) -> Result<(), StreamError> {
        if self.closed_root && self.stack.is_empty() {
            return Err(StreamError::Malformed("document already closed".into()));
        }
        if let Some(parent) = self.stack.last_mut() {
            if *parent == NodeState::HasValue {
                return Err(StreamError::Malformed(
                    "node already has a text value, cannot add children".into(),
                ));
            }
            *parent = NodeState::HasChildren;
        }
        let id = self.name_id(name);
        encode(&Token::StartNode { id }, &mut self.out);
        self.stack.push(NodeState::Fresh);
        if let Some(hint) = type_hint {
            self.emit_attribute(CLASS_ATTRIBUTE, hint);
        }
        Ok(())
    }

    fn add_attribute(&mut self, name: &str, value: &str) -> Result<(), StreamError> {
        match self.stack.last() {
            None => {
                return Err(StreamError::Malformed(
                    "add_attribute with no open node".into(),
                ))
            }
            Some(NodeState::Fresh) => {}
            Some(_) => {
                return Err(StreamError::Malformed(
                    "attributes must precede the node value and children".into(),
                ))
            }
        }
        self.emit_attribute(name, value);
        Ok(())
    }

    fn set_value(&mut self, text: &str) -> Result<(), StreamError> {
        match self.stack.last_mut() {
            None => {
                return Err(StreamError::Malformed("set_value with no open node".into()))
            }
            Some(state @ NodeState::Fresh) => *state = NodeState::HasValue,
            Some(NodeState::HasValue) => {
                return Err(StreamError::Malformed("node value already set".into()))
            }
            Some(NodeState::HasChildren) => {
                return Err(StreamError::Malformed(
                    "node already has children, cannot set a text value".into(),
                ))
            }
        }
        encode(
            &Token::Value {
                text: text.to_owned(),
            },
            &mut self.out,
        );
        Ok(())
    }

    fn end_node(&mut self) -> Result<(), StreamError> {
        if self.stack.pop().is_none() {
            return Err(StreamError::Malformed("end_node with no open node".into()));
        }
        encode(&Token::EndNode, &mut self.out);
        if self.stack.is_empty() {
            self.closed_root = true;
        }
        Ok(())
    }
}
