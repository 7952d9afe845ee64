//! [`StreamReader`] over the binary token stream.

use std::collections::HashMap;

use refstream_buffers::Reader;
use refstream_core::{StreamError, StreamReader, CLASS_ATTRIBUTE};

use crate::token::{decode, Token};

struct Frame {
    name: String,
    attributes: Vec<(String, String)>,
    value: Option<String>,
}

/// Decodes a binary token stream as reader events.
///
/// Name bindings are consumed transparently, so callers only ever see the
/// node structure. At most one token of lookahead is held, which is what
/// `has_more_children` needs.
pub struct BinaryReader<'a> {
    input: Reader<'a>,
    names: HashMap<u64, String>,
    peeked: Option<Token>,
    frames: Vec<Frame>,
}

impl<'a> BinaryReader<'a> {
    /// Opens a binary stream, positioning the reader on the root node.
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self, StreamError> {
        let mut reader = Self {
            input: Reader::new(bytes),
            names: HashMap::new(),
            peeked: None,
            frames: Vec::new(),
        };
        match reader.next_token()? {
            Token::StartNode { id } => reader.enter(id)?,
            other => {
                return Err(StreamError::Malformed(format!(
                    "expected the root node, found {other:?}"
                )))
            }
        }
        Ok(reader)
    }

    /// Binary streams have no character form to parse.
    pub fn from_text(_text: &str) -> Result<Self, StreamError> {
        Err(StreamError::UnsupportedTransport(
            "binary token streams cannot be read from text",
        ))
    }

    fn current(&self) -> &Frame {
        // The stack is never empty: the root frame is pushed at construction
        // and move_up refuses to pop it.
        self.frames.last().expect("reader stack is never empty")
    }

    /// Reads the next structural token, recording name bindings as they pass.
    fn read_token(&mut self) -> Result<Token, StreamError> {
        loop {
            match decode(&mut self.input)? {
                Token::NameEntry { id, name } => {
                    self.names.insert(id, name);
                }
                Token::Version { .. } => {
                    return Err(StreamError::Malformed(
                        "unexpected version token mid-stream".into(),
                    ))
                }
                other => return Ok(other),
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, StreamError> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.read_token(),
        }
    }

    fn fill_peek(&mut self) -> Result<(), StreamError> {
        if self.peeked.is_none() && !self.input.is_empty() {
            self.peeked = Some(self.read_token()?);
        }
        Ok(())
    }

    /// Consumes a pending value token into the current frame, if one is next.
    fn pull_value(&mut self) -> Result<(), StreamError> {
        self.fill_peek()?;
        if matches!(self.peeked, Some(Token::Value { .. })) {
            if let Some(Token::Value { text }) = self.peeked.take() {
                let top = self.frames.len() - 1;
                self.frames[top].value = Some(text);
            }
        }
        Ok(())
    }

    fn resolve(&self, id: u64) -> Result<String, StreamError> {
        self.names
            .get(&id)
            .cloned()
            .ok_or_else(|| StreamError::Malformed(format!("unbound name id {id}")))
    }

    /// Pushes a frame for the node just opened, consuming its attributes.
    fn enter(&mut self, id: u64) -> Result<(), StreamError> {
        let name = self.resolve(id)?;
        let mut attributes = Vec::new();
        loop {
            self.fill_peek()?;
            if !matches!(self.peeked, Some(Token::Attribute { .. })) {
                break;
            }
            if let Some(Token::Attribute { id, value }) = self.peeked.take() {
                attributes.push((self.resolve(id)?, value));
            }
        }
        self.frames.push(Frame {
            name,
            attributes,
            value: None,
        });
        Ok(())
    }
}

impl StreamReader for BinaryReader<'_> {
    fn has_more_children(&mut self) -> Result<bool, StreamError> {
        self.pull_value()?;
        self.fill_peek()?;
        Ok(matches!(self.peeked, Some(Token::StartNode { .. })))
    }

    fn move_down(&mut self) -> Result<(), StreamError> {
        self.pull_value()?;
        match self.next_token()? {
            Token::StartNode { id } => self.enter(id),
            other => Err(StreamError::Malformed(format!(
                "move_down with no child node, found {other:?}"
            ))),
        }
    }

    fn move_up(&mut self) -> Result<(), StreamError> {
        assert!(
            self.frames.len() > 1,
            "move_up without a matching move_down"
        );
        // Skip the rest of the current subtree, including unvisited children.
        let mut depth = 1usize;
        while depth > 0 {
            match self.next_token()? {
                Token::StartNode { .. } => depth += 1,
                Token::EndNode => depth -= 1,
                _ => {}
            }
        }
        self.frames.pop();
        Ok(())
    }

    fn node_name(&self) -> &str {
        &self.current().name
    }

    fn type_hint(&self) -> Option<&str> {
        self.attribute(CLASS_ATTRIBUTE)
    }

    fn value(&mut self) -> Result<Option<String>, StreamError> {
        self.pull_value()?;
        Ok(self.current().value.clone())
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.current()
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn attribute_names(&self) -> Vec<&str> {
        self.current()
            .attributes
            .iter()
            .map(|(key, _)| key.as_str())
            .collect()
    }
}
