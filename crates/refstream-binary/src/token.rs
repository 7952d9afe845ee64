//! The binary token codec.
//!
//! Every token starts with a header byte packing the token kind into the low
//! three bits and an id-width tag into the bits above. Ids are stored offset
//! by the minimum of the narrowest signed integer that fits them, so an id of
//! up to 127 costs one byte, up to 32 767 two bytes, and so on. Text spans are
//! a big-endian `u32` byte length followed by UTF-8.

use refstream_buffers::{BufferError, Reader, Writer};
use refstream_core::StreamError;

const KIND_VERSION: u8 = 1;
const KIND_NAME_ENTRY: u8 = 2;
const KIND_START_NODE: u8 = 3;
const KIND_END_NODE: u8 = 4;
const KIND_ATTRIBUTE: u8 = 5;
const KIND_VALUE: u8 = 6;

const WIDTH_1: u8 = 1;
const WIDTH_2: u8 = 2;
const WIDTH_4: u8 = 3;
const WIDTH_8: u8 = 4;

/// One token of the binary stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Format version marker. Reserved; current streams never carry one.
    Version { id: u64 },
    /// Binds an id to a name for the remainder of the stream.
    NameEntry { id: u64, name: String },
    /// Opens a node whose name was bound by an earlier [`Token::NameEntry`].
    StartNode { id: u64 },
    /// Closes the most recently opened node.
    EndNode,
    /// An attribute of the currently open node.
    Attribute { id: u64, value: String },
    /// The text value of the currently open node.
    Value { text: String },
}

/// Appends the wire form of `token` to `out`.
pub fn encode(token: &Token, out: &mut Writer) {
    match token {
        Token::Version { id } => put_header_and_id(out, KIND_VERSION, *id),
        Token::NameEntry { id, name } => {
            put_header_and_id(out, KIND_NAME_ENTRY, *id);
            put_text(out, name);
        }
        Token::StartNode { id } => put_header_and_id(out, KIND_START_NODE, *id),
        Token::EndNode => out.u8(KIND_END_NODE | (WIDTH_1 << 3)),
        Token::Attribute { id, value } => {
            put_header_and_id(out, KIND_ATTRIBUTE, *id);
            put_text(out, value);
        }
        Token::Value { text } => {
            out.u8(KIND_VALUE | (WIDTH_1 << 3));
            put_text(out, text);
        }
    }
}

/// Decodes the next token at the reader's cursor.
pub fn decode(input: &mut Reader<'_>) -> Result<Token, StreamError> {
    let header = input.u8().map_err(truncated)?;
    let kind = header & 0x07;
    let width = header >> 3;
    if !(WIDTH_1..=WIDTH_8).contains(&width) {
        return Err(StreamError::Malformed(format!(
            "invalid id width tag {width} in token header {header:#04x}"
        )));
    }
    match kind {
        KIND_VERSION => Ok(Token::Version {
            id: take_id(input, width)?,
        }),
        KIND_NAME_ENTRY => Ok(Token::NameEntry {
            id: take_id(input, width)?,
            name: take_text(input)?,
        }),
        KIND_START_NODE => Ok(Token::StartNode {
            id: take_id(input, width)?,
        }),
        KIND_END_NODE => Ok(Token::EndNode),
        KIND_ATTRIBUTE => Ok(Token::Attribute {
            id: take_id(input, width)?,
            value: take_text(input)?,
        }),
        KIND_VALUE => Ok(Token::Value {
            text: take_text(input)?,
        }),
        other => Err(StreamError::Malformed(format!(
            "unknown token kind {other}"
        ))),
    }
}

fn truncated(err: BufferError) -> StreamError {
    StreamError::Malformed(err.to_string())
}

/// Narrowest width tag whose signed maximum holds `id`.
fn id_width(id: u64) -> u8 {
    if id <= i8::MAX as u64 {
        WIDTH_1
    } else if id <= i16::MAX as u64 {
        WIDTH_2
    } else if id <= i32::MAX as u64 {
        WIDTH_4
    } else {
        WIDTH_8
    }
}

fn put_header_and_id(out: &mut Writer, kind: u8, id: u64) {
    let width = id_width(id);
    out.u8(kind | (width << 3));
    match width {
        WIDTH_1 => out.i8((id as i8).wrapping_add(i8::MIN)),
        WIDTH_2 => out.i16((id as i16).wrapping_add(i16::MIN)),
        WIDTH_4 => out.i32((id as i32).wrapping_add(i32::MIN)),
        _ => out.i64((id as i64).wrapping_add(i64::MIN)),
    }
}

fn take_id(input: &mut Reader<'_>, width: u8) -> Result<u64, StreamError> {
    let id = match width {
        WIDTH_1 => input.i8().map_err(truncated)?.wrapping_sub(i8::MIN) as u8 as u64,
        WIDTH_2 => input.i16().map_err(truncated)?.wrapping_sub(i16::MIN) as u16 as u64,
        WIDTH_4 => input.i32().map_err(truncated)?.wrapping_sub(i32::MIN) as u32 as u64,
        _ => input.i64().map_err(truncated)?.wrapping_sub(i64::MIN) as u64,
    };
    Ok(id)
}

fn put_text(out: &mut Writer, text: &str) {
    out.u32(text.len() as u32);
    out.bytes(text.as_bytes());
}

fn take_text(input: &mut Reader<'_>) -> Result<String, StreamError> {
    let len = input.u32().map_err(truncated)? as usize;
    Ok(input.utf8(len).map_err(truncated)?.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bytes_of(token: &Token) -> Vec<u8> {
        let mut out = Writer::new();
        encode(token, &mut out);
        out.into_bytes()
    }

    fn round_trip(token: Token) {
        let bytes = bytes_of(&token);
        let mut input = Reader::new(&bytes);
        assert_eq!(decode(&mut input).unwrap(), token);
        assert!(input.is_empty());
    }

    #[test]
    fn start_node_wire_form() {
        assert_eq!(bytes_of(&Token::StartNode { id: 0 }), [0x0B, 0x80]);
        assert_eq!(bytes_of(&Token::StartNode { id: 127 }), [0x0B, 0xFF]);
        assert_eq!(bytes_of(&Token::StartNode { id: 128 }), [0x13, 0x80, 0x80]);
    }

    #[test]
    fn end_node_wire_form() {
        assert_eq!(bytes_of(&Token::EndNode), [0x0C]);
    }

    #[test]
    fn value_wire_form() {
        assert_eq!(
            bytes_of(&Token::Value { text: "hi".into() }),
            [0x0E, 0, 0, 0, 2, b'h', b'i']
        );
    }

    #[test]
    fn attribute_wire_form() {
        assert_eq!(
            bytes_of(&Token::Attribute {
                id: 1,
                value: "x".into()
            }),
            [0x0D, 0x81, 0, 0, 0, 1, b'x']
        );
    }

    #[test]
    fn id_width_boundaries() {
        assert_eq!(id_width(0), WIDTH_1);
        assert_eq!(id_width(127), WIDTH_1);
        assert_eq!(id_width(128), WIDTH_2);
        assert_eq!(id_width(32_767), WIDTH_2);
        assert_eq!(id_width(32_768), WIDTH_4);
        assert_eq!(id_width(i32::MAX as u64), WIDTH_4);
        assert_eq!(id_width(i32::MAX as u64 + 1), WIDTH_8);
    }

    #[test]
    fn tokens_round_trip() {
        round_trip(Token::Version { id: 1 });
        round_trip(Token::NameEntry {
            id: 300,
            name: "person".into(),
        });
        round_trip(Token::StartNode { id: 32_768 });
        round_trip(Token::EndNode);
        round_trip(Token::Attribute {
            id: 2,
            value: "résumé".into(),
        });
        round_trip(Token::Value {
            text: String::new(),
        });
    }

    #[test]
    fn truncated_stream_rejected() {
        let bytes = bytes_of(&Token::NameEntry {
            id: 1,
            name: "person".into(),
        });
        for cut in 1..bytes.len() {
            let mut input = Reader::new(&bytes[..cut]);
            assert!(matches!(
                decode(&mut input),
                Err(StreamError::Malformed(_))
            ));
        }
    }

    #[test]
    fn zero_width_tag_rejected() {
        let mut input = Reader::new(&[KIND_START_NODE]);
        assert!(matches!(
            decode(&mut input),
            Err(StreamError::Malformed(_))
        ));
    }

    proptest! {
        #[test]
        fn ids_round_trip(id in 0u64..=i64::MAX as u64) {
            round_trip(Token::StartNode { id });
        }
    }
}
