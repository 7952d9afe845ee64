//! Error types shared by all stream backends and marshalling strategies.

use thiserror::Error;

/// Errors raised while producing or consuming a hierarchical stream.
///
/// All variants propagate to the top-level caller unmodified; the core never
/// retries and a failed unmarshal yields no partial object graph.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StreamError {
    /// The token or node sequence violates the event nesting contract.
    #[error("malformed stream: {0}")]
    Malformed(String),

    /// A `reference` attribute names a key absent from the values table.
    #[error("unknown reference `{key}`")]
    UnknownReference { key: String },

    /// A reference targets an object registered as implicit, which has no
    /// stable address of its own.
    #[error("reference to implicit element at {path}")]
    ImplicitReference { path: String },

    /// The backend cannot serve the requested transport direction; raised at
    /// construction time, never lazily.
    #[error("unsupported transport operation: {0}")]
    UnsupportedTransport(&'static str),

    /// No registered converter accepts the given type or hint.
    #[error("no converter registered for `{0}`")]
    NoConverter(String),

    /// A converter-level failure, typically a downcast or field mismatch.
    #[error("{0}")]
    Custom(String),

    /// A converter failure annotated with the path at which it occurred.
    #[error("conversion failed at {path}: {message}")]
    Conversion { path: String, message: String },
}

impl StreamError {
    /// Attaches the current path to a converter-level error. Core error kinds
    /// pass through unchanged so callers can still match on them.
    pub fn with_path(self, path: String) -> Self {
        match self {
            StreamError::Custom(message) => StreamError::Conversion { path, message },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_path_wraps_custom() {
        let err = StreamError::Custom("boom".into()).with_path("/a/b".into());
        assert_eq!(
            err,
            StreamError::Conversion {
                path: "/a/b".into(),
                message: "boom".into()
            }
        );
    }

    #[test]
    fn with_path_leaves_core_kinds() {
        let err = StreamError::UnknownReference { key: "7".into() };
        assert_eq!(err.clone().with_path("/a".into()), err);
    }
}
