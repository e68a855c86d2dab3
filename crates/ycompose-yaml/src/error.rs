//! Error types for tree parsing, addressing and decoding.

use crate::{NodeKind, SourceInfo};
use thiserror::Error;

/// Result type alias for ycompose-yaml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing, addressing or decoding a tree.
#[derive(Debug, Error)]
pub enum Error {
    /// YAML/JSON syntax error
    #[error("{message}")]
    ParseError {
        message: String,
        location: Option<SourceInfo>,
    },

    /// A pointer string that does not start with `/`
    #[error("Invalid JSON Pointer: {0}")]
    InvalidPointer(String),

    /// No node lives at the given path
    #[error("{path}: can not find nodes matches path")]
    NotFound { path: String },

    /// An index token was evaluated against something that is not a sequence
    #[error("{path}: can not evaluate an index {index} on {kind} object")]
    NotASequence {
        path: String,
        index: String,
        kind: NodeKind,
    },

    #[error("{path}: out of bounds index {index}")]
    IndexOutOfBounds { path: String, index: usize },

    /// The `-` token was used somewhere other than the final position
    #[error("{path}: after last element")]
    AfterLastElement { path: String },

    /// The tree does not fit the requested destination type
    #[error("{0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    /// True when the error means "nothing at this path" rather than a
    /// structural mismatch.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Source location of the error, when known.
    pub fn location(&self) -> Option<&SourceInfo> {
        match self {
            Error::ParseError { location, .. } => location.as_ref(),
            _ => None,
        }
    }
}
