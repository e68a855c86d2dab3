//! Source location information for tree nodes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Source location information for a node.
///
/// Tracks which file (or synthetic source such as an environment patch) a
/// node was produced by, and where in it. Nodes carry this record through
/// merges and patches, so that the final document can still point back at
/// the text that produced each value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Optional filename or source identifier
    pub file: Option<String>,

    /// Line number (1-based)
    pub line: usize,

    /// Column number (1-based)
    pub col: usize,
}

impl SourceInfo {
    /// Create a new SourceInfo with all fields specified.
    pub fn new(file: Option<String>, line: usize, col: usize) -> Self {
        Self { file, line, col }
    }

    /// Create a SourceInfo pointing at the first line of `file`.
    ///
    /// Used for synthetic nodes (patch values built from JSON, directive
    /// variables) that have no meaningful position of their own.
    pub fn synthetic(file: impl Into<String>) -> Self {
        Self {
            file: Some(file.into()),
            line: 1,
            col: 1,
        }
    }

    /// Set the filename for this source location.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// The filename, or an empty string when unknown.
    pub fn file_name(&self) -> &str {
        self.file.as_deref().unwrap_or_default()
    }

    /// Reset line and column to the start of the source, keeping the file.
    pub fn reset_position(&mut self) {
        self.line = 1;
        self.col = 1;
    }
}

impl Default for SourceInfo {
    fn default() -> Self {
        Self {
            file: None,
            line: 1,
            col: 1,
        }
    }
}

impl fmt::Display for SourceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(line:{})", self.file_name(), self.line)
    }
}
