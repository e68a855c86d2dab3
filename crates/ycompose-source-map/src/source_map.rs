//! Path-to-source mapping for a composed document.

use serde::{Deserialize, Serialize};

/// A mapping from document paths to the files that produced them.
///
/// Built once from a final, fully composed tree. It holds no reference back
/// to the tree, so it can be serialized into the output document and decoded
/// again later for post-hoc diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMap {
    /// Distinct source identifiers, in first-visited order.
    pub sources: Vec<String>,

    /// One entry per distinct path.
    pub mappings: Vec<Mapping>,
}

/// A single path → location entry of a [`SourceMap`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    /// A normalized JSON Pointer, e.g. `/child/arr/0`.
    pub path: String,

    /// The file (or synthetic source label) that produced the value.
    pub file: String,

    /// Line in `file` (1-based).
    pub line: usize,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a source identifier unless it was already seen.
    pub fn add_source(&mut self, source: &str) {
        if !self.sources.iter().any(|s| s == source) {
            self.sources.push(source.to_string());
        }
    }

    /// Find the mapping for `path`, if any.
    pub fn find_map(&self, path: &str) -> Option<&Mapping> {
        self.mappings.iter().find(|m| m.path == path)
    }

    /// Add a mapping. Re-adding an existing path overwrites its location.
    pub fn add_mapping(&mut self, path: &str, file: &str, line: usize) {
        if let Some(existing) = self.mappings.iter_mut().find(|m| m.path == path) {
            existing.file = file.to_string();
            existing.line = line;
            return;
        }
        self.mappings.push(Mapping {
            path: path.to_string(),
            file: file.to_string(),
            line,
        });
    }
}
