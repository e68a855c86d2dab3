//! # ycompose-yaml
//!
//! YAML/JSON document trees with source location tracking.
//!
//! This crate provides [`Node`], an ordered tree in which every node records
//! the file and line it came from. Provenance travels with a node through
//! every structural operation, so a document assembled from many files can
//! still report where each value originated.
//!
//! ## Design
//!
//! Uses the **owned data approach**: each node owns its children and there is
//! no sharing between tree positions. YAML aliases are resolved by deep copy
//! at parse time.
//!
//! The crate covers:
//!
//! - parsing YAML (and JSON, as flow YAML) into a [`Node`] tree
//! - the mapping operations (`get`, `put`, `delete`) including the
//!   sorted insertion rule for new keys
//! - JSON Pointer addressing ([`JsonPointer`])
//! - deep merge ([`Node::merge`])
//! - source map generation ([`Node::to_source_map`])
//! - emitting YAML/JSON text and decoding into serde types
//!
//! ## Example
//!
//! ```rust
//! use ycompose_yaml::parse_file;
//!
//! let yaml = parse_file("title: My Document\nauthor: Jane\n", "config.yml").unwrap();
//! let title = yaml.get("title").unwrap();
//! assert_eq!(title.as_str(), Some("My Document"));
//! assert_eq!(title.source_info.to_string(), "config.yml(line:1)");
//! ```

mod convert;
mod emit;
mod error;
mod node;
mod parser;
mod pointer;
mod source_map;

pub use emit::{emit_json, emit_yaml};
pub use error::{Error, Result};
pub use node::{MappingEntry, Node, NodeKind, ScalarStyle, ScalarType};
pub use parser::{parse, parse_file};
pub use pointer::{Index, JsonPointer, Token};
pub use ycompose_source_map::{Mapping, SourceInfo, SourceMap}; // Re-export from ycompose-source-map
