//! Source mapping for ycompose
//!
//! This crate provides the two provenance types shared by the rest of the
//! workspace:
//!
//! - [`SourceInfo`]: the file and line a single tree node came from
//! - [`SourceMap`]: a flat, serializable listing of every structural path of
//!   a composed document together with the file and line that produced it
//!
//! # Example
//!
//! ```rust
//! use ycompose_source_map::*;
//!
//! let info = SourceInfo::new(Some("config.yml".into()), 3, 1);
//! assert_eq!(info.to_string(), "config.yml(line:3)");
//!
//! let mut map = SourceMap::new();
//! map.add_mapping("/name", "config.yml", 3);
//! assert_eq!(map.find_map("/name").map(|m| m.line), Some(3));
//! ```

pub mod source_info;
pub mod source_map;

pub use source_info::SourceInfo;
pub use source_map::{Mapping, SourceMap};
