//! # ycompose-core
//!
//! Composes a configuration document out of many YAML/JSON files.
//!
//! A file may carry a directive block (by default under `_directives`):
//!
//! ```yaml
//! _directives:
//!   include:            # glob patterns, relative to this file
//!     - base.yml
//!     - conf.d/*.yml
//!   patches:            # JSON-Patch style edits applied after merging
//!     - op: replace
//!       path: /server/port
//!       value: 8080
//!   variables:          # values for ${NAME} references
//!     REGION: eu
//! name: app
//! region: ${REGION:us}
//! ```
//!
//! [`load`] reads the file, loads and merges its includes depth-first,
//! merges its own content on top, applies its patches and finally expands
//! `${NAME}` / `${NAME:default}` references in string values. Every node of
//! the result remembers the file and line it came from, and the load can
//! attach a [`SourceMap`](ycompose_yaml::SourceMap) listing that for every
//! path.

mod directives;
mod error;
mod loader;
mod options;
mod patch;
mod resolver;
mod vars;

pub use error::{Cause, Error, ErrorKind, Result};
pub use loader::{Loader, OPTION_PATCHES_SOURCE, load, load_as};
pub use options::{DEFAULT_DIRECTIVE_KEY, LoadOptions};
pub use patch::apply_patch;
pub use resolver::{DirectiveVarResolver, EnvVarResolver, ResolverChain, VarResolver};
pub use vars::expand;

// Re-export the tree types callers work with
pub use ycompose_yaml::{Node, NodeKind, SourceInfo, SourceMap};
