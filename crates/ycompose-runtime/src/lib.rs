/*
 * ycompose-runtime
 * Copyright (c) 2026 ycompose contributors
 *
 * System access for the document loader.
 *
 * The loader never touches the filesystem or the process environment
 * directly. It goes through a `SystemRuntime`, of which there are two:
 *
 * - NativeRuntime: std::fs and the process environment, optionally rooted
 *   at a directory
 * - VirtualRuntime: an in-memory file map and environment, for tests and
 *   embedding
 */

mod memory;
mod native;
mod path;
mod traits;

// Re-export core types (API surface)
pub use traits::{RuntimeError, RuntimeResult, SystemRuntime};

// Re-export runtime implementations
pub use memory::VirtualRuntime;
pub use native::NativeRuntime;

pub use path::normalize_path;

/// Create a runtime over the real filesystem, rooted at the working
/// directory.
pub fn default_runtime() -> NativeRuntime {
    NativeRuntime::new()
}
