/*
 * path.rs
 * Copyright (c) 2026 ycompose contributors
 *
 * Lexical path normalization.
 */

use std::path::{Component, Path, PathBuf};

/// Normalize path components (remove `.` and resolve `..`) without touching
/// the filesystem.
///
/// A `..` that would climb above the start of a relative path is kept, and
/// one that would climb above the root of an absolute path is dropped.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    let mut depth = 0usize;
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if depth > 0 {
                    normalized.pop();
                    depth -= 1;
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            Component::Normal(part) => {
                normalized.push(part);
                depth += 1;
            }
            other => normalized.push(other),
        }
    }
    if normalized.as_os_str().is_empty() {
        normalized.push(".");
    }
    normalized
}
