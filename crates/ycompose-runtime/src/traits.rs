/*
 * traits.rs
 * Copyright (c) 2026 ycompose contributors
 *
 * Defines the SystemRuntime trait and its error type.
 */

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur during runtime operations
#[derive(Debug)]
pub enum RuntimeError {
    /// Standard I/O error
    Io(io::Error),

    /// A glob pattern that could not be compiled
    Pattern {
        pattern: String,
        message: String,
    },
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeError::Io(e) => write!(f, "{}", e),
            RuntimeError::Pattern { pattern, message } => {
                write!(f, "invalid pattern {}: {}", pattern, message)
            }
        }
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RuntimeError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for RuntimeError {
    fn from(e: io::Error) -> Self {
        RuntimeError::Io(e)
    }
}

impl RuntimeError {
    pub(crate) fn pattern(pattern: &str, err: glob::PatternError) -> Self {
        RuntimeError::Pattern {
            pattern: pattern.to_string(),
            message: err.msg.to_string(),
        }
    }

    pub(crate) fn not_found(path: &Path) -> Self {
        RuntimeError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("open {}: no such file or directory", path.display()),
        ))
    }
}

/// The system operations the loader needs.
///
/// Paths handed to a runtime are the loader's logical paths: relative ones
/// are resolved against the runtime's root, and glob results come back in
/// the same form as the pattern.
pub trait SystemRuntime: Send + Sync {
    /// Read entire file contents as bytes.
    fn file_read(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    /// Read file as string with UTF-8 encoding.
    ///
    /// Default implementation reads bytes and converts to string.
    fn file_read_string(&self, path: &Path) -> RuntimeResult<String> {
        let bytes = self.file_read(path)?;
        String::from_utf8(bytes).map_err(|e| {
            RuntimeError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid UTF-8 in file: {}", e),
            ))
        })
    }

    /// Expand a glob pattern into the matching files, sorted.
    ///
    /// A pattern without wildcards matches itself if the file exists.
    fn glob(&self, pattern: &str) -> RuntimeResult<Vec<PathBuf>>;

    /// Get a single environment variable.
    fn env_get(&self, name: &str) -> RuntimeResult<Option<String>>;

    /// Get all environment variables.
    fn env_all(&self) -> RuntimeResult<HashMap<String, String>>;
}
