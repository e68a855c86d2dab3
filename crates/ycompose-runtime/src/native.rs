/*
 * native.rs
 * Copyright (c) 2026 ycompose contributors
 *
 * SystemRuntime over std::fs and the process environment.
 */

use crate::traits::{RuntimeError, RuntimeResult, SystemRuntime};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Runtime with real filesystem and environment access.
///
/// Relative paths resolve against `root` when one is set, otherwise against
/// the process working directory.
#[derive(Debug, Clone, Default)]
pub struct NativeRuntime {
    root: Option<PathBuf>,
}

impl NativeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `root` instead of the working directory.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl SystemRuntime for NativeRuntime {
    fn file_read(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        Ok(std::fs::read(self.resolve(path))?)
    }

    fn glob(&self, pattern: &str) -> RuntimeResult<Vec<PathBuf>> {
        let rooted = match &self.root {
            Some(root) if Path::new(pattern).is_relative() => {
                let escaped = glob::Pattern::escape(&root.to_string_lossy());
                Path::new(&escaped).join(pattern).to_string_lossy().into_owned()
            }
            _ => pattern.to_string(),
        };

        let entries =
            glob::glob(&rooted).map_err(|e| RuntimeError::pattern(pattern, e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| RuntimeError::Io(e.into()))?;
            if !path.is_file() {
                continue;
            }
            let logical = match &self.root {
                Some(root) if Path::new(pattern).is_relative() => path
                    .strip_prefix(root)
                    .map(Path::to_path_buf)
                    .unwrap_or(path),
                _ => path,
            };
            paths.push(logical);
        }
        paths.sort();
        Ok(paths)
    }

    fn env_get(&self, name: &str) -> RuntimeResult<Option<String>> {
        Ok(std::env::var_os(name).and_then(|v| v.into_string().ok()))
    }

    fn env_all(&self) -> RuntimeResult<HashMap<String, String>> {
        Ok(std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_io_error() {
        let rt = NativeRuntime::with_root("/nonexistent-ycompose-root");
        let err = rt.file_read(Path::new("nope.yml")).unwrap_err();
        assert!(matches!(err, RuntimeError::Io(_)));
    }

    #[test]
    fn test_invalid_pattern() {
        let rt = NativeRuntime::new();
        let err = rt.glob("a/[").unwrap_err();
        assert!(matches!(err, RuntimeError::Pattern { .. }));
    }

    #[test]
    fn test_env_all_contains_path_like_vars() {
        let rt = NativeRuntime::new();
        let all = rt.env_all().unwrap();
        for (name, value) in all.iter().take(3) {
            assert_eq!(rt.env_get(name).unwrap().as_ref(), Some(value));
        }
    }
}
