/*
 * memory.rs
 * Copyright (c) 2026 ycompose contributors
 *
 * In-memory SystemRuntime.
 */

use crate::path::normalize_path;
use crate::traits::{RuntimeError, RuntimeResult, SystemRuntime};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Runtime backed by an in-memory file map and environment.
///
/// File keys are normalized, so `./a/../b.yml` and `b.yml` name the same
/// file. Globs match against the stored keys with `*` not crossing `/`.
#[derive(Debug, Clone, Default)]
pub struct VirtualRuntime {
    files: BTreeMap<PathBuf, Vec<u8>>,
    env: BTreeMap<String, String>,
}

impl VirtualRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`VirtualRuntime::add_file`].
    pub fn with_file(mut self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) -> Self {
        self.add_file(path, contents);
        self
    }

    pub fn with_env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_env(name, value);
        self
    }

    /// Add or overwrite a file.
    pub fn add_file(&mut self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
        self.files
            .insert(normalize_path(path.as_ref()), contents.into());
    }

    pub fn remove_file(&mut self, path: impl AsRef<Path>) -> bool {
        self.files.remove(&normalize_path(path.as_ref())).is_some()
    }

    pub fn set_env(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.env.insert(name.into(), value.into());
    }

    pub fn list_files(&self) -> Vec<PathBuf> {
        self.files.keys().cloned().collect()
    }
}

impl SystemRuntime for VirtualRuntime {
    fn file_read(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        let normalized = normalize_path(path);
        self.files
            .get(&normalized)
            .cloned()
            .ok_or_else(|| RuntimeError::not_found(&normalized))
    }

    fn glob(&self, pattern: &str) -> RuntimeResult<Vec<PathBuf>> {
        let normalized = normalize_path(Path::new(pattern));
        let normalized = normalized.to_string_lossy();
        let matcher =
            glob::Pattern::new(&normalized).map_err(|e| RuntimeError::pattern(pattern, e))?;
        let options = glob::MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        Ok(self
            .files
            .keys()
            .filter(|path| matcher.matches_path_with(path, options))
            .cloned()
            .collect())
    }

    fn env_get(&self, name: &str) -> RuntimeResult<Option<String>> {
        Ok(self.env.get(name).cloned())
    }

    fn env_all(&self) -> RuntimeResult<HashMap<String, String>> {
        Ok(self
            .env
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
