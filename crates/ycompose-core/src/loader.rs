//! Recursive document loading.
//!
//! A load walks the include tree depth-first. Every file is parsed, its
//! directive block is taken out, its includes are loaded and merged in list
//! order, its own content is merged on top, its patches are applied and its
//! variables join the accumulator shared by the whole load. Once the root
//! file is done, external patches, variable expansion, source comments and
//! the source map are applied to the result.

use crate::directives::{Include, take_directives};
use crate::error::{Error, Result};
use crate::options::LoadOptions;
use crate::patch::apply_patch;
use crate::resolver::{DirectiveVarResolver, EnvVarResolver, ResolverChain, VarResolver};
use crate::vars::expand_tree;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use ycompose_runtime::normalize_path;
use ycompose_yaml::{Node, SourceInfo, parse_file};

/// Provenance label of patches passed through [`LoadOptions::with_patches`].
pub const OPTION_PATCHES_SOURCE: &str = "<LoadOptions.patches>";

/// Load and compose `path`.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use ycompose_core::{LoadOptions, load};
/// use ycompose_runtime::VirtualRuntime;
///
/// let runtime = VirtualRuntime::new()
///     .with_file("app.yml", "_directives:\n  include: [base.yml]\nname: app\n")
///     .with_file("base.yml", "name: base\nport: 80\n");
/// let options = LoadOptions::new().with_runtime(Arc::new(runtime));
///
/// let doc = load("app.yml", &options).unwrap();
/// assert_eq!(doc.get("name").unwrap().as_str(), Some("app"));
/// assert_eq!(doc.get("port").unwrap().source_info.to_string(), "base.yml(line:2)");
/// ```
pub fn load(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Node> {
    Loader::new(options.clone()).load(path)
}

/// Load and compose `path`, then decode it into `T`.
pub fn load_as<T: DeserializeOwned>(path: impl AsRef<Path>, options: &LoadOptions) -> Result<T> {
    Loader::new(options.clone()).load_as(path)
}

/// Reusable loader bound to one set of options.
#[derive(Debug, Clone, Default)]
pub struct Loader {
    options: LoadOptions,
}

impl Loader {
    pub fn new(options: LoadOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    pub fn load(&self, path: impl AsRef<Path>) -> Result<Node> {
        let path = path.as_ref();
        let name = path.to_string_lossy().into_owned();
        tracing::debug!(file = %name, "composing document");

        let mut variables = Node::mapping(SourceInfo::synthetic(name.as_str()));
        let mut active = Vec::new();
        let mut root = self.load_file(path, &mut variables, &mut active)?;
        root.source_info.file = Some(name.clone());

        for patch in self.external_patches()? {
            apply_patch(&mut root, &patch)?;
        }

        self.expand_variables(&mut root, &variables)?;

        if self.options.source_map_comment {
            root.add_source_comments();
        }

        if let Some(key) = &self.options.source_map_key {
            let map = serde_json::to_value(root.to_source_map()).map_err(|e| {
                Error::decode(format!("{}: failed to build the source map", name)).with_cause(e)
            })?;
            root.put(
                Node::string(key.as_str(), SourceInfo::synthetic(name.as_str())),
                Node::from_json(&map, &SourceInfo::default()),
            );
        }

        Ok(root)
    }

    pub fn load_as<T: DeserializeOwned>(&self, path: impl AsRef<Path>) -> Result<T> {
        let path = path.as_ref();
        let node = self.load(path)?;
        node.decode().map_err(|e| {
            Error::decode(format!("{}: failed to map to given object", path.display()))
                .with_cause(e)
        })
    }

    /// Load one file of the include tree.
    ///
    /// `active` holds the normalized paths of the files currently being
    /// loaded, root first.
    fn load_file(&self, path: &Path, variables: &mut Node, active: &mut Vec<PathBuf>) -> Result<Node> {
        let file = path.to_string_lossy().into_owned();
        let normalized = normalize_path(path);
        if let Some(start) = active.iter().position(|p| *p == normalized) {
            let cycle: Vec<String> = active[start..]
                .iter()
                .chain(std::iter::once(&normalized))
                .map(|p| p.display().to_string())
                .collect();
            return Err(Error::directive(format!(
                "include cycle detected: {}",
                cycle.join(" -> ")
            )));
        }

        tracing::debug!(file = %file, depth = active.len(), "loading file");
        let content = self
            .options
            .runtime
            .file_read_string(path)
            .map_err(|e| Error::io(format!("{}: failed to load given file", file)).with_cause(e))?;
        let mut root = parse_file(&content, &file).map_err(|e| {
            Error::yaml(format!("{}: failed to parse given YAML file", file)).with_cause(e)
        })?;
        if !root.is_mapping() {
            return Err(Error::yaml(format!(
                "{}: root node must be a mapping node({})",
                file,
                root.kind()
            )));
        }
        if self.options.remove_block_comments {
            root.strip_comments();
        }

        let directives = take_directives(&mut root, &self.options.directive_key, &file)?;

        active.push(normalized);
        let mut merged: Option<Node> = None;
        for include in &directives.includes {
            for matched in self.expand_include(path, &file, include)? {
                let child = self.load_file(&matched, variables, active)?;
                merged = Some(match merged.take() {
                    Some(mut base) => {
                        base.merge(child);
                        base
                    }
                    None => child,
                });
            }
        }
        active.pop();

        let mut merged = match merged {
            Some(mut base) => {
                base.merge(root);
                base
            }
            None => root,
        };

        for patch in &directives.patches {
            apply_patch(&mut merged, patch)?;
        }

        if let Some(own) = directives.variables {
            variables.merge(own);
        }

        Ok(merged)
    }

    /// Glob one include entry relative to the including file.
    fn expand_include(&self, parent: &Path, file: &str, include: &Include) -> Result<Vec<PathBuf>> {
        let pattern = Path::new(&include.pattern);
        let full = if pattern.is_absolute() {
            pattern.to_path_buf()
        } else {
            parent
                .parent()
                .map_or_else(|| pattern.to_path_buf(), |dir| dir.join(pattern))
        };
        let full = normalize_path(&full);
        let not_found = || {
            Error::io(format!(
                "{}: failed to find a included file {}",
                file, include.pattern
            ))
        };

        let matches = self
            .options
            .runtime
            .glob(&full.to_string_lossy())
            .map_err(|e| not_found().with_cause(e))?;
        if matches.is_empty() {
            return Err(not_found());
        }
        tracing::trace!(
            pattern = %include.pattern,
            at = %include.source_info,
            count = matches.len(),
            "expanded include"
        );
        Ok(matches)
    }

    /// Patches from the options, then from the environment.
    fn external_patches(&self) -> Result<Vec<Node>> {
        let mut patches: Vec<Node> = self
            .options
            .patches
            .iter()
            .map(|value| patch_node(value, OPTION_PATCHES_SOURCE))
            .collect();

        let Some(prefix) = &self.options.env_patch_prefix else {
            return Ok(patches);
        };
        let mut harvested: Vec<(String, String)> = self
            .options
            .runtime
            .env_all()
            .map_err(|e| Error::io("failed to list environment variables").with_cause(e))?
            .into_iter()
            .filter(|(name, _)| name.starts_with(prefix.as_str()))
            .collect();
        harvested.sort();

        for (name, text) in harvested {
            let value: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
                Error::yaml(format!(
                    "failed to parse {} environment variable JSON patch",
                    name
                ))
                .with_cause(e)
            })?;
            tracing::debug!(variable = %name, "patch from environment");
            patches.push(patch_node(&value, &format!("${{{}}}", name)));
        }
        Ok(patches)
    }

    fn expand_variables(&self, root: &mut Node, variables: &Node) -> Result<()> {
        let env = EnvVarResolver::new(self.options.runtime.as_ref());
        let directive = DirectiveVarResolver::new(variables);
        let first: &dyn VarResolver = match &self.options.var_resolver {
            Some(resolver) => resolver.as_ref(),
            None => &env,
        };
        let chain = ResolverChain::new().with(first).with(&directive);
        expand_tree(root, &chain, self.options.keep_variables)
    }
}

/// Turn an externally supplied JSON patch into a tree attributed to its
/// `source` field, or to `label`.
fn patch_node(value: &serde_json::Value, label: &str) -> Node {
    let label = value
        .get("source")
        .and_then(serde_json::Value::as_str)
        .unwrap_or(label);
    Node::from_json(value, &SourceInfo::synthetic(label))
}
