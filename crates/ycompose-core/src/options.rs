//! Load configuration.

use crate::resolver::VarResolver;
use std::fmt;
use std::sync::Arc;
use ycompose_runtime::{NativeRuntime, SystemRuntime};

/// Default key of the directive block.
pub const DEFAULT_DIRECTIVE_KEY: &str = "_directives";

/// Options for [`Loader`](crate::Loader).
///
/// Built with the consuming `with_*` methods:
///
/// ```rust
/// use ycompose_core::LoadOptions;
///
/// let options = LoadOptions::new()
///     .with_source_map_key("_sourcemap")
///     .with_env_patches("PATCH");
/// assert_eq!(options.directive_key(), "_directives");
/// ```
#[derive(Clone)]
pub struct LoadOptions {
    pub(crate) runtime: Arc<dyn SystemRuntime>,
    pub(crate) directive_key: String,
    pub(crate) source_map_key: Option<String>,
    pub(crate) source_map_comment: bool,
    pub(crate) keep_variables: bool,
    pub(crate) remove_block_comments: bool,
    pub(crate) var_resolver: Option<Arc<dyn VarResolver>>,
    pub(crate) patches: Vec<serde_json::Value>,
    pub(crate) env_patch_prefix: Option<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            runtime: Arc::new(NativeRuntime::new()),
            directive_key: DEFAULT_DIRECTIVE_KEY.to_string(),
            source_map_key: None,
            source_map_comment: false,
            keep_variables: false,
            remove_block_comments: false,
            var_resolver: None,
            patches: Vec::new(),
            env_patch_prefix: None,
        }
    }
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read files, expand globs and look up the environment through
    /// `runtime`.
    pub fn with_runtime(mut self, runtime: Arc<dyn SystemRuntime>) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn with_directive_key(mut self, key: impl Into<String>) -> Self {
        self.directive_key = key.into();
        self
    }

    /// Insert the source map of the composed document under `key`.
    pub fn with_source_map_key(mut self, key: impl Into<String>) -> Self {
        self.source_map_key = Some(key.into());
        self
    }

    /// Annotate values with ` file:line` line comments.
    pub fn with_source_map_comment(mut self, enabled: bool) -> Self {
        self.source_map_comment = enabled;
        self
    }

    /// Rewrite references as `${NAME:resolved}` instead of substituting.
    pub fn with_keep_variables(mut self, enabled: bool) -> Self {
        self.keep_variables = enabled;
        self
    }

    pub fn with_remove_block_comments(mut self, enabled: bool) -> Self {
        self.remove_block_comments = enabled;
        self
    }

    /// Consult `resolver` instead of the environment. Directive variables
    /// are still consulted after it.
    pub fn with_var_resolver(mut self, resolver: Arc<dyn VarResolver>) -> Self {
        self.var_resolver = Some(resolver);
        self
    }

    /// Patches applied to the composed document after all files are
    /// loaded.
    pub fn with_patches(mut self, patches: Vec<serde_json::Value>) -> Self {
        self.patches = patches;
        self
    }

    /// Also apply JSON patches found in environment variables whose name
    /// starts with `prefix`, in name order.
    pub fn with_env_patches(mut self, prefix: impl Into<String>) -> Self {
        self.env_patch_prefix = Some(prefix.into());
        self
    }

    pub fn runtime(&self) -> &dyn SystemRuntime {
        self.runtime.as_ref()
    }

    pub fn directive_key(&self) -> &str {
        &self.directive_key
    }

    pub fn source_map_key(&self) -> Option<&str> {
        self.source_map_key.as_deref()
    }
}

impl fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOptions")
            .field("directive_key", &self.directive_key)
            .field("source_map_key", &self.source_map_key)
            .field("source_map_comment", &self.source_map_comment)
            .field("keep_variables", &self.keep_variables)
            .field("remove_block_comments", &self.remove_block_comments)
            .field("var_resolver", &self.var_resolver.is_some())
            .field("patches", &self.patches)
            .field("env_patch_prefix", &self.env_patch_prefix)
            .finish_non_exhaustive()
    }
}
