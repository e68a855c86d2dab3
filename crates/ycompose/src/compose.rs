/*
 * compose.rs
 * Copyright (c) 2026 ycompose contributors
 *
 * Compose command implementation
 */

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use ycompose_core::{DEFAULT_DIRECTIVE_KEY, LoadOptions, load};
use ycompose_runtime::{NativeRuntime, SystemRuntime};
use ycompose_yaml::{emit_json, emit_yaml};

/// Output format of the composed document
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Yaml,
    Json,
}

/// Arguments for composing a document
#[derive(Debug, clap::Args)]
pub struct ComposeArgs {
    /// Root document to load
    pub file: PathBuf,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = Format::Yaml)]
    pub format: Format,

    /// Resolve relative paths against DIR instead of the working directory
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Key of the directive block
    #[arg(long, default_value = DEFAULT_DIRECTIVE_KEY)]
    pub directive_key: String,

    /// Insert the source map under this key
    #[arg(long)]
    pub source_map_key: Option<String>,

    /// Annotate values with their source file and line
    #[arg(long)]
    pub source_map_comment: bool,

    /// Refresh ${NAME:default} defaults instead of substituting
    #[arg(long)]
    pub keep_variables: bool,

    /// Drop comment blocks from loaded files
    #[arg(long)]
    pub remove_block_comments: bool,

    /// Apply JSON patches from environment variables starting with PREFIX
    #[arg(long, value_name = "PREFIX")]
    pub env_patches: Option<String>,

    /// JSON patch object applied after loading (repeatable)
    #[arg(long = "patch", value_name = "JSON")]
    pub patches: Vec<String>,

    /// Write output to FILE instead of stdout
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl ComposeArgs {
    fn load_options(&self) -> Result<LoadOptions> {
        let runtime: Arc<dyn SystemRuntime> = match &self.root {
            Some(root) => Arc::new(NativeRuntime::with_root(root)),
            None => Arc::new(NativeRuntime::new()),
        };
        let patches = self
            .patches
            .iter()
            .map(|p| serde_json::from_str(p).with_context(|| format!("invalid --patch value: {p}")))
            .collect::<Result<Vec<serde_json::Value>>>()?;

        let mut options = LoadOptions::new()
            .with_runtime(runtime)
            .with_directive_key(self.directive_key.as_str())
            .with_source_map_comment(self.source_map_comment)
            .with_keep_variables(self.keep_variables)
            .with_remove_block_comments(self.remove_block_comments)
            .with_patches(patches);
        if let Some(key) = &self.source_map_key {
            options = options.with_source_map_key(key.as_str());
        }
        if let Some(prefix) = &self.env_patches {
            options = options.with_env_patches(prefix.as_str());
        }
        Ok(options)
    }
}

/// Load the document and render it in the requested format.
pub fn render(args: &ComposeArgs) -> Result<String> {
    let options = args.load_options()?;
    debug!(?options, "load options");

    let doc = load(&args.file, &options)
        .with_context(|| format!("failed to compose {}", args.file.display()))?;

    match args.format {
        Format::Yaml => Ok(emit_yaml(&doc)),
        Format::Json => emit_json(&doc).context("failed to render JSON"),
    }
}

/// Execute the compose command
pub fn execute(args: &ComposeArgs) -> Result<()> {
    let text = render(args)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, &text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
