//! ycompose CLI - Main entry point

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod compose;

#[derive(Parser)]
#[command(name = "ycompose")]
#[command(version)]
#[command(about = "Compose a YAML/JSON document from includes, patches and variables", long_about = None)]
struct Cli {
    #[command(flatten)]
    compose: compose::ComposeArgs,
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays the composed document
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ycompose=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    compose::execute(&cli.compose)
}
