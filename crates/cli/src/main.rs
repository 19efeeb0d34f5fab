//! Screenlly CLI - Main Entry Point
//!
//! Captures full-page screenshots through a WebDriver grid and compares them
//! against a baseline tree.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use screenlly_common::RunConfig;
use tracing::{debug, warn};

mod commands;
mod output;

use commands::{capture, compare};

const DEFAULT_CONFIG: &str = "screenlly.yml";

/// Screenlly - full-page screenshots and visual regression checks
#[derive(Parser)]
#[command(name = "screenlly")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (defaults to ./screenlly.yml when present)
    #[arg(short, long, global = true, env = "SCREENLLY_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture screenshots of the configured pages in every browser
    Capture(capture::CaptureArgs),

    /// Compare a tested screenshot tree against the expected one
    Compare(compare::CompareArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Capture(args) => capture::execute(args, config, cli.format).await?,
        Commands::Compare(args) => compare::execute(args, config, cli.format).await?,
    }

    Ok(())
}

/// An explicit path must load; the default file is optional
fn load_config(path: Option<&Path>) -> anyhow::Result<RunConfig> {
    match path {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            Ok(RunConfig::load(path)?)
        }
        None if Path::new(DEFAULT_CONFIG).is_file() => {
            debug!("Loading configuration from {}", DEFAULT_CONFIG);
            Ok(RunConfig::load(Path::new(DEFAULT_CONFIG))?)
        }
        None => {
            warn!("No {} found, using defaults", DEFAULT_CONFIG);
            Ok(RunConfig::default())
        }
    }
}
