// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! urlharvest CLI - collect archived URLs for domains from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Every archived URL for a domain
//! harvest example.com
//!
//! # Domains from stdin, subdomains included, first 5 pages only
//! cat domains.txt | harvest --subs --pages 5
//!
//! # Only 200 responses, no images, JSON lines into a file
//! harvest example.com --mc 200 --blacklist png,jpg,gif --json -o urls.jsonl
//!
//! # List providers
//! harvest providers
//!
//! # Show the effective configuration
//! harvest config show
//! ```

mod blacklist;
mod commands;
mod config;
mod harvest;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{config as config_cmd, fetch, providers};

// ============================================================================
// CLI Definition
// ============================================================================

/// urlharvest - archived URL discovery.
#[derive(Parser)]
#[command(name = "harvest")]
#[command(about = "Fetch known URLs for domains from web archives")]
#[command(long_about = r#"
urlharvest streams every URL web archives have captured for a domain.

Supported providers:
  • Wayback Machine (wayback)

Examples:
  harvest example.com                 # All pages, all providers
  harvest example.com --subs          # Include subdomains
  cat domains.txt | harvest           # Domains from stdin
  harvest example.com --json          # JSON lines output
  harvest providers                   # List providers
"#)]
#[command(version)]
#[command(author = "urlharvest contributors")]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Subcommand to run. If none, fetches URLs for the given domains.
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub fetch: fetch::FetchArgs,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Shorthand for `--format json`.
    #[arg(long, global = true)]
    pub json: bool,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Configuration file (default: <config dir>/urlharvest/config.json).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// Output format after applying `--json`.
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }

    /// Configuration file in effect.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(config::HarvestConfig::default_path)
    }
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch URLs for domains (default if no command specified).
    #[command(visible_alias = "f")]
    Fetch(fetch::FetchArgs),

    /// List available providers.
    #[command(visible_alias = "p")]
    Providers,

    /// Manage configuration.
    Config(config_cmd::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// One plain URL per line.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// General error.
    Error = 1,
    /// Provider not found.
    ProviderMissing = 2,
    /// Configuration could not be loaded.
    ConfigError = 3,
    /// Interrupted twice; the run was abandoned.
    Interrupted = 130,
}

impl ExitCode {
    fn for_error(err: &anyhow::Error) -> Self {
        if err.is::<harvest_providers::UnknownProvider>() {
            Self::ProviderMissing
        } else if err.is::<config::ConfigError>() {
            Self::ConfigError
        } else {
            Self::Error
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = if verbose {
        EnvFilter::new("harvest=debug,info")
    } else {
        EnvFilter::new("harvest=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Some(Commands::Fetch(args)) => fetch::run(args, &cli).await.map(|_| ()),
        Some(Commands::Providers) => providers::run(&cli),
        Some(Commands::Config(args)) => config_cmd::run(args, &cli),
        None => fetch::run(&cli.fetch, &cli).await.map(|_| ()),
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(ExitCode::for_error(&e) as i32);
    }

    Ok(())
}
