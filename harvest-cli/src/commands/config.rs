//! Config command - manage configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use tracing::info;

use crate::config::HarvestConfig;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration.
    Show,

    /// Show the configuration path.
    Path,

    /// Write a configuration file holding the defaults.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Runs the config command.
pub fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli),
        ConfigAction::Path => show_path(cli),
        ConfigAction::Init { force } => init_config(*force, cli),
    }
}

fn show_config(cli: &Cli) -> Result<()> {
    let path = cli.config_path();
    let config = HarvestConfig::resolve(cli.config.as_deref())?;

    match cli.output_format() {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            let providers = if config.providers.is_empty() {
                "all".to_string()
            } else {
                config.providers.join(", ")
            };
            let pages = if config.pages == 0 {
                "all".to_string()
            } else {
                config.pages.to_string()
            };

            println!("urlharvest Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("File:        {}", formatter.format_config_path(&path));
            println!("Providers:   {providers}");
            println!("Threads:     {}", config.threads);
            println!("Retries:     {}", config.retries);
            println!("Timeout:     {}s", config.timeout_secs);
            println!("Pages:       {pages}");
            println!("Subdomains:  {}", config.include_subdomains);
            if !config.blacklist.is_empty() {
                println!("Blacklist:   {}", config.blacklist.join(", "));
            }
            if !config.filters.is_empty() {
                println!("Filters:     {}", serde_json::to_string(&config.filters)?);
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_config(&path, &config)?);
        }
    }

    Ok(())
}

fn show_path(cli: &Cli) -> Result<()> {
    let path = cli.config_path();

    match cli.output_format() {
        OutputFormat::Text => {
            println!("{}", TextFormatter::new(!cli.no_color).format_config_path(&path));
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_file": path.display().to_string(),
                "exists": path.exists(),
            });
            println!("{paths}");
        }
    }

    Ok(())
}

fn init_config(force: bool, cli: &Cli) -> Result<()> {
    let path = cli.config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    HarvestConfig::default().save_to(&path)?;
    info!(path = %path.display(), "Configuration initialized");
    println!("Wrote {}", path.display());

    Ok(())
}
