//! Providers command - list available providers.

use anyhow::Result;
use harvest_providers::ProviderRegistry;
use tracing::info;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the providers command.
pub fn run(cli: &Cli) -> Result<()> {
    info!("Listing providers");

    let providers: Vec<_> = ProviderRegistry::all().iter().collect();

    match cli.output_format() {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);

            println!("{}", formatter.format_providers_header());
            println!("{}", "─".repeat(70));

            for desc in &providers {
                println!("{}", formatter.format_provider_line(desc));
            }

            println!();
            println!("Total: {} providers", providers.len());
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_providers(&providers)?);
        }
    }

    Ok(())
}
