//! JSON output formatting.

use std::path::Path;

use anyhow::Result;
use harvest_providers::ProviderDescriptor;
use serde::Serialize;

use crate::config::HarvestConfig;

// ============================================================================
// Output Types
// ============================================================================

/// One harvested URL.
#[derive(Debug, Serialize)]
pub struct UrlOutput<'a> {
    pub url: &'a str,
}

/// A registered provider.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfoOutput {
    pub name: String,
    pub display_name: String,
    pub aliases: Vec<String>,
    pub homepage: String,
}

/// Config location plus the effective values.
#[derive(Debug, Serialize)]
pub struct ConfigOutput<'a> {
    pub path: String,
    pub exists: bool,
    pub config: &'a HarvestConfig,
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats the provider list.
    pub fn format_providers(&self, providers: &[&ProviderDescriptor]) -> Result<String> {
        let output: Vec<ProviderInfoOutput> = providers
            .iter()
            .map(|d| ProviderInfoOutput {
                name: d.name.to_string(),
                display_name: d.display_name.to_string(),
                aliases: d.aliases.iter().map(ToString::to_string).collect(),
                homepage: d.homepage.to_string(),
            })
            .collect();

        self.to_json(&output)
    }

    /// Formats the effective configuration.
    pub fn format_config(&self, path: &Path, config: &HarvestConfig) -> Result<String> {
        self.to_json(&ConfigOutput {
            path: path.display().to_string(),
            exists: path.exists(),
            config,
        })
    }

    fn to_json<T: Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(json)
    }
}
