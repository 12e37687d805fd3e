//! Configuration management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use harvest_core::{CoreError, Filters};
use harvest_fetch::FetchSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid configuration JSON.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        /// File that failed to parse.
        path: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An explicitly requested file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(String),

    /// A value is out of range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// A filter value is malformed.
    #[error(transparent)]
    Filter(#[from] CoreError),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Domains harvested concurrently.
    pub threads: usize,
    /// Retries per request after the first attempt.
    pub retries: u32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Page cap per provider and domain; `0` means every page.
    pub pages: u32,
    /// Include subdomains in archive queries.
    pub include_subdomains: bool,
    /// Providers to run; empty runs all of them.
    pub providers: Vec<String>,
    /// File extensions dropped from the output.
    pub blacklist: Vec<String>,
    /// Archive-side capture filters.
    pub filters: Filters,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            threads: 1,
            retries: 5,
            timeout_secs: 45,
            pages: 0,
            include_subdomains: false,
            providers: Vec::new(),
            blacklist: Vec::new(),
            filters: Filters::default(),
        }
    }
}

impl HarvestConfig {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("urlharvest")
            .join("config.json")
    }

    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path())
    }

    /// Loads the file the user named, or the default file if they named none.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_explicit(path),
            None => Self::load(),
        }
    }

    /// Loads configuration from a specific path, falling back to defaults
    /// when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::read(path)
    }

    /// Loads configuration from a path the user asked for by name.
    pub fn load_explicit(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        Self::read(path)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Saves configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Checks value ranges and filter syntax.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads == 0 {
            return Err(ConfigError::Invalid("threads must be at least 1".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout must be at least 1 second".to_string()));
        }
        self.filters.validate()?;
        Ok(())
    }

    /// Settings handed to every provider.
    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings::default()
            .with_subdomains(self.include_subdomains)
            .with_max_pages(self.pages)
            .with_max_retries(self.retries)
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_default_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = HarvestConfig::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, HarvestConfig::default());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = HarvestConfig::load_explicit(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_resolve_prefers_named_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(&path, r#"{ "pages": 7 }"#).unwrap();

        let config = HarvestConfig::resolve(Some(&path)).unwrap();
        assert_eq!(config.pages, 7);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "threads": 4, "blacklist": ["png"], "filters": { "match_status_codes": ["200"] } }"#,
        )
        .unwrap();

        let config = HarvestConfig::load_explicit(&path).unwrap();
        assert_eq!(config.threads, 4);
        assert_eq!(config.blacklist, vec!["png".to_string()]);
        assert_eq!(config.filters.match_status_codes, vec!["200".to_string()]);
        assert_eq!(config.retries, 5);
        assert_eq!(config.timeout_secs, 45);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = HarvestConfig {
            pages: 3,
            include_subdomains: true,
            ..HarvestConfig::default()
        };
        config.save_to(&path).unwrap();

        assert_eq!(HarvestConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_bad_json_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ threads: ").unwrap();

        let err = HarvestConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.json"));
    }

    #[test]
    fn test_validate() {
        assert!(HarvestConfig::default().validate().is_ok());

        let zero_threads = HarvestConfig {
            threads: 0,
            ..HarvestConfig::default()
        };
        assert!(matches!(zero_threads.validate(), Err(ConfigError::Invalid(_))));

        let bad_filter = HarvestConfig {
            filters: Filters::new().match_status("ok"),
            ..HarvestConfig::default()
        };
        assert!(matches!(bad_filter.validate(), Err(ConfigError::Filter(_))));
    }

    #[test]
    fn test_fetch_settings() {
        let config = HarvestConfig {
            pages: 2,
            retries: 1,
            timeout_secs: 10,
            include_subdomains: true,
            ..HarvestConfig::default()
        };
        let settings = config.fetch_settings();

        assert!(settings.include_subdomains);
        assert_eq!(settings.max_pages, 2);
        assert_eq!(settings.max_retries, 1);
        assert_eq!(settings.timeout, Duration::from_secs(10));
    }
}
