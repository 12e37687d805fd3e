//! Provider registry for managing all provider descriptors.
//!
//! The registry provides static access to all provider configurations
//! and is the central point for looking up providers by name.

use std::sync::OnceLock;

use thiserror::Error;

use crate::descriptor::ProviderDescriptor;
use crate::wayback::wayback_descriptor;

// ============================================================================
// Static Registry
// ============================================================================

/// Static storage for all provider descriptors.
static DESCRIPTORS: OnceLock<Vec<ProviderDescriptor>> = OnceLock::new();

/// Initializes all provider descriptors, in default run order.
fn init_descriptors() -> Vec<ProviderDescriptor> {
    vec![wayback_descriptor()]
}

/// A provider name that matches no descriptor.
#[derive(Debug, Error)]
#[error("Unknown provider: {0}")]
pub struct UnknownProvider(pub String);

// ============================================================================
// Provider Registry
// ============================================================================

/// Global registry of all provider descriptors.
pub struct ProviderRegistry;

impl ProviderRegistry {
    /// Returns all provider descriptors.
    pub fn all() -> &'static [ProviderDescriptor] {
        DESCRIPTORS.get_or_init(init_descriptors)
    }

    /// Looks up a provider by name or alias, ignoring case.
    pub fn get(name: &str) -> Option<&'static ProviderDescriptor> {
        Self::all().iter().find(|d| d.answers_to(name))
    }

    /// Returns every provider name.
    pub fn names() -> Vec<&'static str> {
        Self::all().iter().map(|d| d.name).collect()
    }

    /// Returns the number of registered providers.
    pub fn count() -> usize {
        Self::all().len()
    }

    /// Resolves a selection of names.
    ///
    /// An empty selection or the word `all` picks every provider. Duplicate
    /// names collapse to one entry; order follows the first mention.
    ///
    /// # Errors
    ///
    /// Returns the first name that matches no provider.
    pub fn select<S: AsRef<str>>(
        names: &[S],
    ) -> Result<Vec<&'static ProviderDescriptor>, UnknownProvider> {
        let names: Vec<&str> = names
            .iter()
            .map(|n| n.as_ref().trim())
            .filter(|n| !n.is_empty())
            .collect();

        if names.is_empty() || names.iter().any(|n| n.eq_ignore_ascii_case("all")) {
            return Ok(Self::all().iter().collect());
        }

        let mut selected: Vec<&'static ProviderDescriptor> = Vec::new();
        for name in names {
            let desc = Self::get(name).ok_or_else(|| UnknownProvider(name.to_string()))?;
            if !selected.iter().any(|d| d.name == desc.name) {
                selected.push(desc);
            }
        }
        Ok(selected)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_contents() {
        assert_eq!(ProviderRegistry::count(), 1);
        assert_eq!(ProviderRegistry::names(), vec!["wayback"]);
    }

    #[test]
    fn test_lookup_by_name_and_alias() {
        assert!(ProviderRegistry::get("wayback").is_some());
        assert!(ProviderRegistry::get("WAYBACK").is_some());

        let alias = ProviderRegistry::get("wb");
        assert_eq!(alias.map(|d| d.name), Some("wayback"));

        assert!(ProviderRegistry::get("otx").is_none());
    }

    #[test]
    fn test_select_all_and_empty() {
        let empty: [&str; 0] = [];
        assert_eq!(ProviderRegistry::select(&empty).unwrap().len(), 1);
        assert_eq!(ProviderRegistry::select(&["all"]).unwrap().len(), 1);
    }

    #[test]
    fn test_select_dedupes_aliases() {
        let selected = ProviderRegistry::select(&["wayback", "wb", " "]).unwrap();
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn test_select_unknown() {
        let err = ProviderRegistry::select(&["wayback", "urlscan"]).unwrap_err();
        assert_eq!(err.to_string(), "Unknown provider: urlscan");
    }
}
