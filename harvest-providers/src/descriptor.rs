//! Provider descriptor system.
//!
//! A descriptor holds the static facts about a provider (its name, aliases,
//! homepage) and how to build a runnable instance from a fetch context and
//! a filter.

use std::sync::Arc;

use harvest_core::QueryFilter;
use harvest_fetch::{FetchContext, Provider};

/// Constructor shared by every provider.
pub type BuildProvider = fn(Arc<FetchContext>, Arc<dyn QueryFilter>) -> Arc<dyn Provider>;

// ============================================================================
// Provider Descriptor
// ============================================================================

/// Complete descriptor for a provider.
pub struct ProviderDescriptor {
    /// Identifier used on the command line and in logs.
    pub name: &'static str,
    /// Human-readable name.
    pub display_name: &'static str,
    /// Alternative command-line names.
    pub aliases: &'static [&'static str],
    /// Archive homepage.
    pub homepage: &'static str,
    /// Builds a provider instance.
    pub build: BuildProvider,
}

impl ProviderDescriptor {
    /// Builds a provider sharing `ctx` and `filter`.
    pub fn build_provider(
        &self,
        ctx: Arc<FetchContext>,
        filter: Arc<dyn QueryFilter>,
    ) -> Arc<dyn Provider> {
        (self.build)(ctx, filter)
    }

    /// Returns true if `name` is this provider's name or one of its aliases.
    pub fn answers_to(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .finish_non_exhaustive()
    }
}
