//! Wayback provider descriptor.

use std::sync::Arc;

use harvest_core::QueryFilter;
use harvest_fetch::{FetchContext, Provider};

use super::api::WAYBACK_BASE;
use super::fetcher::{WaybackProvider, NAME};
use crate::descriptor::ProviderDescriptor;

/// Descriptor for the Wayback Machine CDX provider.
pub fn wayback_descriptor() -> ProviderDescriptor {
    ProviderDescriptor {
        name: NAME,
        display_name: "Wayback Machine",
        aliases: &["wb", "archive.org"],
        homepage: WAYBACK_BASE,
        build: build_wayback,
    }
}

fn build_wayback(ctx: Arc<FetchContext>, filter: Arc<dyn QueryFilter>) -> Arc<dyn Provider> {
    Arc::new(WaybackProvider::new(ctx, filter))
}
