// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # urlharvest Providers
//!
//! Archive source implementations for `urlharvest`.
//!
//! Each provider module includes:
//!
//! - **Descriptor**: Static facts and a constructor
//! - **API**: Query URL construction
//! - **Parser**: Response decoding
//! - **Fetcher**: The [`harvest_fetch::Provider`] implementation
//!
//! ## Supported Providers
//!
//! | Provider | Index | Paginated | Filters |
//! |----------|-------|-----------|---------|
//! | Wayback Machine | CDX | ✅ | ✅ |
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use harvest_core::Filters;
//! use harvest_fetch::FetchContext;
//! use harvest_providers::ProviderRegistry;
//!
//! let ctx = Arc::new(FetchContext::builder().build()?);
//! let desc = ProviderRegistry::get("wayback").unwrap();
//! let provider = desc.build_provider(ctx, Arc::new(Filters::new()));
//!
//! let (tx, mut rx) = tokio::sync::mpsc::channel(1024);
//! provider.fetch(&CancellationToken::new(), "example.com", &tx).await?;
//! ```

pub mod descriptor;
pub mod registry;

// Provider modules (alphabetical)
pub mod wayback;

// Re-export key types
pub use descriptor::{BuildProvider, ProviderDescriptor};
pub use registry::{ProviderRegistry, UnknownProvider};

// Re-export provider types
pub use wayback::{wayback_descriptor, WaybackProvider};
