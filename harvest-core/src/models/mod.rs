//! Domain models for `urlharvest`.
//!
//! ## Submodules
//!
//! - [`summary`] - What a provider reports after streaming a domain

mod summary;

pub use summary::FetchSummary;
