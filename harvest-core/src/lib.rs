// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `urlharvest` Core
//!
//! Core types shared by every `urlharvest` crate.
//!
//! This crate has no network or runtime dependencies. It provides:
//!
//! - Archive query filters and the [`QueryFilter`] capability providers
//!   consume to shape their requests
//! - The [`FetchSummary`] a provider returns after streaming a domain
//! - Error types
//!
//! ## Key Types
//!
//! - [`Filters`] - Date range, status code, and MIME type restrictions
//! - [`QueryFilter`] - Renders a query-string suffix for an archive URL
//! - [`FilterEncoding`] - Which filter dialect an archive understands
//! - [`FetchSummary`] - Pages visited, URLs sent, empty pages, cancellation

pub mod error;
pub mod filters;
pub mod models;

// Re-export error types
pub use error::CoreError;

// Re-export filter types
pub use filters::{FilterEncoding, Filters, NoFilter, QueryFilter};

// Re-export model types
pub use models::FetchSummary;
