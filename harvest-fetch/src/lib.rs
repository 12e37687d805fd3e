// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # urlharvest Fetch
//!
//! Transport and provider contract for `urlharvest`.
//!
//! This crate provides the infrastructure every archive provider runs on:
//!
//! ## Transport
//!
//! - [`transport::Transport`] - Retrying GET returning the body bytes
//! - [`client::HttpClient`] - reqwest implementation with backoff and
//!   rotating user agents
//! - [`retry::RetryStrategy`] - Backoff policy and retryable failures
//!
//! ## Providers
//!
//! - [`provider::Provider`] - Trait every archive source implements
//! - [`provider::send_url`] - Cancellation-aware send onto the output channel
//! - [`context::FetchContext`] - Transport plus read-only run settings
//!
//! ## Example
//!
//! ```ignore
//! use harvest_fetch::FetchContext;
//!
//! let ctx = FetchContext::builder()
//!     .include_subdomains(true)
//!     .max_pages(10)
//!     .build()?;
//!
//! let body = ctx.request("https://web.archive.org/cdx/search/cdx?url=example.com").await?;
//! ```

// Core modules
pub mod client;
pub mod context;
pub mod error;
pub mod provider;
pub mod retry;
pub mod transport;

// Re-export key types at crate root

// Errors
pub use error::{FetchError, ProviderError};

// Transport
pub use client::{HttpClient, ResponseExt};
pub use retry::RetryStrategy;
pub use transport::Transport;

// Providers
pub use context::{FetchContext, FetchContextBuilder, FetchSettings};
pub use provider::{send_url, Provider, SendOutcome};
