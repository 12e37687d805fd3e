//! Transport abstraction consumed by providers.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::FetchError;

/// A retrying GET transport.
///
/// Implementations own their retry, backoff, and timeout policy. Callers
/// perform no retries of their own and treat any error as final for the
/// request.
///
/// ## Implementing a Transport
///
/// ```ignore
/// struct Canned(Vec<u8>);
///
/// #[async_trait]
/// impl Transport for Canned {
///     async fn request(
///         &self,
///         _url: &str,
///         _max_retries: u32,
///         _timeout: Duration,
///     ) -> Result<Vec<u8>, FetchError> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches `url`, retrying transient failures up to `max_retries` times
    /// after the first attempt, each attempt bounded by `timeout`.
    ///
    /// Returns the full response body.
    async fn request(
        &self,
        url: &str,
        max_retries: u32,
        timeout: Duration,
    ) -> Result<Vec<u8>, FetchError>;
}
