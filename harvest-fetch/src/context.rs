//! Fetch context shared by providers.
//!
//! The fetch context bundles the transport with the read-only settings every
//! provider run consults. It is built once and shared behind an [`Arc`].

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::client::HttpClient;
use crate::error::FetchError;
use crate::transport::Transport;

// ============================================================================
// Fetch Settings
// ============================================================================

/// Settings for provider runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    /// Query `*.domain` instead of `domain`.
    pub include_subdomains: bool,
    /// Cap on result pages per domain; `0` visits every page.
    pub max_pages: u32,
    /// Retries after the first attempt, per request.
    pub max_retries: u32,
    /// Timeout for each request attempt.
    pub timeout: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            include_subdomains: false,
            max_pages: 0,
            max_retries: 5,
            timeout: Duration::from_secs(45),
        }
    }
}

impl FetchSettings {
    /// Sets the subdomain flag.
    #[must_use]
    pub fn with_subdomains(mut self, include: bool) -> Self {
        self.include_subdomains = include;
        self
    }

    /// Sets the page cap.
    #[must_use]
    pub fn with_max_pages(mut self, pages: u32) -> Self {
        self.max_pages = pages;
        self
    }

    /// Sets the retry count.
    #[must_use]
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Sets the per-attempt timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Clamps a discovered page count to the configured cap.
    pub fn effective_pages(&self, discovered: u32) -> u32 {
        if self.max_pages == 0 {
            discovered
        } else {
            self.max_pages.min(discovered)
        }
    }
}

// ============================================================================
// Fetch Context
// ============================================================================

/// Context provided to providers: a transport plus settings.
pub struct FetchContext {
    /// Retrying HTTP transport.
    pub transport: Arc<dyn Transport>,
    /// Run settings.
    pub settings: FetchSettings,
}

impl FetchContext {
    /// Creates a context around an explicit transport.
    pub fn new(transport: Arc<dyn Transport>, settings: FetchSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// Creates a builder for customizing the context.
    pub fn builder() -> FetchContextBuilder {
        FetchContextBuilder::new()
    }

    /// Issues a request through the transport using the context's retry
    /// count and timeout.
    ///
    /// # Errors
    ///
    /// Returns whatever the transport returns; nothing is retried here.
    pub async fn request(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.transport
            .request(url, self.settings.max_retries, self.settings.timeout)
            .await
    }
}

impl std::fmt::Debug for FetchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchContext")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Fetch Context Builder
// ============================================================================

/// Builder for constructing a `FetchContext`.
#[derive(Default)]
pub struct FetchContextBuilder {
    transport: Option<Arc<dyn Transport>>,
    settings: FetchSettings,
    cancel: Option<CancellationToken>,
}

impl FetchContextBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the transport.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Lets the default client abandon retry backoff when `cancel` fires.
    ///
    /// Ignored when an explicit transport is given.
    #[must_use]
    pub fn cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Sets the fetch settings.
    #[must_use]
    pub fn settings(mut self, settings: FetchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the subdomain flag.
    #[must_use]
    pub fn include_subdomains(mut self, include: bool) -> Self {
        self.settings.include_subdomains = include;
        self
    }

    /// Sets the page cap.
    #[must_use]
    pub fn max_pages(mut self, pages: u32) -> Self {
        self.settings.max_pages = pages;
        self
    }

    /// Sets the retry count.
    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.settings.max_retries = retries;
        self
    }

    /// Sets the timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = timeout;
        self
    }

    /// Builds the fetch context, creating a default [`HttpClient`] when no
    /// transport was given.
    ///
    /// # Errors
    ///
    /// Fails only if the default HTTP client cannot be created.
    pub fn build(self) -> Result<FetchContext, FetchError> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let client = HttpClient::new()?;
                match self.cancel {
                    Some(cancel) => Arc::new(client.with_cancellation(cancel)),
                    None => Arc::new(client),
                }
            }
        };

        Ok(FetchContext {
            transport,
            settings: self.settings,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_pages() {
        let unbounded = FetchSettings::default();
        assert_eq!(unbounded.effective_pages(12), 12);
        assert_eq!(unbounded.effective_pages(0), 0);

        let capped = FetchSettings::default().with_max_pages(3);
        assert_eq!(capped.effective_pages(12), 3);
        assert_eq!(capped.effective_pages(2), 2);
    }

    #[test]
    fn test_context_builder() {
        let ctx = FetchContext::builder()
            .include_subdomains(true)
            .max_pages(4)
            .max_retries(1)
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap();

        assert!(ctx.settings.include_subdomains);
        assert_eq!(ctx.settings.max_pages, 4);
        assert_eq!(ctx.settings.max_retries, 1);
        assert_eq!(ctx.settings.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_default_settings() {
        let settings = FetchSettings::default();
        assert!(!settings.include_subdomains);
        assert_eq!(settings.max_pages, 0);
        assert_eq!(settings.max_retries, 5);
        assert_eq!(settings.timeout, Duration::from_secs(45));
    }
}
