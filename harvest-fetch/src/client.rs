//! HTTP client with retry capabilities.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::{header, Client, Response, StatusCode};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::error::FetchError;
use crate::retry::RetryStrategy;
use crate::transport::Transport;

/// Browser user agents rotated across requests.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
];

/// HTTP client with retry capabilities.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    retry_strategy: RetryStrategy,
    user_agent: Option<String>,
    cancel: CancellationToken,
}

impl HttpClient {
    /// Creates a new HTTP client with default settings.
    ///
    /// # Errors
    ///
    /// Fails if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder().build()?;

        Ok(Self::from_client(client))
    }

    /// Wraps an already configured reqwest client.
    pub fn from_client(client: Client) -> Self {
        Self {
            inner: client,
            retry_strategy: RetryStrategy::default(),
            user_agent: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Sets the retry strategy for this client.
    #[must_use]
    pub fn with_retry_strategy(mut self, strategy: RetryStrategy) -> Self {
        self.retry_strategy = strategy;
        self
    }

    /// Pins a user agent instead of rotating through browser agents.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Abandons retry backoff as soon as `cancel` fires.
    ///
    /// A request already on the wire still runs to completion.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Returns the retry strategy in use.
    pub fn retry_strategy(&self) -> &RetryStrategy {
        &self.retry_strategy
    }

    fn pick_user_agent(&self) -> &str {
        if let Some(ref agent) = self.user_agent {
            return agent;
        }
        USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(USER_AGENTS[0])
    }

    /// Delay before the next attempt, honoring `Retry-After` up to the cap.
    fn retry_delay(&self, attempt: u32, retry_after: Option<u64>) -> Duration {
        match retry_after {
            Some(secs) => Duration::from_secs(secs).min(self.retry_strategy.max_delay),
            None => self.retry_strategy.delay_for_attempt(attempt),
        }
    }

    /// Sleeps before the next attempt unless the run is cancelled first.
    async fn backoff(&self, delay: Duration) -> Result<(), FetchError> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                debug!("Cancelled during retry backoff");
                Err(FetchError::Cancelled)
            }
            () = tokio::time::sleep(delay) => Ok(()),
        }
    }

    /// Performs a GET request and returns the body, retrying transient failures.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_bytes(
        &self,
        url: &str,
        max_retries: u32,
        timeout: Duration,
    ) -> Result<Vec<u8>, FetchError> {
        let max_attempts = max_retries.saturating_add(1);
        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!(attempt = attempts, "Making GET request");

            let result = self
                .inner
                .get(url)
                .header(header::USER_AGENT, self.pick_user_agent())
                .timeout(timeout)
                .send()
                .await;

            let response = match result {
                Ok(response) => response,
                Err(e) => {
                    if attempts < max_attempts && self.retry_strategy.should_retry(&e) {
                        let delay = self.retry_strategy.delay_for_attempt(attempts);
                        warn!(
                            error = %e,
                            delay_ms = delay.as_millis(),
                            "Request failed, retrying"
                        );
                        self.backoff(delay).await?;
                        continue;
                    }
                    return Err(e.into());
                }
            };

            let status = response.status();
            debug!(status = %status, "Response received");

            if status.is_success() {
                match response.bytes().await {
                    Ok(body) => return Ok(body.to_vec()),
                    Err(e) => {
                        if attempts < max_attempts && self.retry_strategy.should_retry(&e) {
                            let delay = self.retry_strategy.delay_for_attempt(attempts);
                            warn!(error = %e, "Reading body failed, retrying");
                            self.backoff(delay).await?;
                            continue;
                        }
                        return Err(e.into());
                    }
                }
            }

            if !self.retry_strategy.should_retry_status(status) {
                return Err(FetchError::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            let retry_after = if status == StatusCode::TOO_MANY_REQUESTS {
                response.retry_after_secs()
            } else {
                None
            };

            if attempts < max_attempts {
                let delay = self.retry_delay(attempts, retry_after);
                warn!(
                    status = %status,
                    delay_ms = delay.as_millis(),
                    "Server refused request, retrying"
                );
                self.backoff(delay).await?;
                continue;
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(FetchError::RateLimited { retry_after });
            }

            return Err(FetchError::RetriesExhausted {
                status: status.as_u16(),
                url: url.to_string(),
                attempts,
            });
        }
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn request(
        &self,
        url: &str,
        max_retries: u32,
        timeout: Duration,
    ) -> Result<Vec<u8>, FetchError> {
        self.get_bytes(url, max_retries, timeout).await
    }
}

// ============================================================================
// Response Extensions
// ============================================================================

/// Extension trait for Response handling.
pub trait ResponseExt {
    /// Get the Retry-After header value in seconds.
    fn retry_after_secs(&self) -> Option<u64>;
}

impl ResponseExt for Response {
    fn retry_after_secs(&self) -> Option<u64> {
        self.headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    }
}

// ============================================================================
// Tests
// ============================================================================
