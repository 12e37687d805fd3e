//! Retry strategies for HTTP requests.

use std::time::Duration;

use reqwest::StatusCode;

/// Backoff policy between retry attempts.
///
/// The number of retries is chosen per request by the caller; this type
/// only decides how long to wait and what is worth retrying.
#[derive(Debug, Clone)]
pub struct RetryStrategy {
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Whether to use exponential backoff.
    pub exponential_backoff: bool,
    /// Maximum delay between retries.
    pub max_delay: Duration,
}

impl RetryStrategy {
    /// Creates a new exponential strategy with the given base delay.
    pub fn new(base_delay: Duration) -> Self {
        Self {
            base_delay,
            exponential_backoff: true,
            max_delay: Duration::from_secs(30),
        }
    }

    /// Retries immediately, without waiting.
    pub fn no_delay() -> Self {
        Self {
            base_delay: Duration::ZERO,
            exponential_backoff: false,
            max_delay: Duration::ZERO,
        }
    }

    /// Sets the base delay.
    #[must_use]
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Sets the maximum delay.
    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Enables or disables exponential backoff.
    #[must_use]
    pub fn with_exponential_backoff(mut self, enabled: bool) -> Self {
        self.exponential_backoff = enabled;
        self
    }

    /// Calculates the delay before retry number `attempt` (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = if self.exponential_backoff {
            let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
            self.base_delay.saturating_mul(factor)
        } else {
            self.base_delay
        };

        delay.min(self.max_delay)
    }

    /// Determines if a request error should be retried.
    pub fn should_retry(&self, error: &reqwest::Error) -> bool {
        // Retry on connection errors and timeouts
        error.is_connect() || error.is_timeout() || error.is_request()
    }

    /// Determines if a response status should be retried.
    pub fn should_retry_status(&self, status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
    }
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}
