//! Provider trait and output channel helpers.
//!
//! A provider is one archive source. Every provider streams the URLs it
//! knows for a domain onto a caller-owned channel; deduplication and output
//! formatting belong to the caller.

use async_trait::async_trait;
use harvest_core::FetchSummary;
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;

use crate::error::ProviderError;

// ============================================================================
// Provider Trait
// ============================================================================

/// An archive source that streams URLs for a domain.
///
/// ## Contract
///
/// - URLs are sent in the archive's order; nothing is deduplicated.
/// - The output channel is never closed by the provider.
/// - Cancellation is cooperative: it is observed between requests and while
///   blocked on a send, and ends the run successfully. A transport giving
///   up with [`FetchError::Cancelled`](crate::FetchError::Cancelled) counts
///   as cancellation too.
/// - Any error is fatal for the run. URLs already sent stay sent.
///
/// ## Implementing a Provider
///
/// ```ignore
/// struct Static(Vec<String>);
///
/// #[async_trait]
/// impl Provider for Static {
///     fn name(&self) -> &'static str {
///         "static"
///     }
///
///     async fn fetch(
///         &self,
///         cancel: &CancellationToken,
///         _domain: &str,
///         output: &Sender<String>,
///     ) -> Result<FetchSummary, ProviderError> {
///         let mut summary = FetchSummary::new(1);
///         for url in &self.0 {
///             if send_url(cancel, output, url.clone()).await == SendOutcome::Stopped {
///                 summary.cancelled = true;
///                 break;
///             }
///             summary.urls_sent += 1;
///         }
///         Ok(summary)
///     }
/// }
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    /// Constant identifier for this provider (e.g., "wayback").
    fn name(&self) -> &'static str;

    /// Streams every URL known for `domain` onto `output`.
    async fn fetch(
        &self,
        cancel: &CancellationToken,
        domain: &str,
        output: &Sender<String>,
    ) -> Result<FetchSummary, ProviderError>;
}

// ============================================================================
// Sending
// ============================================================================

/// Result of pushing one URL onto the output channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The URL was queued.
    Sent,
    /// The run was cancelled or the receiver is gone; stop producing.
    Stopped,
}

/// Sends one URL, giving up if `cancel` fires while the channel is full.
///
/// A closed channel is reported as [`SendOutcome::Stopped`] as well: with no
/// receiver left there is nobody to produce for.
pub async fn send_url(
    cancel: &CancellationToken,
    output: &Sender<String>,
    url: String,
) -> SendOutcome {
    tokio::select! {
        biased;
        result = output.send(url) => match result {
            Ok(()) => SendOutcome::Sent,
            Err(_) => SendOutcome::Stopped,
        },
        () = cancel.cancelled() => SendOutcome::Stopped,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_send_url_delivers() {
        let (tx, mut rx) = mpsc::channel(1);
        let cancel = CancellationToken::new();

        let outcome = send_url(&cancel, &tx, "https://example.com/".to_string()).await;
        assert_eq!(outcome, SendOutcome::Sent);
        assert_eq!(rx.recv().await.as_deref(), Some("https://example.com/"));
    }

    #[tokio::test]
    async fn test_send_url_stops_on_closed_channel() {
        let (tx, rx) = mpsc::channel::<String>(1);
        drop(rx);
        let cancel = CancellationToken::new();

        let outcome = send_url(&cancel, &tx, "https://example.com/".to_string()).await;
        assert_eq!(outcome, SendOutcome::Stopped);
    }

    #[tokio::test]
    async fn test_send_url_unblocks_on_cancel() {
        let (tx, _rx) = mpsc::channel(1);
        let cancel = CancellationToken::new();

        // Fill the only slot so the next send blocks.
        tx.send("first".to_string()).await.unwrap();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let outcome = send_url(&cancel, &tx, "second".to_string()).await;
        assert_eq!(outcome, SendOutcome::Stopped);
    }
}
