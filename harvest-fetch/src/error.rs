//! Fetch error types.

use thiserror::Error;

// ============================================================================
// Transport Error
// ============================================================================

/// Error type for transport operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a status that is not retried.
    #[error("Unexpected status {status} from {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// Still rate limited after every retry.
    #[error("Rate limited, retry after {retry_after:?} seconds")]
    RateLimited {
        /// Seconds the server asked us to wait.
        retry_after: Option<u64>,
    },

    /// Still failing with a server error after every retry.
    #[error("Server error {status} from {url} after {attempts} attempts")]
    RetriesExhausted {
        /// Last HTTP status code seen.
        status: u16,
        /// Requested URL.
        url: String,
        /// Attempts made, including the first.
        attempts: u32,
    },

    /// The run was cancelled while waiting to retry.
    #[error("Request cancelled while waiting to retry")]
    Cancelled,
}

impl FetchError {
    /// Returns true if this error came from a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }

    /// Returns true if the request was abandoned because of cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

// ============================================================================
// Provider Error
// ============================================================================

/// Error type for provider runs.
///
/// Every variant is fatal for the run that produced it. Empty pages and
/// cancellation are not errors and never show up here.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The page-count request failed at the transport.
    #[error("failed to fetch pagination: {0}")]
    Pagination(#[source] FetchError),

    /// The page-count response was not an unsigned integer.
    #[error("failed to fetch pagination: invalid page count: {0}")]
    PaginationDecode(#[source] serde_json::Error),

    /// A results page request failed at the transport.
    #[error("failed to fetch results page {page}: {source}")]
    PageRequest {
        /// Zero-based page index.
        page: u32,
        /// Underlying transport error.
        #[source]
        source: FetchError,
    },

    /// A results page was not an array of string arrays.
    #[error("failed to decode results for page {page}: {source}")]
    PageDecode {
        /// Zero-based page index.
        page: u32,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The domain was empty or blank.
    #[error("Invalid domain: {0:?}")]
    InvalidDomain(String),
}

impl ProviderError {
    /// Returns the page the error belongs to, if it is page-specific.
    pub fn page(&self) -> Option<u32> {
        match self {
            Self::PageRequest { page, .. } | Self::PageDecode { page, .. } => Some(*page),
            _ => None,
        }
    }

    /// Returns true if the transport gave up because the run was cancelled.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Pagination(source) | Self::PageRequest { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }
}
