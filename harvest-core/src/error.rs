//! Core error types for `urlharvest`.

use thiserror::Error;

/// Core error type for `urlharvest` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A status code filter is not a three-digit HTTP status.
    #[error("Invalid status code filter: {0}")]
    InvalidStatusCode(String),

    /// A MIME type filter is not of the form `type/subtype`.
    #[error("Invalid MIME type filter: {0}")]
    InvalidMimeType(String),

    /// A date bound is not an archive timestamp (`YYYY[MM[DD[hh[mm[ss]]]]]`).
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// The `from` bound is later than the `to` bound.
    #[error("Date range is inverted: from {from} is after to {to}")]
    InvertedRange {
        /// Lower bound as given.
        from: String,
        /// Upper bound as given.
        to: String,
    },
}
