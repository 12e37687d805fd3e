//! Archive query filters.
//!
//! Filters narrow an archive index query by capture date, HTTP status, and
//! MIME type. Providers treat them as an opaque [`QueryFilter`] and only ask
//! for the rendered query-string suffix.
//!
//! Two filter dialects exist among CDX-style servers:
//!
//! - [`FilterEncoding::Extended`] - the Wayback CDX server, field names
//!   `statuscode` / `mimetype`, regex values, `!` for negation
//! - [`FilterEncoding::Basic`] - pywb-style index servers, field names
//!   `status` / `mime`, regex values, `!=` for exclusion

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::error::CoreError;

// ============================================================================
// Query Filter Capability
// ============================================================================

/// Which filter dialect to render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterEncoding {
    /// Wayback CDX server dialect (`statuscode`, `mimetype`).
    #[default]
    Extended,
    /// pywb index server dialect (`status`, `mime`).
    Basic,
}

impl From<bool> for FilterEncoding {
    fn from(extended: bool) -> Self {
        if extended { Self::Extended } else { Self::Basic }
    }
}

/// Something that can render itself as an archive query-string suffix.
///
/// The returned string is either empty or starts with `&`, so it can be
/// appended verbatim to a URL that already carries a query.
pub trait QueryFilter: Send + Sync {
    /// Renders the query-string suffix for the given dialect.
    fn parameters(&self, encoding: FilterEncoding) -> String;
}

/// A filter that never adds parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFilter;

impl QueryFilter for NoFilter {
    fn parameters(&self, _encoding: FilterEncoding) -> String {
        String::new()
    }
}

// ============================================================================
// Filters
// ============================================================================

/// Capture-level restrictions applied by the archive before pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    /// Earliest capture timestamp (inclusive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Latest capture timestamp (inclusive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Only keep captures with one of these status codes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_status_codes: Vec<String>,
    /// Drop captures with any of these status codes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filter_status_codes: Vec<String>,
    /// Only keep captures with one of these MIME types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_mime_types: Vec<String>,
    /// Drop captures with any of these MIME types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filter_mime_types: Vec<String>,
}

impl Filters {
    /// Creates an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the earliest capture timestamp.
    #[must_use]
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Sets the latest capture timestamp.
    #[must_use]
    pub fn with_to(mut self, to: impl Into<String>) -> Self {
        self.to = Some(to.into());
        self
    }

    /// Adds a status code that captures must have.
    #[must_use]
    pub fn match_status(mut self, code: impl Into<String>) -> Self {
        self.match_status_codes.push(code.into());
        self
    }

    /// Adds a status code that excludes a capture.
    #[must_use]
    pub fn exclude_status(mut self, code: impl Into<String>) -> Self {
        self.filter_status_codes.push(code.into());
        self
    }

    /// Adds a MIME type that captures must have.
    #[must_use]
    pub fn match_mime(mut self, mime: impl Into<String>) -> Self {
        self.match_mime_types.push(mime.into());
        self
    }

    /// Adds a MIME type that excludes a capture.
    #[must_use]
    pub fn exclude_mime(mut self, mime: impl Into<String>) -> Self {
        self.filter_mime_types.push(mime.into());
        self
    }

    /// Returns true if no restriction is set.
    pub fn is_empty(&self) -> bool {
        self.from.is_none()
            && self.to.is_none()
            && self.match_status_codes.is_empty()
            && self.filter_status_codes.is_empty()
            && self.match_mime_types.is_empty()
            && self.filter_mime_types.is_empty()
    }

    /// Checks every value before it is sent to an archive.
    ///
    /// # Errors
    ///
    /// Returns the first malformed status code, MIME type, or timestamp, or
    /// [`CoreError::InvertedRange`] when `from` sorts after `to`.
    pub fn validate(&self) -> Result<(), CoreError> {
        for code in self.match_status_codes.iter().chain(&self.filter_status_codes) {
            if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_digit()) {
                return Err(CoreError::InvalidStatusCode(code.clone()));
            }
        }

        for mime in self.match_mime_types.iter().chain(&self.filter_mime_types) {
            let valid = mime
                .split_once('/')
                .is_some_and(|(ty, sub)| !ty.is_empty() && !sub.is_empty() && !sub.contains('/'));
            if !valid {
                return Err(CoreError::InvalidMimeType(mime.clone()));
            }
        }

        for ts in self.from.iter().chain(&self.to) {
            if !is_timestamp(ts) {
                return Err(CoreError::InvalidTimestamp(ts.clone()));
            }
        }

        if let (Some(from), Some(to)) = (&self.from, &self.to) {
            // Archive timestamps are prefixes; compare on the shared length.
            let len = from.len().min(to.len());
            if from[..len] > to[..len] {
                return Err(CoreError::InvertedRange {
                    from: from.clone(),
                    to: to.clone(),
                });
            }
        }

        Ok(())
    }
}

/// `YYYY` through `YYYYMMDDhhmmss`, digits only, even length past the year.
fn is_timestamp(ts: &str) -> bool {
    (4..=14).contains(&ts.len()) && ts.len() % 2 == 0 && ts.bytes().all(|b| b.is_ascii_digit())
}

/// Joins values into a regex alternation, or the bare value when alone.
fn alternation(values: &[String]) -> String {
    if values.len() == 1 {
        values[0].clone()
    } else {
        format!("({})", values.join("|"))
    }
}

impl QueryFilter for Filters {
    fn parameters(&self, encoding: FilterEncoding) -> String {
        let mut form = form_urlencoded::Serializer::new(String::new());

        if let Some(from) = &self.from {
            form.append_pair("from", from);
        }
        if let Some(to) = &self.to {
            form.append_pair("to", to);
        }

        let (status, mime, negate) = match encoding {
            FilterEncoding::Extended => ("statuscode", "mimetype", "!"),
            FilterEncoding::Basic => ("status", "mime", "!="),
        };

        // Repeated filters are ANDed by the archive, so matches are folded
        // into one alternation while exclusions stay separate.
        if !self.match_status_codes.is_empty() {
            let value = format!("{status}:{}", alternation(&self.match_status_codes));
            form.append_pair("filter", &value);
        }
        if !self.match_mime_types.is_empty() {
            let value = format!("{mime}:{}", alternation(&self.match_mime_types));
            form.append_pair("filter", &value);
        }
        for code in &self.filter_status_codes {
            form.append_pair("filter", &format!("{negate}{status}:{code}"));
        }
        for ty in &self.filter_mime_types {
            form.append_pair("filter", &format!("{negate}{mime}:{ty}"));
        }

        let params = form.finish();
        if params.is_empty() {
            params
        } else {
            format!("&{params}")
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
