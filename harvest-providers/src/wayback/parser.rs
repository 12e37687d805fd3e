//! Wayback CDX response parsing.
//!
//! The page-count endpoint answers with a bare integer. Results pages
//! answer with an array of string arrays whose first row names the fields
//! (`["original"]`) and is never a URL.

use tracing::warn;

/// Rows of fields as returned by the JSON output mode.
pub type WaybackRows = Vec<Vec<String>>;

/// Decodes the page-count response.
///
/// # Errors
///
/// Fails if the body is not a non-negative integer that fits in `u32`.
pub fn parse_page_count(body: &[u8]) -> Result<u32, serde_json::Error> {
    serde_json::from_slice(body)
}

/// Decodes one results page.
///
/// # Errors
///
/// Fails if the body is not an array of string arrays.
pub fn parse_rows(body: &[u8]) -> Result<WaybackRows, serde_json::Error> {
    serde_json::from_slice(body)
}

/// What a decoded results page holds.
#[derive(Debug, PartialEq, Eq)]
pub enum PageOutcome {
    /// The archive returned no rows at all.
    ///
    /// Page counts overshoot when filters are applied, so this is expected
    /// near the end and is not an error.
    Empty,
    /// Header row followed by zero or more result rows.
    Rows(WaybackRows),
}

impl From<WaybackRows> for PageOutcome {
    fn from(rows: WaybackRows) -> Self {
        if rows.is_empty() {
            Self::Empty
        } else {
            Self::Rows(rows)
        }
    }
}

/// Yields field 0 of every row after the header.
///
/// Rows without any field are skipped.
pub fn result_urls(rows: WaybackRows) -> impl Iterator<Item = String> {
    rows.into_iter().skip(1).filter_map(|row| {
        let url = row.into_iter().next();
        if url.is_none() {
            warn!("Skipping CDX row without fields");
        }
        url
    })
}
