//! Wayback CDX query URLs.

use harvest_core::{FilterEncoding, QueryFilter};

// ============================================================================
// Constants
// ============================================================================

/// Wayback Machine base URL.
pub const WAYBACK_BASE: &str = "https://web.archive.org";

/// CDX search endpoint.
const CDX_ENDPOINT: &str = "/cdx/search/cdx";

/// Flag that turns a results query into a page-count query.
const SHOW_NUM_PAGES: &str = "&showNumPages=true";

// ============================================================================
// URL Construction
// ============================================================================

/// Builds the CDX query URL for one results page.
///
/// The query asks for JSON, collapses captures by URL key so the archive
/// dedupes before paginating, and keeps only the `original` field. The
/// filter suffix goes last, rendered in the Wayback dialect.
pub fn page_url(
    base: &str,
    domain: &str,
    page: u32,
    include_subdomains: bool,
    filter: &dyn QueryFilter,
) -> String {
    let target = if include_subdomains {
        format!("*.{domain}")
    } else {
        domain.to_string()
    };

    format!(
        "{base}{CDX_ENDPOINT}?url={target}/*&output=json&collapse=urlkey&fl=original&page={page}{}",
        filter.parameters(FilterEncoding::Extended)
    )
}

/// Builds the page-count query: the page 0 URL plus `showNumPages`.
pub fn pagination_url(
    base: &str,
    domain: &str,
    include_subdomains: bool,
    filter: &dyn QueryFilter,
) -> String {
    let mut url = page_url(base, domain, 0, include_subdomains, filter);
    url.push_str(SHOW_NUM_PAGES);
    url
}

// ============================================================================
// Tests
// ============================================================================
