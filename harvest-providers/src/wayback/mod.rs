//! Wayback Machine provider implementation.
//!
//! Queries the CDX index at `web.archive.org`: one page-count request, then
//! one request per results page, in order.

mod api;
mod descriptor;
mod fetcher;
pub(crate) mod parser;

pub use api::{page_url, pagination_url, WAYBACK_BASE};
pub use descriptor::wayback_descriptor;
pub use fetcher::{WaybackProvider, NAME};
pub use parser::{PageOutcome, WaybackRows};
