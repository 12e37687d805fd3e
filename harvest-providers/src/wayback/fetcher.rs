//! Wayback Machine provider.

use std::sync::Arc;

use async_trait::async_trait;
use harvest_core::{FetchSummary, QueryFilter};
use harvest_fetch::{send_url, FetchContext, Provider, ProviderError, SendOutcome};
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::api::{page_url, pagination_url, WAYBACK_BASE};
use super::parser::{parse_page_count, parse_rows, result_urls, PageOutcome, WaybackRows};

/// Provider identifier.
pub const NAME: &str = "wayback";

// ============================================================================
// Provider
// ============================================================================

/// Streams every URL the Wayback Machine has captured under a domain.
///
/// Pages are walked strictly in order, one request at a time; only one
/// page's rows are held in memory.
pub struct WaybackProvider {
    ctx: Arc<FetchContext>,
    filter: Arc<dyn QueryFilter>,
    base_url: String,
}

impl WaybackProvider {
    /// Creates a provider against the public Wayback Machine.
    pub fn new(ctx: Arc<FetchContext>, filter: Arc<dyn QueryFilter>) -> Self {
        Self {
            ctx,
            filter,
            base_url: WAYBACK_BASE.to_string(),
        }
    }

    /// Points the provider at another CDX server (a mirror, or a test server).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Returns the results URL for `page`.
    pub fn page_url(&self, domain: &str, page: u32) -> String {
        page_url(
            &self.base_url,
            domain,
            page,
            self.ctx.settings.include_subdomains,
            self.filter.as_ref(),
        )
    }

    /// Asks the archive how many results pages exist for `domain`.
    async fn page_count(&self, domain: &str) -> Result<u32, ProviderError> {
        let url = pagination_url(
            &self.base_url,
            domain,
            self.ctx.settings.include_subdomains,
            self.filter.as_ref(),
        );

        let body = self
            .ctx
            .request(&url)
            .await
            .map_err(ProviderError::Pagination)?;

        parse_page_count(&body).map_err(ProviderError::PaginationDecode)
    }

    /// Requests and decodes one results page.
    async fn fetch_page(&self, domain: &str, page: u32) -> Result<WaybackRows, ProviderError> {
        let url = self.page_url(domain, page);

        let body = self
            .ctx
            .request(&url)
            .await
            .map_err(|source| ProviderError::PageRequest { page, source })?;

        parse_rows(&body).map_err(|source| ProviderError::PageDecode { page, source })
    }
}

impl std::fmt::Debug for WaybackProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaybackProvider")
            .field("base_url", &self.base_url)
            .field("settings", &self.ctx.settings)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Provider for WaybackProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    #[instrument(skip(self, cancel, output), fields(provider = NAME))]
    async fn fetch(
        &self,
        cancel: &CancellationToken,
        domain: &str,
        output: &Sender<String>,
    ) -> Result<FetchSummary, ProviderError> {
        let domain = domain.trim();
        if domain.is_empty() {
            return Err(ProviderError::InvalidDomain(domain.to_string()));
        }

        let discovered = match self.page_count(domain).await {
            Err(e) if e.is_cancelled() => {
                debug!("Cancelled while resolving pagination");
                let mut summary = FetchSummary::new(0);
                summary.cancelled = true;
                return Ok(summary);
            }
            result => result?,
        };
        let pages = self.ctx.settings.effective_pages(discovered);
        debug!(discovered, pages, "Resolved pagination");

        let mut summary = FetchSummary::new(discovered);

        for page in 0..pages {
            if cancel.is_cancelled() {
                debug!(page, "Cancelled before page");
                summary.cancelled = true;
                break;
            }

            info!(provider = NAME, page, "fetching {domain}");
            let rows = match self.fetch_page(domain, page).await {
                Err(e) if e.is_cancelled() => {
                    debug!(page, "Cancelled while retrying page");
                    summary.cancelled = true;
                    break;
                }
                result => result?,
            };
            summary.pages_visited += 1;

            match PageOutcome::from(rows) {
                PageOutcome::Empty => {
                    warn!(provider = NAME, page, "empty results page for {domain}");
                    summary.empty_pages.push(page);
                }
                PageOutcome::Rows(rows) => {
                    for url in result_urls(rows) {
                        if send_url(cancel, output, url).await == SendOutcome::Stopped {
                            debug!(page, "Output stopped mid-page");
                            summary.cancelled = true;
                            return Ok(summary);
                        }
                        summary.urls_sent += 1;
                    }
                }
            }
        }

        info!(
            provider = NAME,
            pages = summary.pages_visited,
            urls = summary.urls_sent,
            "finished {domain}"
        );
        Ok(summary)
    }
}

// ============================================================================
// Tests
// ============================================================================
