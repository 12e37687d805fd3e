//! Run orchestration: fan providers in, dedupe, filter and write.
//!
//! Every provider sends onto one shared channel. A single consumer task owns
//! the output, so URLs are written in arrival order without locking.

use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use harvest_fetch::Provider;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::blacklist::Blacklist;
use crate::output::UrlWriter;

/// Bound on URLs queued between providers and the writer.
const CHANNEL_CAPACITY: usize = 1024;

// ============================================================================
// Report
// ============================================================================

/// A provider run that ended in an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub provider: &'static str,
    pub domain: String,
    pub error: String,
}

/// Totals for one harvest run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestReport {
    /// Domains processed.
    pub domains: usize,
    /// URLs written to the output.
    pub urls_written: u64,
    /// URLs dropped because they were already written.
    pub duplicates: u64,
    /// URLs dropped by the extension blacklist.
    pub blacklisted: u64,
    /// Provider runs that failed.
    pub failures: Vec<ProviderFailure>,
    /// Whether the run was interrupted.
    pub cancelled: bool,
    /// Whether the output reader went away before the run finished.
    pub output_closed: bool,
}

#[derive(Debug, Default)]
struct SinkTotals {
    written: u64,
    duplicates: u64,
    blacklisted: u64,
    output_closed: bool,
}

// ============================================================================
// Harvester
// ============================================================================

/// Runs a set of providers over a list of domains.
pub struct Harvester {
    providers: Vec<Arc<dyn Provider>>,
    threads: usize,
    blacklist: Blacklist,
}

impl Harvester {
    /// Creates a harvester processing `threads` domains at a time.
    pub fn new(providers: Vec<Arc<dyn Provider>>, threads: usize, blacklist: Blacklist) -> Self {
        Self {
            providers,
            threads: threads.max(1),
            blacklist,
        }
    }

    /// Harvests every domain and writes unique URLs to `writer`.
    ///
    /// Provider failures are logged and collected into the report; the run
    /// carries on with the remaining providers and domains. The writer is
    /// handed back flushed.
    ///
    /// # Errors
    ///
    /// Returns an error only if writing the output fails.
    pub async fn run<W>(
        &self,
        domains: Vec<String>,
        cancel: &CancellationToken,
        writer: UrlWriter<W>,
    ) -> io::Result<(HarvestReport, W)>
    where
        W: Write + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let sink = tokio::spawn(consume(rx, self.blacklist.clone(), writer));

        let domain_count = domains.len();
        let failures: Vec<ProviderFailure> = stream::iter(domains)
            .map(|domain| {
                let tx = tx.clone();
                async move { self.harvest_domain(cancel, &domain, &tx).await }
            })
            .buffer_unordered(self.threads)
            .flat_map(stream::iter)
            .collect()
            .await;
        drop(tx);

        let (totals, out) = sink.await.map_err(io::Error::other)??;

        let report = HarvestReport {
            domains: domain_count,
            urls_written: totals.written,
            duplicates: totals.duplicates,
            blacklisted: totals.blacklisted,
            failures,
            cancelled: cancel.is_cancelled(),
            output_closed: totals.output_closed,
        };
        info!(
            domains = report.domains,
            urls = report.urls_written,
            duplicates = report.duplicates,
            failures = report.failures.len(),
            "Harvest finished"
        );
        Ok((report, out))
    }

    /// Runs every provider for one domain concurrently.
    async fn harvest_domain(
        &self,
        cancel: &CancellationToken,
        domain: &str,
        tx: &mpsc::Sender<String>,
    ) -> Vec<ProviderFailure> {
        let runs = self.providers.iter().map(|provider| async move {
            match provider.fetch(cancel, domain, tx).await {
                Ok(summary) => {
                    debug!(
                        provider = provider.name(),
                        domain,
                        pages = summary.pages_visited,
                        urls = summary.urls_sent,
                        "Provider finished"
                    );
                    None
                }
                Err(e) => {
                    warn!(provider = provider.name(), domain, error = %e, "Provider failed");
                    Some(ProviderFailure {
                        provider: provider.name(),
                        domain: domain.to_string(),
                        error: e.to_string(),
                    })
                }
            }
        });

        futures::future::join_all(runs)
            .await
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Drains the channel, writing each new URL once.
///
/// Returning early drops the receiver, which stops every provider at its
/// next send.
async fn consume<W: Write>(
    mut rx: mpsc::Receiver<String>,
    blacklist: Blacklist,
    mut writer: UrlWriter<W>,
) -> io::Result<(SinkTotals, W)> {
    let mut seen = HashSet::new();
    let mut totals = SinkTotals::default();

    while let Some(url) = rx.recv().await {
        if blacklist.blocks(&url) {
            totals.blacklisted += 1;
            continue;
        }
        if !seen.insert(url.clone()) {
            totals.duplicates += 1;
            continue;
        }
        if let Err(e) = writer.write_url(&url) {
            return output_closed(e, totals, writer);
        }
        totals.written += 1;
    }

    if let Err(e) = writer.flush() {
        return output_closed(e, totals, writer);
    }
    Ok((totals, writer.into_inner()))
}

/// A reader that went away (`harvest ... | head`) ends the run quietly;
/// any other write error is returned.
fn output_closed<W: Write>(
    err: io::Error,
    mut totals: SinkTotals,
    writer: UrlWriter<W>,
) -> io::Result<(SinkTotals, W)> {
    if err.kind() != io::ErrorKind::BrokenPipe {
        return Err(err);
    }
    debug!("Output closed, stopping");
    totals.output_closed = true;
    Ok((totals, writer.into_inner()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OutputFormat;
    use async_trait::async_trait;
    use harvest_core::FetchSummary;
    use harvest_fetch::{send_url, FetchError, ProviderError, SendOutcome};
    use tokio::sync::mpsc::Sender;

    /// Sends a fixed list of paths under each domain.
    struct StaticProvider {
        name: &'static str,
        paths: Vec<&'static str>,
    }

    #[async_trait]
    impl Provider for StaticProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn fetch(
            &self,
            cancel: &CancellationToken,
            domain: &str,
            output: &Sender<String>,
        ) -> Result<FetchSummary, ProviderError> {
            let mut summary = FetchSummary::new(1);
            if cancel.is_cancelled() {
                summary.cancelled = true;
                return Ok(summary);
            }
            summary.pages_visited = 1;
            for path in &self.paths {
                let url = format!("https://{domain}{path}");
                if send_url(cancel, output, url).await == SendOutcome::Stopped {
                    summary.cancelled = true;
                    break;
                }
                summary.urls_sent += 1;
            }
            Ok(summary)
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl Provider for FailingProvider {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn fetch(
            &self,
            _cancel: &CancellationToken,
            _domain: &str,
            _output: &Sender<String>,
        ) -> Result<FetchSummary, ProviderError> {
            Err(ProviderError::Pagination(FetchError::Status {
                status: 500,
                url: "https://archive.test/".to_string(),
            }))
        }
    }

    fn lines(out: Vec<u8>) -> Vec<String> {
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(ToString::to_string)
            .collect()
    }

    #[tokio::test]
    async fn test_dedupes_across_providers() {
        let harvester = Harvester::new(
            vec![
                Arc::new(StaticProvider {
                    name: "one",
                    paths: vec!["/a", "/b"],
                }),
                Arc::new(StaticProvider {
                    name: "two",
                    paths: vec!["/b", "/c"],
                }),
            ],
            1,
            Blacklist::default(),
        );

        let (report, out) = harvester
            .run(
                vec!["example.com".to_string()],
                &CancellationToken::new(),
                UrlWriter::new(Vec::new(), OutputFormat::Text),
            )
            .await
            .unwrap();

        let mut urls = lines(out);
        urls.sort();
        assert_eq!(
            urls,
            vec![
                "https://example.com/a",
                "https://example.com/b",
                "https://example.com/c"
            ]
        );
        assert_eq!(report.urls_written, 3);
        assert_eq!(report.duplicates, 1);
        assert!(report.failures.is_empty());
        assert!(!report.cancelled);
    }

    #[tokio::test]
    async fn test_blacklist_drops_urls() {
        let harvester = Harvester::new(
            vec![Arc::new(StaticProvider {
                name: "one",
                paths: vec!["/", "/logo.png", "/app.js"],
            })],
            1,
            Blacklist::new(&["png"]),
        );

        let (report, out) = harvester
            .run(
                vec!["example.com".to_string()],
                &CancellationToken::new(),
                UrlWriter::new(Vec::new(), OutputFormat::Text),
            )
            .await
            .unwrap();

        assert_eq!(
            lines(out),
            vec!["https://example.com/", "https://example.com/app.js"]
        );
        assert_eq!(report.blacklisted, 1);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_other_providers() {
        let harvester = Harvester::new(
            vec![
                Arc::new(FailingProvider),
                Arc::new(StaticProvider {
                    name: "one",
                    paths: vec!["/a"],
                }),
            ],
            2,
            Blacklist::default(),
        );

        let (report, out) = harvester
            .run(
                vec!["a.test".to_string(), "b.test".to_string()],
                &CancellationToken::new(),
                UrlWriter::new(Vec::new(), OutputFormat::Text),
            )
            .await
            .unwrap();

        assert_eq!(report.domains, 2);
        assert_eq!(report.urls_written, 2);
        assert_eq!(report.failures.len(), 2);
        assert!(report.failures.iter().all(|f| f.provider == "failing"));
        assert!(report.failures[0].error.contains("failed to fetch pagination"));
        assert_eq!(lines(out).len(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_run_writes_nothing() {
        let harvester = Harvester::new(
            vec![Arc::new(StaticProvider {
                name: "one",
                paths: vec!["/a"],
            })],
            1,
            Blacklist::default(),
        );
        let cancel = CancellationToken::new();
        cancel.cancel();

        let (report, out) = harvester
            .run(
                vec!["example.com".to_string()],
                &cancel,
                UrlWriter::new(Vec::new(), OutputFormat::Json),
            )
            .await
            .unwrap();

        assert_eq!(report.urls_written, 0);
        assert!(report.cancelled);
        assert!(out.is_empty());
    }

    /// A pipe whose reader has exited.
    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// A disk that is full.
    #[derive(Debug)]
    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("no space left on device"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_closed_output_ends_run_cleanly() {
        let harvester = Harvester::new(
            vec![Arc::new(StaticProvider {
                name: "one",
                paths: vec!["/a", "/b", "/c"],
            })],
            1,
            Blacklist::default(),
        );

        let (report, _) = harvester
            .run(
                vec!["example.com".to_string()],
                &CancellationToken::new(),
                UrlWriter::new(ClosedPipe, OutputFormat::Text),
            )
            .await
            .unwrap();

        assert!(report.output_closed);
        assert!(!report.cancelled);
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn test_other_write_errors_are_returned() {
        let harvester = Harvester::new(
            vec![Arc::new(StaticProvider {
                name: "one",
                paths: vec!["/a"],
            })],
            1,
            Blacklist::default(),
        );

        let err = harvester
            .run(
                vec!["example.com".to_string()],
                &CancellationToken::new(),
                UrlWriter::new(FullDisk, OutputFormat::Text),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::Other);
    }

    #[tokio::test]
    async fn test_json_output() {
        let harvester = Harvester::new(
            vec![Arc::new(StaticProvider {
                name: "one",
                paths: vec!["/x"],
            })],
            1,
            Blacklist::default(),
        );

        let (_, out) = harvester
            .run(
                vec!["example.com".to_string()],
                &CancellationToken::new(),
                UrlWriter::new(Vec::new(), OutputFormat::Json),
            )
            .await
            .unwrap();

        assert_eq!(lines(out), vec![r#"{"url":"https://example.com/x"}"#]);
    }
}
