//! Fetch command - harvest archived URLs for domains.

use std::fs::File;
use std::io::{self, BufRead, IsTerminal};
use std::path::PathBuf;
use std::pin::pin;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use futures::stream::{self, Stream, StreamExt};
use harvest_core::QueryFilter;
use harvest_fetch::FetchContext;
use harvest_providers::ProviderRegistry;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{Cli, ExitCode};
use crate::blacklist::Blacklist;
use crate::config::HarvestConfig;
use crate::harvest::{HarvestReport, Harvester};
use crate::output::{TextFormatter, UrlWriter};

/// Arguments for the fetch command.
#[derive(Args, Debug, Default)]
pub struct FetchArgs {
    /// Domains to harvest. Read from stdin, one per line, when omitted.
    pub domains: Vec<String>,

    /// Providers to use, comma-separated (default: all).
    #[arg(long, value_delimiter = ',')]
    pub providers: Vec<String>,

    /// Include subdomains of each target domain.
    #[arg(long)]
    pub subs: bool,

    /// Result pages to fetch per provider (0 = all).
    #[arg(long, value_name = "N")]
    pub pages: Option<u32>,

    /// Retries per request.
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,

    /// Per-request timeout.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Domains processed concurrently.
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// Earliest capture, as a timestamp prefix (e.g. 2016).
    #[arg(long)]
    pub from: Option<String>,

    /// Latest capture, as a timestamp prefix.
    #[arg(long)]
    pub to: Option<String>,

    /// Status codes to match, comma-separated.
    #[arg(long, value_delimiter = ',')]
    pub mc: Vec<String>,

    /// Status codes to filter out, comma-separated.
    #[arg(long, value_delimiter = ',')]
    pub fc: Vec<String>,

    /// MIME types to match, comma-separated.
    #[arg(long, value_delimiter = ',')]
    pub mt: Vec<String>,

    /// MIME types to filter out, comma-separated.
    #[arg(long, value_delimiter = ',')]
    pub ft: Vec<String>,

    /// File extensions to drop, comma-separated (e.g. png,jpg).
    #[arg(long, value_delimiter = ',')]
    pub blacklist: Vec<String>,

    /// Write URLs to a file instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

impl FetchArgs {
    /// Overrides file configuration with the flags that were given.
    pub fn apply(&self, config: &mut HarvestConfig) {
        if !self.providers.is_empty() {
            config.providers.clone_from(&self.providers);
        }
        if self.subs {
            config.include_subdomains = true;
        }
        if let Some(pages) = self.pages {
            config.pages = pages;
        }
        if let Some(retries) = self.retries {
            config.retries = retries;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if !self.blacklist.is_empty() {
            config.blacklist.clone_from(&self.blacklist);
        }

        let filters = &mut config.filters;
        if self.from.is_some() {
            filters.from.clone_from(&self.from);
        }
        if self.to.is_some() {
            filters.to.clone_from(&self.to);
        }
        if !self.mc.is_empty() {
            filters.match_status_codes.clone_from(&self.mc);
        }
        if !self.fc.is_empty() {
            filters.filter_status_codes.clone_from(&self.fc);
        }
        if !self.mt.is_empty() {
            filters.match_mime_types.clone_from(&self.mt);
        }
        if !self.ft.is_empty() {
            filters.filter_mime_types.clone_from(&self.ft);
        }
    }
}

/// Runs the fetch command.
pub async fn run(args: &FetchArgs, cli: &Cli) -> Result<HarvestReport> {
    let mut config = HarvestConfig::resolve(cli.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    let descriptors = ProviderRegistry::select(&config.providers)?;
    let domains = collect_domains(&args.domains)?;
    if domains.is_empty() {
        warn!("No domains to harvest");
    }
    debug!(
        domains = domains.len(),
        providers = descriptors.len(),
        threads = config.threads,
        "Starting harvest"
    );

    let cancel = CancellationToken::new();
    let ctx = Arc::new(
        FetchContext::builder()
            .settings(config.fetch_settings())
            .cancellation(cancel.clone())
            .build()?,
    );
    let filter: Arc<dyn QueryFilter> = Arc::new(config.filters.clone());
    let providers = descriptors
        .iter()
        .map(|desc| desc.build_provider(Arc::clone(&ctx), Arc::clone(&filter)))
        .collect();
    let harvester = Harvester::new(providers, config.threads, Blacklist::new(&config.blacklist));

    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if watch_interrupts(interrupt, ctrl_c_stream()).await {
            std::process::exit(ExitCode::Interrupted as i32);
        }
    });

    let format = cli.output_format();
    let report = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            harvester
                .run(domains, &cancel, UrlWriter::new(file, format))
                .await?
                .0
        }
        None => {
            harvester
                .run(domains, &cancel, UrlWriter::new(io::stdout(), format))
                .await?
                .0
        }
    };

    if !cli.quiet {
        eprintln!("{}", TextFormatter::new(!cli.no_color).format_report(&report));
    }

    Ok(report)
}

/// Cancels the run on the first interrupt.
///
/// Returns true if a second interrupt arrives, false if the signal stream
/// ends first.
async fn watch_interrupts<S>(cancel: CancellationToken, signals: S) -> bool
where
    S: Stream<Item = ()>,
{
    let mut signals = pin!(signals);

    if signals.next().await.is_none() {
        return false;
    }
    warn!("Interrupted, finishing in-flight requests (press Ctrl-C again to quit)");
    cancel.cancel();

    signals.next().await.is_some()
}

/// Every Ctrl-C delivered to the process.
fn ctrl_c_stream() -> impl Stream<Item = ()> {
    stream::unfold((), |()| async {
        tokio::signal::ctrl_c().await.ok().map(|()| ((), ()))
    })
}

/// Uses the domains given as arguments, or reads them from stdin.
fn collect_domains(args: &[String]) -> Result<Vec<String>> {
    if !args.is_empty() {
        return Ok(normalize_all(args.iter().map(String::as_str)));
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        anyhow::bail!("No domains given (pass them as arguments or pipe them on stdin)");
    }
    read_domains(stdin.lock()).context("Failed to read domains from stdin")
}

/// Reads one domain per line.
pub fn read_domains<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    let lines = reader.lines().collect::<io::Result<Vec<_>>>()?;
    Ok(normalize_all(lines.iter().map(String::as_str)))
}

/// Normalizes each entry and drops blanks and repeats, keeping first-seen order.
fn normalize_all<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut domains: Vec<String> = Vec::new();
    for domain in raw.filter_map(normalize_domain) {
        if !domains.contains(&domain) {
            domains.push(domain);
        }
    }
    domains
}

/// Strips whitespace, an `http(s)://` prefix and trailing slashes.
///
/// Returns `None` for blank lines and `#` comments.
pub fn normalize_domain(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    let host = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed)
        .trim_end_matches('/');

    (!host.is_empty()).then(|| host.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain("example.com").as_deref(), Some("example.com"));
        assert_eq!(normalize_domain("  example.com \n").as_deref(), Some("example.com"));
        assert_eq!(
            normalize_domain("https://example.com/").as_deref(),
            Some("example.com")
        );
        assert_eq!(
            normalize_domain("http://example.com/app//").as_deref(),
            Some("example.com/app")
        );
        assert_eq!(normalize_domain(""), None);
        assert_eq!(normalize_domain("   "), None);
        assert_eq!(normalize_domain("# comment"), None);
        assert_eq!(normalize_domain("https://"), None);
    }

    #[test]
    fn test_read_domains() {
        let input = "example.com\n\nhttps://example.org/\nexample.com\n# skip\n";
        let domains = read_domains(input.as_bytes()).unwrap();
        assert_eq!(domains, vec!["example.com", "example.org"]);
    }

    #[test]
    fn test_apply_overrides_only_given_flags() {
        let mut config = HarvestConfig {
            threads: 3,
            blacklist: vec!["gif".to_string()],
            ..HarvestConfig::default()
        };
        let args = FetchArgs {
            subs: true,
            pages: Some(2),
            mc: vec!["200".to_string()],
            from: Some("2019".to_string()),
            ..FetchArgs::default()
        };

        args.apply(&mut config);

        assert_eq!(config.threads, 3);
        assert_eq!(config.blacklist, vec!["gif".to_string()]);
        assert!(config.include_subdomains);
        assert_eq!(config.pages, 2);
        assert_eq!(config.filters.match_status_codes, vec!["200".to_string()]);
        assert_eq!(config.filters.from.as_deref(), Some("2019"));
        assert_eq!(config.retries, 5);
    }

    #[tokio::test]
    async fn test_first_interrupt_cancels_second_forces_exit() {
        let cancel = CancellationToken::new();
        let (signals, rx) = futures::channel::mpsc::unbounded::<()>();
        let watcher = tokio::spawn(watch_interrupts(cancel.clone(), rx));

        signals.unbounded_send(()).unwrap();
        tokio::time::timeout(std::time::Duration::from_secs(1), cancel.cancelled())
            .await
            .unwrap();
        assert!(!watcher.is_finished());

        signals.unbounded_send(()).unwrap();
        assert!(watcher.await.unwrap());
    }

    #[tokio::test]
    async fn test_interrupt_watcher_without_signals() {
        let cancel = CancellationToken::new();
        let (signals, rx) = futures::channel::mpsc::unbounded::<()>();
        drop(signals);

        assert!(!watch_interrupts(cancel.clone(), rx).await);
        assert!(!cancel.is_cancelled());
    }

    #[test]
    fn test_apply_replaces_lists() {
        let mut config = HarvestConfig {
            providers: vec!["wayback".to_string()],
            ..HarvestConfig::default()
        };
        let args = FetchArgs {
            providers: vec!["wb".to_string()],
            blacklist: vec!["png".to_string(), "jpg".to_string()],
            ..FetchArgs::default()
        };

        args.apply(&mut config);

        assert_eq!(config.providers, vec!["wb".to_string()]);
        assert_eq!(config.blacklist.len(), 2);
    }
}
