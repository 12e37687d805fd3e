//! End-to-end wayback runs against a local CDX server.

use std::sync::Arc;
use std::time::Duration;

use harvest_core::{Filters, NoFilter};
use harvest_fetch::{FetchContext, HttpClient, Provider, ProviderError, RetryStrategy};
use harvest_providers::WaybackProvider;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn context(max_pages: u32) -> Arc<FetchContext> {
    let client = HttpClient::new()
        .unwrap()
        .with_retry_strategy(RetryStrategy::no_delay());

    let ctx = FetchContext::builder()
        .transport(Arc::new(client))
        .max_pages(max_pages)
        .max_retries(2)
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    Arc::new(ctx)
}

async fn collect(provider: &WaybackProvider, domain: &str) -> (Result<u32, ProviderError>, Vec<String>) {
    let (tx, mut rx) = mpsc::channel(64);
    let result = provider
        .fetch(&CancellationToken::new(), domain, &tx)
        .await
        .map(|s| s.pages_visited);
    drop(tx);

    let mut urls = Vec::new();
    while let Some(url) = rx.recv().await {
        urls.push(url);
    }
    (result, urls)
}

async fn mount_page(server: &MockServer, page: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path("/cdx/search/cdx"))
        .and(query_param("page", page))
        .and(query_param_is_missing("showNumPages"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetches_every_page_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cdx/search/cdx"))
        .and(query_param("url", "example.com/*"))
        .and(query_param("output", "json"))
        .and(query_param("collapse", "urlkey"))
        .and(query_param("fl", "original"))
        .and(query_param("showNumPages", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_string("2\n"))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(
        &server,
        "0",
        r#"[["original"],["https://example.com/a"],["https://example.com/b"]]"#,
    )
    .await;
    mount_page(&server, "1", r#"[["original"],["https://example.com/c"]]"#).await;

    let provider = WaybackProvider::new(context(0), Arc::new(NoFilter)).with_base_url(server.uri());
    let (result, urls) = collect(&provider, "example.com").await;

    assert_eq!(result.unwrap(), 2);
    assert_eq!(
        urls,
        vec![
            "https://example.com/a",
            "https://example.com/b",
            "https://example.com/c"
        ]
    );
}

#[tokio::test]
async fn test_retries_busy_archive() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("showNumPages", "true"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("showNumPages", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_string("1"))
        .mount(&server)
        .await;
    mount_page(&server, "0", r#"[["original"],["https://example.com/"]]"#).await;

    let provider = WaybackProvider::new(context(0), Arc::new(NoFilter)).with_base_url(server.uri());
    let (result, urls) = collect(&provider, "example.com").await;

    assert!(result.is_ok());
    assert_eq!(urls, vec!["https://example.com/"]);
}

#[tokio::test]
async fn test_filters_and_subdomains_in_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("url", "*.example.com/*"))
        .and(query_param("filter", "statuscode:200"))
        .and(query_param("from", "2020"))
        .and(query_param("showNumPages", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_string("1"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("url", "*.example.com/*"))
        .and(query_param("filter", "statuscode:200"))
        .and(query_param_is_missing("showNumPages"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = FetchContext::builder()
        .transport(Arc::new(HttpClient::new().unwrap()))
        .include_subdomains(true)
        .max_retries(0)
        .build()
        .unwrap();
    let filters = Filters::new().match_status("200").with_from("2020");
    let provider =
        WaybackProvider::new(Arc::new(ctx), Arc::new(filters)).with_base_url(server.uri());

    let (tx, _rx) = mpsc::channel(8);
    let summary = provider
        .fetch(&CancellationToken::new(), "example.com", &tx)
        .await
        .unwrap();

    assert_eq!(summary.empty_pages, vec![0]);
    assert_eq!(summary.urls_sent, 0);
}

#[tokio::test]
async fn test_missing_page_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("showNumPages", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_string("3"))
        .mount(&server)
        .await;
    mount_page(&server, "0", r#"[["original"],["https://example.com/x"]]"#).await;
    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .and(query_param_is_missing("showNumPages"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;

    let provider = WaybackProvider::new(context(0), Arc::new(NoFilter)).with_base_url(server.uri());
    let (result, urls) = collect(&provider, "example.com").await;

    assert!(matches!(result, Err(ProviderError::PageRequest { page: 1, .. })));
    assert_eq!(urls, vec!["https://example.com/x"]);
}
