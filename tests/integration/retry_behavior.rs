//! Retry budget and terminal result behavior against a mock server.

use super::util::{fast_config, fetcher};
use word_counter::fetcher::FetcherConfig;
use word_counter::shutdown::ShutdownCoordinator;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn persistent_server_error_gets_exactly_max_retries_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = FetcherConfig {
        max_retries: 3,
        ..fast_config()
    };
    let fetcher = fetcher(config);
    let shutdown = ShutdownCoordinator::shared();

    let mut results = fetcher.fetch_all(shutdown, vec![format!("{}/broken", server.uri())]);
    let result = results.recv().await.expect("one terminal result");
    assert!(results.recv().await.is_none(), "exactly one result per URL");

    assert!(result.error.is_some());
    assert_eq!(result.retry_count, 2, "retry_count is the final attempt index");
    assert!(result.content.is_empty());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3, "one request per attempt");

    let metrics = fetcher.metrics();
    assert_eq!(metrics.errors, 1);
    assert_eq!(metrics.processed, 0);
}

#[tokio::test]
async fn transient_error_recovers_within_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello world"))
        .mount(&server)
        .await;

    let fetcher = fetcher(fast_config());
    let shutdown = ShutdownCoordinator::shared();

    let mut results = fetcher.fetch_all(shutdown, vec![format!("{}/flaky", server.uri())]);
    let result = results.recv().await.expect("one terminal result");

    assert!(result.error.is_none());
    assert_eq!(result.content, "hello world");
    assert_eq!(result.retry_count, 2, "succeeded on the third attempt");
    assert_eq!(fetcher.metrics().processed, 1);
    assert_eq!(fetcher.metrics().errors, 0);
}

#[tokio::test]
async fn not_found_is_an_empty_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = fetcher(fast_config());
    let shutdown = ShutdownCoordinator::shared();

    let mut results = fetcher.fetch_all(shutdown, vec![format!("{}/missing", server.uri())]);
    let result = results.recv().await.expect("one terminal result");

    assert!(result.error.is_none());
    assert!(result.content.is_empty());
    assert_eq!(result.retry_count, 0);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "404 is terminal, no retries");

    let metrics = fetcher.metrics();
    assert_eq!(metrics.processed, 1);
    assert_eq!(metrics.errors, 0);
}

#[tokio::test]
async fn failed_urls_do_not_stop_the_batch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/good"))
        .respond_with(ResponseTemplate::new(200).set_body_string("fine"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bad"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let fetcher = fetcher(fast_config());
    let shutdown = ShutdownCoordinator::shared();

    let urls = vec![
        format!("{}/bad", server.uri()),
        format!("{}/good", server.uri()),
    ];
    let mut results = fetcher.fetch_all(shutdown, urls);

    let mut seen = Vec::new();
    while let Some(result) = results.recv().await {
        seen.push(result);
    }
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().any(|r| r.error.is_none() && r.content == "fine"));
    assert!(seen.iter().any(|r| r.error.is_some()));
}
