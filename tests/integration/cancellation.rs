//! Shutdown must unwind a run promptly, even with slow responses in flight.

use super::util::{fast_config, fetcher};
use std::time::Duration;
use word_counter::fetcher::FetcherConfig;
use word_counter::shutdown::ShutdownCoordinator;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn shutdown_closes_the_result_stream_quickly() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let config = FetcherConfig {
        worker_count: 2,
        ..fast_config()
    };
    let fetcher = fetcher(config);
    let shutdown = ShutdownCoordinator::shared();

    let urls: Vec<String> = (0..8).map(|i| format!("{}/slow?u={i}", server.uri())).collect();
    let mut results = fetcher.fetch_all(shutdown.clone(), urls);

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown.request_shutdown();

    // No new attempts may be admitted after shutdown; the channel must close
    // once the two in-flight requests resolve, well before the remaining six
    // URLs would have finished.
    let drained = tokio::time::timeout(Duration::from_secs(5), async {
        while results.recv().await.is_some() {}
    })
    .await;
    assert!(drained.is_ok(), "result stream never closed after shutdown");

    let requests = server.received_requests().await.unwrap();
    assert!(
        requests.len() <= 2,
        "shutdown should stop admission, saw {} requests",
        requests.len()
    );
}

#[tokio::test]
async fn shutdown_before_admission_issues_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("unused"))
        .mount(&server)
        .await;

    let fetcher = fetcher(fast_config());
    let shutdown = ShutdownCoordinator::shared();
    shutdown.request_shutdown();

    let mut results = fetcher.fetch_all(shutdown, vec![format!("{}/page", server.uri())]);
    assert!(results.recv().await.is_none(), "no results after pre-run shutdown");

    let requests = server.received_requests().await.unwrap();
    assert!(requests.is_empty(), "no requests should be admitted");
}

#[tokio::test]
async fn shutdown_interrupts_a_pending_retry_sleep() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    // A long retry delay keeps the task parked between attempts.
    let config = FetcherConfig {
        retry_delay: Duration::from_secs(60),
        ..fast_config()
    };
    let fetcher = fetcher(config);
    let shutdown = ShutdownCoordinator::shared();

    let mut results = fetcher.fetch_all(shutdown.clone(), vec![format!("{}/broken", server.uri())]);
    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown.request_shutdown();

    let drained = tokio::time::timeout(Duration::from_secs(2), async {
        while results.recv().await.is_some() {}
    })
    .await;
    assert!(drained.is_ok(), "retry sleep was not interrupted by shutdown");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "only the first attempt should have run");
}
