//! End-to-end pipeline runs against a mock server.

use super::util::fast_config;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use word_counter::extract::PlainTextExtractor;
use word_counter::pipeline::Pipeline;
use word_counter::processor::WordBank;
use word_counter::shutdown::ShutdownCoordinator;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn bank(words: &[&str]) -> Arc<WordBank> {
    Arc::new(WordBank::build(words.iter().copied()))
}

#[tokio::test]
async fn aggregates_counts_across_documents() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/one"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("Apple banana apple! Cherry, apple."),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/two"))
        .respond_with(ResponseTemplate::new(200).set_body_string("banana CHERRY banana grape"))
        .mount(&server)
        .await;

    let pipeline = Pipeline::new(
        fast_config(),
        bank(&["apple", "banana", "cherry"]),
        Arc::new(PlainTextExtractor),
    );
    let shutdown = ShutdownCoordinator::shared();
    let urls = vec![
        format!("{}/one", server.uri()),
        format!("{}/two", server.uri()),
    ];

    let seen = Arc::new(AtomicUsize::new(0));
    let report = {
        let seen = Arc::clone(&seen);
        pipeline
            .execute(urls, shutdown, 10, move |_result| {
                seen.fetch_add(1, Ordering::Relaxed);
            })
            .await
            .expect("pipeline run")
    };

    assert_eq!(seen.load(Ordering::Relaxed), 2, "one callback per URL");
    assert_eq!(report.processed, 2);
    assert_eq!(report.errors, 0);

    // apple 3, banana 3, cherry 2; grape is not in the bank. Ties break
    // alphabetically.
    let ranking: Vec<(&str, u64)> = report
        .top_words
        .iter()
        .map(|wc| (wc.word.as_str(), wc.count))
        .collect();
    assert_eq!(ranking, vec![("apple", 3), ("banana", 3), ("cherry", 2)]);
}

#[tokio::test]
async fn failures_and_missing_pages_do_not_poison_the_report() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/good"))
        .respond_with(ResponseTemplate::new(200).set_body_string("apple apple"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let pipeline = Pipeline::new(
        fast_config(),
        bank(&["apple"]),
        Arc::new(PlainTextExtractor),
    );
    let shutdown = ShutdownCoordinator::shared();
    let urls = vec![
        format!("{}/good", server.uri()),
        format!("{}/missing", server.uri()),
        format!("{}/broken", server.uri()),
    ];

    let report = pipeline
        .execute(urls, shutdown, 10, |_| {})
        .await
        .expect("pipeline run");

    // The 404 counts as processed with no content; only /broken errors.
    assert_eq!(report.processed, 2);
    assert_eq!(report.errors, 1);
    assert_eq!(report.top_words.len(), 1);
    assert_eq!(report.top_words[0].word, "apple");
    assert_eq!(report.top_words[0].count, 2);
}

#[tokio::test]
async fn top_n_truncates_the_ranking() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doc"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("alpha alpha alpha beta beta gamma delta delta delta delta"),
        )
        .mount(&server)
        .await;

    let pipeline = Pipeline::new(
        fast_config(),
        bank(&["alpha", "beta", "gamma", "delta"]),
        Arc::new(PlainTextExtractor),
    );
    let shutdown = ShutdownCoordinator::shared();

    let report = pipeline
        .execute(vec![format!("{}/doc", server.uri())], shutdown, 2, |_| {})
        .await
        .expect("pipeline run");

    let ranking: Vec<(&str, u64)> = report
        .top_words
        .iter()
        .map(|wc| (wc.word.as_str(), wc.count))
        .collect();
    assert_eq!(ranking, vec![("delta", 4), ("alpha", 3)]);
    assert!(report.duration_seconds > 0.0);
}
