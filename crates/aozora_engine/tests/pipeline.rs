mod common;

use std::sync::Arc;

use aozora_engine::{
    CancellationToken, Collector, CollectorConfig, CollectorError, DetailUrlTemplate, Entry,
    EntryOutcome, ExtractError, FailureKind, SkipReason,
};
use common::{detail_html, index_html, shift_jis, zip_with, MapFetcher, HTML_UTF8};
use futures_util::StreamExt;
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INDEX_URL: &str = "http://aozora.test/index_pages/person123.html";
const TEMPLATE: &str = "http://aozora.test/cards/{author_id}/card{title_id}.html";

fn stub_config() -> CollectorConfig {
    CollectorConfig {
        detail_url_template: DetailUrlTemplate::new(TEMPLATE).unwrap(),
        ..CollectorConfig::default()
    }
}

fn stub_collector(fetcher: MapFetcher) -> (Collector, Arc<MapFetcher>) {
    let fetcher = Arc::new(fetcher);
    let collector = Collector::with_fetchers(stub_config(), fetcher.clone(), fetcher.clone());
    (collector, fetcher)
}

#[tokio::test]
async fn single_entry_yields_entry_and_decoded_text() {
    aozora_logging::initialize_for_tests();
    let fetcher = MapFetcher::new()
        .with(
            INDEX_URL,
            index_html(&[("../cards/000123/card456.html", "Sample Title")]),
            HTML_UTF8,
        )
        .with(
            "http://aozora.test/cards/000123/card456.html",
            detail_html(Some("Jane Doe"), Some("http://example.org/456.zip")),
            HTML_UTF8,
        )
        .with(
            "http://example.org/456.zip",
            zip_with(&[("456.txt", &shift_jis("こんにちは"))]),
            "application/zip",
        );
    let (collector, _) = stub_collector(fetcher);

    let results: Vec<_> = collector
        .run(INDEX_URL, CancellationToken::new())
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(
        results,
        vec![(
            Entry {
                author_id: "000123".to_string(),
                author_name: "Jane Doe".to_string(),
                title_id: "456".to_string(),
                title: "Sample Title".to_string(),
                source_page_url: INDEX_URL.to_string(),
                archive_url: "http://example.org/456.zip".to_string(),
            },
            Ok("こんにちは".to_string()),
        )]
    );
}

#[tokio::test]
async fn candidate_without_download_table_emits_nothing() {
    let fetcher = MapFetcher::new()
        .with(
            INDEX_URL,
            index_html(&[("../cards/000123/card456.html", "Sample Title")]),
            HTML_UTF8,
        )
        .with(
            "http://aozora.test/cards/000123/card456.html",
            detail_html(Some("Jane Doe"), None),
            HTML_UTF8,
        );
    let (collector, fetcher) = stub_collector(fetcher);

    let results: Vec<_> = collector
        .run(INDEX_URL, CancellationToken::new())
        .await
        .unwrap()
        .collect()
        .await;
    assert!(results.is_empty());
    // Nothing was downloaded for the dropped candidate.
    assert_eq!(fetcher.requests().len(), 2);
}

#[tokio::test]
async fn outcomes_report_why_candidates_were_skipped() {
    let fetcher = MapFetcher::new()
        .with(
            INDEX_URL,
            index_html(&[
                ("../cards/000123/card1.html", "No Archive"),
                ("../cards/000123/card2.html", "Missing Detail Page"),
            ]),
            HTML_UTF8,
        )
        .with(
            "http://aozora.test/cards/000123/card1.html",
            detail_html(Some("Jane Doe"), None),
            HTML_UTF8,
        );
    let (collector, _) = stub_collector(fetcher);

    let outcomes: Vec<_> = collector
        .outcomes(INDEX_URL, CancellationToken::new())
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(outcomes.len(), 2);
    match &outcomes[0] {
        EntryOutcome::Skipped { candidate, reason } => {
            assert_eq!(candidate.title, "No Archive");
            assert_eq!(reason, &SkipReason::NoArchiveLink);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    match &outcomes[1] {
        EntryOutcome::Skipped {
            candidate,
            reason: SkipReason::DetailUnavailable(err),
        } => {
            assert_eq!(candidate.title_id, "2");
            assert_eq!(err.kind, FailureKind::HttpStatus(404));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_index_fails_the_run() {
    let (collector, _) = stub_collector(MapFetcher::new());
    let err = collector
        .run(INDEX_URL, CancellationToken::new())
        .await
        .err()
        .expect("run must fail");
    match err {
        CollectorError::FetchFailed(fetch) => {
            assert_eq!(fetch.url, INDEX_URL);
            assert_eq!(fetch.kind, FailureKind::HttpStatus(404));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn invalid_index_url_fails_the_run() {
    let (collector, fetcher) = stub_collector(MapFetcher::new());
    let err = collector
        .run("person123.html", CancellationToken::new())
        .await
        .err()
        .expect("run must fail");
    assert!(matches!(err, CollectorError::InvalidUrl { .. }), "{err:?}");
    assert!(fetcher.requests().is_empty());
}

#[tokio::test]
async fn cancelled_token_stops_before_any_entry() {
    let fetcher = MapFetcher::new().with(
        INDEX_URL,
        index_html(&[("../cards/000123/card456.html", "Sample Title")]),
        HTML_UTF8,
    );
    let (collector, fetcher) = stub_collector(fetcher);
    let cancel = CancellationToken::new();
    let candidates = collector.discover(INDEX_URL, &cancel).await.unwrap();
    assert_eq!(candidates.len(), 1);

    cancel.cancel();
    let outcomes: Vec<_> = collector.process_all(candidates, cancel).collect().await;
    assert!(outcomes.is_empty());
    assert_eq!(fetcher.requests(), vec![INDEX_URL.to_string()]);
}

#[tokio::test]
async fn download_404_is_reported_and_next_entry_still_runs() {
    aozora_logging::initialize_for_tests();
    let server = MockServer::start().await;
    let base = server.uri();

    let index = index_html(&[
        ("../cards/000123/card456.html", "Broken Archive"),
        ("../cards/000123/card789.html", "Good Archive"),
    ]);
    Mock::given(method("GET"))
        .and(path("/index_pages/person123.html"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(index, HTML_UTF8))
        .mount(&server)
        .await;
    for id in ["456", "789"] {
        Mock::given(method("GET"))
            .and(path(format!("/cards/000123/card{id}.html")))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                detail_html(Some("Jane Doe"), Some(&format!("./files/{id}_ruby.zip"))),
                HTML_UTF8,
            ))
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/cards/000123/files/456_ruby.zip"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cards/000123/files/789_ruby.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            zip_with(&[("789.txt", &shift_jis("吾輩は猫である。名前はまだ無い。"))]),
            "application/zip",
        ))
        .mount(&server)
        .await;

    let config = CollectorConfig {
        detail_url_template: DetailUrlTemplate::new(format!(
            "{base}/cards/{{author_id}}/card{{title_id}}.html"
        ))
        .unwrap(),
        concurrency: 2,
        ..CollectorConfig::default()
    };
    let collector = Collector::new(config);
    let index_url = format!("{base}/index_pages/person123.html");

    let results: Vec<_> = collector
        .run(&index_url, CancellationToken::new())
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(results.len(), 2);
    let (broken, broken_result) = &results[0];
    assert_eq!(broken.title, "Broken Archive");
    assert_eq!(
        broken.archive_url,
        format!("{base}/cards/000123/files/456_ruby.zip")
    );
    match broken_result {
        Err(ExtractError::DownloadFailed(err)) => {
            assert_eq!(err.kind, FailureKind::HttpStatus(404))
        }
        other => panic!("unexpected result {other:?}"),
    }

    let (good, good_result) = &results[1];
    assert_eq!(good.title, "Good Archive");
    assert_eq!(good.author_name, "Jane Doe");
    assert_eq!(
        good_result.as_deref(),
        Ok("吾輩は猫である。名前はまだ無い。")
    );
}
