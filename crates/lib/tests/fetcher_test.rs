//! # Paginated Fetcher Tests
//!
//! These tests run the fetch loop against a `wiremock` server standing in for the
//! Marvel API and check where pagination stops.

use anyhow::Result;
use marvel_etl::{
    constants::PAGE_SIZE, signer::fingerprint, Credentials, FetchError, MarvelClient, StopReason,
};
use marvel_etl_test_utils::{
    characters, characters_url, mount_failure, mount_page, page_body, CHARACTERS_PATH,
};
use serde_json::json;
use std::sync::atomic::{AtomicI64, Ordering};
use wiremock::matchers::{any, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> MarvelClient {
    MarvelClient::new(characters_url(server), Credentials::new("pub", "priv"))
        .expect("client should build")
}

#[tokio::test]
async fn test_short_page_ends_pagination() -> Result<()> {
    let server = MockServer::start().await;
    mount_page(&server, 0, 100).await;
    mount_page(&server, 100, 40).await;

    let report = client(&server).fetch_all(350).await?;

    assert_eq!(report.records.len(), 140);
    assert_eq!(report.pages_requested, 2);
    assert_eq!(report.stop_reason, StopReason::Exhausted);
    assert_eq!(report.records[100]["id"], json!(100));
    Ok(())
}

#[tokio::test]
async fn test_cap_smaller_than_a_page_truncates_first_page() -> Result<()> {
    let server = MockServer::start().await;
    mount_page(&server, 0, 100).await;

    let report = client(&server).fetch_all(30).await?;

    assert_eq!(report.records.len(), 30);
    assert_eq!(report.pages_requested, 1);
    assert_eq!(report.stop_reason, StopReason::CapReached);
    assert_eq!(report.records[29]["id"], json!(29));
    Ok(())
}

#[tokio::test]
async fn test_cap_takes_priority_over_short_page() -> Result<()> {
    let server = MockServer::start().await;
    mount_page(&server, 0, 40).await;

    let report = client(&server).fetch_all(30).await?;

    assert_eq!(report.records.len(), 30);
    assert_eq!(report.stop_reason, StopReason::CapReached);
    Ok(())
}

#[tokio::test]
async fn test_full_pages_stop_at_cap() -> Result<()> {
    let server = MockServer::start().await;
    for offset in [0, 100, 200, 300] {
        mount_page(&server, offset, PAGE_SIZE).await;
    }

    let report = client(&server).fetch_all(350).await?;

    assert_eq!(report.records.len(), 350);
    assert_eq!(report.pages_requested, 4);
    assert_eq!(report.stop_reason, StopReason::CapReached);
    assert_eq!(report.records[349]["id"], json!(349));
    Ok(())
}

#[tokio::test]
async fn test_cap_on_page_boundary_stops_without_extra_request() -> Result<()> {
    let server = MockServer::start().await;
    for offset in [0, 100, 200] {
        mount_page(&server, offset, PAGE_SIZE).await;
    }

    let report = client(&server).fetch_all(300).await?;

    assert_eq!(report.records.len(), 300);
    assert_eq!(report.pages_requested, 3);
    assert_eq!(report.stop_reason, StopReason::CapReached);
    Ok(())
}

#[tokio::test]
async fn test_zero_cap_issues_no_request() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let report = client(&server).fetch_all(0).await?;

    assert!(report.records.is_empty());
    assert_eq!(report.pages_requested, 0);
    Ok(())
}

#[tokio::test]
async fn test_empty_first_page_yields_no_records() -> Result<()> {
    let server = MockServer::start().await;
    mount_page(&server, 0, 0).await;

    let report = client(&server).fetch_all(350).await?;

    assert!(report.records.is_empty());
    assert_eq!(report.stop_reason, StopReason::Exhausted);
    Ok(())
}

#[tokio::test]
async fn test_error_status_keeps_partial_results() -> Result<()> {
    let server = MockServer::start().await;
    mount_page(&server, 0, 100).await;
    mount_failure(&server, 100, 500).await;

    let report = client(&server).fetch_all(350).await?;

    assert_eq!(report.records.len(), 100);
    assert_eq!(report.pages_requested, 2);
    assert!(matches!(report.stop_reason, StopReason::RequestFailed(_)));
    Ok(())
}

#[tokio::test]
async fn test_connection_failure_yields_empty_result() -> Result<()> {
    // Nothing listens on port 1.
    let client = MarvelClient::new(
        "http://127.0.0.1:1/v1/public/characters",
        Credentials::new("pub", "priv"),
    )?;

    let report = client.fetch_all(350).await?;

    assert!(report.records.is_empty());
    assert!(matches!(report.stop_reason, StopReason::RequestFailed(_)));
    Ok(())
}

#[tokio::test]
async fn test_undecodable_body_is_treated_as_request_failure() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CHARACTERS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let report = client(&server).fetch_all(350).await?;

    assert!(report.records.is_empty());
    assert!(matches!(report.stop_reason, StopReason::RequestFailed(_)));
    Ok(())
}

#[tokio::test]
async fn test_missing_results_path_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CHARACTERS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 200, "data": {}})))
        .mount(&server)
        .await;

    let result = client(&server).fetch_all(350).await;

    assert!(matches!(
        result,
        Err(FetchError::MalformedPayload { offset: 0 })
    ));
}

#[tokio::test]
async fn test_page_request_is_signed() -> Result<()> {
    let server = MockServer::start().await;
    let expected_hash = fingerprint(1_700_000_000, "priv", "pub");
    Mock::given(method("GET"))
        .and(path(CHARACTERS_PATH))
        .and(header("accept", "*/*"))
        .and(query_param("ts", "1700000000"))
        .and(query_param("apikey", "pub"))
        .and(query_param("hash", expected_hash.as_str()))
        .and(query_param("limit", "100"))
        .and(query_param("offset", "200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(characters(200, 3))))
        .expect(1)
        .mount(&server)
        .await;

    let results = client(&server)
        .with_clock(|| 1_700_000_000)
        .fetch_page(PAGE_SIZE, 200)
        .await?;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["name"], json!("Character 200"));
    Ok(())
}

static TICK: AtomicI64 = AtomicI64::new(1_700_000_000);

fn ticking_clock() -> i64 {
    TICK.fetch_add(1, Ordering::SeqCst)
}

#[tokio::test]
async fn test_each_page_gets_a_fresh_signature() -> Result<()> {
    let server = MockServer::start().await;
    for (offset, ts, count) in [(0, 1_700_000_000_i64, 100), (100, 1_700_000_001, 10)] {
        let hash = fingerprint(ts, "priv", "pub");
        Mock::given(method("GET"))
            .and(path(CHARACTERS_PATH))
            .and(query_param("offset", offset.to_string()))
            .and(query_param("ts", ts.to_string()))
            .and(query_param("hash", hash.as_str()))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(page_body(characters(offset, count))),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let report = client(&server)
        .with_clock(ticking_clock)
        .fetch_all(350)
        .await?;

    assert_eq!(report.records.len(), 110);
    assert_eq!(report.stop_reason, StopReason::Exhausted);
    assert_ne!(
        fingerprint(1_700_000_000, "priv", "pub"),
        fingerprint(1_700_000_001, "priv", "pub")
    );
    Ok(())
}
