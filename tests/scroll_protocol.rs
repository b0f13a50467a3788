//! Wire-level tests for the scroll client against a mock backend. The client
//! is blocking, so each scenario drives it from `spawn_blocking` under the
//! tokio test runtime.

use esdrain::{EsClient, EsScrollSource, RecordSource, TransportError};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn search_body(scroll_id: Option<&str>, hits: Vec<serde_json::Value>) -> serde_json::Value {
    let mut body = json!({ "hits": { "hits": hits } });
    if let Some(id) = scroll_id {
        body["_scroll_id"] = json!(id);
    }
    body
}

fn doc(id: &str, message: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "_source": { "@timestamp": "2024-01-01T10:00:00Z", "message": message }
    })
}

/// Full happy path: count, open scroll, follow `_scroll_id`, stop on the
/// empty page, release the scroll context. The ApiKey credential must ride
/// on every request.
#[tokio::test]
async fn count_scroll_and_clear() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/logs-test/_count"))
        .and(header("authorization", "ApiKey sekrit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 3 })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/logs-test/_search"))
        .and(query_param("scroll", "1m"))
        .and(header("authorization", "ApiKey sekrit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(
            Some("cursor-1"),
            vec![doc("1", "a"), doc("2", "b")],
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/_search/scroll"))
        .and(body_json(json!({ "scroll": "1m", "scroll_id": "cursor-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(
            Some("cursor-2"),
            vec![doc("3", "c")],
        )))
        .expect(1)
        .mount(&server)
        .await;

    // The terminal empty page rotates the scroll id once more; the clear
    // must release the rotated cursor, not a stale one.
    Mock::given(method("POST"))
        .and(path("/_search/scroll"))
        .and(body_json(json!({ "scroll": "1m", "scroll_id": "cursor-2" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(search_body(Some("cursor-3"), vec![])),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/_search/scroll"))
        .and(body_json(json!({ "scroll_id": ["cursor-3"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "succeeded": true })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    tokio::task::spawn_blocking(move || {
        let client = EsClient::new(&uri, Some("sekrit"), Duration::from_secs(5)).unwrap();
        let mut source =
            EsScrollSource::new(client, "logs-test", json!({ "match_all": {} }), 100, "1m");

        assert_eq!(source.estimated_total().unwrap(), 3);

        let first = source.next_page().unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].id, "1");

        let second = source.next_page().unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].id, "3");

        // Empty page ends the scroll; a finished source stays empty without
        // touching the wire again.
        assert!(source.next_page().unwrap().is_empty());
        assert!(source.next_page().unwrap().is_empty());
    })
    .await
    .unwrap();
}

/// A non-success status maps to `TransportError::BadStatus` carrying the
/// status and body.
#[tokio::test]
async fn backend_error_status_is_a_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/logs-test/_count"))
        .respond_with(ResponseTemplate::new(503).set_body_string("shard unavailable"))
        .mount(&server)
        .await;

    let uri = server.uri();
    tokio::task::spawn_blocking(move || {
        let client = EsClient::new(&uri, None, Duration::from_secs(5)).unwrap();
        let mut source =
            EsScrollSource::new(client, "logs-test", json!({ "match_all": {} }), 100, "1m");

        match source.estimated_total() {
            Err(TransportError::BadStatus { status, body }) => {
                assert_eq!(status, 503);
                assert!(body.contains("shard unavailable"));
            }
            other => panic!("expected BadStatus, got {other:?}"),
        }
    })
    .await
    .unwrap();
}

/// A page with hits but no `_scroll_id` cannot be continued: protocol error,
/// and the source is permanently finished.
#[tokio::test]
async fn missing_scroll_id_is_a_protocol_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/logs-test/_search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(search_body(None, vec![doc("1", "a")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    tokio::task::spawn_blocking(move || {
        let client = EsClient::new(&uri, None, Duration::from_secs(5)).unwrap();
        let mut source =
            EsScrollSource::new(client, "logs-test", json!({ "match_all": {} }), 100, "1m");

        match source.next_page() {
            Err(TransportError::Protocol(msg)) => assert!(msg.contains("_scroll_id")),
            other => panic!("expected Protocol error, got {other:?}"),
        }
        // Terminal: no retry, no further requests.
        assert!(source.next_page().unwrap().is_empty());
    })
    .await
    .unwrap();
}

/// A failed clear-scroll is swallowed; the page sequence still ends cleanly.
#[tokio::test]
async fn clear_scroll_failure_is_non_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/logs-test/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(
            Some("cursor-1"),
            vec![doc("1", "a")],
        )))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/_search/scroll"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(search_body(Some("cursor-1"), vec![])),
        )
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/_search/scroll"))
        .respond_with(ResponseTemplate::new(404).set_body_string("already expired"))
        .mount(&server)
        .await;

    let uri = server.uri();
    tokio::task::spawn_blocking(move || {
        let client = EsClient::new(&uri, None, Duration::from_secs(5)).unwrap();
        let mut source =
            EsScrollSource::new(client, "logs-test", json!({ "match_all": {} }), 100, "1m");

        assert_eq!(source.next_page().unwrap().len(), 1);
        assert!(source.next_page().unwrap().is_empty());
    })
    .await
    .unwrap();
}
