//! Single-Invocation Adapter Tests
//!
//! The `invoke` command and the HTTP server are two adapters over the same
//! router; these tests drive invocation envelopes through `cli::dispatch`
//! and check the results line up with the HTTP surface.

use std::collections::BTreeMap;

use axum::body::Body;
use axum::http::{Method, Request};
use serde_json::{json, Value};
use tower::ServiceExt;

use trackrate::cli::{dispatch, InvocationRequest};
use trackrate::http_server::HttpServer;
use trackrate::store::ReviewStore;

// =============================================================================
// Helper Functions
// =============================================================================

fn envelope(method: &str, path: &str) -> InvocationRequest {
    InvocationRequest {
        method: method.to_string(),
        path: path.to_string(),
        query: BTreeMap::new(),
        headers: BTreeMap::new(),
        body: None,
    }
}

fn submit_envelope(session: &str, audio: i64, rating: f64) -> InvocationRequest {
    let mut request = envelope("POST", "/reviews");
    request.body = Some(json!({
        "audioId": audio,
        "title": "Track A",
        "rating": rating,
        "sessionId": session,
    }));
    request
}

// =============================================================================
// Dispatch Tests
// =============================================================================

#[tokio::test]
async fn test_invoke_submit_then_list() {
    let store = ReviewStore::open(":memory:").unwrap();

    let submitted = dispatch(store.clone(), submit_envelope("s1", 1, 4.5))
        .await
        .unwrap();
    assert_eq!(submitted.status, 200);
    assert_eq!(submitted.body["success"], json!(true));

    let mut list = envelope("GET", "/reviews");
    list.query.insert("sessionId".to_string(), "s1".to_string());
    let listed = dispatch(store, list).await.unwrap();
    assert_eq!(listed.status, 200);
    assert_eq!(listed.body["reviews"].as_array().unwrap().len(), 1);
    assert_eq!(listed.body["reviews"][0]["rating"], json!(4.5));
}

#[tokio::test]
async fn test_invoke_validation_error() {
    let store = ReviewStore::open(":memory:").unwrap();

    let response = dispatch(store, submit_envelope("s1", 1, 9.0))
        .await
        .unwrap();
    assert_eq!(response.status, 400);
    assert!(response.body["error"].as_str().unwrap().contains("Rating"));
}

#[tokio::test]
async fn test_invoke_unknown_route() {
    let store = ReviewStore::open(":memory:").unwrap();

    let response = dispatch(store, envelope("GET", "/nope")).await.unwrap();
    assert_eq!(response.status, 404);
    assert_eq!(response.body, json!({"error": "Not found"}));
}

#[tokio::test]
async fn test_invoke_csv_export() {
    let store = ReviewStore::open(":memory:").unwrap();
    dispatch(store.clone(), submit_envelope("s1", 1, 4.0))
        .await
        .unwrap();

    let mut export = envelope("GET", "/admin/reviews");
    export.query.insert("format".to_string(), "csv".to_string());
    let response = dispatch(store, export).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(
        response.headers.get("content-type").map(String::as_str),
        Some("text/csv")
    );
    let csv = response.body.as_str().unwrap();
    assert!(csv.starts_with("ID,Audio ID,Title"));
}

/// Forwarded headers in the envelope reach the IP derivation.
#[tokio::test]
async fn test_invoke_carries_headers() {
    let store = ReviewStore::open(":memory:").unwrap();

    let mut request = submit_envelope("s1", 1, 4.0);
    request
        .headers
        .insert("x-real-ip".to_string(), "7.7.7.7".to_string());
    dispatch(store.clone(), request).await.unwrap();

    let exported = dispatch(store, envelope("GET", "/admin/reviews"))
        .await
        .unwrap();
    assert_eq!(exported.body["reviews"][0]["ipAddress"], json!("7.7.7.7"));
}

// =============================================================================
// Adapter Equivalence Tests
// =============================================================================

/// The two adapters produce identical payloads for the same logical request.
#[tokio::test]
async fn test_invoke_matches_http_adapter() {
    let store = ReviewStore::open(":memory:").unwrap();
    dispatch(store.clone(), submit_envelope("s1", 1, 4.5))
        .await
        .unwrap();

    let mut list = envelope("GET", "/reviews");
    list.query.insert("sessionId".to_string(), "s1".to_string());
    let invoked = dispatch(store.clone(), list).await.unwrap();

    let request = Request::builder()
        .method(Method::GET)
        .uri("/reviews?sessionId=s1")
        .body(Body::empty())
        .unwrap();
    let response = HttpServer::new(store)
        .router()
        .oneshot(request)
        .await
        .unwrap();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let http_body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(invoked.body, http_body);
}

/// Query values needing encoding survive the round trip.
#[tokio::test]
async fn test_invoke_encodes_query_values() {
    let store = ReviewStore::open(":memory:").unwrap();

    dispatch(store.clone(), submit_envelope("s 1&x=y", 1, 4.0))
        .await
        .unwrap();

    let mut list = envelope("GET", "/reviews");
    list.query
        .insert("sessionId".to_string(), "s 1&x=y".to_string());
    let listed = dispatch(store, list).await.unwrap();
    assert_eq!(listed.status, 200);
    assert_eq!(listed.body["reviews"].as_array().unwrap().len(), 1);
}
