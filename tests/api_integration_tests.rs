//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycles against the router.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use query_cache::{
    api::create_router,
    cache::{CacheStore, InMemoryBackend, KeyHasher, ManualClock},
    AppState,
};
use serde_json::{json, Value};
use tower::ServiceExt;

const DAY: Duration = Duration::from_secs(86_400);

// == Helper Functions ==

fn create_test_app() -> (Router, ManualClock) {
    let clock = ManualClock::new(1_700_000_000_000);
    let store = CacheStore::with_backend(InMemoryBackend::new(), Arc::new(clock.clone()));
    (create_router(AppState::new(store)), clock)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

async fn derive_key(app: &Router, query_type: &str, params: Value) -> String {
    let response = send(
        app,
        "POST",
        "/keys",
        Some(json!({"queryType": query_type, "params": params})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_to_json(response.into_body()).await["cacheKey"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn put_entry(app: &Router, key: &str, query_type: &str, payload: Value) -> Value {
    let response = send(
        app,
        "PUT",
        "/entries",
        Some(json!({"cacheKey": key, "queryType": query_type, "payload": payload})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_to_json(response.into_body()).await
}

// == Key Derivation ==

#[tokio::test]
async fn test_derive_key_is_order_independent() {
    let (app, _) = create_test_app();

    let a = derive_key(&app, "zoning", json!({"longitude": -87.9, "latitude": 43.04})).await;
    let b = derive_key(&app, "zoning", json!({"latitude": 43.04, "longitude": -87.9})).await;

    assert_eq!(a, b);
    assert!(a.starts_with("zoning:"));
}

#[tokio::test]
async fn test_derive_key_legacy_hasher() {
    let app = create_router(AppState::with_hasher(CacheStore::new(), KeyHasher::Djb2));

    let key = derive_key(
        &app,
        "geocode",
        json!({"address": "500 N Water St", "city": "Milwaukee", "state": "WI"}),
    )
    .await;

    assert_eq!(key, "geocode:3uo5es");
}

#[tokio::test]
async fn test_derive_key_unknown_type() {
    let (app, _) = create_test_app();

    let response = send(
        &app,
        "POST",
        "/keys",
        Some(json!({"queryType": "parking", "params": {}})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("parking"));
}

// == Entries ==

#[tokio::test]
async fn test_set_then_get_entry() {
    let (app, _) = create_test_app();

    let written = put_entry(&app, "rag:abc", "rag", json!({"answer": "Yes", "citations": [1]})).await;
    assert_eq!(written["cacheKey"], "rag:abc");
    assert_eq!(written["ttlSeconds"], 86_400);
    assert!(written["id"].is_string());

    let response = send(&app, "GET", "/entries/rag:abc", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["payload"]["answer"], "Yes");
    assert_eq!(json["hitCount"], 0);
    assert_eq!(json["createdAt"], "2023-11-14T22:13:20+00:00");
}

#[tokio::test]
async fn test_upsert_keeps_id_and_created_at() {
    let (app, clock) = create_test_app();

    let first = put_entry(&app, "zoning:1", "zoning", json!("RT4")).await;
    clock.advance(DAY);
    let second = put_entry(&app, "zoning:1", "zoning", json!("LB2")).await;
    assert_eq!(first["id"], second["id"]);

    let json = body_to_json(send(&app, "GET", "/entries/zoning:1", None).await.into_body()).await;
    assert_eq!(json["payload"], "LB2");
    assert_eq!(json["createdAt"], "2023-11-14T22:13:20+00:00");
}

#[tokio::test]
async fn test_set_rejects_empty_key() {
    let (app, _) = create_test_app();

    let response = send(
        &app,
        "PUT",
        "/entries",
        Some(json!({"cacheKey": "", "queryType": "rag", "payload": null})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_geocode_expiry_scenario() {
    let (app, clock) = create_test_app();
    let key = derive_key(
        &app,
        "geocode",
        json!({"address": "500 N Water St", "city": "Milwaukee", "state": "WI"}),
    )
    .await;
    put_entry(&app, &key, "geocode", json!([{"lat": 43.0389, "lng": -87.9065}])).await;

    clock.advance(DAY * 29);
    let response = send(&app, "GET", &format!("/entries/{}", key), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    clock.advance(DAY * 2);
    let response = send(&app, "GET", &format!("/entries/{}", key), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Still physically present until swept
    let stats = body_to_json(send(&app, "GET", "/stats", None).await.into_body()).await;
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["expired"], 1);
}

// == Hits & Stats ==

#[tokio::test]
async fn test_hits_are_counted() {
    let (app, _) = create_test_app();
    put_entry(&app, "rag:q", "rag", json!("a")).await;

    for _ in 0..3 {
        let response = send(&app, "POST", "/entries/rag:q/hits", None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
    let response = send(&app, "POST", "/entries/rag:missing/hits", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let entry = body_to_json(send(&app, "GET", "/entries/rag:q", None).await.into_body()).await;
    assert_eq!(entry["hitCount"], 3);

    let stats = body_to_json(send(&app, "GET", "/stats", None).await.into_body()).await;
    assert_eq!(stats["totalHits"], 3);
    assert_eq!(stats["byType"]["rag"]["hits"], 3);
    assert_eq!(stats["byType"]["rag"]["count"], 1);
    assert_eq!(stats["lookups"]["hits"], 1);
}

// == Cleanup & Clear ==

#[tokio::test]
async fn test_cleanup_batches_until_done() {
    let (app, clock) = create_test_app();
    for i in 0..150 {
        put_entry(&app, &format!("rag:{}", i), "rag", json!(i)).await;
    }
    put_entry(&app, "geocode:keep", "geocode", json!("home")).await;
    clock.advance(DAY * 2);

    let first = body_to_json(send(&app, "POST", "/cleanup", None).await.into_body()).await;
    assert_eq!(first["deleted"], 100);
    assert_eq!(first["hasMore"], true);

    let second = body_to_json(send(&app, "POST", "/cleanup", None).await.into_body()).await;
    assert_eq!(second["deleted"], 50);
    assert_eq!(second["hasMore"], false);

    let stats = body_to_json(send(&app, "GET", "/stats", None).await.into_body()).await;
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["active"], 1);
}

#[tokio::test]
async fn test_clear_by_query_type() {
    let (app, _) = create_test_app();
    put_entry(&app, "geocode:1", "geocode", json!("g")).await;
    put_entry(&app, "zoning:1", "zoning", json!("z")).await;
    put_entry(&app, "zoning:2", "zoning", json!("z")).await;
    put_entry(&app, "rag:1", "rag", json!("r")).await;

    let response = send(&app, "DELETE", "/entries?queryType=zoning", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await["deleted"], 2);

    let stats = body_to_json(send(&app, "GET", "/stats", None).await.into_body()).await;
    assert_eq!(stats["total"], 2);
    assert_eq!(stats["byType"]["zoning"]["count"], 0);
    assert_eq!(stats["byType"]["geocode"]["count"], 1);
    assert_eq!(stats["byType"]["rag"]["count"], 1);

    let response = send(&app, "DELETE", "/entries", None).await;
    assert_eq!(body_to_json(response.into_body()).await["deleted"], 2);
}

#[tokio::test]
async fn test_clear_unknown_type() {
    let (app, _) = create_test_app();

    let response = send(&app, "DELETE", "/entries?queryType=permits", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// == Health ==

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = create_test_app();

    let response = send(&app, "GET", "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_string());
}
