//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint, sharing one vault
//! across requests the way the server does.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use lru_vault::{api::create_router, AppState, LruVault, PersistenceConfig, VaultConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

// == Helper Functions ==

fn app_with(config: VaultConfig) -> Router {
    let vault = LruVault::new(config).unwrap();
    create_router(AppState::new(vault))
}

fn create_test_app() -> Router {
    app_with(VaultConfig::new(100))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

fn set_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri("/set")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete_request(key: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(format!("/del/{}", key))
        .body(Body::empty())
        .unwrap()
}

// == SET Endpoint Tests ==

#[tokio::test]
async fn test_set_endpoint_success() {
    let app = create_test_app();

    let response = send(&app, set_request(json!({"key": "test_key", "value": "test_value"}))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert!(json["message"].as_str().unwrap().contains("test_key"));
    assert_eq!(json["key"], "test_key");
}

#[tokio::test]
async fn test_set_endpoint_empty_key() {
    let app = create_test_app();

    let response = send(&app, set_request(json!({"key": "", "value": 1}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn test_set_endpoint_malformed_body() {
    let app = create_test_app();

    let request = Request::builder()
        .method("PUT")
        .uri("/set")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"key": "k"}"#))
        .unwrap();
    let response = send(&app, request).await;

    assert!(response.status().is_client_error());
}

// == GET Endpoint Tests ==

#[tokio::test]
async fn test_get_returns_json_values_unchanged() {
    let app = create_test_app();
    let samples = [
        ("s", json!("plain text")),
        ("n", json!(3.25)),
        ("o", json!({"name": "x", "tags": ["a", "b"], "nested": {"ok": true}})),
    ];

    for (key, value) in &samples {
        let response = send(&app, set_request(json!({"key": key, "value": value}))).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    for (key, value) in &samples {
        let response = send(&app, get_request(&format!("/get/{}", key))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_to_json(response.into_body()).await;
        assert_eq!(json["key"], *key);
        assert_eq!(json["value"], *value);
    }
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let app = create_test_app();

    let response = send(&app, get_request("/get/missing")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("missing"));
}

#[tokio::test]
async fn test_get_after_eviction_not_found() {
    let app = app_with(VaultConfig::new(2));

    for key in ["a", "b", "c"] {
        send(&app, set_request(json!({"key": key, "value": key}))).await;
    }

    let response = send(&app, get_request("/get/a")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, get_request("/get/c")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// == DELETE Endpoint Tests ==

#[tokio::test]
async fn test_delete_endpoint() {
    let app = create_test_app();
    send(&app, set_request(json!({"key": "gone", "value": 1}))).await;

    let response = send(&app, delete_request("gone")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["removed"], true);

    let response = send(&app, get_request("/get/gone")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_missing_key_is_ok() {
    let app = create_test_app();

    let response = send(&app, delete_request("never_set")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["removed"], false);
}

// == ENTRIES Endpoint Tests ==

#[tokio::test]
async fn test_entries_endpoint() {
    let app = create_test_app();
    send(&app, set_request(json!({"key": "a", "value": {"v": 1}}))).await;
    send(&app, set_request(json!({"key": "b", "value": {"v": 2}}))).await;

    let response = send(&app, get_request("/entries")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 2);

    let mut entries = json["entries"].as_array().unwrap().clone();
    entries.sort_by_key(|e| e["key"].as_str().unwrap().to_string());
    assert_eq!(
        entries,
        vec![
            json!({"key": "a", "value": {"v": 1}}),
            json!({"key": "b", "value": {"v": 2}}),
        ]
    );
}

// == STATS Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint_tracks_hits_and_misses() {
    let app = create_test_app();
    send(&app, set_request(json!({"key": "a", "value": 1}))).await;
    send(&app, get_request("/get/a")).await;
    send(&app, get_request("/get/zz")).await;

    let response = send(&app, get_request("/stats")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["size"], 1);
    assert_eq!(json["hit_rate"], 0.5);
}

#[tokio::test]
async fn test_stats_endpoint_flush() {
    let app = create_test_app();
    send(&app, set_request(json!({"key": "a", "value": 1}))).await;
    send(&app, get_request("/get/a")).await;

    let response = send(&app, get_request("/stats?flush=true")).await;
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["hits"], 1);
    assert_eq!(json["flushed"], true);

    let response = send(&app, get_request("/stats")).await;
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["hits"], 0);
    assert_eq!(json["size"], 1);
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = send(&app, get_request("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}

// == Pipeline Tests ==

#[tokio::test]
async fn test_encrypted_cache_kind_mismatch_is_bad_request() {
    let app = app_with(VaultConfig::new(10).encrypt(true));

    let response = send(&app, set_request(json!({"key": "a", "value": {"x": 1}}))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, set_request(json!({"key": "b", "value": "text"}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, get_request("/get/a")).await;
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["value"], json!({"x": 1}));
}

#[tokio::test]
async fn test_write_through_serves_evicted_keys() {
    let dir = tempfile::tempdir().unwrap();
    let config = VaultConfig::new(1)
        .encryption_material([9; 32], [4; 16])
        .write_through(PersistenceConfig::Directory(dir.path().to_path_buf()));
    let app = app_with(config);

    send(&app, set_request(json!({"key": "first", "value": "one"}))).await;
    send(&app, set_request(json!({"key": "second", "value": "two"}))).await;

    let response = send(&app, get_request("/get/first")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["value"], "one");
}
