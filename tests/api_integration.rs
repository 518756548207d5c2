//! Integration tests for the HTTP API
//!
//! Tests API endpoints against the router, without a socket

use mindread::core::create_router;
use mindread::types::EngineConfig;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt;
use serde_json::Value;

fn create_test_router() -> Router {
    create_router(EngineConfig::default())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn new_session(app: &Router, body: &str) -> String {
    let (status, json) = send(app, "POST", "/session/new", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    json["session_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_router();
    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["sessions_active"], 0);
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_create_session_from_theme() {
    let app = create_test_router();
    let (status, json) = send(&app, "POST", "/session/new", Some(r#"{"theme": "fruits", "seed": 42}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["session_id"].is_string());
    assert!(json["websocket_url"].as_str().unwrap().starts_with("/ws/"));
    assert_eq!(json["round"], 0);

    let groups = json["partition"].as_array().unwrap();
    assert_eq!(groups.len(), 4);
    let total: usize = groups.iter().map(|g| g.as_array().unwrap().len()).sum();
    assert_eq!(total, 16);
}

#[tokio::test]
async fn test_invalid_config_rejected() {
    let app = create_test_router();
    let body = r#"{"words": ["a", "b"], "config": {"activation_threshold": 0.01, "maintain_threshold": 0.5}}"#;
    let (status, _) = send(&app, "POST", "/session/new", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_session_not_found() {
    let app = create_test_router();
    let (status, _) = send(&app, "GET", "/session/nonexistent", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "POST", "/session/nonexistent/choose", Some(r#"{"direction": "left", "timestamp_ms": 0}"#)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_samples_drive_commit() {
    let app = create_test_router();
    let id = new_session(&app, r#"{"words": ["a","b","c","d","e","f","g","h"], "config": {"stable_duration_ms": 1000, "quadrant_schedule": [2, 2, 2]}}"#).await;

    let mut committed = false;
    for t in (0..=1000).step_by(250) {
        let body = format!(r#"{{"timestamp_ms": {}, "position": {{"kind": "offset", "value": -0.4}}}}"#, t);
        let (status, json) = send(&app, "POST", &format!("/session/{}/sample", id), Some(&body)).await;
        assert_eq!(status, StatusCode::OK);
        committed |= json["events"]
            .as_array()
            .unwrap()
            .iter()
            .any(|e| e["event"] == "round_committed" && e["direction"] == "left");
    }
    assert!(committed);

    let (_, info) = send(&app, "GET", &format!("/session/{}", id), None).await;
    assert_eq!(info["round"], 1);
    assert_eq!(info["partition"], serde_json::json!([["a", "b"], ["c", "d"]]));
    assert_eq!(info["phase"], "IDLE");
}

#[tokio::test]
async fn test_absent_position_produces_nothing() {
    let app = create_test_router();
    let id = new_session(&app, r#"{"words": ["a","b","c","d"]}"#).await;
    let (status, json) = send(&app, "POST", &format!("/session/{}/sample", id), Some(r#"{"timestamp_ms": 5}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["events"], serde_json::json!([]));
}

#[tokio::test]
async fn test_full_session_flow() {
    let app = create_test_router();
    let id = new_session(&app, r#"{"words": ["a","b","c","d"], "config": {"quadrant_schedule": [2, 2]}}"#).await;

    // Round 1: a b | c d
    let (_, json) = send(&app, "POST", &format!("/session/{}/choose", id), Some(r#"{"direction": "right", "timestamp_ms": 0}"#)).await;
    assert_eq!(json["finished"], false);

    // Round 2: c | d
    let (_, json) = send(&app, "POST", &format!("/session/{}/choose", id), Some(r#"{"direction": "left", "timestamp_ms": 10}"#)).await;
    assert_eq!(json["finished"], true);
    let last = json["events"].as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["event"], "word_selected");
    assert_eq!(last["word"], "c");
    assert_eq!(last["forced"], false);

    // Override after the game is over does nothing
    let (_, json) = send(&app, "POST", &format!("/session/{}/choose", id), Some(r#"{"direction": "left", "timestamp_ms": 20}"#)).await;
    assert_eq!(json["events"], serde_json::json!([]));

    let (status, _) = send(&app, "DELETE", &format!("/session/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &format!("/session/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
