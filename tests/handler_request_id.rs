mod common;

use axum::http::StatusCode;
use serde_json::json;
use shortkey::rate_limit::RateLimitConfig;
use std::time::Duration;

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = common::create_test_app();

    let response = app
        .server
        .get("/healthz")
        .add_header("X-Request-ID", "deploy-42")
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("x-request-id"), "deploy-42");
}

#[tokio::test]
async fn test_request_id_is_generated_when_missing() {
    let app = common::create_test_app();

    let first = app.server.get("/healthz").await.header("x-request-id");
    let second = app.server.get("/healthz").await.header("x-request-id");

    let first = first.to_str().unwrap();
    assert_eq!(first.len(), 36);
    assert_eq!(first.matches('-').count(), 4);
    assert_ne!(first, second.to_str().unwrap());
}

#[tokio::test]
async fn test_request_id_on_error_responses() {
    let app = common::create_test_app();

    let response = app
        .server
        .get("/missing")
        .add_header("X-Request-ID", "lookup-1")
        .await;

    response.assert_status_not_found();
    assert_eq!(response.header("x-request-id"), "lookup-1");
}

#[tokio::test]
async fn test_request_id_on_rate_limited_responses() {
    let app = common::create_test_app_with(RateLimitConfig::new(1, Duration::from_secs(60)), false);
    let body = json!({ "url": "https://example.com/a" });

    app.server.post("/api/links").json(&body).await;
    let response = app
        .server
        .post("/api/links")
        .json(&body)
        .add_header("X-Request-ID", "burst-2")
        .await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.header("x-request-id"), "burst-2");
}
