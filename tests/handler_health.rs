mod common;

use axum::http::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn test_health_endpoint_success() {
    let app = common::create_test_app();

    let response = app.server.get("/healthz").await;

    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["storage"]["status"], "ok");
    assert_eq!(json["checks"]["click_queue"]["status"], "ok");
}

#[tokio::test]
async fn test_health_endpoint_structure() {
    let app = common::create_test_app();

    let response = app.server.get("/healthz").await;

    let json = response.json::<Value>();

    assert!(json.get("status").is_some());
    assert!(json.get("version").is_some());
    assert!(json["checks"].get("storage").is_some());
    assert!(json["checks"].get("click_queue").is_some());
}

#[tokio::test]
async fn test_health_degraded_when_click_queue_closed() {
    let mut app = common::create_test_app();
    app.click_rx.close();

    let response = app.server.get("/healthz").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json = response.json::<Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["click_queue"]["status"], "error");
}
