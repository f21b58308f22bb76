mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use shortkey::domain::repositories::LinkRepository;

#[tokio::test]
async fn test_redirect_success() {
    let app = common::create_test_app();

    let created = app
        .server
        .post("/api/links")
        .json(&json!({ "url": "https://example.com/target" }))
        .await;
    let key = created.json::<Value>()["key"].as_str().unwrap().to_string();

    let response = app.server.get(&format!("/{key}")).await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header("location"), "https://example.com/target");
}

#[tokio::test]
async fn test_redirect_alias() {
    let app = common::create_test_app();
    common::insert_alias(&app.links, "promo", "https://example.com/sale?src=x", None).await;

    let response = app.server.get("/promo").await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header("location"), "https://example.com/sale?src=x");
}

#[tokio::test]
async fn test_redirect_not_found() {
    let app = common::create_test_app();

    let response = app.server.get("/notfound").await;

    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_redirect_key_lookup_is_exact() {
    let app = common::create_test_app();
    app.server
        .post("/api/links")
        .json(&json!({ "url": "https://example.com" }))
        .await
        .assert_status(StatusCode::CREATED);

    app.server.get("/000001").await.assert_status(StatusCode::TEMPORARY_REDIRECT);
    app.server.get("/1").await.assert_status_not_found();
    app.server.get("/00000A").await.assert_status_not_found();
}

#[tokio::test]
async fn test_redirect_disabled_link_is_gone() {
    let app = common::create_test_app();
    common::insert_alias(&app.links, "retired", "https://example.com", None).await;
    app.links.disable("retired").await.unwrap();

    let response = app.server.get("/retired").await;

    response.assert_status(StatusCode::GONE);
    assert_eq!(response.json::<Value>()["error"]["code"], "disabled");
}

#[tokio::test]
async fn test_redirect_expired_link_is_gone() {
    let app = common::create_test_app();
    let past = Utc::now() - Duration::hours(1);
    common::insert_alias(&app.links, "lapsed", "https://example.com", Some(past)).await;

    let response = app.server.get("/lapsed").await;

    response.assert_status(StatusCode::GONE);
    assert_eq!(response.json::<Value>()["error"]["code"], "expired");
}

#[tokio::test]
async fn test_redirect_disabled_wins_over_expired() {
    let app = common::create_test_app();
    let past = Utc::now() - Duration::hours(1);
    common::insert_alias(&app.links, "both", "https://example.com", Some(past)).await;
    app.links.disable("both").await.unwrap();

    let response = app.server.get("/both").await;

    response.assert_status(StatusCode::GONE);
    assert_eq!(response.json::<Value>()["error"]["code"], "disabled");
}

#[tokio::test]
async fn test_redirect_records_click() {
    let mut app = common::create_test_app();
    let link = common::insert_alias(&app.links, "clickme", "https://example.com", None).await;

    let response = app
        .server
        .get("/clickme")
        .add_header("User-Agent", "Mozilla/5.0")
        .add_header("Referer", "https://search.example")
        .await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);

    let event = app.click_rx.try_recv().unwrap();
    assert_eq!(event.link_id, link.id);
    assert_eq!(event.ip.as_deref(), Some("127.0.0.1"));
    assert_eq!(event.user_agent.as_deref(), Some("Mozilla/5.0"));
    assert_eq!(event.referer.as_deref(), Some("https://search.example"));
}

#[tokio::test]
async fn test_redirect_failure_records_no_click() {
    let mut app = common::create_test_app();
    common::insert_alias(&app.links, "retired", "https://example.com", None).await;
    app.links.disable("retired").await.unwrap();

    app.server.get("/retired").await.assert_status(StatusCode::GONE);
    app.server.get("/missing").await.assert_status_not_found();

    assert!(app.click_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_redirect_survives_closed_click_queue() {
    let mut app = common::create_test_app();
    common::insert_alias(&app.links, "promo", "https://example.com", None).await;
    app.click_rx.close();

    let response = app.server.get("/promo").await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
}
