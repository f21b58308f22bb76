mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};
use shortkey::domain::repositories::LinkRepository;
use shortkey::rate_limit::RateLimitConfig;
use std::time::Duration;

// ─── CREATE ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_system_link() {
    let app = common::create_test_app();

    let response = app
        .server
        .post("/api/links")
        .json(&json!({ "url": "HTTPS://Example.com:443/page#top" }))
        .await;

    response.assert_status(StatusCode::CREATED);

    let json = response.json::<Value>();
    assert_eq!(json["key"], "000001");
    assert_eq!(json["short_url"], "http://sho.rt/000001");
    assert_eq!(json["long_url"], "https://example.com/page");
    assert_eq!(json["is_custom"], false);
    assert_eq!(json["is_disabled"], false);
    assert!(json.get("created_at").is_some());
    assert!(json.get("expires_at").is_none());
}

#[tokio::test]
async fn test_create_same_url_returns_existing_link() {
    let app = common::create_test_app();

    let first = app
        .server
        .post("/api/links")
        .json(&json!({ "url": "https://example.com/a" }))
        .await;
    first.assert_status(StatusCode::CREATED);

    let second = app
        .server
        .post("/api/links")
        .json(&json!({ "url": "https://EXAMPLE.com/a#fragment" }))
        .await;
    second.assert_status_ok();

    assert_eq!(first.json::<Value>()["key"], second.json::<Value>()["key"]);
    assert_eq!(app.links.row_count().await, 1);
}

#[tokio::test]
async fn test_create_distinct_urls_get_sequential_keys() {
    let app = common::create_test_app();

    for (i, url) in ["https://a.example", "https://b.example", "https://c.example"]
        .iter()
        .enumerate()
    {
        let response = app.server.post("/api/links").json(&json!({ "url": url })).await;
        response.assert_status(StatusCode::CREATED);
        assert_eq!(response.json::<Value>()["key"], format!("00000{}", i + 1));
    }
}

#[tokio::test]
async fn test_create_with_alias_and_expiry() {
    let app = common::create_test_app();

    let response = app
        .server
        .post("/api/links")
        .json(&json!({
            "url": "https://example.com/promo",
            "alias": "promo",
            "expires_at": "2999-01-01T00:00:00Z"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);

    let json = response.json::<Value>();
    assert_eq!(json["key"], "promo");
    assert_eq!(json["short_url"], "http://sho.rt/promo");
    assert_eq!(json["is_custom"], true);
    assert_eq!(json["expires_at"], "2999-01-01T00:00:00Z");
}

#[tokio::test]
async fn test_create_alias_does_not_dedup_system_link() {
    let app = common::create_test_app();

    app.server
        .post("/api/links")
        .json(&json!({ "url": "https://example.com/", "alias": "home" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = app
        .server
        .post("/api/links")
        .json(&json!({ "url": "https://example.com/" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["is_custom"], false);
}

#[tokio::test]
async fn test_create_alias_conflict() {
    let app = common::create_test_app();
    common::insert_alias(&app.links, "taken", "https://example.com/1", None).await;

    let response = app
        .server
        .post("/api/links")
        .json(&json!({ "url": "https://example.com/2", "alias": "taken" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let json = response.json::<Value>();
    assert_eq!(json["error"]["code"], "alias_in_use");
    assert_eq!(json["error"]["details"]["alias"], "taken");
}

#[tokio::test]
async fn test_create_reserved_alias() {
    let app = common::create_test_app();

    let response = app
        .server
        .post("/api/links")
        .json(&json!({ "url": "https://example.com", "alias": "Healthz" }))
        .await;

    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["error"]["code"], "reserved_key");
}

#[tokio::test]
async fn test_create_invalid_alias() {
    let app = common::create_test_app();

    let response = app
        .server
        .post("/api/links")
        .json(&json!({ "url": "https://example.com", "alias": "no spaces" }))
        .await;

    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["error"]["code"], "invalid_alias");
}

#[tokio::test]
async fn test_create_invalid_url() {
    let app = common::create_test_app();

    for url in ["not a url", "ftp://example.com/file", "javascript:alert(1)"] {
        let response = app.server.post("/api/links").json(&json!({ "url": url })).await;

        response.assert_status_bad_request();
        assert_eq!(response.json::<Value>()["error"]["code"], "invalid_url");
    }

    assert_eq!(app.links.row_count().await, 0);
}

#[tokio::test]
async fn test_create_past_expiry_rejected() {
    let app = common::create_test_app();

    let response = app
        .server
        .post("/api/links")
        .json(&json!({
            "url": "https://example.com",
            "expires_at": "2000-01-01T00:00:00Z"
        }))
        .await;

    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_create_missing_url_field() {
    let app = common::create_test_app();

    let response = app
        .server
        .post("/api/links")
        .json(&json!({ "alias": "promo" }))
        .await;

    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_create_empty_url() {
    let app = common::create_test_app();

    let response = app.server.post("/api/links").json(&json!({ "url": "" })).await;

    response.assert_status_bad_request();
}

// ─── RATE LIMIT ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_reports_remaining_budget() {
    let app = common::create_test_app_with(RateLimitConfig::new(5, Duration::from_secs(60)), false);

    let response = app
        .server
        .post("/api/links")
        .json(&json!({ "url": "https://example.com" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.header("x-ratelimit-remaining"), "4");
}

#[tokio::test]
async fn test_create_rate_limited() {
    let app = common::create_test_app_with(RateLimitConfig::new(2, Duration::from_secs(60)), false);

    for i in 0..2 {
        app.server
            .post("/api/links")
            .json(&json!({ "url": format!("https://example.com/{i}") }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let response = app
        .server
        .post("/api/links")
        .json(&json!({ "url": "https://example.com/2" }))
        .await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response
        .header("retry-after")
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=30).contains(&retry_after));
    assert_eq!(response.json::<Value>()["error"]["code"], "rate_limited");

    // The denied request never reached storage.
    assert_eq!(app.links.row_count().await, 2);
}

#[tokio::test]
async fn test_failed_requests_consume_budget() {
    let app = common::create_test_app_with(RateLimitConfig::new(1, Duration::from_secs(60)), false);

    app.server
        .post("/api/links")
        .json(&json!({ "url": "not a url" }))
        .await
        .assert_status_bad_request();

    app.server
        .post("/api/links")
        .json(&json!({ "url": "https://example.com" }))
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_rate_limit_is_per_forwarded_client() {
    let app = common::create_test_app_with(RateLimitConfig::new(1, Duration::from_secs(60)), true);

    let create = |ip: &'static str| {
        app.server
            .post("/api/links")
            .add_header("X-Forwarded-For", ip)
            .json(&json!({ "url": format!("https://example.com/{ip}") }))
    };

    create("203.0.113.1").await.assert_status(StatusCode::CREATED);
    create("203.0.113.1")
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
    create("203.0.113.2").await.assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_lookups_are_not_rate_limited() {
    let app = common::create_test_app_with(RateLimitConfig::new(1, Duration::from_secs(60)), false);
    common::insert_alias(&app.links, "promo", "https://example.com/", None).await;

    for _ in 0..5 {
        app.server.get("/api/links/promo").await.assert_status_ok();
        app.server
            .get("/promo")
            .await
            .assert_status(StatusCode::TEMPORARY_REDIRECT);
    }
}

// ─── GET ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_link() {
    let app = common::create_test_app();
    common::insert_alias(&app.links, "docs-page", "https://example.com/docs", None).await;

    let response = app.server.get("/api/links/docs-page").await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["key"], "docs-page");
    assert_eq!(json["long_url"], "https://example.com/docs");
    assert_eq!(json["is_custom"], true);
}

#[tokio::test]
async fn test_get_disabled_link_still_returns_details() {
    let app = common::create_test_app();
    common::insert_alias(&app.links, "old-promo", "https://example.com/", None).await;
    app.links.disable("old-promo").await.unwrap();

    let response = app.server.get("/api/links/old-promo").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["is_disabled"], true);
}

#[tokio::test]
async fn test_get_link_not_found() {
    let app = common::create_test_app();

    let response = app.server.get("/api/links/nothing").await;

    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["error"]["code"], "not_found");
}
