//! Handlers for link creation and lookup.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::link::LinkResponse;
use crate::api::dto::shorten::ShortenRequest;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/links` (rate limited per client)
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/some/page",
///   "alias": "promo",                       // optional
///   "expires_at": "2030-01-01T00:00:00Z"    // optional
/// }
/// ```
///
/// # Response
///
/// - **201 Created**: a new link was stored
/// - **200 OK**: the URL already had a system link, which is returned as is
///
/// ```json
/// {
///   "key": "000001",
///   "short_url": "http://localhost:3000/000001",
///   "long_url": "https://example.com/some/page",
///   "is_custom": false,
///   "created_at": "2025-01-01T00:00:00Z",
///   "is_disabled": false
/// }
/// ```
///
/// # Errors
///
/// - 400 for an invalid body, URL, alias or expiry
/// - 409 if the alias is already in use
/// - 429 when the client exceeded its creation budget
pub async fn create_link_handler(
    State(state): State<AppState>,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    let Json(payload) = payload.map_err(|e| {
        AppError::bad_request("Invalid request body", json!({ "reason": e.body_text() }))
    })?;
    payload.validate()?;

    let allocation = state.link_service.shorten(payload.into()).await?;

    let status = if allocation.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    let short_url = state.link_service.short_url(&allocation.link.key);

    Ok((status, Json(LinkResponse::new(allocation.link, short_url))))
}

/// Returns a link's details, including disabled and expired links.
///
/// # Endpoint
///
/// `GET /api/links/{key}`
///
/// # Errors
///
/// Returns 404 Not Found if no link has this key.
pub async fn get_link_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.find(&key).await?;
    let short_url = state.link_service.short_url(&link.key);

    Ok(Json(LinkResponse::new(link, short_url)))
}
