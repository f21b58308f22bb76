//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, header},
    response::Redirect,
};
use tokio::sync::mpsc::error::TrySendError;

use crate::api::extract::ClientIdentity;
use crate::domain::click_event::ClickEvent;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short key to its original URL.
///
/// # Endpoint
///
/// `GET /{key}`
///
/// # Click Tracking
///
/// Click events are sent to a bounded channel for async processing.
/// If the queue is full, the click is dropped (fire-and-forget).
///
/// # Errors
///
/// - 404 Not Found if the key doesn't exist
/// - 410 Gone if the link is disabled or expired
pub async fn redirect_handler(
    Path(key): Path<String>,
    State(state): State<AppState>,
    client: ClientIdentity,
    headers: HeaderMap,
) -> Result<Redirect, AppError> {
    let link = state.link_service.resolve(&key).await?;

    let click_event = ClickEvent::new(
        link.id,
        client.ip().map(str::to_string),
        headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok()),
        headers.get(header::REFERER).and_then(|v| v.to_str().ok()),
    );

    match state.click_sender.try_send(click_event) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => {
            metrics::counter!("clicks_dropped_total").increment(1);
            tracing::debug!(key = %link.key, "Click queue full, dropping click");
        }
        Err(TrySendError::Closed(_)) => {
            tracing::debug!(key = %link.key, "Click queue closed, dropping click");
        }
    }

    Ok(Redirect::temporary(&link.long_url))
}
