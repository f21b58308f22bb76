//! Handler for per-link click statistics.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use serde_json::json;

use crate::api::dto::stats::{StatsQuery, StatsResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Returns click counts for a link.
///
/// # Endpoint
///
/// `GET /api/links/{key}/stats?from=YYYY-MM-DD&to=YYYY-MM-DD`
///
/// Both dates are optional and inclusive; the default range is the last 30
/// days through today (UTC).
///
/// # Response
///
/// ```json
/// {
///   "key": "000001",
///   "total_clicks": 42,
///   "last_clicked_at": "2025-03-02T12:00:00Z",
///   "from": "2025-02-01",
///   "to": "2025-03-02",
///   "daily": [{ "date": "2025-03-02", "clicks": 3 }]
/// }
/// ```
///
/// # Errors
///
/// - 400 for malformed dates or an invalid range
/// - 404 if no link has this key
pub async fn link_stats_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> Result<Json<StatsResponse>, AppError> {
    let Query(query) = query.map_err(|e| {
        AppError::bad_request("Invalid query parameters", json!({ "reason": e.body_text() }))
    })?;

    let link = state.link_service.find(&key).await?;
    let stats = state
        .stats_service
        .link_stats(&link, query.from, query.to)
        .await?;

    Ok(Json(StatsResponse::new(link.key, stats)))
}
