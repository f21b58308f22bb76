//! API route configuration.

use crate::api::handlers::{create_link_handler, get_link_handler, link_stats_handler};
use crate::api::middleware::rate_limit;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Routes nested under `/api`.
///
/// # Endpoints
///
/// - `POST /links`             - Create a short link (rate limited)
/// - `GET  /links/{key}`       - Link details
/// - `GET  /links/{key}/stats` - Click counts
pub fn api_routes(state: AppState) -> Router<AppState> {
    let create = Router::new()
        .route("/links", post(create_link_handler))
        .route_layer(middleware::from_fn_with_state(state, rate_limit::layer));

    Router::new()
        .merge(create)
        .route("/links/{key}", get(get_link_handler))
        .route("/links/{key}/stats", get(link_stats_handler))
}
