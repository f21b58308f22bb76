//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{key}`   - Short link redirect
//! - `GET  /healthz` - Health check: storage and click queue
//! - `/api/*`        - REST API
//!
//! # Middleware
//!
//! - **Request id** - `X-Request-ID` accepted or generated, echoed on the response
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-client token bucket on link creation
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{request_id, tracing};
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// Serve it with connect info (`into_make_service_with_connect_info`) so
/// clients can be told apart by peer address.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}

/// Routes and middleware without path normalization.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/{key}", get(redirect_handler))
        .nest("/api", api::routes::api_routes(state.clone()))
        .with_state(state)
        .layer(request_id::propagate_layer())
        .layer(tracing::layer())
        .layer(request_id::set_layer())
}
