//! `X-Request-ID` handling.
//!
//! A client-supplied id is kept as is; otherwise a UUID v4 is generated.
//! Either way the id is on the request before [`super::tracing::layer`]
//! opens its span, and is copied onto the response.

use axum::http::HeaderName;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Outermost layer: assigns an id to requests that arrive without one.
pub fn set_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid)
}

/// Echoes the request's id on the response, including error responses.
pub fn propagate_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(X_REQUEST_ID)
}
