//! Per-client rate limiting for link creation.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::api::extract::ClientIdentity;
use crate::error::AppError;
use crate::rate_limit::RateDecision;
use crate::state::AppState;

/// Remaining creations in the current window, set on allowed responses.
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

/// Consumes one token from the client's bucket before running the handler.
///
/// Clients are identified by [`ClientIdentity`]. Denied requests never reach
/// the handler and are not queued.
///
/// # Errors
///
/// Returns `429 Too Many Requests` with a `Retry-After` header (whole seconds,
/// at least 1) when the bucket is empty.
///
/// # Example
///
/// ```rust,ignore
/// let create = Router::new()
///     .route("/links", post(create_link_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit::layer));
/// ```
pub async fn layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();
    let Ok(ClientIdentity(identity)) = ClientIdentity::from_request_parts(&mut parts, &state).await;
    let req = Request::from_parts(parts, body);

    match state.rate_limiter.check(&identity) {
        RateDecision::Allowed { remaining } => {
            let mut response = next.run(req).await;
            response
                .headers_mut()
                .insert(X_RATELIMIT_REMAINING, HeaderValue::from(remaining));
            Ok(response)
        }
        RateDecision::Denied { retry_after } => Err(AppError::RateLimited {
            retry_after_secs: retry_after.as_secs().max(1),
        }),
    }
}
