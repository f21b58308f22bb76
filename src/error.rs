//! Application error taxonomy and its HTTP representation.
//!
//! Every failure the service can surface is an [`AppError`] variant. Each variant
//! maps to a stable snake_case code and an HTTP status, and renders as:
//!
//! ```json
//! { "error": { "code": "alias_in_use", "message": "...", "details": { ... } } }
//! ```

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::utils::key_codec::KeyCodecError;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// The `error` object of every failure response.
#[derive(Debug, Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
    details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid URL: {reason}")]
    InvalidUrl { reason: String },

    #[error("Alias must be 3-32 characters of letters, digits, '_' or '-'")]
    InvalidAlias { alias: String },

    #[error("Alias '{alias}' is reserved")]
    ReservedKey { alias: String },

    #[error("{message}")]
    Validation { message: String, details: Value },

    #[error("Invalid short key: {0}")]
    InvalidKey(#[from] KeyCodecError),

    #[error("Alias '{alias}' is already in use")]
    AliasInUse { alias: String },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    #[error("Link '{key}' has expired")]
    Expired { key: String },

    #[error("Link '{key}' has been disabled")]
    Disabled { key: String },

    #[error("Too many requests, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Terminal allocator failure: every candidate for this row is taken or too long.
    #[error("No free key of at most {max_len} characters for primary candidate '{primary}'")]
    KeySpaceExhausted { primary: String, max_len: usize },

    #[error("Storage operation timed out")]
    StorageTimeout,

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidUrl { .. } => "invalid_url",
            AppError::InvalidAlias { .. } => "invalid_alias",
            AppError::ReservedKey { .. } => "reserved_key",
            AppError::Validation { .. } => "validation_error",
            AppError::InvalidKey(_) => "invalid_key",
            AppError::AliasInUse { .. } => "alias_in_use",
            AppError::NotFound { .. } => "not_found",
            AppError::Expired { .. } => "expired",
            AppError::Disabled { .. } => "disabled",
            AppError::RateLimited { .. } => "rate_limited",
            AppError::KeySpaceExhausted { .. } => "key_space_exhausted",
            AppError::StorageTimeout => "storage_timeout",
            AppError::Internal { .. } => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidUrl { .. }
            | AppError::InvalidAlias { .. }
            | AppError::ReservedKey { .. }
            | AppError::Validation { .. }
            | AppError::InvalidKey(_) => StatusCode::BAD_REQUEST,
            AppError::AliasInUse { .. } => StatusCode::CONFLICT,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Expired { .. } | AppError::Disabled { .. } => StatusCode::GONE,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::StorageTimeout => StatusCode::SERVICE_UNAVAILABLE,
            AppError::KeySpaceExhausted { .. } | AppError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn details(&self) -> Value {
        match self {
            AppError::InvalidUrl { reason } => json!({ "reason": reason }),
            AppError::InvalidAlias { alias }
            | AppError::ReservedKey { alias }
            | AppError::AliasInUse { alias } => json!({ "alias": alias }),
            AppError::Expired { key } | AppError::Disabled { key } => json!({ "key": key }),
            AppError::RateLimited { retry_after_secs } => {
                json!({ "retry_after_secs": retry_after_secs })
            }
            AppError::KeySpaceExhausted { primary, max_len } => {
                json!({ "primary": primary, "max_len": max_len })
            }
            AppError::Validation { details, .. }
            | AppError::NotFound { details, .. }
            | AppError::Internal { details, .. } => details.clone(),
            AppError::InvalidKey(_) | AppError::StorageTimeout => json!({}),
        }
    }

    fn to_error_info(&self) -> ErrorInfo {
        ErrorInfo {
            code: self.code(),
            message: self.to_string(),
            details: self.details(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(code = self.code(), "{}", self);
        }

        let retry_after = match &self {
            AppError::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };

        let body = ErrorBody {
            error: self.to_error_info(),
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!(error = %e, "Database error");
        AppError::internal("Database error", json!({}))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::bad_request("Request validation failed", json!({ "fields": e.to_string() }))
    }
}
