//! DTOs for the link creation endpoint.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::application::services::ShortenCommand;

/// Request to shorten a URL.
///
/// URL syntax and alias format are checked by the link service, which
/// reports them as `invalid_url` / `invalid_alias`.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The original URL to shorten.
    #[validate(length(min = 1, max = 2048, message = "URL must be 1-2048 characters"))]
    pub url: String,

    /// Optional custom key.
    #[serde(default)]
    pub alias: Option<String>,

    /// Optional expiry timestamp. After this time, the link returns 410 Gone.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<ShortenRequest> for ShortenCommand {
    fn from(r: ShortenRequest) -> Self {
        ShortenCommand {
            url: r.url,
            alias: r.alias,
            expires_at: r.expires_at,
        }
    }
}
