//! DTO describing a stored link.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::Link;

/// A short link as returned by the API.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub key: String,
    pub short_url: String,
    pub long_url: String,
    pub is_custom: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub is_disabled: bool,
}

impl LinkResponse {
    pub fn new(link: Link, short_url: String) -> Self {
        Self {
            key: link.key,
            short_url,
            long_url: link.long_url,
            is_custom: link.is_custom,
            created_at: link.created_at,
            expires_at: link.expires_at,
            is_disabled: link.is_disabled,
        }
    }
}
