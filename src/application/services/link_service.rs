//! Link creation and resolution service.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::time::Instant;

use crate::application::services::key_allocator::{Allocation, KeyAllocator, with_deadline};
use crate::domain::entities::Link;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::url_normalizer::canonicalize;

/// Input for [`LinkService::shorten`].
#[derive(Debug, Clone, Default)]
pub struct ShortenCommand {
    pub url: String,
    /// Custom key; an empty string counts as absent.
    pub alias: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Service for creating and resolving short links.
///
/// Every storage call made on behalf of one request shares a single deadline
/// of `storage_timeout` from the start of the call.
pub struct LinkService {
    repository: Arc<dyn LinkRepository>,
    allocator: KeyAllocator,
    base_url: String,
    storage_timeout: Duration,
}

impl LinkService {
    pub fn new(
        repository: Arc<dyn LinkRepository>,
        allocator: KeyAllocator,
        base_url: impl Into<String>,
        storage_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            allocator,
            base_url: base_url.into(),
            storage_timeout,
        }
    }

    /// Creates a short link, or returns the existing system link for the URL.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidUrl`] if the URL cannot be canonicalized
    /// - [`AppError::Validation`] if `expires_at` is not in the future
    /// - any error of [`KeyAllocator::create_alias`] or [`KeyAllocator::create_system`]
    pub async fn shorten(&self, command: ShortenCommand) -> Result<Allocation, AppError> {
        let long_url = canonicalize(&command.url)?;

        if let Some(expires_at) = command.expires_at
            && expires_at <= Utc::now()
        {
            return Err(AppError::bad_request(
                "expires_at must be in the future",
                json!({ "expires_at": expires_at }),
            ));
        }

        let deadline = self.deadline();
        match command.alias.as_deref().filter(|a| !a.is_empty()) {
            Some(alias) => {
                self.allocator
                    .create_alias(alias, &long_url, command.expires_at, deadline)
                    .await
            }
            None => {
                self.allocator
                    .create_system(&long_url, command.expires_at, deadline)
                    .await
            }
        }
    }

    /// Looks up a link for redirection.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if no link has this key
    /// - [`AppError::Disabled`] if the link was disabled
    /// - [`AppError::Expired`] if the link is past its expiry time
    pub async fn resolve(&self, key: &str) -> Result<Link, AppError> {
        let link = self.find(key).await?;

        if link.is_disabled {
            return Err(AppError::Disabled {
                key: link.key.clone(),
            });
        }
        if link.is_expired() {
            return Err(AppError::Expired {
                key: link.key.clone(),
            });
        }

        Ok(link)
    }

    /// Looks up a link regardless of its state.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this key.
    pub async fn find(&self, key: &str) -> Result<Link, AppError> {
        with_deadline(self.deadline(), self.repository.get_by_key(key))
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "key": key })))
    }

    /// Disables a link so it no longer redirects.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this key.
    pub async fn disable(&self, key: &str) -> Result<(), AppError> {
        self.allocator.disable(key, self.deadline()).await
    }

    /// Checks that storage answers within the timeout.
    pub async fn ping(&self) -> Result<(), AppError> {
        with_deadline(self.deadline(), self.repository.ping()).await
    }

    /// Builds the public short URL for a key.
    pub fn short_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    fn deadline(&self) -> Instant {
        Instant::now() + self.storage_timeout
    }
}
