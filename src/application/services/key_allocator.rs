//! Race-safe short key allocation.
//!
//! System keys are derived from the row id the storage assigns inside an open
//! transaction, so two concurrent allocations never propose the same primary
//! candidate. Collisions only happen against custom aliases that happen to
//! look like encoded ids, and are resolved by single-symbol suffix probing.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::time::Instant;

use crate::domain::entities::{Link, NewAlias};
use crate::domain::repositories::{KeyClaim, LinkRepository, LinkTransaction, PendingInsert};
use crate::error::AppError;
use crate::utils::alias::validate_alias;
use crate::utils::key_codec::{ALPHABET, encode, pad};

/// Rounds of "look up, then insert" before giving up on a URL that keeps
/// losing insert races.
const MAX_SELECT_ROUNDS: usize = 3;

/// Runs a storage call against `deadline`.
///
/// # Errors
///
/// Returns [`AppError::StorageTimeout`] if the deadline passes first.
pub async fn with_deadline<T, F>(deadline: Instant, call: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    tokio::time::timeout_at(deadline, call)
        .await
        .map_err(|_| AppError::StorageTimeout)?
}

/// Result of an allocation request.
#[derive(Debug, Clone)]
pub struct Allocation {
    pub link: Link,
    /// False when an existing link for the same URL was returned.
    pub created: bool,
}

/// Progress of claiming a key for one pending row.
#[derive(Debug)]
enum ClaimState {
    Proposed(String),
    Colliding,
    Committed(String),
    Exhausted,
}

/// Assigns unique short keys to links.
pub struct KeyAllocator {
    repository: Arc<dyn LinkRepository>,
    min_len: usize,
    max_len: usize,
}

impl KeyAllocator {
    /// Creates an allocator producing keys of `min_len..=max_len` characters.
    pub fn new(repository: Arc<dyn LinkRepository>, min_len: usize, max_len: usize) -> Self {
        Self {
            repository,
            min_len,
            max_len,
        }
    }

    /// Stores a caller-chosen alias.
    ///
    /// Validation happens before any storage call.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidAlias`] / [`AppError::ReservedKey`] for a bad alias
    /// - [`AppError::AliasInUse`] if the key already exists; never retried
    /// - [`AppError::StorageTimeout`] if `deadline` passes
    pub async fn create_alias(
        &self,
        alias: &str,
        long_url: &str,
        expires_at: Option<DateTime<Utc>>,
        deadline: Instant,
    ) -> Result<Allocation, AppError> {
        validate_alias(alias)?;

        let new_alias = NewAlias {
            alias: alias.to_string(),
            long_url: long_url.to_string(),
            expires_at,
        };
        let link = with_deadline(deadline, self.repository.insert_alias(new_alias)).await?;

        metrics::counter!("links_created_total", "kind" => "custom").increment(1);
        tracing::info!(key = %link.key, "Custom alias created");

        Ok(Allocation {
            link,
            created: true,
        })
    }

    /// Returns the system link for a canonical URL, creating it if needed.
    ///
    /// Concurrent calls for the same URL all observe the same link; exactly
    /// one of them reports `created = true`.
    ///
    /// # Errors
    ///
    /// - [`AppError::KeySpaceExhausted`] if no candidate fits in `max_len`
    /// - [`AppError::StorageTimeout`] if `deadline` passes
    /// - [`AppError::Internal`] on storage errors, or if the URL keeps losing
    ///   insert races
    pub async fn create_system(
        &self,
        long_url: &str,
        expires_at: Option<DateTime<Utc>>,
        deadline: Instant,
    ) -> Result<Allocation, AppError> {
        for round in 0..MAX_SELECT_ROUNDS {
            if let Some(link) =
                with_deadline(deadline, self.repository.get_by_canonical_url(long_url)).await?
            {
                return Ok(Allocation {
                    link,
                    created: false,
                });
            }

            // Dropping `tx` on any early return rolls it back.
            let mut tx = with_deadline(deadline, self.repository.begin()).await?;

            let pending =
                match with_deadline(deadline, tx.insert_pending(long_url, expires_at)).await? {
                    PendingInsert::Inserted(pending) => pending,
                    PendingInsert::DuplicateUrl => {
                        tracing::debug!(round, "Lost insert race for URL, re-selecting");
                        with_deadline(deadline, tx.rollback()).await?;
                        continue;
                    }
                };

            let key = self.claim_key(tx.as_mut(), pending.id, deadline).await?;
            with_deadline(deadline, tx.commit()).await?;

            metrics::counter!("links_created_total", "kind" => "system").increment(1);
            tracing::info!(key = %key, id = pending.id, "Short link created");

            return Ok(Allocation {
                link: pending.into_link(key),
                created: true,
            });
        }

        Err(AppError::internal(
            "Could not settle link creation for URL",
            json!({ "rounds": MAX_SELECT_ROUNDS }),
        ))
    }

    /// Marks a link as disabled.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this key.
    pub async fn disable(&self, key: &str, deadline: Instant) -> Result<(), AppError> {
        with_deadline(deadline, self.repository.disable(key)).await?;
        tracing::info!(key, "Link disabled");
        Ok(())
    }

    /// Claims the primary candidate for `id`, probing suffixes on collision.
    async fn claim_key(
        &self,
        tx: &mut dyn LinkTransaction,
        id: i64,
        deadline: Instant,
    ) -> Result<String, AppError> {
        let n = u64::try_from(id).map_err(|_| {
            AppError::internal("Storage returned a negative id", json!({ "id": id }))
        })?;
        let primary = pad(&encode(n), self.min_len);
        let mut suffixes = ALPHABET.iter();
        let mut state = ClaimState::Proposed(primary.clone());

        loop {
            state = match state {
                ClaimState::Proposed(candidate) if candidate.len() > self.max_len => {
                    ClaimState::Colliding
                }
                ClaimState::Proposed(candidate) => {
                    match with_deadline(deadline, tx.try_set_key(id, &candidate)).await? {
                        KeyClaim::Claimed => ClaimState::Committed(candidate),
                        KeyClaim::Taken => {
                            metrics::counter!("key_collisions_total").increment(1);
                            tracing::debug!(candidate = %candidate, "Key candidate taken");
                            ClaimState::Colliding
                        }
                    }
                }
                ClaimState::Colliding => match suffixes.next() {
                    Some(&symbol) => ClaimState::Proposed(format!("{primary}{}", symbol as char)),
                    None => ClaimState::Exhausted,
                },
                ClaimState::Committed(key) => return Ok(key),
                ClaimState::Exhausted => {
                    tracing::warn!(primary = %primary, max_len = self.max_len, "Key space exhausted");
                    return Err(AppError::KeySpaceExhausted {
                        primary,
                        max_len: self.max_len,
                    });
                }
            };
        }
    }
}
