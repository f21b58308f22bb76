//! Storage contract for short links.
//!
//! The allocator relies on two uniqueness guarantees enforced by the backend:
//! a unique key column, and at most one non-custom row per canonical URL.
//! Collisions on either are reported as values ([`PendingInsert::DuplicateUrl`],
//! [`KeyClaim::Taken`]) because the allocator uses them as control flow.

use crate::domain::entities::{Link, NewAlias, PendingLink};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Outcome of inserting a pending system row.
#[derive(Debug, Clone)]
pub enum PendingInsert {
    /// The row was inserted and holds a fresh id.
    Inserted(PendingLink),
    /// Another transaction already owns a non-custom row for this URL.
    DuplicateUrl,
}

/// Outcome of claiming a key for a pending row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClaim {
    Claimed,
    /// The key belongs to another row; the transaction remains usable.
    Taken,
}

/// Repository interface for short links.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryLinkRepository`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Finds a committed link by key, custom or not.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn get_by_key(&self, key: &str) -> Result<Option<Link>, AppError>;

    /// Finds the non-custom link for a canonical URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn get_by_canonical_url(&self, long_url: &str) -> Result<Option<Link>, AppError>;

    /// Opens an allocation transaction.
    ///
    /// Dropping the returned handle without calling
    /// [`LinkTransaction::commit`] rolls the transaction back.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn begin(&self) -> Result<Box<dyn LinkTransaction>, AppError>;

    /// Inserts a custom alias in a single statement.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::AliasInUse`] if the key is already taken.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn insert_alias(&self, new_alias: NewAlias) -> Result<Link, AppError>;

    /// Marks a link as disabled.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this key.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn disable(&self, key: &str) -> Result<(), AppError>;

    /// Checks that the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the backend does not answer.
    async fn ping(&self) -> Result<(), AppError>;
}

/// An open allocation transaction.
#[async_trait]
pub trait LinkTransaction: Send {
    /// Inserts a non-custom row with no key to obtain its id and creation time.
    async fn insert_pending(
        &mut self,
        long_url: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<PendingInsert, AppError>;

    /// Tries to assign `key` to the pending row `id`.
    async fn try_set_key(&mut self, id: i64, key: &str) -> Result<KeyClaim, AppError>;

    async fn commit(self: Box<Self>) -> Result<(), AppError>;

    async fn rollback(self: Box<Self>) -> Result<(), AppError>;
}
