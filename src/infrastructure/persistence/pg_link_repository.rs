//! PostgreSQL implementation of the link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;

use crate::domain::entities::{Link, NewAlias, PendingLink};
use crate::domain::repositories::{KeyClaim, LinkRepository, LinkTransaction, PendingInsert};
use crate::error::AppError;
use crate::utils::db_error::{SHORT_KEY_CONSTRAINT, SYSTEM_URL_CONSTRAINT, is_unique_violation_on};

const LINK_COLUMNS: &str =
    "id, short_key, long_url, is_custom, created_at, expires_at, is_disabled";

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    short_key: String,
    long_url: String,
    is_custom: bool,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    is_disabled: bool,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link {
            id: r.id,
            key: r.short_key,
            long_url: r.long_url,
            is_custom: r.is_custom,
            created_at: r.created_at,
            expires_at: r.expires_at,
            is_disabled: r.is_disabled,
        }
    }
}

/// PostgreSQL repository for link storage and allocation.
///
/// Uniqueness is enforced by the `links_short_key_key` constraint and the
/// partial index `links_system_long_url_key` (see `migrations/`).
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn get_by_key(&self, key: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE short_key = $1"
        ))
        .bind(key)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn get_by_canonical_url(&self, long_url: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            "SELECT {LINK_COLUMNS} FROM links \
             WHERE long_url = $1 AND is_custom = FALSE AND short_key IS NOT NULL"
        ))
        .bind(long_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn begin(&self) -> Result<Box<dyn LinkTransaction>, AppError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgLinkTransaction { tx }))
    }

    async fn insert_alias(&self, new_alias: NewAlias) -> Result<Link, AppError> {
        let result = sqlx::query_as::<_, LinkRow>(&format!(
            "INSERT INTO links (short_key, long_url, is_custom, expires_at) \
             VALUES ($1, $2, TRUE, $3) \
             RETURNING {LINK_COLUMNS}"
        ))
        .bind(&new_alias.alias)
        .bind(&new_alias.long_url)
        .bind(new_alias.expires_at)
        .fetch_one(self.pool.as_ref())
        .await;

        match result {
            Ok(row) => Ok(row.into()),
            Err(e) if is_unique_violation_on(&e, SHORT_KEY_CONSTRAINT) => {
                Err(AppError::AliasInUse {
                    alias: new_alias.alias,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn disable(&self, key: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE links SET is_disabled = TRUE WHERE short_key = $1")
            .bind(key)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(
                "Short link not found",
                json!({ "key": key }),
            ));
        }

        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}

/// Allocation transaction on a pooled connection.
///
/// `sqlx` rolls the transaction back when it is dropped uncommitted, which
/// covers cancellation mid-allocation.
struct PgLinkTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LinkTransaction for PgLinkTransaction {
    /// A duplicate URL aborts the transaction; the caller must roll back.
    async fn insert_pending(
        &mut self,
        long_url: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<PendingInsert, AppError> {
        let result = sqlx::query_as::<_, (i64, DateTime<Utc>)>(
            "INSERT INTO links (long_url, is_custom, expires_at) \
             VALUES ($1, FALSE, $2) \
             RETURNING id, created_at",
        )
        .bind(long_url)
        .bind(expires_at)
        .fetch_one(&mut *self.tx)
        .await;

        match result {
            Ok((id, created_at)) => Ok(PendingInsert::Inserted(PendingLink {
                id,
                long_url: long_url.to_string(),
                created_at,
                expires_at,
            })),
            Err(e) if is_unique_violation_on(&e, SYSTEM_URL_CONSTRAINT) => {
                Ok(PendingInsert::DuplicateUrl)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Runs inside a savepoint so a key collision leaves the enclosing
    /// transaction usable for the next candidate.
    async fn try_set_key(&mut self, id: i64, key: &str) -> Result<KeyClaim, AppError> {
        sqlx::query("SAVEPOINT claim_key")
            .execute(&mut *self.tx)
            .await?;

        let result = sqlx::query("UPDATE links SET short_key = $1 WHERE id = $2")
            .bind(key)
            .bind(id)
            .execute(&mut *self.tx)
            .await;

        match result {
            Ok(done) if done.rows_affected() == 1 => {
                sqlx::query("RELEASE SAVEPOINT claim_key")
                    .execute(&mut *self.tx)
                    .await?;
                Ok(KeyClaim::Claimed)
            }
            Ok(_) => Err(AppError::internal(
                "Pending link row vanished during allocation",
                json!({ "id": id }),
            )),
            Err(e) if is_unique_violation_on(&e, SHORT_KEY_CONSTRAINT) => {
                sqlx::query("ROLLBACK TO SAVEPOINT claim_key")
                    .execute(&mut *self.tx)
                    .await?;
                Ok(KeyClaim::Taken)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
