//! PostgreSQL implementation of the click repository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{DayCount, NewClick};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

/// PostgreSQL repository for click events.
pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn record_click(&self, new_click: NewClick) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO clicks (link_id, occurred_at, visitor_hash, user_agent, referer) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(new_click.link_id)
        .bind(new_click.occurred_at)
        .bind(new_click.visitor_hash)
        .bind(new_click.user_agent)
        .bind(new_click.referer)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn totals(&self, link_id: i64) -> Result<(i64, Option<DateTime<Utc>>), AppError> {
        let row = sqlx::query_as::<_, (i64, Option<DateTime<Utc>>)>(
            "SELECT COUNT(*), MAX(occurred_at) FROM clicks WHERE link_id = $1",
        )
        .bind(link_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row)
    }

    async fn daily(
        &self,
        link_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DayCount>, AppError> {
        let rows = sqlx::query_as::<_, (NaiveDate, i64)>(
            "SELECT (occurred_at AT TIME ZONE 'UTC')::date AS day, COUNT(*) \
             FROM clicks \
             WHERE link_id = $1 AND occurred_at >= $2 AND occurred_at < $3 \
             GROUP BY day \
             ORDER BY day",
        )
        .bind(link_id)
        .bind(from)
        .bind(to)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(day, clicks)| DayCount { day, clicks })
            .collect())
    }
}
