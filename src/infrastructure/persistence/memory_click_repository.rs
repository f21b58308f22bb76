//! In-process implementation of the click repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::entities::{DayCount, NewClick};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

/// Click repository backed by process memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryClickRepository {
    clicks: Arc<Mutex<Vec<NewClick>>>,
}

impl MemoryClickRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded clicks across all links.
    pub fn recorded(&self) -> usize {
        self.clicks.lock().len()
    }
}

#[async_trait]
impl ClickRepository for MemoryClickRepository {
    async fn record_click(&self, new_click: NewClick) -> Result<(), AppError> {
        self.clicks.lock().push(new_click);
        Ok(())
    }

    async fn totals(&self, link_id: i64) -> Result<(i64, Option<DateTime<Utc>>), AppError> {
        let clicks = self.clicks.lock();
        let mut total = 0i64;
        let mut last = None;

        for click in clicks.iter().filter(|c| c.link_id == link_id) {
            total += 1;
            last = last.max(Some(click.occurred_at));
        }

        Ok((total, last))
    }

    async fn daily(
        &self,
        link_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DayCount>, AppError> {
        let clicks = self.clicks.lock();
        let mut days = BTreeMap::new();

        for click in clicks
            .iter()
            .filter(|c| c.link_id == link_id && c.occurred_at >= from && c.occurred_at < to)
        {
            *days.entry(click.occurred_at.date_naive()).or_insert(0i64) += 1;
        }

        Ok(days
            .into_iter()
            .map(|(day, clicks)| DayCount { day, clicks })
            .collect())
    }
}
