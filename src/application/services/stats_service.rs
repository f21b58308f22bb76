//! Click statistics service.

use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde_json::json;

use crate::domain::entities::{DayCount, Link};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

/// Days covered when the caller gives no start date, today included.
pub const DEFAULT_RANGE_DAYS: u64 = 30;

/// Longest range a single stats request may cover.
pub const MAX_RANGE_DAYS: u64 = 366;

/// Click counts for one link.
#[derive(Debug, Clone)]
pub struct LinkStats {
    pub total_clicks: i64,
    pub last_clicked_at: Option<DateTime<Utc>>,
    /// First day of the range.
    pub from: NaiveDate,
    /// Last day of the range, inclusive.
    pub to: NaiveDate,
    /// Days with at least one click, in order.
    pub daily: Vec<DayCount>,
}

/// Service for reading click statistics.
pub struct StatsService {
    repository: Arc<dyn ClickRepository>,
}

impl StatsService {
    pub fn new(repository: Arc<dyn ClickRepository>) -> Self {
        Self { repository }
    }

    /// Returns totals and per-day counts for `link` between two UTC dates.
    ///
    /// `to` defaults to today and `from` to [`DEFAULT_RANGE_DAYS`] days
    /// ending at `to`. Both ends are inclusive.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `from` is after `to` or the range
    /// exceeds [`MAX_RANGE_DAYS`].
    pub async fn link_stats(
        &self,
        link: &Link,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<LinkStats, AppError> {
        let to = to.unwrap_or_else(|| Utc::now().date_naive());
        let from = match from {
            Some(from) => from,
            None => to
                .checked_sub_days(Days::new(DEFAULT_RANGE_DAYS - 1))
                .unwrap_or(NaiveDate::MIN),
        };

        if from > to {
            return Err(AppError::bad_request(
                "'from' must not be after 'to'",
                json!({ "from": from, "to": to }),
            ));
        }
        let span = (to - from).num_days().unsigned_abs() + 1;
        if span > MAX_RANGE_DAYS {
            return Err(AppError::bad_request(
                "Date range too large",
                json!({ "days": span, "max_days": MAX_RANGE_DAYS }),
            ));
        }

        let start = from.and_time(chrono::NaiveTime::MIN).and_utc();
        let end = to
            .checked_add_days(Days::new(1))
            .ok_or_else(|| AppError::bad_request("Date out of range", json!({ "to": to })))?
            .and_time(chrono::NaiveTime::MIN)
            .and_utc();

        let (total_clicks, last_clicked_at) = self.repository.totals(link.id).await?;
        let daily = self.repository.daily(link.id, start, end).await?;

        Ok(LinkStats {
            total_clicks,
            last_clicked_at,
            from,
            to,
            daily,
        })
    }
}
