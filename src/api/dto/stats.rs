//! DTOs for per-link click statistics.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::application::services::LinkStats;

/// Query parameters for `GET /api/links/{key}/stats`.
///
/// Both dates are UTC and inclusive.
#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Clicks on one UTC day.
#[derive(Debug, Serialize)]
pub struct DailyClicks {
    pub date: NaiveDate,
    pub clicks: i64,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub key: String,
    pub total_clicks: i64,
    pub last_clicked_at: Option<DateTime<Utc>>,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub daily: Vec<DailyClicks>,
}

impl StatsResponse {
    pub fn new(key: String, stats: LinkStats) -> Self {
        Self {
            key,
            total_clicks: stats.total_clicks,
            last_clicked_at: stats.last_clicked_at,
            from: stats.from,
            to: stats.to,
            daily: stats
                .daily
                .into_iter()
                .map(|d| DailyClicks {
                    date: d.day,
                    clicks: d.clicks,
                })
                .collect(),
        }
    }
}
