//! Click tracking entities.

use chrono::{DateTime, NaiveDate, Utc};

/// Input data for recording a redirect.
///
/// Only an anonymous visitor hash is kept, never the raw client address.
#[derive(Debug, Clone, PartialEq)]
pub struct NewClick {
    pub link_id: i64,
    pub occurred_at: DateTime<Utc>,
    pub visitor_hash: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

/// Number of clicks on a single UTC day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCount {
    pub day: NaiveDate,
    pub clicks: i64,
}
