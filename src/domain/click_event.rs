//! Click event model for asynchronous click tracking.

use chrono::{DateTime, Utc};

use crate::domain::entities::NewClick;
use crate::utils::visitor::visitor_hash;

/// Request metadata captured by the redirect handler.
///
/// Sent over a bounded channel to [`crate::domain::click_worker::run_click_worker`]
/// so the redirect response never waits on analytics writes. The raw IP only
/// lives in memory; it is hashed before anything is persisted.
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub link_id: i64,
    pub occurred_at: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

impl ClickEvent {
    /// Creates a click event stamped with the current time.
    pub fn new(
        link_id: i64,
        ip: Option<String>,
        user_agent: Option<&str>,
        referer: Option<&str>,
    ) -> Self {
        Self {
            link_id,
            occurred_at: Utc::now(),
            ip,
            user_agent: user_agent.map(|s| s.to_string()),
            referer: referer.filter(|s| !s.is_empty()).map(|s| s.to_string()),
        }
    }

    /// Converts the event into a persistable click, replacing the IP with a
    /// visitor hash.
    pub fn into_new_click(self) -> NewClick {
        let visitor_hash = self
            .ip
            .as_deref()
            .map(|ip| visitor_hash(ip, self.user_agent.as_deref()));

        NewClick {
            link_id: self.link_id,
            occurred_at: self.occurred_at,
            visitor_hash,
            user_agent: self.user_agent,
            referer: self.referer,
        }
    }
}
