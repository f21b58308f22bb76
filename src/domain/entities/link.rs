//! Link entity representing a short key mapping.

use chrono::{DateTime, Utc};

/// A committed short link.
///
/// `key` is globally unique. At most one non-custom link exists per canonical
/// `long_url`. After creation only `is_disabled` ever changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub id: i64,
    pub key: String,
    pub long_url: String,
    pub is_custom: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_disabled: bool,
}

impl Link {
    /// Returns true if the link has passed its expiry time at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| now >= e)
    }

    /// Returns true if the link has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// A system-generated row inserted inside an allocation transaction but not
/// yet holding a key.
#[derive(Debug, Clone)]
pub struct PendingLink {
    pub id: i64,
    pub long_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl PendingLink {
    /// Builds the committed link once `key` has been claimed for this row.
    pub fn into_link(self, key: String) -> Link {
        Link {
            id: self.id,
            key,
            long_url: self.long_url,
            is_custom: false,
            created_at: self.created_at,
            expires_at: self.expires_at,
            is_disabled: false,
        }
    }
}

/// Input data for inserting a custom alias.
#[derive(Debug, Clone)]
pub struct NewAlias {
    pub alias: String,
    pub long_url: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn link(expires_at: Option<DateTime<Utc>>) -> Link {
        Link {
            id: 1,
            key: "000001".to_string(),
            long_url: "https://example.com/".to_string(),
            is_custom: false,
            created_at: Utc::now(),
            expires_at,
            is_disabled: false,
        }
    }

    #[test]
    fn test_link_without_expiry_never_expires() {
        assert!(!link(None).is_expired());
    }

    #[test]
    fn test_link_is_expired() {
        assert!(link(Some(Utc::now() - Duration::seconds(1))).is_expired());
        assert!(!link(Some(Utc::now() + Duration::hours(1))).is_expired());
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let at = Utc::now();
        assert!(link(Some(at)).is_expired_at(at));
    }

    #[test]
    fn test_pending_into_link() {
        let now = Utc::now();
        let pending = PendingLink {
            id: 42,
            long_url: "https://rust-lang.org/".to_string(),
            created_at: now,
            expires_at: None,
        };

        let link = pending.into_link("00000G".to_string());

        assert_eq!(link.id, 42);
        assert_eq!(link.key, "00000G");
        assert_eq!(link.created_at, now);
        assert!(!link.is_custom);
        assert!(!link.is_disabled);
    }
}
