use sha2::{Digest, Sha256};

/// Length of the hex-encoded visitor hash stored with each click.
const VISITOR_HASH_LEN: usize = 16;

/// Derives an anonymous visitor fingerprint from IP and User-Agent.
///
/// Raw addresses are never stored; only the first 16 hex characters of
/// `SHA-256(ip || user_agent)`.
pub fn visitor_hash(ip: &str, user_agent: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ip.as_bytes());
    hasher.update(user_agent.unwrap_or_default().as_bytes());

    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(VISITOR_HASH_LEN);
    digest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visitor_hash_is_stable_and_short() {
        let a = visitor_hash("192.0.2.1", Some("Mozilla/5.0"));
        let b = visitor_hash("192.0.2.1", Some("Mozilla/5.0"));

        assert_eq!(a, b);
        assert_eq!(a.len(), VISITOR_HASH_LEN);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_visitor_hash_depends_on_user_agent() {
        assert_ne!(
            visitor_hash("192.0.2.1", Some("Mozilla/5.0")),
            visitor_hash("192.0.2.1", Some("curl/8.0"))
        );
        assert_ne!(
            visitor_hash("192.0.2.1", None),
            visitor_hash("192.0.2.2", None)
        );
    }
}
