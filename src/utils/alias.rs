//! Custom alias validation.

use crate::error::AppError;
use regex::Regex;
use std::sync::LazyLock;

static ALIAS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{3,32}$").expect("alias pattern is valid"));

/// Keys that collide with service routes or well-known files.
pub const RESERVED_KEYS: &[&str] = &[
    "api",
    "v1",
    "healthz",
    "readyz",
    "metrics",
    "admin",
    "docs",
    "robots.txt",
    "favicon.ico",
    "sitemap.xml",
    "static",
    "assets",
    "app",
];

/// Returns true if `key` is reserved, ignoring case and surrounding whitespace.
pub fn is_reserved(key: &str) -> bool {
    let key = key.trim();
    RESERVED_KEYS.iter().any(|r| r.eq_ignore_ascii_case(key))
}

/// Validates a caller-chosen alias.
///
/// # Errors
///
/// - [`AppError::InvalidAlias`] unless the alias matches `^[A-Za-z0-9_-]{3,32}$`
/// - [`AppError::ReservedKey`] if the alias is a reserved word
pub fn validate_alias(alias: &str) -> Result<(), AppError> {
    if !ALIAS_REGEX.is_match(alias) {
        return Err(AppError::InvalidAlias {
            alias: alias.to_string(),
        });
    }

    if is_reserved(alias) {
        return Err(AppError::ReservedKey {
            alias: alias.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_allowed_characters() {
        for alias in ["abc", "My_Link-2024", "A1b2C3", &"x".repeat(32)] {
            assert!(validate_alias(alias).is_ok(), "{alias} should be valid");
        }
    }

    #[test]
    fn test_validate_rejects_length_bounds() {
        assert!(matches!(
            validate_alias("ab"),
            Err(AppError::InvalidAlias { .. })
        ));
        assert!(matches!(
            validate_alias(&"x".repeat(33)),
            Err(AppError::InvalidAlias { .. })
        ));
        assert!(matches!(
            validate_alias(""),
            Err(AppError::InvalidAlias { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_special_characters() {
        for alias in ["my link", "my.link", "a/b/c", "promo!", "ünï"] {
            assert!(matches!(
                validate_alias(alias),
                Err(AppError::InvalidAlias { .. })
            ));
        }
    }

    #[test]
    fn test_validate_rejects_reserved_case_insensitive() {
        assert!(matches!(
            validate_alias("ADMIN"),
            Err(AppError::ReservedKey { .. })
        ));
        assert!(matches!(
            validate_alias("Healthz"),
            Err(AppError::ReservedKey { .. })
        ));
    }

    #[test]
    fn test_reserved_words_with_dots_fail_pattern_first() {
        assert!(matches!(
            validate_alias("robots.txt"),
            Err(AppError::InvalidAlias { .. })
        ));
        assert!(is_reserved(" Robots.TXT "));
    }

    #[test]
    fn test_all_pattern_compatible_reserved_words_rejected() {
        for &reserved in RESERVED_KEYS
            .iter()
            .filter(|r| !r.contains('.') && r.len() >= 3)
        {
            assert!(
                matches!(
                    validate_alias(reserved),
                    Err(AppError::ReservedKey { .. })
                ),
                "Reserved key '{}' should be rejected",
                reserved
            );
        }
    }
}
