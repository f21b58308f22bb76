/// Unique constraint on `links.short_key`.
pub const SHORT_KEY_CONSTRAINT: &str = "links_short_key_key";

/// Partial unique index on `links.long_url` for system-generated rows.
pub const SYSTEM_URL_CONSTRAINT: &str = "links_system_long_url_key";

/// Returns true if `e` is a unique violation on the named constraint.
pub fn is_unique_violation_on(e: &sqlx::Error, constraint: &str) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    if !db_err.is_unique_violation() {
        return false;
    }

    db_err.constraint() == Some(constraint)
}
