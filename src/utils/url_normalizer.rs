//! URL canonicalization.
//!
//! The canonical form is the dedup key for system-generated links, so the same
//! input must always produce the same output.

use crate::error::AppError;
use url::Url;

/// Errors that can occur during canonicalization.
#[derive(Debug, thiserror::Error)]
pub enum CanonicalizeError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL has no host")]
    MissingHost,

    #[error("Failed to normalize URL: {0}")]
    NormalizationFailed(String),
}

impl From<CanonicalizeError> for AppError {
    fn from(e: CanonicalizeError) -> Self {
        AppError::InvalidUrl {
            reason: e.to_string(),
        }
    }
}

/// Normalizes a raw URL to its canonical form.
///
/// # Normalization Rules
///
/// 1. **Whitespace**: Leading and trailing whitespace is ignored
/// 2. **Protocol**: Only HTTP and HTTPS are allowed
/// 3. **Hostname**: Must be present; converted to lowercase
/// 4. **Default ports**: Removed (80 for HTTP, 443 for HTTPS)
/// 5. **Fragments**: Removed (e.g., `#section`)
/// 6. **Path and query**: Preserved as-is
///
/// # Errors
///
/// Returns [`CanonicalizeError::InvalidFormat`] for malformed URLs,
/// [`CanonicalizeError::UnsupportedProtocol`] for non-HTTP(S) schemes and
/// [`CanonicalizeError::MissingHost`] when the host is empty.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     canonicalize("HTTP://Example.com:80/x#y").unwrap(),
///     "http://example.com/x"
/// );
/// ```
pub fn canonicalize(raw: &str) -> Result<String, CanonicalizeError> {
    let mut url =
        Url::parse(raw.trim()).map_err(|e| CanonicalizeError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(CanonicalizeError::UnsupportedProtocol),
    }

    let host = match url.host_str() {
        Some(host) if !host.is_empty() => host.to_ascii_lowercase(),
        _ => return Err(CanonicalizeError::MissingHost),
    };
    url.set_host(Some(&host)).map_err(|_| {
        CanonicalizeError::NormalizationFailed("Failed to set normalized host".to_string())
    })?;

    url.set_fragment(None);

    let is_default_port = matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    );
    if is_default_port {
        url.set_port(None).map_err(|_| {
            CanonicalizeError::NormalizationFailed("Failed to remove default port".to_string())
        })?;
    }

    Ok(url.to_string())
}
