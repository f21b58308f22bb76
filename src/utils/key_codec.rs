//! Base-62 codec between numeric link ids and short keys.
//!
//! Keys are positional base-62 numerals over [`ALPHABET`]; the first symbol
//! (`'0'`) is the zero digit, so left-padding with it never changes the value.

/// Digits, then lowercase, then uppercase letters.
pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

const BASE: u64 = ALPHABET.len() as u64;

/// Errors returned by [`decode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyCodecError {
    #[error("invalid character '{ch}' at position {position}")]
    InvalidChar { ch: char, position: usize },

    #[error("value does not fit in 64 bits")]
    Overflow,

    #[error("empty key")]
    Empty,
}

/// Encodes `n` as a base-62 string. `encode(0)` is `"0"`.
pub fn encode(mut n: u64) -> String {
    if n == 0 {
        return (ALPHABET[0] as char).to_string();
    }

    let mut digits = Vec::with_capacity(11);
    while n > 0 {
        digits.push(ALPHABET[(n % BASE) as usize]);
        n /= BASE;
    }
    digits.reverse();

    // ALPHABET is ASCII
    digits.into_iter().map(char::from).collect()
}

/// Decodes a base-62 string produced by [`encode`] (optionally [`pad`]ded).
///
/// # Errors
///
/// - [`KeyCodecError::Empty`] for an empty string
/// - [`KeyCodecError::InvalidChar`] for any symbol outside [`ALPHABET`]
/// - [`KeyCodecError::Overflow`] when the value exceeds `u64::MAX`
pub fn decode(s: &str) -> Result<u64, KeyCodecError> {
    if s.is_empty() {
        return Err(KeyCodecError::Empty);
    }

    s.chars().enumerate().try_fold(0u64, |acc, (position, ch)| {
        let digit = digit_value(ch).ok_or(KeyCodecError::InvalidChar { ch, position })?;
        acc.checked_mul(BASE)
            .and_then(|v| v.checked_add(digit))
            .ok_or(KeyCodecError::Overflow)
    })
}

/// Left-pads `s` with the zero symbol up to `min_len` characters.
pub fn pad(s: &str, min_len: usize) -> String {
    if s.len() >= min_len {
        return s.to_string();
    }

    let mut padded = String::with_capacity(min_len);
    padded.extend(std::iter::repeat_n(ALPHABET[0] as char, min_len - s.len()));
    padded.push_str(s);
    padded
}

fn digit_value(ch: char) -> Option<u64> {
    match ch {
        '0'..='9' => Some(ch as u64 - '0' as u64),
        'a'..='z' => Some(ch as u64 - 'a' as u64 + 10),
        'A'..='Z' => Some(ch as u64 - 'A' as u64 + 36),
        _ => None,
    }
}
