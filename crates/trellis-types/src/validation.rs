//! Shared payload validation helpers.

use thiserror::Error;

/// A registration or operation payload failed its shape check.
///
/// Always names the offending field so callers can surface actionable
/// messages. Never retried.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid field `{field}`: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Whether `value` is a 64-character lowercase hex SHA-256 digest.
pub fn is_hex_digest(value: &str) -> bool {
    value.len() == 64
        && value
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
