//! Argument validation
//!
//! Fail-fast precondition checks. Every public cache and facade operation
//! validates its identifiers with these before touching any shared state.

use once_cell::sync::Lazy;
use regex::Regex;

// Partition ids and resource names share the same restricted alphabet.
static IDENTIFIER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// Precondition failure raised by the validators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required argument was absent.
    #[error("{0} must not be null")]
    NullArgument(String),

    /// A required string argument was empty or whitespace.
    #[error("{0} must not be empty")]
    EmptyArgument(String),

    /// An identifier contained characters outside `[A-Za-z0-9_-]`.
    #[error("{field} must contain only characters in [A-Za-z0-9_-], got {value:?}")]
    InvalidFormat { field: String, value: String },
}

/// Unwraps `value`, failing with [`ValidationError::NullArgument`] naming
/// `field` when it is absent.
pub fn require_present<T>(value: Option<T>, field: &str) -> Result<T, ValidationError> {
    value.ok_or_else(|| ValidationError::NullArgument(field.to_string()))
}

/// Unwraps `value`, additionally failing with
/// [`ValidationError::EmptyArgument`] when the trimmed string is empty.
pub fn require_non_empty<'a>(
    value: Option<&'a str>,
    field: &str,
) -> Result<&'a str, ValidationError> {
    let value = require_present(value, field)?;
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyArgument(field.to_string()));
    }
    Ok(value)
}

/// Checks that every character of `value` falls in `[A-Za-z0-9_-]`.
pub fn require_allowed_characters(value: &str, field: &str) -> Result<(), ValidationError> {
    if IDENTIFIER_REGEX.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            value: value.to_string(),
        })
    }
}
