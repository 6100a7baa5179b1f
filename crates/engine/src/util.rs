//! Internal helpers for form normalization and validation.
//!
//! These utilities are **not** part of the public API. They centralize the
//! trim/empty rules so every op applies the same required-field semantics.

use crate::{EngineError, ResultEngine};

/// Trim a required text field; empty input is a validation error.
pub(crate) fn normalize_required(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field; blank input collapses to `None`.
pub(crate) fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// A required foreign-key selection; `None` is a validation error.
pub(crate) fn require_selected(value: Option<i32>, label: &str) -> ResultEngine<i32> {
    value.ok_or_else(|| EngineError::Validation(format!("{label} must be selected")))
}

/// Matches the form `local@domain.tld` with no whitespace and non-empty
/// parts, the same shape the employee editor accepts.
pub(crate) fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = value.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
