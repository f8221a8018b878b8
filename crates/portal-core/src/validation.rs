//! # Field Validation
//!
//! Normalization and format checks applied when a record is built or patched.
//!
//! Every function trims its input first, then either returns the normalized
//! value or a `PortalError::Validation` naming the offending field.

use crate::PortalError;
use crate::primitives::{
    MAX_CAPACITY, MAX_LIST_LENGTH, MAX_LONG_TEXT_LENGTH, MAX_SHORT_TEXT_LENGTH, PASSWORD_MIN_LENGTH,
    USERNAME_MAX_LENGTH, USERNAME_MIN_LENGTH,
};
use regex::Regex;
use std::sync::LazyLock;

static ACADEMIC_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[^\s@]+@[a-z0-9.-]+\.(ac\.in|edu|edu\.in)$").expect("valid email regex")
});

static ACADEMIC_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9.-]+\.(ac\.in|edu|edu\.in)$").expect("valid domain regex")
});

static USERNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_]+$").expect("valid username regex"));

static GITHUB_PROFILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://(www\.)?github\.com/[A-Za-z0-9_-]+$").expect("valid github regex")
});

static TIME_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)-([01]\d|2[0-3]):([0-5]\d)$")
        .expect("valid time range regex")
});

// =============================================================================
// TEXT
// =============================================================================

/// A required short text field: trimmed, non-empty, bounded.
pub fn required_text(field: &str, value: &str) -> Result<String, PortalError> {
    bounded(field, value, MAX_SHORT_TEXT_LENGTH, true).map(|v| v.unwrap_or_default())
}

/// A required long text field such as a description.
pub fn required_long_text(field: &str, value: &str) -> Result<String, PortalError> {
    bounded(field, value, MAX_LONG_TEXT_LENGTH, true).map(|v| v.unwrap_or_default())
}

/// An optional short text field. Blank input collapses to `None`.
pub fn optional_text(field: &str, value: Option<&str>) -> Result<Option<String>, PortalError> {
    match value {
        Some(v) => bounded(field, v, MAX_SHORT_TEXT_LENGTH, false),
        None => Ok(None),
    }
}

/// An optional long text field. Blank input collapses to `None`.
pub fn optional_long_text(
    field: &str,
    value: Option<&str>,
) -> Result<Option<String>, PortalError> {
    match value {
        Some(v) => bounded(field, v, MAX_LONG_TEXT_LENGTH, false),
        None => Ok(None),
    }
}

fn bounded(
    field: &str,
    value: &str,
    max: usize,
    required: bool,
) -> Result<Option<String>, PortalError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return if required {
            Err(PortalError::Validation(format!("{} is required", field)))
        } else {
            Ok(None)
        };
    }
    if trimmed.len() > max {
        return Err(PortalError::Validation(format!(
            "{} exceeds maximum length of {} bytes",
            field, max
        )));
    }
    Ok(Some(trimmed.to_string()))
}

/// A free-form string list: entries are trimmed, blanks dropped, length bounded.
pub fn text_list(field: &str, values: &[String]) -> Result<Vec<String>, PortalError> {
    if values.len() > MAX_LIST_LENGTH {
        return Err(PortalError::Validation(format!(
            "{} accepts at most {} entries",
            field, MAX_LIST_LENGTH
        )));
    }
    let mut out = Vec::with_capacity(values.len());
    for value in values {
        if let Some(v) = bounded(field, value, MAX_SHORT_TEXT_LENGTH, false)? {
            out.push(v);
        }
    }
    Ok(out)
}

// =============================================================================
// ACCOUNT FIELDS
// =============================================================================

/// Lowercase an email and require an academic domain.
pub fn email(value: &str) -> Result<String, PortalError> {
    let normalized = value.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(PortalError::Validation("email is required".to_string()));
    }
    if normalized.len() > MAX_SHORT_TEXT_LENGTH || !ACADEMIC_EMAIL.is_match(&normalized) {
        return Err(PortalError::Validation(
            "Please use a college email address (.ac.in, .edu or .edu.in)".to_string(),
        ));
    }
    Ok(normalized)
}

/// Lowercase a username and check its length and alphabet.
pub fn username(value: &str) -> Result<String, PortalError> {
    let normalized = value.trim().to_lowercase();
    let len = normalized.chars().count();
    if len < USERNAME_MIN_LENGTH || len > USERNAME_MAX_LENGTH {
        return Err(PortalError::Validation(format!(
            "username must be between {} and {} characters",
            USERNAME_MIN_LENGTH, USERNAME_MAX_LENGTH
        )));
    }
    if !USERNAME.is_match(&normalized) {
        return Err(PortalError::Validation(
            "username may contain only lowercase letters, numbers and underscores".to_string(),
        ));
    }
    Ok(normalized)
}

/// Check a plaintext password (and its confirmation, when given) before hashing.
pub fn password(value: &str, confirmation: Option<&str>) -> Result<(), PortalError> {
    if value.len() < PASSWORD_MIN_LENGTH {
        return Err(PortalError::Validation(format!(
            "password must be at least {} characters",
            PASSWORD_MIN_LENGTH
        )));
    }
    if confirmation.is_some_and(|c| c != value) {
        return Err(PortalError::Validation("Passwords do not match".to_string()));
    }
    Ok(())
}

/// Optional GitHub profile link in `https://github.com/<handle>` form.
pub fn github_profile(value: Option<&str>) -> Result<Option<String>, PortalError> {
    let Some(link) = optional_text("githubProfile", value)? else {
        return Ok(None);
    };
    if !GITHUB_PROFILE.is_match(&link) {
        return Err(PortalError::Validation(
            "githubProfile must look like https://github.com/<username>".to_string(),
        ));
    }
    Ok(Some(link))
}

/// Lowercase a college domain and require an academic suffix.
pub fn college_domain(value: &str) -> Result<String, PortalError> {
    let normalized = value.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(PortalError::Validation("Domain is required".to_string()));
    }
    if normalized.len() > MAX_SHORT_TEXT_LENGTH || !ACADEMIC_DOMAIN.is_match(&normalized) {
        return Err(PortalError::Validation(
            "Please provide a valid academic domain (e.g. nitdgp.ac.in)".to_string(),
        ));
    }
    Ok(normalized)
}

// =============================================================================
// SCHEDULING FIELDS
// =============================================================================

/// An availability window in `HH:MM-HH:MM` form.
pub fn time_range(value: &str) -> Result<String, PortalError> {
    let trimmed = value.trim();
    if !TIME_RANGE.is_match(trimmed) {
        return Err(PortalError::Validation(
            "Time must be in HH:MM-HH:MM format".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// A positive headcount bounded by `MAX_CAPACITY`.
pub fn capacity(field: &str, value: u32) -> Result<u32, PortalError> {
    if value == 0 {
        return Err(PortalError::Validation(format!(
            "{} must be at least 1",
            field
        )));
    }
    if value > MAX_CAPACITY {
        return Err(PortalError::Validation(format!(
            "{} must be at most {}",
            field,
            MAX_CAPACITY
        )));
    }
    Ok(value)
}

// =============================================================================
// TESTS
// =============================================================================
