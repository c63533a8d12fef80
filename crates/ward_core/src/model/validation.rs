//! Write-time validation shared by the ward records.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Rejected input for a family, member or request write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text is empty after trimming.
    EmptyField(&'static str),
    /// Zone is outside `1..=5`.
    ZoneOutOfRange(i64),
    /// House number is zero, negative or too large.
    InvalidHouseNumber(i64),
    /// Text exceeds its storage bound.
    TooLong {
        field: &'static str,
        max_chars: usize,
        actual_chars: usize,
    },
    /// Enumerated text is not one of the recognized values.
    UnknownValue { field: &'static str, value: String },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "`{field}` must not be empty"),
            Self::ZoneOutOfRange(zone) => write!(f, "zone must be between 1 and 5, got {zone}"),
            Self::InvalidHouseNumber(value) => {
                write!(f, "house number must be a positive integer, got {value}")
            }
            Self::TooLong {
                field,
                max_chars,
                actual_chars,
            } => write!(
                f,
                "`{field}` allows at most {max_chars} characters, got {actual_chars}"
            ),
            Self::UnknownValue { field, value } => {
                write!(f, "unrecognized {field} value `{value}`")
            }
        }
    }
}

impl Error for ValidationError {}

/// Normalizes a required single-line label: trims and collapses whitespace runs.
pub fn required_label(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let normalized = WHITESPACE_RE.replace_all(value.trim(), " ").into_owned();
    if normalized.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(normalized)
}

/// Normalizes an optional single-line label. Blank input becomes `None`.
pub fn optional_label(
    field: &'static str,
    value: Option<&str>,
    max_chars: usize,
) -> Result<Option<String>, ValidationError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let normalized = WHITESPACE_RE.replace_all(value.trim(), " ").into_owned();
    if normalized.is_empty() {
        return Ok(None);
    }
    ensure_max_chars(field, &normalized, max_chars)?;
    Ok(Some(normalized))
}

/// Validates required free text, keeping inner line breaks.
pub fn required_text(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    ensure_max_chars(field, trimmed, max_chars)?;
    Ok(trimmed.to_string())
}

/// Validates optional free text. Blank input becomes `None`.
pub fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max_chars: usize,
) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(trimmed) => {
            ensure_max_chars(field, trimmed, max_chars)?;
            Ok(Some(trimmed.to_string()))
        }
    }
}

fn ensure_max_chars(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), ValidationError> {
    let actual_chars = value.chars().count();
    if actual_chars > max_chars {
        return Err(ValidationError::TooLong {
            field,
            max_chars,
            actual_chars,
        });
    }
    Ok(())
}

/// Uppercases and joins words with `_` so `in progress`, `In-Progress` and
/// `IN_PROGRESS` all compare equal.
pub(crate) fn enum_key(value: &str) -> String {
    value
        .trim()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_uppercase)
        .collect::<Vec<_>>()
        .join("_")
}
