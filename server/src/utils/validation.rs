use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::models::Submitted;

/// Field-level validation failures, keyed by field name.
///
/// Every rule that fails adds a message; checks never stop at the first
/// failure, so a caller gets the full set back in one response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Messages recorded for `field`, empty if it passed.
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Checks that a caller-assigned key is present, an integer, and positive.
///
/// Returns the key only when it is usable for a lookup.
pub fn positive_key(
    errors: &mut FieldErrors,
    field: &str,
    label: &str,
    value: Option<&Submitted<i32>>,
) -> Option<i32> {
    match value {
        None => {
            errors.add(field, format!("{label} is required"));
            None
        }
        Some(Submitted::Unparsed(_)) => {
            errors.add(field, format!("{label} must be a whole number"));
            None
        }
        Some(Submitted::Parsed(key)) if *key <= 0 => {
            errors.add(field, format!("{label} must be a positive number"));
            None
        }
        Some(Submitted::Parsed(key)) => Some(*key),
    }
}

/// Resolves a submitted date to a calendar day, using `default` when the
/// field was left empty. Returns `None` after recording an error when the
/// value is not a date.
pub fn date_or(
    errors: &mut FieldErrors,
    field: &str,
    label: &str,
    value: Option<&Submitted<NaiveDateTime>>,
    default: NaiveDate,
) -> Option<NaiveDate> {
    match value {
        None => Some(default),
        Some(Submitted::Parsed(at)) => Some(at.date()),
        Some(Submitted::Unparsed(_)) => {
            errors.add(field, format!("{label} is not a valid date"));
            None
        }
    }
}

/// Checks a required text field against its character limit.
pub fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    label: &str,
    value: Option<&str>,
    max_chars: usize,
) {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        errors.add(field, format!("{label} is required"));
    } else if trimmed.chars().count() > max_chars {
        errors.add(
            field,
            format!("{label} must not exceed {max_chars} characters"),
        );
    }
}
