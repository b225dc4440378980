//! Validation error types and the generic rule runner
//!
//! Each entity declares its field rules as a table of [`Rule`]s. The runner
//! evaluates every rule and returns the full list of violations, so a caller
//! can report all problems with a record at once.

use std::fmt;

use thiserror::Error;

/// A single field-level or cross-entity rule violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required field is missing or blank
    Empty { field: &'static str },

    /// Field exceeds maximum length (in characters)
    TooLong { field: &'static str, max: usize },

    /// Field doesn't match the required format
    InvalidFormat {
        field: &'static str,
        reason: &'static str,
    },

    /// Invalid enum variant
    InvalidVariant { field: &'static str, value: String },

    /// List field has no items
    EmptyList { field: &'static str },

    /// Referenced record does not exist
    MissingReference { field: &'static str, id: String },

    /// Referenced record could not be looked up (malformed id, storage failure)
    ReferenceLookup {
        field: &'static str,
        id: String,
        reason: String,
    },
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Empty { field }
            | Self::TooLong { field, .. }
            | Self::InvalidFormat { field, .. }
            | Self::InvalidVariant { field, .. }
            | Self::EmptyList { field }
            | Self::MissingReference { field, .. }
            | Self::ReferenceLookup { field, .. } => field,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} is required", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::InvalidFormat { field, reason } => write!(f, "{}: {}", field, reason),
            Self::InvalidVariant { field, value } => {
                write!(f, "invalid {} value: '{}'", field, value)
            }
            Self::EmptyList { field } => {
                write!(f, "{} must contain at least one item", field)
            }
            Self::MissingReference { field, id } => {
                write!(f, "{}: event '{}' does not exist", field, id)
            }
            Self::ReferenceLookup { field, id, reason } => {
                write!(f, "{}: could not verify event '{}': {}", field, id, reason)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// All violations found while validating one record.
///
/// Never empty: constructed only when at least one rule failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join_messages(.0))]
pub struct ValidationErrors(Vec<ValidationError>);

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    /// Wrap collected violations, returning `None` when there are none.
    pub fn from_vec(errors: Vec<ValidationError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self(errors))
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any violation names `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field() == field)
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(e: ValidationError) -> Self {
        Self(vec![e])
    }
}

/// A field name paired with a pure check over the whole record.
pub struct Rule<T> {
    pub field: &'static str,
    pub check: fn(&T) -> Result<(), ValidationError>,
}

/// Evaluate every rule against `record`, collecting all failures in rule order.
pub fn run_rules<T>(record: &T, rules: &[Rule<T>]) -> Vec<ValidationError> {
    rules
        .iter()
        .filter_map(|rule| {
            let result = (rule.check)(record);
            if let Err(e) = &result {
                tracing::debug!(field = rule.field, error = %e, "rule failed");
            }
            result.err()
        })
        .collect()
}

/// Non-blank after trimming.
pub fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(())
}

/// Non-blank after trimming and at most `max` characters long.
pub fn required_max(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    required(field, value)?;
    if value.trim().chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

/// At least one non-blank item.
pub fn non_empty_list(field: &'static str, items: &[String]) -> Result<(), ValidationError> {
    if items.iter().all(|item| item.trim().is_empty()) {
        return Err(ValidationError::EmptyList { field });
    }
    Ok(())
}
