//! Field-level validation errors shared by every calculator.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Field name used for errors that are not tied to a single input.
pub const GENERAL_FIELD: &str = "general";

/// Reported when a figure leaves the range a `Decimal` can hold.
pub const TOO_LARGE_MESSAGE: &str = "These amounts are too large to calculate";

/// A single failed check, keyed by the input it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every check that failed for one submission.
///
/// A field carries at most one message; a later check on the same field
/// replaces the earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{}", summary(.0))]
pub struct ValidationErrors(Vec<FieldError>);

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single general error for inputs whose costs overflow.
    pub fn too_large() -> Self {
        let mut errors = Self::new();
        errors.add(GENERAL_FIELD, TOO_LARGE_MESSAGE);
        errors
    }

    /// Records an error, replacing any earlier message for the same field.
    pub fn add(
        &mut self,
        field: impl Into<String>,
        message: impl Into<String>,
    ) {
        let error = FieldError::new(field, message);
        match self.0.iter_mut().find(|e| e.field == error.field) {
            Some(existing) => *existing = error,
            None => self.0.push(error),
        }
    }

    /// Records an error when `failed` is true.
    pub fn check(
        &mut self,
        failed: bool,
        field: &str,
        message: &str,
    ) {
        if failed {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Message recorded for `field`, if any.
    pub fn message_for(
        &self,
        field: &str,
    ) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// `Ok(())` when nothing failed, otherwise the collected errors.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_errors_convert_to_ok() {
        assert_eq!(ValidationErrors::new().into_result(), Ok(()));
    }

    #[test]
    fn later_error_replaces_earlier_for_same_field() {
        let mut errors = ValidationErrors::new();
        errors.add("cost", "Product cost must be greater than 0");
        errors.add("cost", "Product cost must be less than product price");

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.message_for("cost"),
            Some("Product cost must be less than product price")
        );
    }

    #[test]
    fn check_only_records_failures() {
        let mut errors = ValidationErrors::new();
        errors.check(false, "pallets", "never");
        errors.check(true, "units", "Units are wrong");

        assert_eq!(errors.errors(), &[FieldError::new("units", "Units are wrong")]);
    }

    #[test]
    fn too_large_is_a_general_error() {
        let errors = ValidationErrors::too_large();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.message_for(GENERAL_FIELD), Some(TOO_LARGE_MESSAGE));
    }

    #[test]
    fn display_joins_messages() {
        let mut errors = ValidationErrors::new();
        errors.add("a", "first");
        errors.add("b", "second");

        assert_eq!(errors.to_string(), "first; second");
    }
}
