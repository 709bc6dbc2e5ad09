//! Error types for rule configuration
//!
//! Configuration errors are raised synchronously by [`Session::add_rule`]
//! and indicate a defect in the rule string, never in the user data.
//! Failed validations are reported through [`ValidationOutcome`] instead.
//!
//! [`Session::add_rule`]: crate::Session::add_rule
//! [`ValidationOutcome`]: crate::ValidationOutcome

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

// ============================================================================
// Configuration Errors
// ============================================================================

/// Result type for rule configuration
pub type RuleResult<T> = Result<T, RuleError>;

/// Errors raised while configuring a session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// The rule name is not present in the registry
    #[error("Unknown rule: '{rule}'")]
    UnknownRule { rule: String },

    /// The rule needs `[...]` options and none were given
    #[error("Rule '{rule}' can't operate without options")]
    MissingOptions { rule: String },

    /// The `regex[...]` pattern does not compile
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// No message template exists for a rule that can fail
    #[error("No error message template for rule '{rule}'")]
    MissingTemplate { rule: String },

    /// A record value is not a flat, string-coercible value
    #[error("Field '{field}' holds a nested value")]
    UnsupportedValue { field: String },
}

impl RuleError {
    /// Name of the rule the error refers to, if any
    pub fn rule(&self) -> Option<&str> {
        match self {
            Self::UnknownRule { rule }
            | Self::MissingOptions { rule }
            | Self::MissingTemplate { rule } => Some(rule),
            Self::InvalidPattern { .. } => Some("regex"),
            Self::UnsupportedValue { .. } => None,
        }
    }
}

// ============================================================================
// Validation Failures
// ============================================================================

/// Field name to joined error messages, ordered by field name
pub type ErrorMap = BTreeMap<String, String>;

/// Per-field validation failures of a completed run
///
/// Produced by [`ValidationOutcome::into_result`](crate::ValidationOutcome::into_result)
/// so callers can use `?` on a validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors {
    errors: ErrorMap,
}

impl FieldErrors {
    pub(crate) fn new(errors: ErrorMap) -> Self {
        Self { errors }
    }

    /// Number of failing fields
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always false for errors produced by a run
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Joined message for one field
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    /// Iterate over `(field, message)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Unwrap into the underlying map
    pub fn into_map(self) -> ErrorMap {
        self.errors
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} field(s) failed validation", self.errors.len())
    }
}

impl std::error::Error for FieldErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RuleError::MissingOptions {
            rule: "minLength".to_string(),
        };
        assert_eq!(err.to_string(), "Rule 'minLength' can't operate without options");

        let err = RuleError::UnknownRule {
            rule: "nope".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown rule: 'nope'");
    }

    #[test]
    fn test_error_rule_name() {
        let err = RuleError::InvalidPattern {
            pattern: "(".to_string(),
            reason: "unclosed group".to_string(),
        };
        assert_eq!(err.rule(), Some("regex"));

        let err = RuleError::UnsupportedValue {
            field: "tags".to_string(),
        };
        assert_eq!(err.rule(), None);
    }

    #[test]
    fn test_field_errors() {
        let mut map = ErrorMap::new();
        map.insert("email".to_string(), "The Email field is required.".to_string());
        let errors = FieldErrors::new(map);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("email"), Some("The Email field is required."));
        assert_eq!(errors.get("name"), None);
        assert_eq!(errors.to_string(), "1 field(s) failed validation");
    }
}
