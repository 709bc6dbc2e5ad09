//! Error message templates
//!
//! Every rule that can fail has a positional template. `%s` (also `%d`,
//! `%i`, `%j`) is replaced by the next argument: the field's friendly name
//! first, then each non-empty rule option. `%%` is a literal percent sign.

use std::collections::HashMap;

use crate::errors::{RuleError, RuleResult};

/// Built-in templates, keyed by rule name
pub const DEFAULT_TEMPLATES: &[(&str, &str)] = &[
    ("required", "The %s field is required."),
    ("minLength", "The %s field must be at least %s characters in length."),
    ("maxLength", "The %s field cannot exceed %s characters in length."),
    ("exactLength", "The %s field must be exactly %s characters in length."),
    ("greaterThan", "The %s field must contain a number greater than %s."),
    ("lessThan", "The %s field must contain a number less than %s."),
    ("alpha", "The %s field may only contain alphabetical characters."),
    ("alphaNumeric", "The %s field may only contain alpha-numeric characters."),
    (
        "alphaNumericDash",
        "The %s field may only contain alpha-numeric characters and dashes.",
    ),
    ("numeric", "The %s field must contain only numbers."),
    ("integer", "The %s field must contain an integer."),
    ("decimal", "The %s field must contain a decimal number."),
    ("natural", "The %s field must contain only positive numbers."),
    ("naturalNoZero", "The %s field must contain a number greater than zero."),
    ("email", "The %s field must contain a valid email address."),
    ("regex", "The %s field is not in the correct format."),
    ("matches", "The %s field does not match its confirmation."),
    ("list", "The %s field must be a comma separated list."),
    ("minListLength", "The %s field must contain at least %s items."),
    ("maxListLength", "The %s field cannot contain more than %s items."),
    ("date", "The %s field must contain a valid date."),
    ("beforeDate", "The %s field must contain a date before %s."),
    ("afterDate", "The %s field must contain a date after %s."),
    ("boolean", "The %s field must be either true or false."),
];

/// Rule name to message template table
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MessageTemplates {
    templates: HashMap<String, String>,
}

impl Default for MessageTemplates {
    fn default() -> Self {
        DEFAULT_TEMPLATES.iter().copied().collect()
    }
}

impl MessageTemplates {
    /// Create an empty table
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    /// Add or replace a template (builder style)
    pub fn with(mut self, rule: impl Into<String>, template: impl Into<String>) -> Self {
        self.insert(rule, template);
        self
    }

    /// Add or replace a template
    pub fn insert(&mut self, rule: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(rule.into(), template.into());
    }

    /// Template for a rule
    pub fn get(&self, rule: &str) -> Option<&str> {
        self.templates.get(rule).map(String::as_str)
    }

    /// Whether the table has a template for a rule
    pub fn contains(&self, rule: &str) -> bool {
        self.templates.contains_key(rule)
    }

    /// Overlay another table on top of this one
    pub fn merge(&mut self, other: MessageTemplates) {
        self.templates.extend(other.templates);
    }

    /// Format the failure message for a rule
    ///
    /// # Example
    /// ```
    /// use ouroboros_rules::MessageTemplates;
    ///
    /// let templates = MessageTemplates::default();
    /// let message = templates
    ///     .format("minLength", "Username", &["5".to_string()])
    ///     .unwrap();
    /// assert_eq!(message, "The Username field must be at least 5 characters in length.");
    /// ```
    pub fn format(&self, rule: &str, friendly_name: &str, options: &[String]) -> RuleResult<String> {
        let template = self.get(rule).ok_or_else(|| RuleError::MissingTemplate {
            rule: rule.to_string(),
        })?;

        let args = std::iter::once(friendly_name)
            .chain(options.iter().map(String::as_str).filter(|o| !o.is_empty()));

        Ok(format_positional(template, args))
    }
}

impl<K, V> FromIterator<(K, V)> for MessageTemplates
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            templates: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Substitute positional placeholders; surplus arguments are dropped
fn format_positional<'a>(template: &str, args: impl IntoIterator<Item = &'a str>) -> String {
    let mut args = args.into_iter();
    let mut out = String::with_capacity(template.len() + 16);
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        match chars.peek().copied() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some(spec @ ('s' | 'd' | 'i' | 'j')) => {
                chars.next();
                match args.next() {
                    Some(arg) => out.push_str(arg),
                    None => {
                        out.push('%');
                        out.push(spec);
                    }
                }
            }
            _ => out.push('%'),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_default_table_covers_builtin_checks() {
        let templates = MessageTemplates::default();
        for (rule, _) in DEFAULT_TEMPLATES {
            assert!(templates.contains(rule));
        }
        assert!(!templates.contains("sanitize"));
    }

    #[test]
    fn test_format_friendly_name() {
        let templates = MessageTemplates::default();
        assert_eq!(
            templates.format("required", "Email", &[]).unwrap(),
            "The Email field is required."
        );
    }

    #[test]
    fn test_format_skips_empty_options() {
        let templates = MessageTemplates::empty().with("between", "%s must be %s to %s");
        assert_eq!(
            templates
                .format("between", "Age", &opts(&["", "18", "65"]))
                .unwrap(),
            "Age must be 18 to 65"
        );
    }

    #[test]
    fn test_format_drops_surplus_arguments() {
        let templates = MessageTemplates::default();
        let message = templates
            .format("regex", "Code", &opts(&["^[a-z]+$"]))
            .unwrap();
        assert_eq!(message, "The Code field is not in the correct format.");
    }

    #[test]
    fn test_format_missing_template() {
        let templates = MessageTemplates::empty();
        let err = templates.format("required", "Email", &[]).unwrap_err();
        assert_eq!(
            err,
            RuleError::MissingTemplate {
                rule: "required".to_string()
            }
        );
    }

    #[test]
    fn test_format_positional_edge_cases() {
        assert_eq!(format_positional("100%% of %s", ["it"]), "100% of it");
        assert_eq!(format_positional("%s and %s", ["one"]), "one and %s");
        assert_eq!(format_positional("50% off", ["x"]), "50% off");
        assert_eq!(format_positional("%d items", ["3"]), "3 items");
    }

    #[test]
    fn test_merge_overrides() {
        let mut templates = MessageTemplates::default();
        templates.merge(MessageTemplates::empty().with("required", "%s is mandatory"));
        assert_eq!(
            templates.format("required", "Name", &[]).unwrap(),
            "Name is mandatory"
        );
        assert!(templates.contains("email"));
    }
}
