//! Built-in rule checks
//!
//! Every check has the shape `fn(value, options) -> bool` and is wrapped in
//! an [`FnPredicate`](crate::registry::FnPredicate) by the registry. Except
//! for [`required`], checks only ever see non-empty values.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::dates::{is_date, parse_date};

// ============================================================================
// Pre-compiled Regex Patterns
// ============================================================================

static ALPHA_REGEX: Lazy<Regex> = Lazy::new(|| ascii_class(r"^[a-z]+$"));

static ALPHA_NUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| ascii_class(r"^[a-z0-9]+$"));

static ALPHA_NUMERIC_DASH_REGEX: Lazy<Regex> = Lazy::new(|| ascii_class(r"^[a-z0-9\-]+$"));

static NUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| ascii_class(r"^[0-9]+$"));

static INTEGER_REGEX: Lazy<Regex> = Lazy::new(|| ascii_class(r"^[\-+]?[0-9]+$"));

static DECIMAL_REGEX: Lazy<Regex> = Lazy::new(|| ascii_class(r"^[\-+]?[0-9]+(\.[0-9]+)?$"));

static NATURAL_REGEX: Lazy<Regex> = Lazy::new(|| ascii_class(r"^\+?[0-9]+$"));

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    ascii_class(r"^\s*[\w\-+]+(\.[\w\-+]+)*@[\w\-+]+\.[\w\-+]+(\.[\w\-+]+)*\s*$")
});

fn ascii_class(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .unicode(false)
        .build()
        .expect("built-in pattern is valid")
}

/// Compile a user pattern the way the `regex` rule evaluates it
/// (case-insensitive, unanchored)
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

// ============================================================================
// Option Helpers
// ============================================================================

fn first_option(options: &[String]) -> Option<&str> {
    options.first().map(String::as_str)
}

fn count_option(options: &[String]) -> Option<usize> {
    first_option(options).and_then(|o| o.trim().parse().ok())
}

/// Integer prefix of a string: leading whitespace, optional sign, digits
///
/// `"12px"` parses as `12`; `"px"` has no integer prefix.
pub fn parse_int_prefix(value: &str) -> Option<i64> {
    let s = value.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

// ============================================================================
// Presence and Length
// ============================================================================

/// Value has at least one character (`"0"` counts as present)
pub fn required(value: &str, _options: &[String]) -> bool {
    !value.is_empty()
}

/// At least `options[0]` characters
///
/// # Example
/// ```
/// use ouroboros_rules::predicates::min_length;
///
/// let five = vec!["5".to_string()];
/// assert!(min_length("héllo", &five));
/// assert!(!min_length("abc", &five));
/// ```
pub fn min_length(value: &str, options: &[String]) -> bool {
    count_option(options).is_some_and(|min| value.chars().count() >= min)
}

/// At most `options[0]` characters
pub fn max_length(value: &str, options: &[String]) -> bool {
    count_option(options).is_some_and(|max| value.chars().count() <= max)
}

/// Exactly `options[0]` characters
pub fn exact_length(value: &str, options: &[String]) -> bool {
    count_option(options).is_some_and(|len| value.chars().count() == len)
}

// ============================================================================
// Numeric Comparison
// ============================================================================

/// Integer prefix of the value is greater than `options[0]`
///
/// # Example
/// ```
/// use ouroboros_rules::predicates::greater_than;
///
/// let ten = vec!["10".to_string()];
/// assert!(greater_than("12px", &ten));
/// assert!(!greater_than("10", &ten));
/// assert!(!greater_than("px", &ten));
/// ```
pub fn greater_than(value: &str, options: &[String]) -> bool {
    match (parse_int_prefix(value), first_option(options).and_then(parse_int_prefix)) {
        (Some(v), Some(bound)) => v > bound,
        _ => false,
    }
}

/// Integer prefix of the value is less than `options[0]`
pub fn less_than(value: &str, options: &[String]) -> bool {
    match (parse_int_prefix(value), first_option(options).and_then(parse_int_prefix)) {
        (Some(v), Some(bound)) => v < bound,
        _ => false,
    }
}

// ============================================================================
// Character Classes
// ============================================================================

/// ASCII letters only
pub fn alpha(value: &str, _options: &[String]) -> bool {
    ALPHA_REGEX.is_match(value)
}

/// ASCII letters and digits only
pub fn alpha_numeric(value: &str, _options: &[String]) -> bool {
    ALPHA_NUMERIC_REGEX.is_match(value)
}

/// ASCII letters, digits and dashes only
pub fn alpha_numeric_dash(value: &str, _options: &[String]) -> bool {
    ALPHA_NUMERIC_DASH_REGEX.is_match(value)
}

/// Digits only
pub fn numeric(value: &str, _options: &[String]) -> bool {
    NUMERIC_REGEX.is_match(value)
}

/// Optionally signed whole number
pub fn integer(value: &str, _options: &[String]) -> bool {
    INTEGER_REGEX.is_match(value)
}

/// Optionally signed number with an optional fractional part
pub fn decimal(value: &str, _options: &[String]) -> bool {
    DECIMAL_REGEX.is_match(value)
}

/// Unsigned whole number, zero included
pub fn natural(value: &str, _options: &[String]) -> bool {
    NATURAL_REGEX.is_match(value)
}

/// Unsigned whole number greater than zero
pub fn natural_no_zero(value: &str, _options: &[String]) -> bool {
    NATURAL_REGEX.is_match(value) && parse_int_prefix(value).is_some_and(|n| n > 0)
}

// ============================================================================
// Formats and Patterns
// ============================================================================

/// Email address shape
///
/// # Example
/// ```
/// use ouroboros_rules::predicates::email;
///
/// assert!(email("ada@example.com", &[]));
/// assert!(!email("ada@", &[]));
/// ```
pub fn email(value: &str, _options: &[String]) -> bool {
    EMAIL_REGEX.is_match(value)
}

/// Case-insensitive search for the pattern in `options[0]`, compiled per call
///
/// Sessions match the pattern compiled when the rule was added instead.
pub fn pattern(value: &str, options: &[String]) -> bool {
    first_option(options)
        .and_then(|p| compile_pattern(p).ok())
        .is_some_and(|re| re.is_match(value))
}

/// `options[0]` is the other field's value, resolved when the rule was added
pub fn matches(value: &str, options: &[String]) -> bool {
    first_option(options) == Some(value)
}

/// Exactly `true` or `false`
pub fn boolean(value: &str, _options: &[String]) -> bool {
    value == "true" || value == "false"
}

// ============================================================================
// Lists
// ============================================================================

/// Comma separated, every element non-empty. Commas cannot be escaped.
pub fn list(value: &str, _options: &[String]) -> bool {
    value.split(',').all(|item| !item.is_empty())
}

/// At least `options[0]` comma separated items
pub fn min_list_length(value: &str, options: &[String]) -> bool {
    count_option(options).is_some_and(|min| value.split(',').count() >= min)
}

/// At most `options[0]` comma separated items
pub fn max_list_length(value: &str, options: &[String]) -> bool {
    count_option(options).is_some_and(|max| value.split(',').count() <= max)
}

// ============================================================================
// Dates
// ============================================================================

/// Any shape [`parse_date`] accepts
pub fn date(value: &str, _options: &[String]) -> bool {
    is_date(value)
}

/// Date strictly before the date in `options[0]`
pub fn before_date(value: &str, options: &[String]) -> bool {
    match (parse_date(value), first_option(options).and_then(parse_date)) {
        (Some(v), Some(bound)) => v < bound,
        _ => false,
    }
}

/// Date strictly after the date in `options[0]`
pub fn after_date(value: &str, options: &[String]) -> bool {
    match (parse_date(value), first_option(options).and_then(parse_date)) {
        (Some(v), Some(bound)) => v > bound,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opt(value: &str) -> Vec<String> {
        vec![value.to_string()]
    }

    #[test]
    fn test_required() {
        assert!(required("0", &[]));
        assert!(required(" ", &[]));
        assert!(!required("", &[]));
    }

    #[test]
    fn test_lengths_count_chars() {
        assert!(min_length("héllo", &opt("5")));
        assert!(!min_length("hi", &opt("5")));
        assert!(max_length("héllo", &opt("5")));
        assert!(!max_length("hello!", &opt("5")));
        assert!(exact_length("abc", &opt("3")));
        assert!(!exact_length("abcd", &opt("3")));
    }

    #[test]
    fn test_unparseable_count_fails() {
        assert!(!min_length("hello", &opt("five")));
        assert!(!max_length("hello", &[]));
    }

    #[test]
    fn test_parse_int_prefix() {
        assert_eq!(parse_int_prefix("42"), Some(42));
        assert_eq!(parse_int_prefix("  -7"), Some(-7));
        assert_eq!(parse_int_prefix("+3"), Some(3));
        assert_eq!(parse_int_prefix("12px"), Some(12));
        assert_eq!(parse_int_prefix("px"), None);
        assert_eq!(parse_int_prefix("-"), None);
    }

    #[test]
    fn test_numeric_comparison() {
        assert!(greater_than("11", &opt("10")));
        assert!(!greater_than("10", &opt("10")));
        assert!(!greater_than("12.9", &opt("12x")));
        assert!(less_than("-1", &opt("0")));
        assert!(!less_than("abc", &opt("10")));
    }

    #[test]
    fn test_character_classes() {
        assert!(alpha("Hello"));
        assert!(!alpha("héllo"));
        assert!(alpha_numeric("abc123"));
        assert!(!alpha_numeric("abc-123"));
        assert!(alpha_numeric_dash("abc-123"));
        assert!(numeric("0123"));
        assert!(!numeric("-1"));
        assert!(integer("-12"));
        assert!(integer("+12"));
        assert!(!integer("1.5"));
        assert!(decimal("1.5"));
        assert!(decimal("-3"));
        assert!(!decimal("1."));
        assert!(natural("0"));
        assert!(natural("+5"));
        assert!(!natural("-5"));
        assert!(natural_no_zero("5"));
        assert!(!natural_no_zero("0"));
        assert!(!natural_no_zero("000"));
    }

    fn alpha(v: &str) -> bool {
        super::alpha(v, &[])
    }
    fn alpha_numeric(v: &str) -> bool {
        super::alpha_numeric(v, &[])
    }
    fn alpha_numeric_dash(v: &str) -> bool {
        super::alpha_numeric_dash(v, &[])
    }
    fn numeric(v: &str) -> bool {
        super::numeric(v, &[])
    }
    fn integer(v: &str) -> bool {
        super::integer(v, &[])
    }
    fn decimal(v: &str) -> bool {
        super::decimal(v, &[])
    }
    fn natural(v: &str) -> bool {
        super::natural(v, &[])
    }
    fn natural_no_zero(v: &str) -> bool {
        super::natural_no_zero(v, &[])
    }

    #[test]
    fn test_email() {
        assert!(email("user@example.com", &[]));
        assert!(email("first.last+tag@mail.example.co.uk", &[]));
        assert!(email(" padded@example.com ", &[]));
        assert!(!email("user@example", &[]));
        assert!(!email("@example.com", &[]));
        assert!(!email("not-an-email", &[]));
    }

    #[test]
    fn test_pattern_is_case_insensitive_search() {
        assert!(pattern("ABC-123", &opt("[a-z]+-\\d+")));
        assert!(pattern("xx abc xx", &opt("abc")));
        assert!(!pattern("abc", &opt("^\\d+$")));
        assert!(!pattern("abc", &opt("(")));
    }

    #[test]
    fn test_matches() {
        assert!(matches("abc123", &opt("abc123")));
        assert!(!matches("xyz", &opt("abc123")));
        assert!(!matches("xyz", &opt("")));
    }

    #[test]
    fn test_boolean() {
        assert!(boolean("true", &[]));
        assert!(boolean("false", &[]));
        assert!(!boolean("True", &[]));
        assert!(!boolean("1", &[]));
    }

    #[test]
    fn test_lists() {
        assert!(list("a,b,c", &[]));
        assert!(list("single", &[]));
        assert!(!list("a,,c", &[]));
        assert!(!list("a,b,", &[]));

        assert!(min_list_length("a,b,c", &opt("3")));
        assert!(!min_list_length("a,b", &opt("3")));
        assert!(max_list_length("a,b", &opt("2")));
        assert!(!max_list_length("a,b,c", &opt("2")));
    }

    #[test]
    fn test_dates() {
        assert!(date("2024-01-19", &[]));
        assert!(!date("someday", &[]));

        assert!(before_date("2024-01-01", &opt("2024-06-01")));
        assert!(!before_date("2024-06-01", &opt("2024-01-01")));
        assert!(after_date("2024-06-01", &opt("2024-01-01")));
        assert!(!after_date("2024-01-01", &opt("2024-01-01")));
        assert!(!after_date("2024-06-01", &opt("not a date")));
    }
}
