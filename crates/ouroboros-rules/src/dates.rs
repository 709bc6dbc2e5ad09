//! Date parsing used by the `date`, `beforeDate` and `afterDate` rules
//!
//! Accepts the common textual shapes a form submits. Values without an
//! offset are read as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Parse a date or date-time string into an instant
///
/// # Example
/// ```
/// use ouroboros_rules::dates::parse_date;
///
/// assert!(parse_date("2024-01-19").is_some());
/// assert!(parse_date("2024-01-19T12:00:00+08:00").is_some());
/// assert!(parse_date("not a date").is_none());
/// ```
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    DATE_FORMATS.iter().find_map(|format| {
        NaiveDate::parse_from_str(value, format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| Utc.from_utc_datetime(&naive))
    })
}

/// Whether `value` parses as a date
pub fn is_date(value: &str) -> bool {
    parse_date(value).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_iso_shapes() {
        assert!(is_date("2024-01-19"));
        assert!(is_date("2024-01-19T12:00:00Z"));
        assert!(is_date("2024-01-19T12:00:00.250+02:00"));
        assert!(is_date("2024-01-19 12:00"));
        assert!(is_date("2024/01/19"));
    }

    #[test]
    fn test_parse_textual_shapes() {
        assert!(is_date("01/19/2024"));
        assert!(is_date("January 19, 2024"));
        assert!(is_date("Jan 19, 2024"));
        assert!(is_date("19 January 2024"));
        assert!(is_date("Fri, 19 Jan 2024 12:00:00 +0000"));
    }

    #[test]
    fn test_rejects_invalid() {
        assert!(!is_date(""));
        assert!(!is_date("yesterday"));
        assert!(!is_date("2024-02-30"));
        assert!(!is_date("2024-13-01"));
    }

    #[test]
    fn test_offset_is_normalized() {
        let a = parse_date("2024-01-19T08:00:00+08:00").unwrap();
        let b = parse_date("2024-01-19T00:00:00Z").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.day(), 19);
    }
}
