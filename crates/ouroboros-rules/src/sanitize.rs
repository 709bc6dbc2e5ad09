//! Value sanitization applied by the `sanitize` rule
//!
//! `sanitize` is not a check: the session rewrites the field's value as soon
//! as the rule is added, and later rules see the sanitized value.

/// Rewrites a field value in place of the `sanitize` rule
pub trait Sanitizer: Send + Sync {
    /// Return the sanitized form of a non-empty value
    fn sanitize(&self, value: &str) -> String;
}

/// Default sanitizer: trims surrounding whitespace and escapes HTML
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlSanitizer;

impl Sanitizer for HtmlSanitizer {
    fn sanitize(&self, value: &str) -> String {
        html_escape(value.trim())
    }
}

impl<F> Sanitizer for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn sanitize(&self, value: &str) -> String {
        self(value)
    }
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape("a & b"), "a &amp; b");
        assert_eq!(html_escape("\"quoted\""), "&quot;quoted&quot;");
        assert_eq!(html_escape("it's"), "it&#x27;s");
    }

    #[test]
    fn test_html_sanitizer_trims() {
        let sanitizer = HtmlSanitizer;
        assert_eq!(
            sanitizer.sanitize("  <b>bold</b>  "),
            "&lt;b&gt;bold&lt;/b&gt;"
        );
    }

    #[test]
    fn test_closure_sanitizer() {
        let upper = |v: &str| v.to_uppercase();
        assert_eq!(upper.sanitize("abc"), "ABC");
    }
}
