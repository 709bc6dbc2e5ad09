//! Rule string tokenizer
//!
//! Turns a rule string such as `required|minLength[3]|regex[^a|b$]` into
//! an ordered list of [`RawRule`]s. Names are not checked here; the session
//! resolves them against its registry.
//!
//! # Grammar
//!
//! ```text
//! spec    := rule ('|' rule)*
//! rule    := name ('[' options ']')?
//! options := option (',' option)*
//! ```
//!
//! The single exception is `regex[...]`: everything between `regex[` and the
//! last `]` on the line is one verbatim pattern, so the pattern may contain
//! `|`, `,`, `[` and `]`. A consequence is that a `regex` rule followed by
//! another rule with options swallows that rule, so `regex` goes last.

use std::ops::Range;

use crate::errors::{RuleError, RuleResult};

const PATTERN_RULE: &str = "regex";
const PATTERN_OPEN: &str = "regex[";

/// Stand-in for the `regex[...]` segment while splitting on `|`.
/// Private-use code points never appear in a rule written by hand.
const PLACEHOLDER: &str = "\u{E000}regex\u{E000}";

/// One rule token: a name and its `[...]` options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRule {
    /// Rule name as written (case-sensitive)
    pub name: String,
    /// Options in declaration order; empty when no `[...]` group is present
    pub options: Vec<String>,
}

impl RawRule {
    fn new(name: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }
}

/// Split a rule string into rule tokens
///
/// Splitting is strict: tokens are not trimmed and empty tokens are kept, so
/// `"required||email"` or `" required"` carry a name no registry knows and
/// fail when the session resolves them.
///
/// # Example
///
/// ```
/// use ouroboros_rules::parser::parse_rule_spec;
///
/// let rules = parse_rule_spec("required|regex[^(a|b)[0-9]$]").unwrap();
/// assert_eq!(rules.len(), 2);
/// assert_eq!(rules[1].options, vec!["^(a|b)[0-9]$".to_string()]);
/// ```
pub fn parse_rule_spec(spec: &str) -> RuleResult<Vec<RawRule>> {
    let segment = pattern_segment(spec).map(|range| &spec[range]);

    let working = match segment {
        Some(seg) => spec.replacen(seg, PLACEHOLDER, 1),
        None => spec.to_string(),
    };

    working
        .split('|')
        .map(|token| match segment {
            Some(seg) if token.contains(PLACEHOLDER) => {
                parse_token(&token.replacen(PLACEHOLDER, seg, 1))
            }
            _ => parse_token(token),
        })
        .collect()
}

/// Byte range of the first `regex[...]` segment, up to the last `]` on its line
fn pattern_segment(spec: &str) -> Option<Range<usize>> {
    let start = spec.find(PATTERN_OPEN)?;
    let body_start = start + PATTERN_OPEN.len();
    let line_end = spec[body_start..]
        .find('\n')
        .map_or(spec.len(), |offset| body_start + offset);

    // The pattern needs at least one character before the closing bracket
    let close = spec[body_start..line_end].rfind(']')?;
    if close == 0 {
        return None;
    }

    Some(start..body_start + close + 1)
}

fn parse_token(token: &str) -> RuleResult<RawRule> {
    let Some(open) = token.find('[') else {
        return Ok(RawRule::new(token, Vec::new()));
    };

    let name = &token[..open];
    // An options group needs at least one character, `name[]` is no rule
    let inner = match token[open + 1..].strip_suffix(']') {
        Some(inner) if !inner.is_empty() => inner,
        _ => {
            return Err(RuleError::UnknownRule {
                rule: token.to_string(),
            })
        }
    };

    let options = if name == PATTERN_RULE {
        vec![inner.to_string()]
    } else {
        inner.split(',').map(str::to_string).collect()
    };

    Ok(RawRule::new(name, options))
}
