//! Validation sessions
//!
//! A [`Session`] owns one record and the rules configured for its fields.
//! Rules are added per field with [`Session::add_rule`], which parses the
//! rule string, resolves every name against the registry and applies the
//! rules that act immediately (`sanitize`, `matches`, `regex`). The session
//! is then run with [`Session::run`](crate::Session::run).
//!
//! # Example
//!
//! ```
//! use ouroboros_rules::{Record, Session};
//!
//! let record = Record::new()
//!     .with("password", "abc123")
//!     .with("confirm", "abc123");
//!
//! let mut session = Session::new(record);
//! session.add_rule("password", "Password", "required|minLength[6]").unwrap();
//! session.add_rule("confirm", "Confirmation", "matches[password]").unwrap();
//!
//! let outcome = session.run_blocking();
//! assert!(outcome.is_valid());
//! ```

use regex::Regex;
use std::fmt;
use std::sync::Arc;

use crate::config::SessionConfig;
use crate::errors::{RuleError, RuleResult};
use crate::messages::MessageTemplates;
use crate::parser::{parse_rule_spec, RawRule};
use crate::predicates::compile_pattern;
use crate::record::Record;
use crate::registry::{Resolution, RuleDefinition};

// ============================================================================
// Rule Instance
// ============================================================================

/// One rule attached to a field, resolved against the registry
#[derive(Clone)]
pub struct RuleInstance {
    name: String,
    options: Vec<String>,
    definition: Arc<RuleDefinition>,
    // Compiled once for `Resolution::Pattern` rules
    pattern: Option<Regex>,
}

impl RuleInstance {
    /// Rule name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Options after parse-time resolution
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Pattern compiled when the rule was added (`regex` rules only)
    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    pub(crate) async fn evaluate(&self, value: &str) -> bool {
        match &self.pattern {
            Some(regex) => self.definition.skips(value) || regex.is_match(value),
            None => self.definition.evaluate(value, &self.options).await,
        }
    }
}

impl fmt::Debug for RuleInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleInstance")
            .field("name", &self.name)
            .field("options", &self.options)
            .field("pattern", &self.pattern.as_ref().map(Regex::as_str))
            .finish()
    }
}

// ============================================================================
// Field Spec
// ============================================================================

/// Parsed rule configuration for one field
#[derive(Debug, Clone)]
pub struct FieldSpec {
    field_name: String,
    friendly_name: String,
    rules: Vec<RuleInstance>,
}

impl FieldSpec {
    /// Field name in the record
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Display name used in messages
    pub fn friendly_name(&self) -> &str {
        &self.friendly_name
    }

    /// Deferred rules in declaration order
    pub fn rules(&self) -> &[RuleInstance] {
        &self.rules
    }
}

// ============================================================================
// Session
// ============================================================================

/// State of one validation run: data, field rules and configuration
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) data: Record,
    pub(crate) fields: Vec<FieldSpec>,
    pub(crate) outstanding_tasks: usize,
    pub(crate) config: SessionConfig,
}

impl Session {
    /// Create a session with the default configuration
    pub fn new(data: Record) -> Self {
        Self::with_config(data, SessionConfig::default())
    }

    /// Create a session with its own message templates
    pub fn with_templates(data: Record, templates: MessageTemplates) -> Self {
        Self::with_config(data, SessionConfig::new().templates(templates))
    }

    /// Create a session with a full configuration
    pub fn with_config(data: Record, config: SessionConfig) -> Self {
        Self {
            data,
            fields: Vec::new(),
            outstanding_tasks: 0,
            config,
        }
    }

    /// Replace the record, dropping every configured rule
    pub fn set_data(&mut self, data: Record) {
        self.reset();
        self.data = data;
    }

    /// Drop the record and every configured rule
    pub fn reset(&mut self) {
        self.data = Record::new();
        self.fields.clear();
        self.outstanding_tasks = 0;
    }

    /// Current record
    pub fn data(&self) -> &Record {
        &self.data
    }

    /// Mutable record; changes are seen by the next run
    pub fn data_mut(&mut self) -> &mut Record {
        &mut self.data
    }

    /// Consume the session, returning its record
    pub fn into_data(self) -> Record {
        self.data
    }

    /// Configured fields in the order they were first added
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Rule configuration of one field
    pub fn field(&self, field_name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.field_name == field_name)
    }

    /// Number of evaluations the next run schedules
    pub fn outstanding_tasks(&self) -> usize {
        self.outstanding_tasks
    }

    /// Session configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Configure the rules of one field
    ///
    /// `rules` is a pipe-delimited rule string such as
    /// `required|minLength[3]|regex[^[a-z]+$]`. An empty `friendly_name`
    /// falls back to the field name. Adding rules to a field that already
    /// has some replaces them.
    ///
    /// The call is atomic: on error neither the rules nor the record change.
    ///
    /// # Errors
    ///
    /// - [`RuleError::UnknownRule`] for a name missing from the registry
    /// - [`RuleError::MissingOptions`] when a rule needs `[...]` options
    /// - [`RuleError::InvalidPattern`] when a `regex` pattern does not compile
    /// - [`RuleError::MissingTemplate`] when a rule has no message template
    pub fn add_rule(&mut self, field_name: &str, friendly_name: &str, rules: &str) -> RuleResult<()> {
        let tokens = parse_rule_spec(rules)?;
        let registry = self.config.rule_registry();
        let templates = self.config.message_templates();

        let mut sanitized: Option<String> = None;
        let mut instances = Vec::with_capacity(tokens.len());

        for RawRule { name, mut options } in tokens {
            let definition = registry
                .get(&name)
                .ok_or_else(|| RuleError::UnknownRule { rule: name.clone() })?;

            if definition.needs_options() && options.is_empty() {
                return Err(RuleError::MissingOptions { rule: name });
            }

            let pattern = match definition.resolution_mode() {
                Resolution::Sanitize => {
                    let current = sanitized.as_deref().or_else(|| self.data.get(field_name));
                    let cleaned = current
                        .filter(|v| !v.is_empty())
                        .map(|v| self.config.value_sanitizer().sanitize(v));
                    if cleaned.is_some() {
                        sanitized = cleaned;
                    }
                    continue;
                }
                Resolution::FieldReference => {
                    if let Some(first) = options.first_mut() {
                        let referenced = match sanitized.as_deref() {
                            Some(own) if first.as_str() == field_name => Some(own),
                            _ => self.data.get(first),
                        };
                        *first = referenced.unwrap_or_default().to_string();
                    }
                    None
                }
                Resolution::Pattern => options
                    .first()
                    .map(|pattern| {
                        compile_pattern(pattern).map_err(|e| RuleError::InvalidPattern {
                            pattern: pattern.clone(),
                            reason: e.to_string(),
                        })
                    })
                    .transpose()?,
                Resolution::Literal => None,
            };

            if !templates.contains(&name) {
                return Err(RuleError::MissingTemplate { rule: name });
            }

            instances.push(RuleInstance {
                name,
                options,
                definition: Arc::clone(definition),
                pattern,
            });
        }

        if let Some(value) = sanitized {
            self.data.insert(field_name, value);
        }

        let friendly_name = if friendly_name.is_empty() {
            field_name
        } else {
            friendly_name
        };
        let spec = FieldSpec {
            field_name: field_name.to_string(),
            friendly_name: friendly_name.to_string(),
            rules: instances,
        };

        tracing::debug!(
            field = field_name,
            rules = spec.rules.len(),
            "Configured field rules"
        );

        self.outstanding_tasks += spec.rules.len();
        match self.fields.iter_mut().find(|f| f.field_name == field_name) {
            Some(existing) => {
                self.outstanding_tasks -= existing.rules.len();
                *existing = spec;
            }
            None => self.fields.push(spec),
        }

        Ok(())
    }
}
