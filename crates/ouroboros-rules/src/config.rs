//! Session configuration
//!
//! Collects the collaborators a session uses: the rule registry, the
//! message templates, the sanitizer and the separator used to join several
//! messages for one field.

use std::fmt;
use std::sync::Arc;

use crate::messages::MessageTemplates;
use crate::registry::RuleRegistry;
use crate::sanitize::{HtmlSanitizer, Sanitizer};

/// Separator placed between the messages of one field
pub const DEFAULT_SEPARATOR: &str = "<br>";

/// Configuration for a validation session
#[derive(Clone)]
pub struct SessionConfig {
    registry: Arc<RuleRegistry>,
    templates: MessageTemplates,
    sanitizer: Arc<dyn Sanitizer>,
    separator: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            registry: RuleRegistry::shared(),
            templates: MessageTemplates::default(),
            sanitizer: Arc::new(HtmlSanitizer),
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl SessionConfig {
    /// Create a config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom rule registry
    pub fn registry(mut self, registry: impl Into<Arc<RuleRegistry>>) -> Self {
        self.registry = registry.into();
        self
    }

    /// Replace the message templates wholesale
    pub fn templates(mut self, templates: MessageTemplates) -> Self {
        self.templates = templates;
        self
    }

    /// Use a custom sanitizer for the `sanitize` rule
    pub fn sanitizer(mut self, sanitizer: impl Sanitizer + 'static) -> Self {
        self.sanitizer = Arc::new(sanitizer);
        self
    }

    /// Set the separator joining several messages for one field
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Rule registry in use
    pub fn rule_registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Message templates in use
    pub fn message_templates(&self) -> &MessageTemplates {
        &self.templates
    }

    /// Sanitizer in use
    pub fn value_sanitizer(&self) -> &dyn Sanitizer {
        self.sanitizer.as_ref()
    }

    /// Message separator in use
    pub fn message_separator(&self) -> &str {
        &self.separator
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("rules", &self.registry.len())
            .field("templates", &self.templates)
            .field("separator", &self.separator)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.message_separator(), "<br>");
        assert!(config.rule_registry().contains("required"));
        assert!(config.message_templates().contains("required"));
        assert_eq!(config.value_sanitizer().sanitize(" <i> "), "&lt;i&gt;");
    }

    #[test]
    fn test_config_builder() {
        let config = SessionConfig::new()
            .separator("; ")
            .templates(MessageTemplates::empty().with("required", "%s!"))
            .registry(RuleRegistry::new())
            .sanitizer(|v: &str| v.trim().to_string());

        assert_eq!(config.message_separator(), "; ");
        assert!(!config.message_templates().contains("email"));
        assert!(config.rule_registry().is_empty());
        assert_eq!(config.value_sanitizer().sanitize(" <i> "), "<i>");
    }
}
