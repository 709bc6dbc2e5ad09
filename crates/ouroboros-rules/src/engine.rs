//! Execution engine
//!
//! Fans out one evaluation per (field, rule) pair, drives them concurrently
//! and fans the completions back in through a [`CompletionBarrier`]. Messages
//! of one field are joined in rule declaration order regardless of which
//! predicate finishes first.

use futures::stream::{FuturesUnordered, StreamExt};

use crate::barrier::{Completion, CompletionBarrier, Slot};
use crate::errors::{ErrorMap, FieldErrors};
use crate::record::Record;
use crate::session::{FieldSpec, Session};

// ============================================================================
// Validation Outcome
// ============================================================================

/// Result of a validation run: per-field errors (if any) and the record
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ValidationOutcome {
    errors: Option<ErrorMap>,
    data: Record,
}

impl ValidationOutcome {
    fn new(errors: Option<ErrorMap>, data: Record) -> Self {
        Self { errors, data }
    }

    /// Whether every rule passed
    pub fn is_valid(&self) -> bool {
        self.errors.is_none()
    }

    /// Failing fields and their joined messages; `None` when valid
    pub fn errors(&self) -> Option<&ErrorMap> {
        self.errors.as_ref()
    }

    /// Joined messages of one field
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.as_ref()?.get(field).map(String::as_str)
    }

    /// The record as validated (after sanitization)
    pub fn data(&self) -> &Record {
        &self.data
    }

    /// Split into `(errors, data)`
    pub fn into_parts(self) -> (Option<ErrorMap>, Record) {
        (self.errors, self.data)
    }

    /// Convert to Result - Ok with the record if valid, Err with the failures otherwise
    pub fn into_result(self) -> Result<Record, FieldErrors> {
        match self.errors {
            Some(errors) => Err(FieldErrors::new(errors)),
            None => Ok(self.data),
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

/// What a completion needs to be reported and formatted
struct RuleContext<'a> {
    field_name: &'a str,
    friendly_name: &'a str,
    rule_name: &'a str,
    options: &'a [String],
    slot: Slot,
}

impl Session {
    /// Evaluate every configured rule against the current record
    ///
    /// All predicates of the run are polled concurrently on the calling
    /// task, so async predicates (e.g. a uniqueness lookup) overlap. Each
    /// call evaluates the record as it is now; nothing is cached between
    /// runs.
    pub async fn run(&self) -> ValidationOutcome {
        if self.outstanding_tasks == 0 {
            tracing::debug!("No deferred rules configured, skipping evaluation");
            return ValidationOutcome::new(None, self.data.clone());
        }

        let groups: Vec<&FieldSpec> = self
            .fields
            .iter()
            .filter(|field| !field.rules().is_empty())
            .collect();

        let mut barrier = CompletionBarrier::new(groups.iter().map(|field| field.rules().len()));
        debug_assert_eq!(barrier.total(), self.outstanding_tasks);

        tracing::debug!(
            tasks = barrier.total(),
            fields = groups.len(),
            "Starting validation run"
        );

        let mut pending = FuturesUnordered::new();
        for (group, field) in groups.iter().copied().enumerate() {
            let value = self.data.get(field.field_name()).unwrap_or_default();

            for (index, rule) in field.rules().iter().enumerate() {
                let context = RuleContext {
                    field_name: field.field_name(),
                    friendly_name: field.friendly_name(),
                    rule_name: rule.name(),
                    options: rule.options(),
                    slot: Slot::new(group, index),
                };
                pending.push(async move {
                    let passed = rule.evaluate(value).await;
                    (context, passed)
                });
            }
        }

        while let Some((context, passed)) = pending.next().await {
            tracing::trace!(
                field = context.field_name,
                rule = context.rule_name,
                passed,
                "Rule evaluated"
            );

            let failure = (!passed).then(|| self.failure_message(&context));
            match barrier.complete(context.slot, failure) {
                Ok(Completion::Pending { .. }) => {}
                Ok(Completion::Finished(failures)) => return self.finalize(&groups, failures),
                Err(err) => tracing::warn!(error = %err, "Ignoring completion"),
            }
        }

        // Every scheduled evaluation reports once, so the barrier has finished
        // by the time the stream is drained.
        tracing::error!(
            completed = barrier.completed(),
            total = barrier.total(),
            "Validation run drained before the barrier finished"
        );
        self.finalize(&groups, barrier.take_failures())
    }

    /// Run and hand `(errors, data)` to a callback, exactly once
    pub async fn run_with<F, R>(&self, callback: F) -> R
    where
        F: FnOnce(Option<&ErrorMap>, &Record) -> R,
    {
        let outcome = self.run().await;
        callback(outcome.errors(), outcome.data())
    }

    /// Run on the current thread, blocking until every predicate completes
    ///
    /// Intended for synchronous callers; inside an async runtime use
    /// [`run`](Self::run).
    pub fn run_blocking(&self) -> ValidationOutcome {
        futures::executor::block_on(self.run())
    }

    fn failure_message(&self, context: &RuleContext<'_>) -> String {
        let templates = self.config.message_templates();
        match templates.format(context.rule_name, context.friendly_name, context.options) {
            Ok(message) => message,
            Err(err) => {
                // add_rule rejects rules without a template
                tracing::error!(
                    field = context.field_name,
                    rule = context.rule_name,
                    error = %err,
                    "Failed to format validation message"
                );
                format!(
                    "The {} field failed the {} rule.",
                    context.friendly_name, context.rule_name
                )
            }
        }
    }

    fn finalize(&self, groups: &[&FieldSpec], failures: Vec<Vec<String>>) -> ValidationOutcome {
        let separator = self.config.message_separator();
        let errors: ErrorMap = groups
            .iter()
            .zip(failures)
            .filter(|(_, messages)| !messages.is_empty())
            .map(|(field, messages)| (field.field_name().to_string(), messages.join(separator)))
            .collect();

        tracing::debug!(failed_fields = errors.len(), "Validation run finished");

        let errors = (!errors.is_empty()).then_some(errors);
        ValidationOutcome::new(errors, self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;

    #[tokio::test]
    async fn test_fast_path_without_rules() {
        let session = Session::new(Record::new().with("name", ""));
        let outcome = session.run().await;
        assert!(outcome.is_valid());
        assert_eq!(outcome.data().get("name"), Some(""));
    }

    #[tokio::test]
    async fn test_sanitize_only_takes_fast_path() {
        let mut session = Session::new(Record::new().with("name", " <x> "));
        session.add_rule("name", "Name", "sanitize").unwrap();
        let (errors, data) = session.run().await.into_parts();
        assert!(errors.is_none());
        assert_eq!(data.get("name"), Some("&lt;x&gt;"));
    }

    #[tokio::test]
    async fn test_failure_messages_joined_with_separator() {
        let config = SessionConfig::new().separator(" | ");
        let mut session = Session::with_config(Record::new().with("code", "ab"), config);
        session.add_rule("code", "Code", "minLength[5]|numeric").unwrap();

        let outcome = session.run().await;
        assert_eq!(
            outcome.error("code"),
            Some(
                "The Code field must be at least 5 characters in length. | \
                 The Code field must contain only numbers."
            )
        );
    }

    #[tokio::test]
    async fn test_run_with_callback() {
        let mut session = Session::new(Record::new());
        session.add_rule("email", "Email", "required").unwrap();

        let failed = session
            .run_with(|errors, _data| errors.map(|e| e.len()).unwrap_or(0))
            .await;
        assert_eq!(failed, 1);
    }

    #[tokio::test]
    async fn test_pattern_rules_match_compiled_pattern() {
        use crate::registry::{FnPredicate, Resolution, RuleDefinition, RuleRegistry};
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut registry = RuleRegistry::builtin();
        registry.register(
            "regex",
            RuleDefinition::new(FnPredicate::new(move |_value: &str, _options: &[String]| {
                counter.fetch_add(1, Ordering::SeqCst);
                false
            }))
            .requires_options()
            .resolution(Resolution::Pattern),
        );

        let config = SessionConfig::new().registry(registry);
        let mut session = Session::with_config(Record::new().with("code", "AB-12"), config);
        session.add_rule("code", "Code", "regex[^[a-z]{2}-[0-9]+$]").unwrap();

        assert!(session.run().await.is_valid());

        session.data_mut().insert("code", "ab12");
        assert_eq!(
            session.run().await.error("code"),
            Some("The Code field is not in the correct format.")
        );

        session.data_mut().insert("code", "");
        assert!(session.run().await.is_valid());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_into_result() {
        let mut session = Session::new(Record::new().with("age", "x"));
        session.add_rule("age", "Age", "integer").unwrap();

        let err = session.run_blocking().into_result().unwrap_err();
        assert_eq!(err.get("age"), Some("The Age field must contain an integer."));

        session.data_mut().insert("age", "42");
        let data = session.run_blocking().into_result().unwrap();
        assert_eq!(data.get("age"), Some("42"));
    }
}
