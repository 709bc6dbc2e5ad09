//! Rule registry
//!
//! Maps rule names to [`RuleDefinition`]s. A definition pairs a
//! [`Predicate`] with the metadata the session needs when a rule is added:
//! whether options are mandatory, whether the check also runs on empty
//! values, and how the first option is resolved.
//!
//! # Example (custom async rule)
//!
//! ```rust,ignore
//! use ouroboros_rules::registry::{AsyncFnPredicate, RuleDefinition, RuleRegistry};
//!
//! let mut registry = RuleRegistry::builtin();
//! registry.register(
//!     "uniqueUsername",
//!     RuleDefinition::new(AsyncFnPredicate::new(|value, _options| async move {
//!         !users_table_contains(&value).await
//!     })),
//! );
//! ```

use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::predicates;

// ============================================================================
// Predicate Trait
// ============================================================================

/// A pass/fail check of one value
///
/// A predicate may complete immediately or await external work; the engine
/// drives all predicates of a run concurrently and does not depend on the
/// order in which they finish.
#[async_trait]
pub trait Predicate: Send + Sync {
    /// Check `value` against the rule's `options`
    async fn check(&self, value: &str, options: &[String]) -> bool;
}

/// Type alias for a shared predicate
pub type BoxedPredicate = Arc<dyn Predicate>;

/// Predicate backed by a synchronous function
pub struct FnPredicate<F>
where
    F: Fn(&str, &[String]) -> bool + Send + Sync,
{
    check_fn: F,
}

impl<F> FnPredicate<F>
where
    F: Fn(&str, &[String]) -> bool + Send + Sync,
{
    /// Wrap a synchronous check
    pub fn new(check_fn: F) -> Self {
        Self { check_fn }
    }
}

#[async_trait]
impl<F> Predicate for FnPredicate<F>
where
    F: Fn(&str, &[String]) -> bool + Send + Sync,
{
    async fn check(&self, value: &str, options: &[String]) -> bool {
        (self.check_fn)(value, options)
    }
}

/// Predicate backed by an async closure taking owned arguments
pub struct AsyncFnPredicate<F> {
    check_fn: F,
}

impl<F, Fut> AsyncFnPredicate<F>
where
    F: Fn(String, Vec<String>) -> Fut + Send + Sync,
    Fut: Future<Output = bool> + Send,
{
    /// Wrap an asynchronous check
    pub fn new(check_fn: F) -> Self {
        Self { check_fn }
    }
}

#[async_trait]
impl<F, Fut> Predicate for AsyncFnPredicate<F>
where
    F: Fn(String, Vec<String>) -> Fut + Send + Sync,
    Fut: Future<Output = bool> + Send,
{
    async fn check(&self, value: &str, options: &[String]) -> bool {
        (self.check_fn)(value.to_string(), options.to_vec()).await
    }
}

// ============================================================================
// Rule Definition
// ============================================================================

/// How a rule's first option is interpreted when the rule is added
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    /// Options are literal values (default)
    #[default]
    Literal,
    /// The first option names another field; its current value replaces it
    FieldReference,
    /// The first option is a pattern, compiled once when the rule is added;
    /// sessions match the compiled pattern instead of calling the predicate
    Pattern,
    /// Not a check: the field's value is sanitized in place
    Sanitize,
}

/// A registered rule
#[derive(Clone)]
pub struct RuleDefinition {
    predicate: Option<BoxedPredicate>,
    resolution: Resolution,
    requires_options: bool,
    evaluates_empty: bool,
}

impl RuleDefinition {
    /// Define a rule from any predicate
    pub fn new(predicate: impl Predicate + 'static) -> Self {
        Self {
            predicate: Some(Arc::new(predicate)),
            resolution: Resolution::Literal,
            requires_options: false,
            evaluates_empty: false,
        }
    }

    /// Define a rule from a synchronous check function
    pub fn from_fn(check_fn: fn(&str, &[String]) -> bool) -> Self {
        Self::new(FnPredicate::new(check_fn))
    }

    /// The `sanitize` pseudo-rule
    pub fn sanitize() -> Self {
        Self {
            predicate: None,
            resolution: Resolution::Sanitize,
            requires_options: false,
            evaluates_empty: false,
        }
    }

    /// Reject the rule when it is written without `[...]` options
    pub fn requires_options(mut self) -> Self {
        self.requires_options = true;
        self
    }

    /// Run the check on empty values too (instead of passing them)
    pub fn evaluates_empty(mut self) -> Self {
        self.evaluates_empty = true;
        self
    }

    /// Set how the first option is resolved
    pub fn resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Whether options are mandatory
    pub fn needs_options(&self) -> bool {
        self.requires_options
    }

    /// Whether empty values are checked
    pub fn checks_empty(&self) -> bool {
        self.evaluates_empty
    }

    /// Option resolution mode
    pub fn resolution_mode(&self) -> Resolution {
        self.resolution
    }

    /// Whether `value` passes without running the check
    pub fn skips(&self, value: &str) -> bool {
        value.is_empty() && !self.evaluates_empty
    }

    /// Evaluate the rule against a value
    ///
    /// Empty values pass without calling the predicate unless the rule
    /// [`evaluates_empty`](Self::evaluates_empty); this is what keeps
    /// optional fields valid while `required` still rejects them.
    pub async fn evaluate(&self, value: &str, options: &[String]) -> bool {
        if self.skips(value) {
            return true;
        }

        match &self.predicate {
            Some(predicate) => predicate.check(value, options).await,
            None => true,
        }
    }
}

impl fmt::Debug for RuleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleDefinition")
            .field("has_predicate", &self.predicate.is_some())
            .field("resolution", &self.resolution)
            .field("requires_options", &self.requires_options)
            .field("evaluates_empty", &self.evaluates_empty)
            .finish()
    }
}

// ============================================================================
// Registry
// ============================================================================

static SHARED_REGISTRY: Lazy<Arc<RuleRegistry>> = Lazy::new(|| Arc::new(RuleRegistry::builtin()));

/// Rule name to definition catalog
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: HashMap<String, Arc<RuleDefinition>>,
}

impl RuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in rule
    pub fn builtin() -> Self {
        use predicates::*;

        let mut registry = Self::new();
        registry
            .with("required", RuleDefinition::from_fn(required).evaluates_empty())
            .with("minLength", RuleDefinition::from_fn(min_length).requires_options())
            .with("maxLength", RuleDefinition::from_fn(max_length).requires_options())
            .with("exactLength", RuleDefinition::from_fn(exact_length).requires_options())
            .with("greaterThan", RuleDefinition::from_fn(greater_than).requires_options())
            .with("lessThan", RuleDefinition::from_fn(less_than).requires_options())
            .with("alpha", RuleDefinition::from_fn(alpha))
            .with("alphaNumeric", RuleDefinition::from_fn(alpha_numeric))
            .with("alphaNumericDash", RuleDefinition::from_fn(alpha_numeric_dash))
            .with("numeric", RuleDefinition::from_fn(numeric))
            .with("integer", RuleDefinition::from_fn(integer))
            .with("decimal", RuleDefinition::from_fn(decimal))
            .with("natural", RuleDefinition::from_fn(natural))
            .with("naturalNoZero", RuleDefinition::from_fn(natural_no_zero))
            .with("email", RuleDefinition::from_fn(email))
            .with(
                "regex",
                RuleDefinition::from_fn(pattern)
                    .requires_options()
                    .resolution(Resolution::Pattern),
            )
            .with(
                "matches",
                RuleDefinition::from_fn(matches)
                    .requires_options()
                    .resolution(Resolution::FieldReference),
            )
            .with("list", RuleDefinition::from_fn(list))
            .with("minListLength", RuleDefinition::from_fn(min_list_length).requires_options())
            .with("maxListLength", RuleDefinition::from_fn(max_list_length).requires_options())
            .with("date", RuleDefinition::from_fn(date))
            .with("beforeDate", RuleDefinition::from_fn(before_date).requires_options())
            .with("afterDate", RuleDefinition::from_fn(after_date).requires_options())
            .with("boolean", RuleDefinition::from_fn(boolean))
            .with("sanitize", RuleDefinition::sanitize());
        registry
    }

    /// Process-wide built-in registry
    pub fn shared() -> Arc<RuleRegistry> {
        Arc::clone(&SHARED_REGISTRY)
    }

    /// Add or replace a rule
    pub fn register(&mut self, name: impl Into<String>, definition: RuleDefinition) {
        self.rules.insert(name.into(), Arc::new(definition));
    }

    /// Add or replace a rule (chainable)
    pub fn with(&mut self, name: impl Into<String>, definition: RuleDefinition) -> &mut Self {
        self.register(name, definition);
        self
    }

    /// Look up a rule by name
    pub fn get(&self, name: &str) -> Option<&Arc<RuleDefinition>> {
        self.rules.get(name)
    }

    /// Whether a rule is registered
    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Registered rule names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
