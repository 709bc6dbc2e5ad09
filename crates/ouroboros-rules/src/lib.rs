//! Ouroboros Rules
//!
//! Declarative field validation for flat records.
//!
//! Each field gets a friendly name and a pipe-delimited rule string such as
//! `required|minLength[3]|regex[^[a-z0-9_]+$]`. A [`Session`] parses the
//! rule strings up front, so unknown rules, missing options and bad patterns
//! are reported before anything runs, then evaluates every rule against the
//! record and returns either the per-field messages or the (sanitized)
//! record.
//!
//! # Architecture
//!
//! ```text
//! rule string ──parser──▶ RawRule ──Session::add_rule──▶ FieldSpec / RuleInstance
//!                                   (registry lookup, sanitize, matches, regex)
//!
//! Session::run ──fan-out──▶ Predicate::check (sync or async)
//!              ◀──fan-in─── CompletionBarrier ──▶ MessageTemplates ──▶ ValidationOutcome
//! ```
//!
//! # Features
//!
//! - **Default**: rule parsing, built-in rules and the async-capable engine
//! - **serde**: JSON conversion for [`Record`], [`ValidationOutcome`] and
//!   [`MessageTemplates`]
//!
//! # Example
//!
//! ```rust
//! use ouroboros_rules::{Record, Session};
//!
//! let record = Record::new()
//!     .with("username", "ada")
//!     .with("email", "not-an-email");
//!
//! let mut session = Session::new(record);
//! session.add_rule("username", "Username", "required|alphaNumeric|minLength[3]").unwrap();
//! session.add_rule("email", "Email", "required|email").unwrap();
//!
//! let outcome = session.run_blocking();
//! assert!(!outcome.is_valid());
//! assert_eq!(
//!     outcome.error("email"),
//!     Some("The Email field must contain a valid email address.")
//! );
//! ```

// Public modules
pub mod barrier;
pub mod config;
pub mod dates;
pub mod engine;
pub mod errors;
pub mod messages;
pub mod parser;
pub mod predicates;
pub mod record;
pub mod registry;
pub mod sanitize;
pub mod session;

// Re-export commonly used types
pub use config::{SessionConfig, DEFAULT_SEPARATOR};
pub use engine::ValidationOutcome;
pub use errors::{ErrorMap, FieldErrors, RuleError, RuleResult};
pub use messages::{MessageTemplates, DEFAULT_TEMPLATES};
pub use record::Record;
pub use registry::{
    AsyncFnPredicate, BoxedPredicate, FnPredicate, Predicate, Resolution, RuleDefinition,
    RuleRegistry,
};
pub use sanitize::{HtmlSanitizer, Sanitizer};
pub use session::{FieldSpec, RuleInstance, Session};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
