//! Ouroboros Rules CLI - validate a record from the command line
//!
//! Usage:
//!   ob-rules check --data user.json --rules user.toml
//!   ob-rules check --data user.json --rules user.toml --format json
//!   ob-rules check --data user.json --rules user.toml --messages messages.toml
//!   ob-rules check --data user.json --rules user.toml --separator "; "
//!   ob-rules list                 List built-in rules
//!
//! Rules file (TOML):
//!
//! ```toml
//! [[field]]
//! name = "email"
//! label = "Email"
//! rules = "required|email"
//! ```
//!
//! Exit code is 0 when the record is valid, 1 when any rule fails.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use ouroboros_rules::{
    MessageTemplates, Record, RuleRegistry, Session, SessionConfig, ValidationOutcome,
};

#[derive(Parser)]
#[command(name = "ob-rules")]
#[command(about = "Validate flat records against pipe-delimited rule strings", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a JSON record against a rules file
    Check {
        /// JSON object with the record to validate
        #[arg(short, long)]
        data: PathBuf,

        /// TOML file with [[field]] rule definitions
        #[arg(short, long)]
        rules: PathBuf,

        /// TOML table of message templates overriding the defaults
        #[arg(short, long)]
        messages: Option<PathBuf>,

        /// Separator between messages of one field
        #[arg(long)]
        separator: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Log level (RUST_LOG takes precedence)
        #[arg(long, default_value = "warn")]
        log_level: String,
    },
    /// List the built-in rules
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

// ============================================================================
// Rules File
// ============================================================================

/// Parsed rules file
#[derive(Debug, Deserialize)]
struct RulesFile {
    #[serde(default, rename = "field")]
    fields: Vec<FieldRules>,
}

/// One `[[field]]` entry
#[derive(Debug, Deserialize)]
struct FieldRules {
    name: String,
    #[serde(default)]
    label: String,
    rules: String,
}

fn parse_rules(content: &str) -> Result<RulesFile> {
    toml::from_str(content).context("Failed to parse rules file")
}

fn parse_messages(content: &str) -> Result<MessageTemplates> {
    let overrides: MessageTemplates =
        toml::from_str(content).context("Failed to parse messages file")?;
    let mut templates = MessageTemplates::default();
    templates.merge(overrides);
    Ok(templates)
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

// ============================================================================
// Commands
// ============================================================================

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            data,
            rules,
            messages,
            separator,
            format,
            log_level,
        } => {
            init_logging(&log_level)?;
            let exit_code = run_check(&data, &rules, messages.as_deref(), separator, format)?;
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
        }
        Commands::List => {
            for name in RuleRegistry::builtin().names() {
                println!("{}", name);
            }
        }
    }

    Ok(())
}

fn run_check(
    data_path: &Path,
    rules_path: &Path,
    messages_path: Option<&Path>,
    separator: Option<String>,
    format: OutputFormat,
) -> Result<i32> {
    let json: serde_json::Value = serde_json::from_str(&read_file(data_path)?)
        .with_context(|| format!("Invalid JSON in {}", data_path.display()))?;
    let record = Record::from_json(&json)
        .with_context(|| format!("Unsupported record in {}", data_path.display()))?;

    let rules = parse_rules(&read_file(rules_path)?)?;

    let mut config = SessionConfig::new();
    if let Some(path) = messages_path {
        config = config.templates(parse_messages(&read_file(path)?)?);
    }
    if let Some(separator) = separator {
        config = config.separator(separator);
    }

    let mut session = Session::with_config(record, config);
    for field in &rules.fields {
        session
            .add_rule(&field.name, &field.label, &field.rules)
            .with_context(|| format!("Invalid rules for field '{}'", field.name))?;
    }
    tracing::debug!(fields = rules.fields.len(), "Loaded rules file");

    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    let outcome = rt.block_on(session.run());

    report(&outcome, format)?;
    Ok(if outcome.is_valid() { 0 } else { 1 })
}

fn report(outcome: &ValidationOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let output =
                serde_json::to_string_pretty(outcome).context("Failed to serialize outcome")?;
            println!("{}", output);
        }
        OutputFormat::Text => match outcome.errors() {
            None => println!("OK: {} field(s) checked", outcome.data().len()),
            Some(errors) => {
                for (field, message) in errors {
                    println!("{}: {}", field, message);
                }
                eprintln!("FAILED: {} field(s) invalid", errors.len());
            }
        },
    }
    Ok(())
}

/// Initialize logging with the given level
fn init_logging(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .ok(); // Ignore error if already initialized

    Ok(())
}
