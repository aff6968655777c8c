//! Error handling for the tapscan CLI.
//!
//! Provides structured errors with:
//! - User-friendly messages
//! - Actionable suggestions
//! - Proper error chaining
//! - Exit code mapping

use std::error::Error;

use owo_colors::OwoColorize;
use thiserror::Error;

use tapscan_adapters::ScenarioError;
use tapscan_core::error::TapscanError;

// Re-export so callers only need `use crate::error::*`.
pub use tapscan_core::error::ErrorCategory as CoreCategory;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Keys understood by `tapscan config get`.
pub const CONFIG_KEYS: &[&str] = &[
    "session.focus_region_ratio",
    "session.apply_white_balance",
    "session.apply_stabilization",
    "session.initial_orientation",
    "output.no_color",
    "output.format",
];

/// CLI error types.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input (validation failed).
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ── Config errors ──────────────────────────────────────────────────────
    /// A configuration file could not be read, parsed, or written.
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unknown config key '{key}'")]
    UnknownConfigKey { key: String },

    // ── Core errors ────────────────────────────────────────────────────────
    /// An error propagated from `tapscan-core`.
    #[error("{0}")]
    Core(#[from] TapscanError),

    /// A scenario could not be loaded or replayed.
    #[error("Scenario failed: {0}")]
    Scenario(#[from] ScenarioError),

    // ── System errors ──────────────────────────────────────────────────────
    /// An I/O operation failed.
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

impl CliError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidInput { message, .. } => vec![
                format!("Check your input: {}", message),
                "Use --help for usage information".into(),
            ],

            Self::ConfigError { message, .. } => vec![
                format!("Configuration issue: {}", message),
                "Check your config file (see 'tapscan config path')".into(),
                "Use 'tapscan init --force' to write a fresh default config".into(),
            ],

            Self::UnknownConfigKey { key } => {
                let mut suggestions = vec![
                    format!("'{}' is not a configuration key", key),
                    "Known keys:".into(),
                ];
                suggestions.extend(CONFIG_KEYS.iter().map(|k| format!("  • {k}")));
                suggestions
            }

            Self::Core(core_err) => core_err.suggestions(),

            Self::Scenario(err) => scenario_suggestions(err),

            Self::IoError { message, .. } => vec![
                format!("I/O operation failed: {}", message),
                "Check file permissions".into(),
                "Ensure the parent directory exists".into(),
            ],
        }
    }

    /// Get the error category for styling and exit codes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } => ErrorCategory::UserError,
            Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::UnknownConfigKey { .. } => ErrorCategory::UserError,
            Self::Core(core) => core_category(core),
            Self::Scenario(err) => match err {
                ScenarioError::Io { source, .. }
                    if source.kind() == std::io::ErrorKind::NotFound =>
                {
                    ErrorCategory::NotFound
                }
                ScenarioError::Io { .. } | ScenarioError::HoldNeverReached { .. } => {
                    ErrorCategory::Internal
                }
                ScenarioError::Session(core) => core_category(core),
                _ => ErrorCategory::UserError,
            },
            Self::IoError { .. } => ErrorCategory::Internal,
        }
    }

    /// Exit code to pass to the OS.
    ///
    /// | Category      | Code |
    /// |---------------|------|
    /// | User error    |  2   |
    /// | Not found     |  3   |
    /// | Configuration |  4   |
    /// | Internal      |  1   |
    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::UserError => 2,
            ErrorCategory::NotFound => 3,
            ErrorCategory::Configuration => 4,
            ErrorCategory::Internal => 1,
        }
    }

    /// Format the error for display with colors and suggestions.
    pub fn format_colored(&self, verbose: bool) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "\n{} {}\n\n",
            "✗".red().bold(),
            "Error:".red().bold()
        ));

        output.push_str(&format!("  {}\n", self.to_string().red()));

        if verbose {
            let mut source = self.source();
            while let Some(err) = source {
                output.push_str(&format!(
                    "\n  {} {}\n",
                    "→".dimmed(),
                    err.to_string().dimmed()
                ));
                source = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str(&format!("\n{}\n", "Suggestions:".yellow().bold()));
            for suggestion in suggestions {
                output.push_str(&format!("  {}\n", suggestion));
            }
        }

        if !verbose {
            output.push('\n');
            output.push_str(&format!(
                "{} {}\n",
                "\u{2139}".blue(), // ℹ
                "Use -v / --verbose for more details.".dimmed(),
            ));
        }

        output
    }

    /// Plain-text version of [`Self::format_colored`], no ANSI codes.
    pub fn format_plain(&self, verbose: bool) -> String {
        let mut out = String::new();
        out.push_str(&format!("\nError: {}\n", self));

        if verbose {
            let mut src = std::error::Error::source(self);
            while let Some(err) = src {
                out.push_str(&format!("  Caused by: {err}\n"));
                src = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str("\nSuggestions:\n");
            for s in &suggestions {
                out.push_str(&format!("  {s}\n"));
            }
        }

        if !verbose {
            out.push_str("\nUse -v / --verbose for more details.\n");
        }

        out
    }

    /// Log the error using tracing.
    pub fn log(&self) {
        match self.category() {
            ErrorCategory::UserError => tracing::warn!("User error: {}", self),
            ErrorCategory::NotFound => tracing::warn!("Not found: {}", self),
            ErrorCategory::Configuration => tracing::error!("Configuration error: {}", self),
            ErrorCategory::Internal => tracing::error!("Internal error: {}", self),
        }

        if let Some(source) = self.source() {
            tracing::debug!("Caused by: {}", source);
        }
    }
}

fn core_category(err: &TapscanError) -> ErrorCategory {
    match err.category() {
        CoreCategory::Validation => ErrorCategory::UserError,
        CoreCategory::NotFound | CoreCategory::Unavailable => ErrorCategory::NotFound,
        CoreCategory::Configuration => ErrorCategory::Configuration,
        CoreCategory::Internal => ErrorCategory::Internal,
    }
}

fn scenario_suggestions(err: &ScenarioError) -> Vec<String> {
    match err {
        ScenarioError::Io { path, .. } => vec![
            format!("Could not read {}", path.display()),
            "Check the path; sample scenarios live in the scenarios/ directory".into(),
        ],
        ScenarioError::Parse { .. } => vec![
            "Scenarios are TOML with [[device]] and [[step]] tables".into(),
            "Every step needs an `event` key, e.g. event = \"add-device\"".into(),
        ],
        ScenarioError::InvalidValue { source, .. } => source.suggestions(),
        ScenarioError::UnknownDevice { device, .. } => vec![
            format!("Declare '{}' in a [[device]] table before using it", device),
        ],
        ScenarioError::NothingHeld { .. } => {
            vec!["Add a `hold` step for the device before `release`".into()]
        }
        ScenarioError::HoldNeverReached { .. } => vec![
            "The held device was never selected".into(),
            "Make sure a step between `hold` and `release` selects it".into(),
        ],
        ScenarioError::DuplicateDevice(id) => {
            vec![format!("Give each [[device]] a unique id ('{}' repeats)", id)]
        }
        ScenarioError::Session(core) => core.suggestions(),
    }
}

/// Error categories for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// User input error (validation, invalid arguments).
    UserError,
    /// Resource not found.
    NotFound,
    /// Configuration error.
    Configuration,
    /// Internal/system error.
    Internal,
}

// ── IntoCli trait ─────────────────────────────────────────────────────────────

/// Extension trait to convert I/O results into [`CliError`] at call-sites
/// with a descriptive context message.
pub trait IntoCli<T> {
    /// Convert to `CliResult` attaching a human-readable context message.
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IntoCli<T> for Result<T, std::io::Error> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| CliError::IoError {
            message: f().into(),
            source: e,
        })
    }
}

/// Wrap a serialisation failure as a configuration error.
pub fn config_error(
    message: impl Into<String>,
    source: impl Error + Send + Sync + 'static,
) -> CliError {
    CliError::ConfigError {
        message: message.into(),
        source: Some(Box::new(source)),
    }
}
