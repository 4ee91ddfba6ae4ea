//! Error types for the report generation pipeline.
//!
//! This module defines one error type per pipeline stage:
//!
//! - [`IngestionError`] - Reading feed/reference sources (fatal to a run)
//! - [`ExpressionError`] - Evaluating one field's expression (recovered locally)
//! - [`SinkError`] - Writing the report output (fatal to a run)
//! - [`ConfigError`] - Loading rules and settings
//! - [`RunError`] - Top-level run failure
//! - [`ServerError`] - HTTP server and scheduler startup
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Ingestion Errors
// =============================================================================

/// Errors while reading a feed or reference source.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Failed to read file.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Format string not one of the supported tabular formats.
    #[error("Unsupported file type '{0}' (expected csv, xls or xlsx)")]
    UnsupportedFormat(String),

    /// Malformed delimited text.
    #[error("Invalid CSV in '{path}': {message}")]
    Csv { path: String, message: String },

    /// Workbook could not be opened or read.
    #[error("Invalid spreadsheet '{path}': {message}")]
    Spreadsheet { path: String, message: String },

    /// No header row found.
    #[error("No header row found in '{0}'")]
    NoHeaders(String),
}

// =============================================================================
// Expression Errors
// =============================================================================

/// Errors evaluating a single rule expression.
///
/// These never abort a row or a run: the evaluator turns them into the
/// `"Error"` marker for the affected field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    /// No expression configured for the output field.
    #[error("No rule configured for '{0}'")]
    MissingRule(String),

    /// `max(` without a closing parenthesis.
    #[error("Unclosed max( call")]
    UnclosedFunction,

    /// `max(...)` with fewer than two arguments.
    #[error("max() expects two arguments, got '{0}'")]
    BadArguments(String),

    /// Operator without a right-hand operand.
    #[error("Missing operand for '{0}'")]
    MissingOperand(char),

    /// Operand text is not a number.
    #[error("Not a number: '{0}'")]
    NotANumber(String),

    /// Arithmetic produced NaN or infinity.
    #[error("Result is not finite: {0}")]
    NonFinite(String),
}

// =============================================================================
// Sink Errors
// =============================================================================

/// Errors writing the report output.
#[derive(Debug, Error)]
pub enum SinkError {
    /// IO error on the destination.
    #[error("Failed to write '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV writer error.
    #[error("CSV writer error: {0}")]
    Csv(#[from] csv::Error),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors loading rules or settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Rules file could not be read.
    #[error("Failed to read rules file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Rules file is not valid JSON.
    #[error("Invalid rules JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Rule key is not one of the output fields.
    #[error("Unknown output field '{0}' (expected outfield1..outfield5)")]
    UnknownField(String),

    /// Environment variable with an unparsable value.
    #[error("Invalid value for {name}: '{value}'")]
    InvalidEnv { name: String, value: String },
}

// =============================================================================
// Run Errors (top-level)
// =============================================================================

/// Top-level run failure.
///
/// This is the error returned by [`crate::transform::pipeline::generate_report`].
/// Expression failures never surface here.
#[derive(Debug, Error)]
pub enum RunError {
    /// Feed or reference source could not be read.
    #[error("{0}")]
    Ingestion(#[from] IngestionError),

    /// Output could not be written.
    #[error("{0}")]
    Sink(#[from] SinkError),

    /// Blocking worker panicked or was cancelled.
    #[error("Report task failed: {0}")]
    Task(String),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server and scheduler errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid bind address.
    #[error("Invalid address '{0}'")]
    Address(String),

    /// Socket error.
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Result type for expression evaluation.
pub type ExpressionResult<T> = Result<T, ExpressionError>;

/// Result type for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for report runs.
pub type RunResult<T> = Result<T, RunError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // IngestionError -> RunError
        let err = IngestionError::UnsupportedFormat("json".into());
        let run_err: RunError = err.into();
        assert!(run_err.to_string().contains("json"));

        // ConfigError -> ServerError
        let cfg_err = ConfigError::UnknownField("outfield9".into());
        let server_err: ServerError = cfg_err.into();
        assert!(server_err.to_string().contains("outfield9"));
    }

    #[test]
    fn test_io_error_names_path() {
        let err = IngestionError::Io {
            path: "feed.csv".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        let msg = err.to_string();
        assert!(msg.contains("feed.csv"));
        assert!(msg.contains("missing"));
    }

    #[test]
    fn test_expression_error_format() {
        assert_eq!(
            ExpressionError::NotANumber("abc".into()).to_string(),
            "Not a number: 'abc'"
        );
        assert_eq!(
            ExpressionError::MissingOperand('+').to_string(),
            "Missing operand for '+'"
        );
    }
}
