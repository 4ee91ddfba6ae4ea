//! # Reportgen - rule-driven feed/reference reports
//!
//! Reportgen reads a feed source and a reference source (CSV, XLS or XLSX),
//! pairs their rows by position and computes five output columns from
//! configurable arithmetic rules.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Feed + Ref  │────▶│   Parser    │────▶│  Transform  │────▶│ output.csv  │
//! │ csv/xls(x)  │     │  (auto-enc) │     │  (RuleSet)  │     │ outfield1-5 │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use reportgen::{generate_report, ReportRequest, RuleSet};
//! use std::path::Path;
//!
//! let rules = RuleSet::load("rules.json")?;
//! let request = ReportRequest::new("feed.csv", "reference.csv", "csv", "csv");
//! let summary = generate_report(&request, &rules, Path::new("output.csv"))?;
//! println!("{} rows, {} error fields", summary.output_rows, summary.error_fields);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per stage
//! - [`models`] - Rows, output fields and values
//! - [`config`] - Rule set and environment settings
//! - [`parser`] - CSV and spreadsheet ingestion
//! - [`transform`] - Expression evaluation, row transformation, runs
//! - [`output`] - Report writer
//! - [`api`] - HTTP trigger and log stream
//! - [`scheduler`] - Hourly runs

// Core modules
pub mod error;
pub mod models;
pub mod config;

// Ingestion
pub mod parser;

// Transformation
pub mod transform;

// Output
pub mod output;

// HTTP API
pub mod api;

// Scheduling
pub mod scheduler;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{
    ConfigError, ExpressionError, IngestionError, RunError, ServerError, SinkError,
};

pub use models::{FieldValue, OutputField, Row, RowPair, TransformedRow, ERROR_MARKER};

pub use config::{ReportConfig, RuleSet, ScheduleConfig};

pub use parser::{read_rows, read_source, ParseResult, SourceFormat};

pub use transform::{
    evaluate, format_number, generate_report, generate_report_async, transform, transform_pair,
    try_evaluate, ReportRequest, RunSummary,
};

pub use output::{render_report, write_report};

pub use scheduler::Scheduler;
