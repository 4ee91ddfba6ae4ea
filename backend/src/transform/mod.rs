//! Rule-driven transformation.
//!
//! - Expression: substitution and arithmetic for one rule
//! - Transformer: feed/reference pairing and per-row evaluation
//! - Pipeline: a complete report run

pub mod expression;
pub mod pipeline;
pub mod transformer;

pub use expression::{evaluate, format_number, try_evaluate};
pub use pipeline::{generate_report, generate_report_async, ReportRequest, RunSummary};
pub use transformer::{transform, transform_pair};
