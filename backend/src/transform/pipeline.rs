//! Report run orchestration.
//!
//! One run reads the feed and reference sources, transforms the feed rows
//! with the rule set and writes the report:
//!
//! ```text
//! feed ──┐
//!        ├─▶ parser::read_rows ─▶ transformer::transform ─▶ output::write_report
//! ref  ──┘                              ▲
//!                                   RuleSet
//! ```
//!
//! Ingestion and output failures abort the run. Expression failures only
//! show up as `Error` cells and in [`RunSummary::error_fields`].
//!
//! # Example
//!
//! ```rust,ignore
//! use reportgen::{generate_report, ReportRequest, RuleSet};
//! use std::path::Path;
//!
//! let rules = RuleSet::load("rules.json")?;
//! let request = ReportRequest::new("feed.csv", "reference.xlsx", "csv", "xlsx");
//! let summary = generate_report(&request, &rules, Path::new("output.csv"))?;
//! println!("{} rows written", summary.output_rows);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info_span;
use uuid::Uuid;

use super::transformer::transform;
use crate::api::logs::{log_error, log_info, log_success, log_warning};
use crate::config::RuleSet;
use crate::error::{RunError, RunResult};
use crate::output::write_report;
use crate::parser::read_rows;

/// The four trigger parameters of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    #[serde(rename = "feedFilePath")]
    pub feed_path: String,
    #[serde(rename = "referenceFilePath")]
    pub reference_path: String,
    #[serde(rename = "feedFileType")]
    pub feed_format: String,
    #[serde(rename = "referenceFileType")]
    pub reference_format: String,
}

impl ReportRequest {
    pub fn new(
        feed_path: impl Into<String>,
        reference_path: impl Into<String>,
        feed_format: impl Into<String>,
        reference_format: impl Into<String>,
    ) -> Self {
        Self {
            feed_path: feed_path.into(),
            reference_path: reference_path.into(),
            feed_format: feed_format.into(),
            reference_format: reference_format.into(),
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub feed_rows: usize,
    pub reference_rows: usize,
    pub output_rows: usize,
    /// Number of cells holding the `Error` marker.
    pub error_fields: usize,
    pub output_path: String,
}

/// Run one report synchronously.
pub fn generate_report(
    request: &ReportRequest,
    rules: &RuleSet,
    output_path: &Path,
) -> RunResult<RunSummary> {
    let run_id = Uuid::new_v4().to_string();
    let span = info_span!("report", run_id = %run_id);
    let _guard = span.enter();

    let started_at = Utc::now();
    log_info("📄 Starting report generation...");
    log_info(format!("Feed file path: {}", request.feed_path));
    log_info(format!("Reference file path: {}", request.reference_path));
    log_info(format!("Feed file type: {}", request.feed_format));
    log_info(format!("Reference file type: {}", request.reference_format));

    for field in rules.missing() {
        log_warning(format!("No rule configured for {}; column will contain Error", field));
    }

    let feed = read_rows(&request.feed_path, &request.feed_format).inspect_err(|e| {
        log_error(format!("Feed ingestion failed: {}", e));
    })?;
    log_success(format!("Read {} feed rows", feed.row_count()));

    let reference = read_rows(&request.reference_path, &request.reference_format)
        .inspect_err(|e| log_error(format!("Reference ingestion failed: {}", e)))?;
    log_success(format!("Read {} reference rows", reference.row_count()));

    if reference.row_count() < feed.row_count() {
        log_warning(format!(
            "Reference has {} fewer rows than feed; refdata values default to 0",
            feed.row_count() - reference.row_count()
        ));
    }

    log_info("⚙️  Applying transformation rules...");
    let transformed = transform(&feed.rows, &reference.rows, rules);
    let error_fields: usize = transformed.iter().map(|r| r.error_count()).sum();
    if error_fields > 0 {
        log_warning(format!("{} fields could not be evaluated", error_fields));
    }

    write_report(output_path, &transformed).inspect_err(|e| {
        log_error(format!("Writing report failed: {}", e));
    })?;
    log_success(format!(
        "Report generation completed: {} rows written to {}",
        transformed.len(),
        output_path.display()
    ));

    Ok(RunSummary {
        run_id,
        started_at,
        finished_at: Utc::now(),
        feed_rows: feed.row_count(),
        reference_rows: reference.row_count(),
        output_rows: transformed.len(),
        error_fields,
        output_path: output_path.display().to_string(),
    })
}

/// Run one report on the blocking thread pool.
pub async fn generate_report_async(
    request: ReportRequest,
    rules: Arc<RuleSet>,
    output_path: PathBuf,
) -> RunResult<RunSummary> {
    tokio::task::spawn_blocking(move || generate_report(&request, &rules, &output_path))
        .await
        .map_err(|e| RunError::Task(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{IngestionError, SinkError};
    use crate::models::OutputField;
    use std::fs;
    use tempfile::tempdir;

    fn sample_rules() -> RuleSet {
        RuleSet::new([
            (OutputField::Outfield1, "field1+field2"),
            (OutputField::Outfield2, "max(field1, refdata1)"),
            (OutputField::Outfield3, "field3*refdata2"),
            (OutputField::Outfield4, "field5/refdata3"),
            (OutputField::Outfield5, "refdata4-field1"),
        ])
    }

    #[test]
    fn test_generate_report() {
        let dir = tempdir().unwrap();
        let feed = dir.path().join("feed.csv");
        let reference = dir.path().join("reference.csv");
        let output = dir.path().join("output.csv");
        fs::write(&feed, "field1,field2,field3,field5\n10,3,2,9\n1,1,1,1\n").unwrap();
        fs::write(&reference, "refdata1,refdata2,refdata3,refdata4\n2,4,3,20\n").unwrap();

        let request = ReportRequest::new(
            feed.to_string_lossy(),
            reference.to_string_lossy(),
            "csv",
            "CSV",
        );
        let summary = generate_report(&request, &sample_rules(), &output).unwrap();

        assert_eq!(summary.feed_rows, 2);
        assert_eq!(summary.reference_rows, 1);
        assert_eq!(summary.output_rows, 2);
        // Row 2: field5/refdata3 = 1/0
        assert_eq!(summary.error_fields, 1);

        let content = fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "outfield1,outfield2,outfield3,outfield4,outfield5");
        assert_eq!(lines[1], "13.0,10.0,8.0,3.0,10.0");
        assert_eq!(lines[2], "2.0,1.0,0.0,Error,-1.0");
    }

    #[test]
    fn test_missing_feed_fails_run() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("output.csv");
        let request = ReportRequest::new(
            dir.path().join("absent.csv").to_string_lossy(),
            dir.path().join("absent-ref.csv").to_string_lossy(),
            "csv",
            "csv",
        );

        let err = generate_report(&request, &sample_rules(), &output).unwrap_err();
        assert!(matches!(err, RunError::Ingestion(IngestionError::Io { .. })));
        assert!(!output.exists());
    }

    #[test]
    fn test_unsupported_format_fails_run() {
        let dir = tempdir().unwrap();
        let feed = dir.path().join("feed.csv");
        fs::write(&feed, "field1\n1\n").unwrap();
        let request = ReportRequest::new(feed.to_string_lossy(), feed.to_string_lossy(), "csv", "parquet");

        let err = generate_report(&request, &sample_rules(), &dir.path().join("out.csv")).unwrap_err();
        assert!(err.to_string().contains("parquet"));
    }

    #[test]
    fn test_unwritable_output_fails_run() {
        let dir = tempdir().unwrap();
        let feed = dir.path().join("feed.csv");
        fs::write(&feed, "field1\n1\n").unwrap();
        let request = ReportRequest::new(feed.to_string_lossy(), feed.to_string_lossy(), "csv", "csv");

        let output = dir.path().join("no-such-dir").join("out.csv");
        let err = generate_report(&request, &sample_rules(), &output).unwrap_err();
        assert!(matches!(err, RunError::Sink(SinkError::Io { .. })));
    }

    #[test]
    fn test_request_query_names() {
        let request: ReportRequest = serde_json::from_value(serde_json::json!({
            "feedFilePath": "a.csv",
            "referenceFilePath": "b.xlsx",
            "feedFileType": "csv",
            "referenceFileType": "xlsx"
        }))
        .unwrap();
        assert_eq!(request, ReportRequest::new("a.csv", "b.xlsx", "csv", "xlsx"));
    }

    #[tokio::test]
    async fn test_generate_report_async() {
        let dir = tempdir().unwrap();
        let feed = dir.path().join("feed.csv");
        let output = dir.path().join("output.csv");
        fs::write(&feed, "field1,field2\n10,3\n").unwrap();
        let request = ReportRequest::new(feed.to_string_lossy(), feed.to_string_lossy(), "csv", "csv");

        let summary = generate_report_async(request, Arc::new(sample_rules()), output.clone())
            .await
            .unwrap();

        assert_eq!(summary.output_rows, 1);
        assert!(output.exists());
    }
}
