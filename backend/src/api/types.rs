//! REST API response types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::RunError;

/// Body returned when a triggered run completes.
pub const GENERATE_OK: &str = "Report generation triggered successfully.";

/// Body returned when a triggered run fails.
pub fn generate_error(err: &RunError) -> String {
    format!("Error generating report: {}", err)
}

/// `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    /// Number of configured output rules
    pub rules: usize,
}

/// `GET /api/reports/describe`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiDescription {
    pub api: String,
    pub description: String,
    pub endpoints: BTreeMap<String, String>,
    pub usage: String,
}

impl ApiDescription {
    pub fn current() -> Self {
        let endpoints = [
            (
                "POST /api/reports/generate",
                "Generate the report from a feed and a reference file.",
            ),
            ("GET /api/reports/describe", "This description."),
            ("GET /api/logs", "Server-Sent Events stream of run logs."),
            ("GET /health", "Health check."),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            api: "Report Generator API".to_string(),
            description: "Welcome to the Report Generator API!".to_string(),
            endpoints,
            usage: "POST /api/reports/generate with query parameters feedFilePath, \
                    referenceFilePath, feedFileType and referenceFileType \
                    (csv, xls or xlsx)."
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestionError;

    #[test]
    fn test_generate_error_message() {
        let err = RunError::from(IngestionError::UnsupportedFormat("pdf".into()));
        let body = generate_error(&err);
        assert!(body.starts_with("Error generating report: "));
        assert!(body.contains("pdf"));
    }

    #[test]
    fn test_description_lists_generate() {
        let description = ApiDescription::current();
        assert_eq!(description.api, "Report Generator API");
        assert!(description.endpoints.contains_key("POST /api/reports/generate"));
    }
}
