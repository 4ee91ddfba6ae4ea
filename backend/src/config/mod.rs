//! Runtime configuration.
//!
//! - [`RuleSet`] - expression per output field, loaded from JSON
//! - [`ReportConfig`] - paths, listen address and schedule, from environment
//!
//! Environment variables (a `.env` file is honoured by the binary):
//!
//! | Variable                           | Default                     |
//! |------------------------------------|-----------------------------|
//! | `REPORT_RULES_PATH`                | `rules.json`                |
//! | `REPORT_OUTPUT_PATH`               | `output.csv`                |
//! | `REPORT_HOST`                      | `0.0.0.0`                   |
//! | `REPORT_PORT`                      | `8080`                      |
//! | `REPORT_SCHEDULE_ENABLED`          | `true`                      |
//! | `REPORT_SCHEDULE_FEED_PATH`        | `path/to/feedfile.csv`      |
//! | `REPORT_SCHEDULE_REFERENCE_PATH`   | `path/to/referencefile.csv` |
//! | `REPORT_SCHEDULE_FEED_FORMAT`      | `csv`                       |
//! | `REPORT_SCHEDULE_REFERENCE_FORMAT` | `csv`                       |

pub mod rules;

pub use rules::RuleSet;

use std::env;
use std::path::PathBuf;

use crate::error::{ConfigError, ConfigResult};
use crate::transform::pipeline::ReportRequest;

/// Process-level settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub rules_path: PathBuf,
    pub output_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub schedule: ScheduleConfig,
}

/// The report run triggered at the top of every hour.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleConfig {
    pub enabled: bool,
    pub request: ReportRequest,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            rules_path: PathBuf::from("rules.json"),
            output_path: PathBuf::from("output.csv"),
            host: "0.0.0.0".to_string(),
            port: 8080,
            schedule: ScheduleConfig::default(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            request: ReportRequest {
                feed_path: "path/to/feedfile.csv".to_string(),
                reference_path: "path/to/referencefile.csv".to_string(),
                feed_format: "csv".to_string(),
                reference_format: "csv".to_string(),
            },
        }
    }
}

impl ReportConfig {
    /// Read settings from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read settings through `lookup`, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("REPORT_RULES_PATH") {
            config.rules_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("REPORT_OUTPUT_PATH") {
            config.output_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("REPORT_HOST") {
            config.host = v;
        }
        if let Some(v) = lookup("REPORT_PORT") {
            config.port = v.parse().map_err(|_| ConfigError::InvalidEnv {
                name: "REPORT_PORT".to_string(),
                value: v.clone(),
            })?;
        }
        if let Some(v) = lookup("REPORT_SCHEDULE_ENABLED") {
            config.schedule.enabled = parse_flag("REPORT_SCHEDULE_ENABLED", &v)?;
        }

        let request = &mut config.schedule.request;
        if let Some(v) = lookup("REPORT_SCHEDULE_FEED_PATH") {
            request.feed_path = v;
        }
        if let Some(v) = lookup("REPORT_SCHEDULE_REFERENCE_PATH") {
            request.reference_path = v;
        }
        if let Some(v) = lookup("REPORT_SCHEDULE_FEED_FORMAT") {
            request.feed_format = v;
        }
        if let Some(v) = lookup("REPORT_SCHEDULE_REFERENCE_FORMAT") {
            request.reference_format = v;
        }

        Ok(config)
    }

    /// `host:port` for the HTTP listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(name: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}
