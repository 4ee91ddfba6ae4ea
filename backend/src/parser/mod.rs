//! Tabular source ingestion.
//!
//! Turns a feed or reference file into an ordered sequence of [`Row`]s.
//! The first record of the source is the header; every following record
//! becomes one row keyed by those header names.
//!
//! - [`delimited`] - CSV with encoding and delimiter auto-detection
//! - [`spreadsheet`] - first worksheet of an `.xls` / `.xlsx` workbook

pub mod delimited;
pub mod spreadsheet;

pub use delimited::{decode_content, detect_delimiter, detect_encoding, parse_csv_bytes, parse_csv_str};
pub use spreadsheet::read_workbook;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{IngestionError, IngestionResult};
use crate::models::Row;

/// Supported source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Csv,
    Xls,
    Xlsx,
}

impl SourceFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceFormat::Csv => "csv",
            SourceFormat::Xls => "xls",
            SourceFormat::Xlsx => "xlsx",
        }
    }
}

impl FromStr for SourceFormat {
    type Err = IngestionError;

    /// Case-insensitive: `CSV`, `csv` and `Csv` are the same format.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "xls" => Ok(SourceFormat::Xls),
            "xlsx" => Ok(SourceFormat::Xlsx),
            _ => Err(IngestionError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rows read from one source, with detection metadata.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub rows: Vec<Row>,
    pub headers: Vec<String>,
    pub format: SourceFormat,
    /// Detected text encoding (CSV only).
    pub encoding: Option<String>,
    /// Detected delimiter (CSV only).
    pub delimiter: Option<char>,
}

impl ParseResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Read `path` using a format name such as `"csv"` or `"xlsx"`.
pub fn read_rows(path: impl AsRef<Path>, format: &str) -> IngestionResult<ParseResult> {
    read_source(path, format.parse()?)
}

/// Read `path` in the given format.
pub fn read_source(path: impl AsRef<Path>, format: SourceFormat) -> IngestionResult<ParseResult> {
    let path = path.as_ref();
    match format {
        SourceFormat::Csv => {
            let bytes = std::fs::read(path).map_err(|source| IngestionError::Io {
                path: path.display().to_string(),
                source,
            })?;
            parse_csv_bytes(&bytes, &path.display().to_string())
        }
        SourceFormat::Xls | SourceFormat::Xlsx => read_workbook(path, format),
    }
}
