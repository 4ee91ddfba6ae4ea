//! Spreadsheet ingestion (`.xls`, `.xlsx`) via calamine.
//!
//! Only the first worksheet is read. Its first row is the header.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{open_workbook, Data, Range, Reader, Xls, Xlsx};

use super::{ParseResult, SourceFormat};
use crate::error::{IngestionError, IngestionResult};
use crate::models::Row;

/// Read the first worksheet of a workbook.
pub fn read_workbook(path: &Path, format: SourceFormat) -> IngestionResult<ParseResult> {
    let range = match format {
        SourceFormat::Xls => first_sheet::<Xls<BufReader<File>>>(path)?,
        SourceFormat::Xlsx => first_sheet::<Xlsx<BufReader<File>>>(path)?,
        SourceFormat::Csv => return Err(IngestionError::UnsupportedFormat(format.to_string())),
    };

    let (headers, rows) = rows_from_range(&range, path)?;
    Ok(ParseResult {
        rows,
        headers,
        format,
        encoding: None,
        delimiter: None,
    })
}

fn first_sheet<R>(path: &Path) -> IngestionResult<Range<Data>>
where
    R: Reader<BufReader<File>>,
    R::Error: std::fmt::Display,
{
    let mut workbook: R = open_workbook(path).map_err(|e| spreadsheet_error(path, e))?;

    match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| spreadsheet_error(path, e)),
        None => Err(IngestionError::Spreadsheet {
            path: path.display().to_string(),
            message: "workbook has no sheets".to_string(),
        }),
    }
}

fn rows_from_range(range: &Range<Data>, path: &Path) -> IngestionResult<(Vec<String>, Vec<Row>)> {
    let mut sheet_rows = range.rows();

    let headers: Vec<String> = sheet_rows
        .next()
        .ok_or_else(|| IngestionError::NoHeaders(path.display().to_string()))?
        .iter()
        .map(|cell| cell_to_string(cell).trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(IngestionError::NoHeaders(path.display().to_string()));
    }

    let mut rows = Vec::new();
    let mut filled = 0;
    for cells in sheet_rows {
        // Empty cells read as "", the same as an empty CSV field.
        let row: Row = headers
            .iter()
            .zip(cells.iter())
            .filter(|(h, _)| !h.is_empty())
            .map(|(h, c)| (h.as_str(), cell_to_string(c)))
            .collect();
        rows.push(row);

        if cells.iter().any(|c| !cell_to_string(c).trim().is_empty()) {
            filled = rows.len();
        }
    }
    // Blank rows keep their position; only the trailing run is dropped.
    rows.truncate(filled);

    Ok((headers, rows))
}

/// Render a cell as the text a user would see in it.
///
/// Whole-valued numbers drop the fraction (`10`, not `10.0`).
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn spreadsheet_error(path: &Path, err: impl std::fmt::Display) -> IngestionError {
    IngestionError::Spreadsheet {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}
