//! Report output - transformed rows to delimited text.
//!
//! The report always has the header `outfield1,...,outfield5` followed by
//! one line per transformed row. The destination is replaced atomically:
//! rows are written to a temporary sibling file which is then renamed over
//! the target, so a failed run leaves the previous report untouched.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{SinkError, SinkResult};
use crate::models::{OutputField, TransformedRow};

/// Write the report header and rows to any writer.
pub fn write_rows<W: Write>(writer: W, rows: &[TransformedRow]) -> SinkResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(OutputField::header())?;
    for row in rows {
        csv_writer.write_record(row.to_record())?;
    }

    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write the report to `path`, replacing any previous report.
pub fn write_report(path: &Path, rows: &[TransformedRow]) -> SinkResult<()> {
    let tmp_path = temp_sibling(path);

    let result = fs::File::create(&tmp_path)
        .map_err(|source| io_error(&tmp_path, source))
        .and_then(|file| write_rows(file, rows))
        .and_then(|()| fs::rename(&tmp_path, path).map_err(|source| io_error(path, source)));

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

/// Render the report as a string.
pub fn render_report(rows: &[TransformedRow]) -> SinkResult<String> {
    let mut buffer = Vec::new();
    write_rows(&mut buffer, rows)?;
    String::from_utf8(buffer).map_err(|e| SinkError::Io {
        path: "<memory>".to_string(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    path.with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()))
}

fn io_error(path: &Path, source: std::io::Error) -> SinkError {
    SinkError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldValue;
    use tempfile::tempdir;

    fn sample_rows() -> Vec<TransformedRow> {
        vec![
            TransformedRow::new([
                FieldValue::Number(13.0),
                FieldValue::Number(10.0),
                FieldValue::Error,
                FieldValue::Number(0.5),
                FieldValue::Number(-1.0),
            ]),
            TransformedRow::new([FieldValue::Error; 5]),
        ]
    }

    #[test]
    fn test_render_report() {
        let text = render_report(&sample_rows()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "outfield1,outfield2,outfield3,outfield4,outfield5");
        assert_eq!(lines[1], "13.0,10.0,Error,0.5,-1.0");
        assert_eq!(lines[2], "Error,Error,Error,Error,Error");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_empty_report_has_header() {
        let text = render_report(&[]).unwrap();
        assert_eq!(text, "outfield1,outfield2,outfield3,outfield4,outfield5\n");
    }

    #[test]
    fn test_write_report_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.csv");
        fs::write(&path, "stale content\nmore\nand more\n").unwrap();

        write_report(&path, &sample_rows()[..1]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(!content.contains("stale"));

        // No temporary files left behind
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_write_report_missing_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("output.csv");

        let err = write_report(&path, &sample_rows()).unwrap_err();
        assert!(matches!(err, SinkError::Io { .. }));
    }
}
