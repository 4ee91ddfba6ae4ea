//! Delimited-text ingestion with encoding and delimiter auto-detection.

use encoding_rs::{Encoding, UTF_8};

use super::{ParseResult, SourceFormat};
use crate::error::{IngestionError, IngestionResult};
use crate::models::Row;

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes using an encoding label, falling back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let encoding = Encoding::for_label(encoding.as_bytes()).unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

/// Detect the delimiter by counting occurrences in the header line.
///
/// Comma wins ties and single-column files.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
///
/// `source` names the input in error messages.
pub fn parse_csv_bytes(bytes: &[u8], source: &str) -> IngestionResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);

    let mut result = parse_csv_str(&content, delimiter, source)?;
    result.encoding = Some(encoding);
    Ok(result)
}

/// Parse CSV text with an explicit delimiter. The first record is the header.
///
/// Records shorter than the header leave the trailing columns absent, so
/// those lookups fall back to the default value. A record of empty fields
/// (`,,`) is still a row, which keeps feed and reference positions aligned.
pub fn parse_csv_str(content: &str, delimiter: char, source: &str) -> IngestionResult<ParseResult> {
    let delimiter_byte = u8::try_from(delimiter).map_err(|_| IngestionError::Csv {
        path: source.to_string(),
        message: format!("unsupported delimiter '{}'", delimiter),
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(source, e))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(IngestionError::NoHeaders(source.to_string()));
    }

    let mut rows = Vec::new();
    let mut filled = 0;
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(source, e))?;

        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.as_str(), v))
            .collect();
        rows.push(row);

        if record.iter().any(|field| !field.trim().is_empty()) {
            filled = rows.len();
        }
    }
    // Blank records keep their position; only the trailing run is dropped.
    rows.truncate(filled);

    Ok(ParseResult {
        rows,
        headers,
        format: SourceFormat::Csv,
        encoding: None,
        delimiter: Some(delimiter),
    })
}

fn csv_error(source: &str, err: csv::Error) -> IngestionError {
    let message = match err.position() {
        Some(pos) => format!("line {}: {}", pos.line(), err),
        None => err.to_string(),
    };
    IngestionError::Csv {
        path: source.to_string(),
        message,
    }
}
