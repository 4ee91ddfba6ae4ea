//! Domain models for the report pipeline.
//!
//! - [`Row`] - One input record (column name -> string value)
//! - [`RowPair`] - A feed row paired with its positional reference row
//! - [`OutputField`] - The five fixed report columns
//! - [`FieldValue`] - A computed value or the error marker
//! - [`TransformedRow`] - One report line, exactly one value per output field

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::transform::expression::format_number;

/// Literal written to the report for a field whose expression failed.
pub const ERROR_MARKER: &str = "Error";

/// Value substituted for a variable missing from its row.
pub const MISSING_VALUE: &str = "0";

// =============================================================================
// Row
// =============================================================================

/// An input record: an ordered association of column name to value.
///
/// Column order follows the source header. Keys are unique; inserting an
/// existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    entries: Vec<(String, String)>,
}

impl Row {
    /// An empty row. Every lookup against it falls back to the default.
    pub const EMPTY: Row = Row {
        entries: Vec::new(),
    };

    pub fn empty() -> Self {
        Self::EMPTY
    }

    /// Set `column` to `value`.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == column)
            .map(|(_, v)| v.as_str())
    }

    /// Lookup that never fails: missing columns read as `"0"`.
    pub fn get_or_default(&self, column: &str) -> &str {
        self.get(column).unwrap_or(MISSING_VALUE)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::empty();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// A feed row and the reference row at the same ordinal position.
#[derive(Debug, Clone, Copy)]
pub struct RowPair<'a> {
    pub feed: &'a Row,
    pub reference: &'a Row,
}

impl<'a> RowPair<'a> {
    pub fn new(feed: &'a Row, reference: &'a Row) -> Self {
        Self { feed, reference }
    }
}

// =============================================================================
// Output Fields
// =============================================================================

/// One of the five fixed report columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputField {
    Outfield1,
    Outfield2,
    Outfield3,
    Outfield4,
    Outfield5,
}

impl OutputField {
    /// All output fields in report column order.
    pub const ALL: [OutputField; 5] = [
        OutputField::Outfield1,
        OutputField::Outfield2,
        OutputField::Outfield3,
        OutputField::Outfield4,
        OutputField::Outfield5,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputField::Outfield1 => "outfield1",
            OutputField::Outfield2 => "outfield2",
            OutputField::Outfield3 => "outfield3",
            OutputField::Outfield4 => "outfield4",
            OutputField::Outfield5 => "outfield5",
        }
    }

    /// Column position in the report.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Report header line columns.
    pub fn header() -> [&'static str; 5] {
        Self::ALL.map(OutputField::as_str)
    }
}

impl fmt::Display for OutputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

// =============================================================================
// Field Values
// =============================================================================

/// Result of evaluating one field's expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Error,
}

impl FieldValue {
    pub fn is_error(&self) -> bool {
        matches!(self, FieldValue::Error)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Error => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => f.write_str(&format_number(*n)),
            FieldValue::Error => f.write_str(ERROR_MARKER),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// =============================================================================
// Transformed Row
// =============================================================================

/// One report line: exactly one value per [`OutputField`], in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedRow {
    values: [FieldValue; 5],
}

impl TransformedRow {
    pub fn new(values: [FieldValue; 5]) -> Self {
        Self { values }
    }

    pub fn get(&self, field: OutputField) -> FieldValue {
        self.values[field.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (OutputField, FieldValue)> + '_ {
        OutputField::ALL.into_iter().zip(self.values.iter().copied())
    }

    /// Values rendered as report cells.
    pub fn to_record(&self) -> [String; 5] {
        self.values.map(|v| v.to_string())
    }

    pub fn error_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_error()).count()
    }
}

impl Serialize for TransformedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.as_str(), &value)?;
        }
        map.end()
    }
}
