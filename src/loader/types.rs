//! Import file types

use crate::error::{Error, Result};
use crate::types::{JsonValue, Record, SqlValue, PRIMARY_KEY};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Literal string the exporter writes in place of SQL NULL
pub const NULL_SENTINEL: &str = "NULL";

/// A Manus DB query export
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportFile {
    /// Exported records, in file order
    pub rows: Vec<Record>,
}

impl ImportFile {
    /// First record, used for inference and statement building
    pub fn first_row(&self) -> Option<&Record> {
        self.rows.first()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Ordered field list shared by every record of a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordShape {
    fields: Vec<String>,
}

impl RecordShape {
    /// Take the shape of a record; fields are kept sorted by name
    pub fn from_record(record: &Record) -> Self {
        let mut fields: Vec<String> = record.keys().cloned().collect();
        fields.sort();
        Self { fields }
    }

    /// All field names
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Fields overwritten on conflict (everything but the primary key)
    pub fn update_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .map(String::as_str)
            .filter(|f| *f != PRIMARY_KEY)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Check that a record has exactly this shape's fields
    pub fn check(&self, row: usize, record: &Record) -> Result<()> {
        let expected: BTreeSet<&str> = self.fields.iter().map(String::as_str).collect();
        let actual: BTreeSet<&str> = record.keys().map(String::as_str).collect();
        if expected == actual {
            return Ok(());
        }

        let missing: Vec<&str> = expected.difference(&actual).copied().collect();
        let unexpected: Vec<&str> = actual.difference(&expected).copied().collect();
        Err(Error::ShapeMismatch {
            row,
            missing: missing.join(", "),
            unexpected: unexpected.join(", "),
        })
    }

    /// Check every record of a file against this shape
    pub fn validate(&self, rows: &[Record]) -> Result<()> {
        rows.iter()
            .enumerate()
            .try_for_each(|(i, record)| self.check(i, record))
    }
}

/// Convert an exported value into a bound SQL value.
///
/// `"NULL"` and absent values become SQL NULL; scalars pass through as-is.
/// Arrays and objects are bound as their compact JSON text.
pub fn normalize_value(value: Option<&JsonValue>) -> SqlValue {
    match value {
        None | Some(JsonValue::Null) => SqlValue::Null,
        Some(JsonValue::String(s)) if s == NULL_SENTINEL => SqlValue::Null,
        Some(JsonValue::String(s)) => SqlValue::Text(s.clone()),
        Some(JsonValue::Bool(b)) => SqlValue::Bool(*b),
        Some(JsonValue::Number(n)) => {
            if let Some(i) = n.as_i64() {
                SqlValue::Int(i)
            } else if let Some(u) = n.as_u64() {
                SqlValue::UInt(u)
            } else {
                n.as_f64().map_or(SqlValue::Null, SqlValue::Float)
            }
        }
        Some(other @ (JsonValue::Array(_) | JsonValue::Object(_))) => {
            SqlValue::Text(other.to_string())
        }
    }
}
