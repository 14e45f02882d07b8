//! Common types used throughout manus-import
//!
//! This module contains shared type definitions, type aliases,
//! and the closed set of destination tables.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// A single exported record: field name to value
pub type Record = JsonObject;

/// Name of the primary key column every destination table carries
pub const PRIMARY_KEY: &str = "id";

// ============================================================================
// Destination Tables
// ============================================================================

/// Destination table for an import file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Professionals,
    Users,
    Reviews,
    Stories,
    Categories,
}

impl Table {
    /// All tables, in the order they are verified after a run
    pub const ALL: [Table; 5] = [
        Table::Professionals,
        Table::Users,
        Table::Reviews,
        Table::Stories,
        Table::Categories,
    ];

    /// SQL table name
    pub fn as_str(self) -> &'static str {
        match self {
            Table::Professionals => "professionals",
            Table::Users => "users",
            Table::Reviews => "reviews",
            Table::Stories => "stories",
            Table::Categories => "categories",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Table {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| crate::error::Error::invalid_value("table", format!("unknown table '{s}'")))
    }
}

// ============================================================================
// Bound Values
// ============================================================================

/// A value bound to an upsert statement, independent of the driver
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
}

impl SqlValue {
    /// Check if this value is SQL NULL
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names() {
        let names: Vec<&str> = Table::ALL.iter().map(|t| t.as_str()).collect();
        assert_eq!(
            names,
            vec!["professionals", "users", "reviews", "stories", "categories"]
        );
        assert_eq!(Table::Stories.to_string(), "stories");
    }

    #[test]
    fn test_table_from_str() {
        assert_eq!("reviews".parse::<Table>().unwrap(), Table::Reviews);
        assert_eq!("USERS".parse::<Table>().unwrap(), Table::Users);
        assert!("orders".parse::<Table>().is_err());
    }

    #[test]
    fn test_table_serde() {
        let json = serde_json::to_string(&Table::Categories).unwrap();
        assert_eq!(json, "\"categories\"");
        let table: Table = serde_json::from_str("\"professionals\"").unwrap();
        assert_eq!(table, Table::Professionals);
    }

    #[test]
    fn test_sql_value_is_null() {
        assert!(SqlValue::Null.is_null());
        assert!(!SqlValue::Text("NULL".to_string()).is_null());
    }
}
