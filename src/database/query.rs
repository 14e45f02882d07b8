//! Upsert statement construction

use crate::loader::{normalize_value, RecordShape};
use crate::types::{Record, SqlValue, Table, PRIMARY_KEY};

/// SQL dialect of a destination engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// MySQL / MariaDB: backtick identifiers, `ON DUPLICATE KEY UPDATE`
    MySql,
    /// DuckDB: double-quoted identifiers, `ON CONFLICT ... DO UPDATE`
    DuckDb,
}

impl Dialect {
    /// Quote an identifier, doubling any embedded quote character
    pub fn quote_ident(self, ident: &str) -> String {
        match self {
            Dialect::MySql => format!("`{}`", ident.replace('`', "``")),
            Dialect::DuckDb => format!("\"{}\"", ident.replace('"', "\"\"")),
        }
    }
}

/// An insert-or-update statement for one file's record shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertStatement {
    table: Table,
    columns: Vec<String>,
    sql: String,
}

impl UpsertStatement {
    /// Render the statement for a table and record shape.
    ///
    /// Every column except `id` is overwritten with the incoming value on
    /// a primary key conflict.
    pub fn build(dialect: Dialect, table: Table, shape: &RecordShape) -> Self {
        let q = |ident: &str| dialect.quote_ident(ident);
        let table_ident = q(table.as_str());
        let columns: Vec<String> = shape.fields().to_vec();

        let column_list = columns.iter().map(|c| q(c)).collect::<Vec<_>>().join(", ");
        let placeholders = vec!["?"; columns.len()].join(", ");
        let update_fields: Vec<&str> = shape.update_fields().collect();

        let insert = if columns.is_empty() {
            match dialect {
                Dialect::MySql => format!("INSERT INTO {table_ident} () VALUES ()"),
                Dialect::DuckDb => format!("INSERT INTO {table_ident} DEFAULT VALUES"),
            }
        } else {
            format!("INSERT INTO {table_ident} ({column_list}) VALUES ({placeholders})")
        };

        let conflict = match dialect {
            Dialect::MySql => {
                let updates = if update_fields.is_empty() {
                    // Nothing to overwrite; keep the statement valid
                    format!("{pk}={pk}", pk = q(PRIMARY_KEY))
                } else {
                    update_fields
                        .iter()
                        .map(|f| format!("{col}=VALUES({col})", col = q(f)))
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                format!("ON DUPLICATE KEY UPDATE {updates}")
            }
            Dialect::DuckDb => {
                if update_fields.is_empty() {
                    "ON CONFLICT DO NOTHING".to_string()
                } else {
                    let updates = update_fields
                        .iter()
                        .map(|f| format!("{col} = excluded.{col}", col = q(f)))
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!("ON CONFLICT ({}) DO UPDATE SET {updates}", q(PRIMARY_KEY))
                }
            }
        };

        Self {
            table,
            columns,
            sql: format!("{insert} {conflict}"),
        }
    }

    pub fn table(&self) -> Table {
        self.table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rendered SQL with positional `?` placeholders
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Normalized values of a record, in column order
    pub fn bind_values(&self, record: &Record) -> Vec<SqlValue> {
        self.columns
            .iter()
            .map(|column| normalize_value(record.get(column)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn shape(value: serde_json::Value) -> (RecordShape, Record) {
        let record = value.as_object().cloned().unwrap();
        (RecordShape::from_record(&record), record)
    }

    #[test]
    fn test_mysql_upsert() {
        let (shape, _) = shape(json!({"id": 1, "displayName": "Alice", "category": "plumber"}));
        let stmt = UpsertStatement::build(Dialect::MySql, Table::Professionals, &shape);
        assert_eq!(
            stmt.sql(),
            "INSERT INTO `professionals` (`category`, `displayName`, `id`) VALUES (?, ?, ?) \
             ON DUPLICATE KEY UPDATE `category`=VALUES(`category`), `displayName`=VALUES(`displayName`)"
        );
        assert_eq!(stmt.table(), Table::Professionals);
    }

    #[test]
    fn test_duckdb_upsert() {
        let (shape, _) = shape(json!({"id": 1, "rating": 5}));
        let stmt = UpsertStatement::build(Dialect::DuckDb, Table::Reviews, &shape);
        assert_eq!(
            stmt.sql(),
            "INSERT INTO \"reviews\" (\"id\", \"rating\") VALUES (?, ?) \
             ON CONFLICT (\"id\") DO UPDATE SET \"rating\" = excluded.\"rating\""
        );
    }

    #[test]
    fn test_id_only_shape_stays_valid() {
        let (shape, _) = shape(json!({"id": 9}));
        let mysql = UpsertStatement::build(Dialect::MySql, Table::Users, &shape);
        assert!(mysql.sql().ends_with("ON DUPLICATE KEY UPDATE `id`=`id`"));

        let duck = UpsertStatement::build(Dialect::DuckDb, Table::Users, &shape);
        assert!(duck.sql().ends_with("ON CONFLICT DO NOTHING"));
    }

    #[test]
    fn test_shape_without_id_updates_every_column() {
        let (shape, _) = shape(json!({"openId": "x", "userType": "client"}));
        let stmt = UpsertStatement::build(Dialect::MySql, Table::Users, &shape);
        assert!(stmt
            .sql()
            .ends_with("`openId`=VALUES(`openId`), `userType`=VALUES(`userType`)"));
    }

    #[test]
    fn test_quote_ident_escapes() {
        assert_eq!(Dialect::MySql.quote_ident("we`ird"), "`we``ird`");
        assert_eq!(Dialect::DuckDb.quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_bind_values_in_column_order() {
        let (shape, record) = shape(json!({
            "id": 3,
            "name": "Plumbing",
            "icon": "NULL",
            "displayOrder": 2
        }));
        let stmt = UpsertStatement::build(Dialect::MySql, Table::Categories, &shape);
        let values = stmt.bind_values(&record);

        let expected: Vec<SqlValue> = stmt
            .columns()
            .iter()
            .map(|c| match c.as_str() {
                "id" => SqlValue::Int(3),
                "name" => SqlValue::Text("Plumbing".to_string()),
                "icon" => SqlValue::Null,
                "displayOrder" => SqlValue::Int(2),
                other => panic!("unexpected column {other}"),
            })
            .collect();
        assert_eq!(values, expected);
    }

    #[test]
    fn test_bind_values_missing_field_is_null() {
        let (shape, _) = shape(json!({"id": 1, "rating": 5}));
        let stmt = UpsertStatement::build(Dialect::DuckDb, Table::Reviews, &shape);
        let other = json!({"id": 2}).as_object().cloned().unwrap();
        let values = stmt.bind_values(&other);
        assert_eq!(values, vec![SqlValue::Int(2), SqlValue::Null]);
    }
}
