//! DuckDB-backed record store
//!
//! Writes into a local DuckDB database file. DuckDB invalidates an open
//! transaction on the first failed statement, so every upsert here runs in
//! its own implicit transaction and `begin`/`commit` only bracket the file
//! in the logs.

use super::query::{Dialect, UpsertStatement};
use super::RecordStore;
use crate::error::{Error, Result};
use crate::types::{SqlValue, Table};
use async_trait::async_trait;
use duckdb::Connection;
use std::path::{Path, PathBuf};

/// Record store on a DuckDB database file
pub struct DuckDbStore {
    /// DuckDB connection
    conn: Connection,
    /// Database file (for logging)
    path: PathBuf,
    /// Upserts executed since `begin`
    pending: u64,
}

impl DuckDbStore {
    /// Open (or create) a DuckDB database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path).map_err(|e| {
            Error::database(format!(
                "Failed to open DuckDB database '{}': {e}",
                path.display()
            ))
        })?;

        Ok(Self {
            conn,
            path,
            pending: 0,
        })
    }

    /// Run raw SQL, e.g. to create the destination tables
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Database file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordStore for DuckDbStore {
    fn dialect(&self) -> Dialect {
        Dialect::DuckDb
    }

    async fn check(&mut self) -> Result<()> {
        self.conn
            .query_row("SELECT 1", [], |row| row.get::<_, i32>(0))
            .map_err(|e| Error::database(format!("Connection check failed: {e}")))?;
        Ok(())
    }

    async fn begin(&mut self) -> Result<()> {
        self.pending = 0;
        Ok(())
    }

    async fn upsert(&mut self, statement: &UpsertStatement, values: Vec<SqlValue>) -> Result<u64> {
        let mut stmt = self.conn.prepare(statement.sql())?;
        let affected = stmt.execute(duckdb::params_from_iter(
            values.into_iter().map(to_duckdb_value),
        ))?;
        self.pending += 1;
        Ok(affected as u64)
    }

    async fn commit(&mut self) -> Result<()> {
        tracing::debug!(
            "DuckDB {}: {} upserts already committed",
            self.path.display(),
            self.pending
        );
        self.pending = 0;
        Ok(())
    }

    async fn count_rows(&mut self, table: Table) -> Result<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {}",
            Dialect::DuckDb.quote_ident(table.as_str())
        );
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count)
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Convert a bound value to a DuckDB value
fn to_duckdb_value(value: SqlValue) -> duckdb::types::Value {
    match value {
        SqlValue::Null => duckdb::types::Value::Null,
        SqlValue::Bool(b) => duckdb::types::Value::Boolean(b),
        SqlValue::Int(i) => duckdb::types::Value::BigInt(i),
        SqlValue::UInt(u) => duckdb::types::Value::UBigInt(u),
        SqlValue::Float(f) => duckdb::types::Value::Double(f),
        SqlValue::Text(s) => duckdb::types::Value::Text(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::RecordShape;
    use serde_json::json;

    const SCHEMA: &str = r#"
        CREATE TABLE reviews (
            id BIGINT PRIMARY KEY,
            "professionalId" BIGINT NOT NULL,
            rating BIGINT,
            comment VARCHAR
        );
    "#;

    fn store() -> (tempfile::TempDir, DuckDbStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = DuckDbStore::open(dir.path().join("test.duckdb")).unwrap();
        store.execute_batch(SCHEMA).unwrap();
        (dir, store)
    }

    fn statement(value: &serde_json::Value) -> UpsertStatement {
        let record = value.as_object().unwrap();
        UpsertStatement::build(
            Dialect::DuckDb,
            Table::Reviews,
            &RecordShape::from_record(record),
        )
    }

    #[test]
    fn test_to_duckdb_value() {
        assert_eq!(to_duckdb_value(SqlValue::Null), duckdb::types::Value::Null);
        assert_eq!(
            to_duckdb_value(SqlValue::Bool(true)),
            duckdb::types::Value::Boolean(true)
        );
        assert_eq!(
            to_duckdb_value(SqlValue::Int(42)),
            duckdb::types::Value::BigInt(42)
        );
        assert_eq!(
            to_duckdb_value(SqlValue::Text("hello".to_string())),
            duckdb::types::Value::Text("hello".to_string())
        );
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_updates() {
        let (_dir, mut store) = store();
        let row = json!({"id": 1, "professionalId": 7, "rating": 3, "comment": "ok"});
        let stmt = statement(&row);

        store.begin().await.unwrap();
        let values = stmt.bind_values(row.as_object().unwrap());
        store.upsert(&stmt, values).await.unwrap();

        let updated = json!({"id": 1, "professionalId": 7, "rating": 5, "comment": "NULL"});
        let values = stmt.bind_values(updated.as_object().unwrap());
        store.upsert(&stmt, values).await.unwrap();
        store.commit().await.unwrap();

        assert_eq!(store.count_rows(Table::Reviews).await.unwrap(), 1);
        let (rating, comment): (i64, Option<String>) = store
            .conn
            .query_row("SELECT rating, comment FROM reviews WHERE id = 1", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(rating, 5);
        assert_eq!(comment, None);
    }

    #[tokio::test]
    async fn test_failed_upsert_does_not_poison_later_rows() {
        let (_dir, mut store) = store();
        let row = json!({"id": 1, "professionalId": 7, "rating": 3, "comment": "ok"});
        let stmt = statement(&row);

        store.begin().await.unwrap();
        let bad = json!({"id": 2, "professionalId": "NULL", "rating": 1, "comment": "x"});
        let err = store
            .upsert(&stmt, stmt.bind_values(bad.as_object().unwrap()))
            .await
            .unwrap_err();
        assert!(err.is_database());

        store
            .upsert(&stmt, stmt.bind_values(row.as_object().unwrap()))
            .await
            .unwrap();
        store.commit().await.unwrap();

        assert_eq!(store.count_rows(Table::Reviews).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_count_rows_missing_table() {
        let (_dir, mut store) = store();
        assert!(store.count_rows(Table::Stories).await.is_err());
    }

    #[tokio::test]
    async fn test_check() {
        let (_dir, mut store) = store();
        assert!(store.check().await.is_ok());
    }
}
