//! MySQL record store
//!
//! Holds a single-connection pool; each file's upserts share one
//! transaction that is committed after the last row.

use super::query::{Dialect, UpsertStatement};
use super::RecordStore;
use crate::error::{Error, Result};
use crate::types::{SqlValue, Table};
use async_trait::async_trait;
use sqlx::mysql::{MySql, MySqlArguments, MySqlPool, MySqlPoolOptions};
use sqlx::query::Query;
use sqlx::Transaction;

/// Record store on a MySQL server
pub struct MySqlStore {
    pool: MySqlPool,
    tx: Option<Transaction<'static, MySql>>,
}

impl MySqlStore {
    /// Open a connection to the given `mysql://` URL
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await?;
        Ok(Self { pool, tx: None })
    }
}

#[async_trait]
impl RecordStore for MySqlStore {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    async fn check(&mut self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| Error::database(format!("Connection check failed: {e}")))?;
        Ok(())
    }

    async fn begin(&mut self) -> Result<()> {
        if self.tx.is_none() {
            self.tx = Some(self.pool.begin().await?);
        }
        Ok(())
    }

    async fn upsert(&mut self, statement: &UpsertStatement, values: Vec<SqlValue>) -> Result<u64> {
        let tx = self.tx.as_mut().ok_or(Error::NoTransaction)?;
        let query = values
            .into_iter()
            .fold(sqlx::query(statement.sql()), bind_value);
        let result = query.execute(&mut **tx).await?;
        Ok(result.rows_affected())
    }

    async fn commit(&mut self) -> Result<()> {
        let tx = self.tx.take().ok_or(Error::NoTransaction)?;
        tx.commit().await?;
        Ok(())
    }

    async fn count_rows(&mut self, table: Table) -> Result<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {}",
            Dialect::MySql.quote_ident(table.as_str())
        );
        // The pool has one connection; reuse it if a transaction holds it
        let count: i64 = match self.tx.as_mut() {
            Some(tx) => sqlx::query_scalar(&sql).fetch_one(&mut **tx).await?,
            None => sqlx::query_scalar(&sql).fetch_one(&self.pool).await?,
        };
        Ok(count)
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tracing::debug!("Rolling back uncommitted MySQL transaction");
            tx.rollback().await?;
        }
        self.pool.close().await;
        Ok(())
    }
}

/// Bind one value to a MySQL query
fn bind_value(query: Query<'_, MySql, MySqlArguments>, value: SqlValue) -> Query<'_, MySql, MySqlArguments> {
    match value {
        SqlValue::Null => query.bind(None::<String>),
        SqlValue::Bool(b) => query.bind(b),
        SqlValue::Int(i) => query.bind(i),
        SqlValue::UInt(u) => query.bind(u),
        SqlValue::Float(f) => query.bind(f),
        SqlValue::Text(s) => query.bind(s),
    }
}
