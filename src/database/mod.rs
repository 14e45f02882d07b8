//! Destination database support
//!
//! Upserts go through the [`RecordStore`] trait so the importer does not
//! care which engine sits behind it:
//!
//! - [`MySqlStore`] - MySQL/MariaDB over sqlx, one transaction per file
//! - [`DuckDbStore`] - a local DuckDB database file
//!
//! [`DatabaseTarget`] turns an engine config into a fresh store for every
//! file the importer processes.

mod engine;
mod mysql;
mod query;

pub use engine::DuckDbStore;
pub use mysql::MySqlStore;
pub use query::{Dialect, UpsertStatement};

use crate::config::{DatabaseConfig, DatabaseEngine};
use crate::error::Result;
use crate::types::{SqlValue, Table};
use async_trait::async_trait;

/// A single open database connection that accepts upserts
#[async_trait]
pub trait RecordStore: Send {
    /// SQL dialect statements for this store must be rendered in
    fn dialect(&self) -> Dialect;

    /// Run a trivial query to prove the connection works
    async fn check(&mut self) -> Result<()>;

    /// Start the file-scoped transaction
    async fn begin(&mut self) -> Result<()>;

    /// Execute one upsert; returns the affected row count
    async fn upsert(&mut self, statement: &UpsertStatement, values: Vec<SqlValue>) -> Result<u64>;

    /// Commit every successful upsert since `begin`
    async fn commit(&mut self) -> Result<()>;

    /// Count rows in a destination table
    async fn count_rows(&mut self, table: Table) -> Result<i64>;

    /// Close the connection, rolling back anything uncommitted
    async fn close(&mut self) -> Result<()>;
}

/// Opens stores on demand
#[async_trait]
pub trait StoreConnector: Send + Sync {
    /// Open a new connection
    async fn connect(&self) -> Result<Box<dyn RecordStore>>;

    /// Dialect of the stores this connector opens
    fn dialect(&self) -> Dialect;

    /// Human-readable target (passwords masked)
    fn describe(&self) -> String;
}

/// Connector for a configured destination database
#[derive(Debug, Clone)]
pub struct DatabaseTarget {
    config: DatabaseConfig,
}

impl DatabaseTarget {
    /// Create a target from database settings
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    /// Database settings
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }
}

#[async_trait]
impl StoreConnector for DatabaseTarget {
    async fn connect(&self) -> Result<Box<dyn RecordStore>> {
        tracing::debug!("Connecting to {}", self.describe());
        match self.config.engine {
            DatabaseEngine::Mysql => {
                let url = self.config.connection_url()?;
                Ok(Box::new(MySqlStore::connect(&url).await?))
            }
            DatabaseEngine::Duckdb => Ok(Box::new(DuckDbStore::open(&self.config.database)?)),
        }
    }

    fn dialect(&self) -> Dialect {
        match self.config.engine {
            DatabaseEngine::Mysql => Dialect::MySql,
            DatabaseEngine::Duckdb => Dialect::DuckDb,
        }
    }

    fn describe(&self) -> String {
        self.config.display_target()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_dialect() {
        let mut config = DatabaseConfig::default();
        assert_eq!(DatabaseTarget::new(config.clone()).dialect(), Dialect::MySql);

        config.engine = DatabaseEngine::Duckdb;
        config.database = "out.duckdb".to_string();
        let target = DatabaseTarget::new(config);
        assert_eq!(target.dialect(), Dialect::DuckDb);
        assert_eq!(target.describe(), "duckdb:out.duckdb");
    }

    #[tokio::test]
    async fn test_target_connects_duckdb() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            engine: DatabaseEngine::Duckdb,
            database: dir.path().join("t.duckdb").to_string_lossy().to_string(),
            ..DatabaseConfig::default()
        };

        let mut store = DatabaseTarget::new(config).connect().await.unwrap();
        assert_eq!(store.dialect(), Dialect::DuckDb);
        store.check().await.unwrap();
        store.close().await.unwrap();
    }
}
