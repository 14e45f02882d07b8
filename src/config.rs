//! Importer configuration
//!
//! Settings come from, lowest to highest precedence: built-in defaults, an
//! optional YAML file, `IMPORT_*` environment variables (a `.env` file is
//! loaded by the binary), and command-line flags.

use crate::discovery::{DEFAULT_ERROR_MARKER, DEFAULT_PATTERN};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

// ============================================================================
// Environment Variables
// ============================================================================

pub const ENV_INPUT_DIR: &str = "IMPORT_INPUT_DIR";
pub const ENV_FILE_PATTERN: &str = "IMPORT_FILE_PATTERN";
pub const ENV_ERROR_MARKER: &str = "IMPORT_ERROR_MARKER";
pub const ENV_DB_ENGINE: &str = "IMPORT_DB_ENGINE";
pub const ENV_DB_URL: &str = "IMPORT_DB_URL";
pub const ENV_DB_HOST: &str = "IMPORT_DB_HOST";
pub const ENV_DB_PORT: &str = "IMPORT_DB_PORT";
pub const ENV_DB_USER: &str = "IMPORT_DB_USER";
pub const ENV_DB_PASSWORD: &str = "IMPORT_DB_PASSWORD";
pub const ENV_DB_NAME: &str = "IMPORT_DB_NAME";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete importer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Directory holding the query exports
    pub input_dir: PathBuf,

    /// Glob pattern for export file names
    pub file_pattern: String,

    /// Files whose name contains this marker are skipped
    pub error_marker: String,

    /// Destination database
    pub database: DatabaseConfig,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            file_pattern: DEFAULT_PATTERN.to_string(),
            error_marker: DEFAULT_ERROR_MARKER.to_string(),
            database: DatabaseConfig::default(),
        }
    }
}

impl ImportConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ImportConfig = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Overlay `IMPORT_*` variables from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Overlay `IMPORT_*` variables from an arbitrary lookup
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_INPUT_DIR) {
            self.input_dir = PathBuf::from(dir);
        }
        if let Some(pattern) = lookup(ENV_FILE_PATTERN) {
            self.file_pattern = pattern;
        }
        if let Some(marker) = lookup(ENV_ERROR_MARKER) {
            self.error_marker = marker;
        }

        let db = &mut self.database;
        if let Some(engine) = lookup(ENV_DB_ENGINE) {
            db.engine = engine.parse()?;
        }
        if let Some(url) = lookup(ENV_DB_URL) {
            db.url = Some(url);
        }
        if let Some(host) = lookup(ENV_DB_HOST) {
            db.host = host;
        }
        if let Some(port) = lookup(ENV_DB_PORT) {
            db.port = port.parse().map_err(|_| {
                Error::invalid_value(ENV_DB_PORT, format!("'{port}' is not a valid port"))
            })?;
        }
        if let Some(user) = lookup(ENV_DB_USER) {
            db.user = user;
        }
        if let Some(password) = lookup(ENV_DB_PASSWORD) {
            db.password = Some(password);
        }
        if let Some(name) = lookup(ENV_DB_NAME) {
            db.database = name;
        }
        Ok(())
    }

    /// Check the configuration is usable for a run
    pub fn validate(&self) -> Result<()> {
        if self.file_pattern.trim().is_empty() {
            return Err(Error::invalid_value(
                "file_pattern",
                "pattern cannot be empty",
            ));
        }
        self.database.validate()
    }
}

// ============================================================================
// Database Config
// ============================================================================

/// Supported destination engines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseEngine {
    /// MySQL / MariaDB server
    #[default]
    Mysql,
    /// Local DuckDB database file
    Duckdb,
}

impl std::fmt::Display for DatabaseEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseEngine::Mysql => write!(f, "mysql"),
            DatabaseEngine::Duckdb => write!(f, "duckdb"),
        }
    }
}

impl std::str::FromStr for DatabaseEngine {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(DatabaseEngine::Mysql),
            "duckdb" => Ok(DatabaseEngine::Duckdb),
            other => Err(Error::invalid_value(
                "engine",
                format!("unknown engine '{other}' (expected mysql or duckdb)"),
            )),
        }
    }
}

/// Destination database connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Engine type
    pub engine: DatabaseEngine,

    /// Full connection URL (MySQL only); overrides the individual fields
    pub url: Option<String>,

    pub host: String,
    pub port: u16,
    pub user: String,

    /// Never defaulted; supply via `IMPORT_DB_PASSWORD` or the URL
    pub password: Option<String>,

    /// Database name (MySQL) or database file path (DuckDB)
    pub database: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            engine: DatabaseEngine::Mysql,
            url: None,
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: None,
            database: String::new(),
        }
    }
}

impl DatabaseConfig {
    /// Check required fields for the configured engine
    pub fn validate(&self) -> Result<()> {
        match self.engine {
            DatabaseEngine::Mysql => {
                if let Some(url) = &self.url {
                    let parsed = Url::parse(url)?;
                    if parsed.scheme() != "mysql" && parsed.scheme() != "mariadb" {
                        return Err(Error::invalid_value(
                            "url",
                            format!("expected a mysql:// URL, got '{}://'", parsed.scheme()),
                        ));
                    }
                    return Ok(());
                }
                if self.database.is_empty() {
                    return Err(Error::missing_field("database"));
                }
                if self.host.is_empty() {
                    return Err(Error::missing_field("host"));
                }
                Ok(())
            }
            DatabaseEngine::Duckdb => {
                if self.database.is_empty() {
                    return Err(Error::missing_field("database"));
                }
                if self.database == ":memory:" {
                    return Err(Error::invalid_value(
                        "database",
                        "in-memory DuckDB is not supported, each file opens a new connection",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Build the MySQL connection URL
    pub fn connection_url(&self) -> Result<String> {
        if let Some(url) = &self.url {
            return Ok(url.clone());
        }

        let mut url = Url::parse(&format!("mysql://{}:{}", self.host, self.port))?;
        url.set_username(&self.user)
            .map_err(|()| Error::invalid_value("user", "cannot be set on this URL"))?;
        url.set_password(self.password.as_deref())
            .map_err(|()| Error::invalid_value("password", "cannot be set on this URL"))?;
        url.set_path(&self.database);
        Ok(url.to_string())
    }

    /// Connection target for logging, password masked
    pub fn display_target(&self) -> String {
        match self.engine {
            DatabaseEngine::Duckdb => format!("duckdb:{}", self.database),
            DatabaseEngine::Mysql => match self.connection_url() {
                Ok(url) => mask_password(&url),
                Err(_) => format!("mysql://{}:{}/{}", self.host, self.port, self.database),
            },
        }
    }
}

/// Replace the password of a URL with `****`
pub fn mask_password(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) if parsed.password().is_some() => {
            if parsed.set_password(Some("****")).is_ok() {
                parsed.to_string()
            } else {
                url.to_string()
            }
        }
        _ => url.to_string(),
    }
}
