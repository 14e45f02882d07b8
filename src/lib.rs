//! # manus-import
//!
//! Loads Manus DB query exports (`db-query-*.json`) into a relational
//! database. Each file's destination table is inferred from the fields of
//! its first record, and every record is written with an idempotent
//! upsert keyed on `id`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use manus_import::config::ImportConfig;
//! use manus_import::database::DatabaseTarget;
//! use manus_import::discovery::discover_files;
//! use manus_import::importer::Importer;
//!
//! #[tokio::main]
//! async fn main() -> manus_import::Result<()> {
//!     let mut config = ImportConfig::default();
//!     config.apply_env()?;
//!     config.validate()?;
//!
//!     let files = discover_files(&config.input_dir, &config.file_pattern, &config.error_marker)?;
//!     let importer = Importer::new(DatabaseTarget::new(config.database.clone()));
//!     let summary = importer.run(&files).await;
//!     println!("imported {} records", summary.total_imported);
//!
//!     for count in importer.verify().await? {
//!         println!("{}: {}", count.table, count.rows);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//!  discover ──▶ load ──▶ infer table ──▶ validate shape ──▶ upsert rows ──▶ commit
//!  (glob)      (JSON)    (field rules)   (same fields)      (per row)      (per file)
//!                                                                │
//!                                              summarize ◀───────┘ ──▶ verify counts
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Importer configuration
pub mod config;

/// Export file discovery
pub mod discovery;

/// Import file parsing and null normalization
pub mod loader;

/// Destination table inference
pub mod inference;

/// Destination database stores and upsert statements
pub mod database;

/// Per-file import and run orchestration
pub mod importer;

/// Console reporting
pub mod report;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use importer::{FileOutcome, Importer, RunSummary};
pub use inference::infer_table;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
