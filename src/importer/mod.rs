//! Import engine module
//!
//! Per-file import and run orchestration.
//!
//! # Overview
//!
//! For each file the importer:
//! 1. parses the JSON export (`rows` array),
//! 2. infers the destination table from the first record,
//! 3. checks every record has the first record's fields,
//! 4. opens a connection and upserts row by row, skipping failed rows,
//! 5. commits and closes the connection.
//!
//! Any failure in steps 1-3 or in the commit fails the whole file, which
//! then contributes zero rows. The run itself never stops on a bad file.

mod types;

pub use types::{FileOutcome, FilePlan, Phase, RunSummary, SkipReason, TableCount};

use crate::database::{RecordStore, StoreConnector, UpsertStatement};
use crate::error::Result;
use crate::inference::infer_table;
use crate::loader::{load_import_file, RecordShape};
use crate::types::{Record, Table};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Imports export files into a destination database
pub struct Importer {
    connector: Box<dyn StoreConnector>,
}

impl Importer {
    /// Create an importer writing through the given connector
    pub fn new(connector: impl StoreConnector + 'static) -> Self {
        Self {
            connector: Box::new(connector),
        }
    }

    /// Connector in use
    pub fn connector(&self) -> &dyn StoreConnector {
        self.connector.as_ref()
    }

    /// Import every file in order and total the outcomes
    pub async fn run(&self, files: &[PathBuf]) -> RunSummary {
        let start = Instant::now();
        let mut summary = RunSummary::new(files.len());

        for path in files {
            let outcome = self.import_file(path).await;
            summary.record(path, &outcome);
        }

        summary.duration_ms = start.elapsed().as_millis() as u64;
        summary
    }

    /// Import a single file; failures are logged and reported, never raised
    pub async fn import_file(&self, path: &Path) -> FileOutcome {
        match self.try_import_file(path).await {
            Ok(outcome) => {
                match &outcome {
                    FileOutcome::Imported {
                        table,
                        rows,
                        failed_rows,
                    } => tracing::info!(
                        "{}: {} rows imported into {} ({} failed)",
                        path.display(),
                        rows,
                        table,
                        failed_rows
                    ),
                    FileOutcome::Skipped { reason } => {
                        tracing::info!("{}: skipped, {}", path.display(), reason);
                    }
                    FileOutcome::Failed { .. } => {}
                }
                outcome
            }
            Err(e) => {
                tracing::error!("Failed to process {}: {}", path.display(), e);
                FileOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    async fn try_import_file(&self, path: &Path) -> Result<FileOutcome> {
        let file = load_import_file(path)?;

        let Some(first) = file.first_row() else {
            return Ok(FileOutcome::Skipped {
                reason: SkipReason::EmptyRows,
            });
        };
        let Some(table) = infer_table(first) else {
            return Ok(FileOutcome::Skipped {
                reason: SkipReason::NoTableInferred,
            });
        };

        let shape = RecordShape::from_record(first);
        shape.validate(&file.rows)?;

        let statement = UpsertStatement::build(self.connector.dialect(), table, &shape);
        tracing::debug!("{} -> {}: {}", path.display(), table, statement.sql());

        let mut store = self.connector.connect().await?;
        let written = write_rows(store.as_mut(), &statement, &file.rows).await;
        if let Err(e) = store.close().await {
            tracing::warn!("Failed to close connection after {}: {}", path.display(), e);
        }
        let (rows, failed_rows) = written?;

        Ok(FileOutcome::Imported {
            table,
            rows,
            failed_rows,
        })
    }

    /// Count rows in every destination table.
    ///
    /// Tables that cannot be counted are left out; only a failure to
    /// connect is an error.
    pub async fn verify(&self) -> Result<Vec<TableCount>> {
        let mut store = self.connector.connect().await?;
        let mut counts = Vec::with_capacity(Table::ALL.len());

        for table in Table::ALL {
            match store.count_rows(table).await {
                Ok(rows) => counts.push(TableCount { table, rows }),
                Err(e) => tracing::debug!("Could not count {}: {}", table, e),
            }
        }

        if let Err(e) = store.close().await {
            tracing::warn!("Failed to close verification connection: {}", e);
        }
        Ok(counts)
    }

    /// Open a connection and run a trivial query
    pub async fn check(&self) -> Result<()> {
        let mut store = self.connector.connect().await?;
        let result = store.check().await;
        store.close().await?;
        result
    }
}

/// Upsert rows one by one inside the file's transaction.
///
/// Returns `(imported, failed)`. A failed row is logged and skipped.
async fn write_rows(
    store: &mut dyn RecordStore,
    statement: &UpsertStatement,
    rows: &[Record],
) -> Result<(usize, usize)> {
    store.begin().await?;

    let mut imported = 0;
    let mut failed = 0;
    for (index, row) in rows.iter().enumerate() {
        match store.upsert(statement, statement.bind_values(row)).await {
            Ok(_) => imported += 1,
            Err(e) => {
                failed += 1;
                tracing::warn!(
                    "Failed to insert into {} (row {}): {}",
                    statement.table(),
                    index,
                    e
                );
            }
        }
    }

    store.commit().await?;
    Ok((imported, failed))
}

/// Inspect a file without touching the database
pub fn inspect_file(path: &Path) -> Result<FilePlan> {
    let file = load_import_file(path)?;
    let table = file.first_row().and_then(infer_table);
    let shape_error = file.first_row().and_then(|first| {
        RecordShape::from_record(first)
            .validate(&file.rows)
            .err()
            .map(|e| e.to_string())
    });

    Ok(FilePlan {
        file: path.display().to_string(),
        rows: file.len(),
        table,
        shape_error,
    })
}
