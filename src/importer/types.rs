//! Importer types
//!
//! Per-file outcomes, run phases, and the run summary.

use crate::discovery::file_stem;
use crate::types::Table;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Steps of a full import run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Discover,
    ImportEach,
    Summarize,
    Verify,
    Done,
}

impl Phase {
    /// The phase that follows this one
    pub fn next(self) -> Phase {
        match self {
            Phase::Discover => Phase::ImportEach,
            Phase::ImportEach => Phase::Summarize,
            Phase::Summarize => Phase::Verify,
            Phase::Verify | Phase::Done => Phase::Done,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Discover => "discover",
            Phase::ImportEach => "import",
            Phase::Summarize => "summarize",
            Phase::Verify => "verify",
            Phase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Why a file was skipped without touching the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// `rows` is an empty array
    EmptyRows,
    /// The first record matches no inference rule
    NoTableInferred,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::EmptyRows => write!(f, "no rows"),
            SkipReason::NoTableInferred => write!(f, "no table matches the record fields"),
        }
    }
}

/// Result of importing one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Rows were written (some may have failed individually)
    Imported {
        table: Table,
        rows: usize,
        failed_rows: usize,
    },
    /// Nothing to import
    Skipped { reason: SkipReason },
    /// The whole file failed and contributes zero rows
    Failed { error: String },
}

impl FileOutcome {
    /// Rows successfully upserted
    pub fn imported_rows(&self) -> usize {
        match self {
            FileOutcome::Imported { rows, .. } => *rows,
            _ => 0,
        }
    }

    pub fn table(&self) -> Option<Table> {
        match self {
            FileOutcome::Imported { table, .. } => Some(*table),
            _ => None,
        }
    }
}

/// Dry-run view of a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilePlan {
    pub file: String,
    pub rows: usize,
    pub table: Option<Table>,
    /// Set when a later record's fields differ from the first record's
    pub shape_error: Option<String>,
}

/// Row count of a destination table after the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableCount {
    pub table: Table,
    pub rows: i64,
}

/// Totals for a full import run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub files_found: usize,
    pub files_imported: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
    pub total_imported: usize,
    pub failed_rows: usize,
    /// Imported rows keyed by file stem, only files with at least one row
    pub by_file: BTreeMap<String, usize>,
    pub by_table: BTreeMap<Table, usize>,
}

impl RunSummary {
    /// Start an empty summary for a run over `files_found` files
    pub fn new(files_found: usize) -> Self {
        Self {
            started_at: Utc::now(),
            duration_ms: 0,
            files_found,
            files_imported: 0,
            files_skipped: 0,
            files_failed: 0,
            total_imported: 0,
            failed_rows: 0,
            by_file: BTreeMap::new(),
            by_table: BTreeMap::new(),
        }
    }

    /// Fold one file's outcome into the totals
    pub fn record(&mut self, path: &Path, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Imported {
                table,
                rows,
                failed_rows,
            } => {
                self.files_imported += 1;
                self.failed_rows += failed_rows;
                if *rows > 0 {
                    self.total_imported += rows;
                    *self.by_file.entry(file_stem(path)).or_insert(0) += rows;
                    *self.by_table.entry(*table).or_insert(0) += rows;
                }
            }
            FileOutcome::Skipped { .. } => self.files_skipped += 1,
            FileOutcome::Failed { .. } => self.files_failed += 1,
        }
    }
}
