//! Console reporting
//!
//! Progress and summary output for the CLI. `Pretty` prints human-readable
//! lines; `Json` prints one JSON message per line.

use crate::importer::{FileOutcome, FilePlan, RunSummary, TableCount};
use crate::types::JsonValue;
use serde_json::json;
use std::io::{self, Write};
use std::path::Path;

/// Console output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON message per line
    Json,
}

/// Writes run progress and results
pub struct Reporter<W: Write = io::Stdout> {
    format: OutputFormat,
    out: W,
}

impl Reporter<io::Stdout> {
    /// Reporter on standard output
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(format, io::stdout())
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(format: OutputFormat, out: W) -> Self {
        Self { format, out }
    }

    /// Consume the reporter and return its writer
    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn started(&mut self, target: &str) -> io::Result<()> {
        match self.format {
            OutputFormat::Pretty => writeln!(self.out, "Starting import into {target}"),
            OutputFormat::Json => self.message(&json!({"type": "START", "target": target})),
        }
    }

    pub fn files_found(&mut self, dir: &Path, count: usize) -> io::Result<()> {
        match self.format {
            OutputFormat::Pretty => writeln!(
                self.out,
                "Found {count} query files in {}",
                dir.display()
            ),
            OutputFormat::Json => self.message(&json!({
                "type": "DISCOVERED",
                "dir": dir.display().to_string(),
                "files": count
            })),
        }
    }

    pub fn file_outcome(&mut self, path: &Path, outcome: &FileOutcome) -> io::Result<()> {
        match self.format {
            OutputFormat::Pretty => {
                let name = path.file_name().map_or_else(
                    || path.display().to_string(),
                    |n| n.to_string_lossy().to_string(),
                );
                match outcome {
                    FileOutcome::Imported {
                        table,
                        rows,
                        failed_rows: 0,
                    } => writeln!(self.out, "   {name} -> {table}: {rows} records"),
                    FileOutcome::Imported {
                        table,
                        rows,
                        failed_rows,
                    } => writeln!(
                        self.out,
                        "   {name} -> {table}: {rows} records ({failed_rows} failed)"
                    ),
                    FileOutcome::Skipped { reason } => {
                        writeln!(self.out, "   {name}: skipped ({reason})")
                    }
                    FileOutcome::Failed { error } => {
                        writeln!(self.out, "   {name}: failed ({error})")
                    }
                }
            }
            OutputFormat::Json => self.message(&json!({
                "type": "FILE",
                "file": path.display().to_string(),
                "outcome": outcome
            })),
        }
    }

    pub fn summary(&mut self, summary: &RunSummary) -> io::Result<()> {
        match self.format {
            OutputFormat::Pretty => {
                writeln!(self.out)?;
                writeln!(self.out, "Import finished in {}ms", summary.duration_ms)?;
                writeln!(
                    self.out,
                    "Total records imported: {}",
                    summary.total_imported
                )?;
                if summary.failed_rows > 0 || summary.files_failed > 0 {
                    writeln!(
                        self.out,
                        "Failed rows: {}, failed files: {}",
                        summary.failed_rows, summary.files_failed
                    )?;
                }
                if !summary.by_file.is_empty() {
                    writeln!(self.out)?;
                    writeln!(self.out, "By file:")?;
                    for (file, count) in &summary.by_file {
                        writeln!(self.out, "   - {file}: {count} records")?;
                    }
                }
                if !summary.by_table.is_empty() {
                    writeln!(self.out)?;
                    writeln!(self.out, "By table:")?;
                    for (table, count) in &summary.by_table {
                        writeln!(self.out, "   - {table}: {count} records")?;
                    }
                }
                Ok(())
            }
            OutputFormat::Json => self.message(&json!({"type": "SUMMARY", "summary": summary})),
        }
    }

    pub fn table_counts(&mut self, counts: &[TableCount]) -> io::Result<()> {
        match self.format {
            OutputFormat::Pretty => {
                writeln!(self.out)?;
                writeln!(self.out, "Table row counts:")?;
                for count in counts {
                    writeln!(self.out, "   - {}: {} records", count.table, count.rows)?;
                }
                Ok(())
            }
            OutputFormat::Json => self.message(&json!({"type": "COUNTS", "counts": counts})),
        }
    }

    pub fn plan(&mut self, plan: &FilePlan) -> io::Result<()> {
        match self.format {
            OutputFormat::Pretty => {
                let table = plan.table.map_or("-", |t| t.as_str());
                write!(self.out, "   {} -> {table}: {} rows", plan.file, plan.rows)?;
                match &plan.shape_error {
                    Some(error) => writeln!(self.out, " (invalid: {error})"),
                    None => writeln!(self.out),
                }
            }
            OutputFormat::Json => self.message(&json!({"type": "PLAN", "plan": plan})),
        }
    }

    pub fn plan_error(&mut self, path: &Path, error: &str) -> io::Result<()> {
        match self.format {
            OutputFormat::Pretty => writeln!(self.out, "   {}: unreadable ({error})", path.display()),
            OutputFormat::Json => self.message(&json!({
                "type": "PLAN",
                "plan": {"file": path.display().to_string(), "error": error}
            })),
        }
    }

    pub fn connection_status(&mut self, target: &str, result: Result<(), String>) -> io::Result<()> {
        match (self.format, result) {
            (OutputFormat::Pretty, Ok(())) => writeln!(self.out, "Connection to {target} succeeded"),
            (OutputFormat::Pretty, Err(e)) => {
                writeln!(self.out, "Connection to {target} failed: {e}")
            }
            (OutputFormat::Json, Ok(())) => self.message(&json!({
                "type": "CONNECTION_STATUS",
                "connectionStatus": {"status": "SUCCEEDED", "target": target}
            })),
            (OutputFormat::Json, Err(e)) => self.message(&json!({
                "type": "CONNECTION_STATUS",
                "connectionStatus": {"status": "FAILED", "target": target, "message": e}
            })),
        }
    }

    fn message(&mut self, msg: &JsonValue) -> io::Result<()> {
        let line = serde_json::to_string(msg).map_err(io::Error::other)?;
        writeln!(self.out, "{line}")
    }
}
