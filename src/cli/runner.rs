//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::ImportConfig;
use crate::database::{DatabaseTarget, StoreConnector};
use crate::discovery::discover_files;
use crate::error::Result;
use crate::importer::{inspect_file, Importer, Phase, RunSummary};
use crate::report::Reporter;
use std::time::Instant;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match self.cli.command.clone().unwrap_or_default() {
            Commands::Import { skip_verify } => self.import(skip_verify).await,
            Commands::Discover => self.discover(),
            Commands::Check => self.check().await,
            Commands::Counts => self.counts().await,
        }
    }

    /// Build configuration: file, then environment, then flags
    pub fn load_config(&self) -> Result<ImportConfig> {
        let mut config = match &self.cli.config {
            Some(path) => ImportConfig::from_file(path)?,
            None => ImportConfig::default(),
        };
        config.apply_env()?;
        self.apply_flags(&mut config)?;
        Ok(config)
    }

    fn apply_flags(&self, config: &mut ImportConfig) -> Result<()> {
        if let Some(dir) = &self.cli.input_dir {
            config.input_dir = dir.clone();
        }
        if let Some(pattern) = &self.cli.pattern {
            config.file_pattern = pattern.clone();
        }
        if let Some(marker) = &self.cli.error_marker {
            config.error_marker = marker.clone();
        }
        if let Some(engine) = &self.cli.engine {
            config.database.engine = engine.parse()?;
        }
        if let Some(url) = &self.cli.database_url {
            config.database.url = Some(url.clone());
        }
        if let Some(database) = &self.cli.database {
            config.database.database = database.clone();
        }
        Ok(())
    }

    fn reporter(&self) -> Reporter {
        Reporter::stdout(self.cli.format)
    }

    /// Full run: discover, import each file, summarize, verify
    async fn import(&self, skip_verify: bool) -> Result<()> {
        let config = self.load_config()?;
        config.validate()?;
        let target = DatabaseTarget::new(config.database.clone());
        let importer = Importer::new(target);
        let mut reporter = self.reporter();
        let run_start = Instant::now();

        reporter.started(&importer.connector().describe())?;

        let mut phase = Phase::Discover;
        tracing::debug!("Phase: {}", phase);
        let files = discover_files(
            &config.input_dir,
            &config.file_pattern,
            &config.error_marker,
        )?;
        reporter.files_found(&config.input_dir, files.len())?;

        phase = phase.next();
        tracing::debug!("Phase: {}", phase);
        let mut summary = RunSummary::new(files.len());
        for path in &files {
            let outcome = importer.import_file(path).await;
            reporter.file_outcome(path, &outcome)?;
            summary.record(path, &outcome);
        }
        summary.duration_ms = run_start.elapsed().as_millis() as u64;

        phase = phase.next();
        tracing::debug!("Phase: {}", phase);
        reporter.summary(&summary)?;

        phase = phase.next();
        if !skip_verify {
            tracing::debug!("Phase: {}", phase);
            let counts = importer.verify().await?;
            reporter.table_counts(&counts)?;
        }

        phase = phase.next();
        tracing::info!(
            "Phase: {} ({} records from {} files in {}ms)",
            phase,
            summary.total_imported,
            summary.files_found,
            run_start.elapsed().as_millis()
        );
        Ok(())
    }

    /// Dry run: list files and what would happen to them
    fn discover(&self) -> Result<()> {
        let config = self.load_config()?;
        let files = discover_files(
            &config.input_dir,
            &config.file_pattern,
            &config.error_marker,
        )?;
        let mut reporter = self.reporter();
        reporter.files_found(&config.input_dir, files.len())?;

        for path in &files {
            match inspect_file(path) {
                Ok(plan) => reporter.plan(&plan)?,
                Err(e) => reporter.plan_error(path, &e.to_string())?,
            }
        }
        Ok(())
    }

    /// Check the database connection
    async fn check(&self) -> Result<()> {
        let config = self.load_config()?;
        config.database.validate()?;
        let importer = Importer::new(DatabaseTarget::new(config.database.clone()));
        let target = importer.connector().describe();

        let result = importer.check().await.map_err(|e| e.to_string());
        self.reporter().connection_status(&target, result)?;
        Ok(())
    }

    /// Print destination table row counts
    async fn counts(&self) -> Result<()> {
        let config = self.load_config()?;
        config.database.validate()?;
        let importer = Importer::new(DatabaseTarget::new(config.database.clone()));

        let counts = importer.verify().await?;
        self.reporter().table_counts(&counts)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseEngine;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("import.yaml");
        std::fs::write(
            &config_path,
            "input_dir: /from/file\nfile_pattern: '*.json'\ndatabase:\n  database: filedb\n",
        )
        .unwrap();

        let cli = Cli::parse_from([
            "manus-import",
            "--config",
            config_path.to_str().unwrap(),
            "--input-dir",
            "/from/flag",
            "--engine",
            "duckdb",
            "--database",
            "local.duckdb",
        ]);
        let runner = Runner::new(cli);
        let mut config = ImportConfig::from_file(&config_path).unwrap();
        runner.apply_flags(&mut config).unwrap();

        assert_eq!(config.input_dir, PathBuf::from("/from/flag"));
        assert_eq!(config.file_pattern, "*.json");
        assert_eq!(config.database.engine, DatabaseEngine::Duckdb);
        assert_eq!(config.database.database, "local.duckdb");
    }

    #[test]
    fn test_bad_engine_flag() {
        let cli = Cli::parse_from(["manus-import", "--engine", "oracle"]);
        let runner = Runner::new(cli);
        let mut config = ImportConfig::default();
        assert!(runner.apply_flags(&mut config).is_err());
    }
}
