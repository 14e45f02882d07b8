//! CLI module
//!
//! Command-line interface for running imports.
//!
//! # Commands
//!
//! - `import` - Load every export file, then verify table counts (default)
//! - `discover` - List export files and their inferred tables, no database
//! - `check` - Test the database connection
//! - `counts` - Print destination table row counts

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
