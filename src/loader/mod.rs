//! Import file loader module
//!
//! Parse Manus DB query exports from JSON files.
//!
//! # Overview
//!
//! The loader module provides:
//! - `ImportFile` - The `{"rows": [...]}` document
//! - `RecordShape` - The field list every record in a file must share
//! - `normalize_value` - `"NULL"`/missing to SQL NULL

mod parser;
mod types;

pub use parser::{load_import_file, load_import_file_from_str};
pub use types::{normalize_value, ImportFile, RecordShape, NULL_SENTINEL};

#[cfg(test)]
mod tests;
