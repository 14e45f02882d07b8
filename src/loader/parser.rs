//! JSON parser for import files

use crate::error::{Error, Result};
use crate::loader::types::ImportFile;
use crate::types::JsonValue;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Load an import file from disk
pub fn load_import_file(path: impl AsRef<Path>) -> Result<ImportFile> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::Io(e)
        }
    })?;
    load_import_file_from_str(&content)
}

/// Export as written on disk, before records are checked
#[derive(Deserialize)]
struct RawImportFile {
    rows: Vec<JsonValue>,
}

/// Load an import file from a JSON string
pub fn load_import_file_from_str(json: &str) -> Result<ImportFile> {
    let raw: RawImportFile = serde_json::from_str(json)?;
    let rows = raw
        .rows
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            JsonValue::Object(record) => Ok(record),
            _ => Err(Error::NotAnObject { row }),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(ImportFile { rows })
}
