//! Loader tests

use super::*;
use crate::error::Error;
use crate::types::SqlValue;
use serde_json::json;
use std::io::Write;

// ============================================================================
// Parsing Tests
// ============================================================================

#[test]
fn test_load_from_str() {
    let file = load_import_file_from_str(
        r#"{"rows": [{"id": 1, "displayName": "Alice", "category": "plumber"}]}"#,
    )
    .unwrap();
    assert_eq!(file.len(), 1);
    assert_eq!(file.first_row().unwrap()["displayName"], "Alice");
}

#[test]
fn test_load_empty_rows() {
    let file = load_import_file_from_str(r#"{"rows": []}"#).unwrap();
    assert!(file.is_empty());
    assert!(file.first_row().is_none());
}

#[test]
fn test_load_ignores_extra_keys() {
    let file =
        load_import_file_from_str(r#"{"query": "SELECT 1", "rows": [{"id": 1}]}"#).unwrap();
    assert_eq!(file.len(), 1);
}

#[test]
fn test_load_missing_rows() {
    let result = load_import_file_from_str(r#"{"error": "timeout"}"#);
    assert!(matches!(result, Err(Error::JsonParse(_))));
}

#[test]
fn test_load_malformed_json() {
    let result = load_import_file_from_str(r#"{"rows": [{"id": 1},"#);
    assert!(matches!(result, Err(Error::JsonParse(_))));
}

#[test]
fn test_load_non_object_rows() {
    let result = load_import_file_from_str(r#"{"rows": [{"id": 1}, "x"]}"#);
    assert!(matches!(result, Err(Error::NotAnObject { row: 1 })));
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"rows": [{{"id": 1}}, {{"id": 2}}]}}"#).unwrap();

    let loaded = load_import_file(file.path()).unwrap();
    assert_eq!(loaded.len(), 2);
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_import_file(dir.path().join("db-query-404.json"));
    assert!(matches!(result, Err(Error::FileNotFound { .. })));
}

// ============================================================================
// Null Normalization Tests
// ============================================================================

#[test]
fn test_normalize_null_sentinel() {
    assert_eq!(normalize_value(Some(&json!("NULL"))), SqlValue::Null);
    assert_eq!(normalize_value(Some(&json!(null))), SqlValue::Null);
    assert_eq!(normalize_value(None), SqlValue::Null);
}

#[test]
fn test_normalize_is_case_sensitive() {
    assert_eq!(
        normalize_value(Some(&json!("null"))),
        SqlValue::Text("null".to_string())
    );
    assert_eq!(
        normalize_value(Some(&json!(""))),
        SqlValue::Text(String::new())
    );
}

#[test]
fn test_normalize_scalars_pass_through() {
    assert_eq!(
        normalize_value(Some(&json!("plumber"))),
        SqlValue::Text("plumber".to_string())
    );
    assert_eq!(normalize_value(Some(&json!(true))), SqlValue::Bool(true));
    assert_eq!(normalize_value(Some(&json!(42))), SqlValue::Int(42));
    assert_eq!(normalize_value(Some(&json!(-7))), SqlValue::Int(-7));
    assert_eq!(
        normalize_value(Some(&json!(u64::MAX))),
        SqlValue::UInt(u64::MAX)
    );
    assert_eq!(normalize_value(Some(&json!(4.5))), SqlValue::Float(4.5));
}

#[test]
fn test_normalize_nested_as_json_text() {
    assert_eq!(
        normalize_value(Some(&json!([{"type": "text"}]))),
        SqlValue::Text(r#"[{"type":"text"}]"#.to_string())
    );
}

// ============================================================================
// Record Shape Tests
// ============================================================================

fn rows(value: serde_json::Value) -> Vec<crate::types::Record> {
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_shape_update_fields_skip_id() {
    let rows = rows(json!([{"id": 1, "name": "a", "icon": "b"}]));
    let shape = RecordShape::from_record(&rows[0]);
    assert_eq!(shape.len(), 3);
    let update: Vec<&str> = shape.update_fields().collect();
    assert!(!update.contains(&"id"));
    assert_eq!(update.len(), 2);
}

#[test]
fn test_shape_validate_uniform() {
    let rows = rows(json!([
        {"id": 1, "rating": 5},
        {"rating": 3, "id": 2}
    ]));
    let shape = RecordShape::from_record(&rows[0]);
    assert!(shape.validate(&rows).is_ok());
}

#[test]
fn test_shape_validate_mismatch() {
    let rows = rows(json!([
        {"id": 1, "rating": 5},
        {"id": 2, "rating": 4},
        {"id": 3, "score": 4}
    ]));
    let shape = RecordShape::from_record(&rows[0]);
    let err = shape.validate(&rows).unwrap_err();
    match err {
        Error::ShapeMismatch {
            row,
            missing,
            unexpected,
        } => {
            assert_eq!(row, 2);
            assert_eq!(missing, "rating");
            assert_eq!(unexpected, "score");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_shape_validate_extra_field() {
    let rows = rows(json!([{"id": 1}, {"id": 2, "note": "x"}]));
    let shape = RecordShape::from_record(&rows[0]);
    assert!(matches!(
        shape.validate(&rows),
        Err(Error::ShapeMismatch { row: 1, .. })
    ));
}
