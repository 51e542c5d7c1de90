//! JSON and NDJSON parsers
//!
//! Input must already be tabular: a JSON array of objects, or one object per
//! line for NDJSON. Anything else is rejected with [`InputShapeError`]
//! before the upload step can start.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexSet;
use serde_json::Value;

use crate::config::Config;
use crate::model::{CellValue, Column, Table};

use super::{InputShapeError, Parser};

/// Parser for JSON array files and NDJSON files
pub struct JsonParser;

impl Parser for JsonParser {
    fn parse(&self, path: &Path, _config: &Config) -> Result<Table> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open JSON file: {}", path.display()))?;
        let reader = BufReader::new(file);

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let records = if matches!(ext.as_str(), "jsonl" | "ndjson") {
            read_ndjson(reader)?
        } else {
            read_json_array(reader)?
        };

        build_table(records)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "json" | "jsonl" | "ndjson")
    }
}

fn read_json_array(reader: impl std::io::Read) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_reader(reader).context("Failed to parse JSON file")?;

    match value {
        Value::Array(arr) => Ok(arr),
        Value::Object(_) => Err(InputShapeError::NotTabular("a single object").into()),
        Value::Null => Err(InputShapeError::NotTabular("null").into()),
        Value::Bool(_) => Err(InputShapeError::NotTabular("a boolean").into()),
        Value::Number(_) => Err(InputShapeError::NotTabular("a number").into()),
        Value::String(_) => Err(InputShapeError::NotTabular("a string").into()),
    }
}

fn read_ndjson(reader: impl BufRead) -> Result<Vec<Value>> {
    let mut records = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read NDJSON line {}", line_num + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(&line)
            .with_context(|| format!("Failed to parse NDJSON line {}", line_num + 1))?;
        records.push(value);
    }
    Ok(records)
}

fn build_table(records: Vec<Value>) -> Result<Table> {
    if records.is_empty() {
        return Err(InputShapeError::Empty.into());
    }

    // Every record must be an object; reject rather than coerce
    for (i, record) in records.iter().enumerate() {
        if !record.is_object() {
            return Err(InputShapeError::RowNotObject(i + 1).into());
        }
    }

    // Columns are the insertion-ordered union of keys across all records
    let mut column_names: IndexSet<String> = IndexSet::new();
    for record in &records {
        if let Value::Object(obj) = record {
            for key in obj.keys() {
                column_names.insert(key.clone());
            }
        }
    }

    let columns: Vec<Column> = column_names
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(name.clone(), i))
        .collect();

    let mut table = Table::new(columns);

    for (line_num, record) in records.iter().enumerate() {
        if let Value::Object(obj) = record {
            let cells = column_names
                .iter()
                .map(|key| json_value_to_cell(obj.get(key)))
                .collect();
            table.add_row(cells, line_num + 1);
        }
    }

    super::infer_column_types(&mut table);

    Ok(table)
}

fn json_value_to_cell(value: Option<&Value>) -> CellValue {
    match value {
        None | Some(Value::Null) => CellValue::Null,
        Some(Value::Bool(b)) => CellValue::Bool(*b),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                CellValue::Int(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(Cow::Owned(n.to_string()))
            }
        }
        Some(Value::String(s)) => {
            // Try parsing as date/datetime
            if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return CellValue::Date(date);
            }
            if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                return CellValue::DateTime(dt);
            }
            if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return CellValue::DateTime(dt);
            }
            CellValue::String(Cow::Owned(s.clone()))
        }
        // Nested structures are carried as their JSON text
        Some(Value::Array(arr)) => {
            CellValue::String(Cow::Owned(serde_json::to_string(arr).unwrap_or_default()))
        }
        Some(Value::Object(obj)) => {
            CellValue::String(Cow::Owned(serde_json::to_string(obj).unwrap_or_default()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(json: &str) -> Result<Table> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, json).unwrap();
        JsonParser.parse(&path, &Config::default())
    }

    #[test]
    fn test_array_of_objects() {
        let table = parse_str(r#"[{"temp": 950, "grade": null}, {"temp": null, "grade": "A"}]"#)
            .unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.columns[0].name, "temp");
        assert_eq!(table.columns[1].name, "grade");
        assert_eq!(table.rows[0].cells, vec![CellValue::Int(950), CellValue::Null]);
        assert_eq!(table.rows[1].cells, vec![CellValue::Null, CellValue::from("A")]);
    }

    #[test]
    fn test_heterogeneous_keys_union_with_nulls() {
        let table = parse_str(r#"[{"temp": 950}, {"grade": "A"}]"#).unwrap();
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.rows[0].cells, vec![CellValue::Int(950), CellValue::Null]);
        assert_eq!(table.rows[1].cells, vec![CellValue::Null, CellValue::from("A")]);
    }

    #[test]
    fn test_single_object_is_rejected() {
        let err = parse_str(r#"{"temp": 950}"#).unwrap_err();
        let shape = err.downcast_ref::<InputShapeError>().unwrap();
        assert!(matches!(shape, InputShapeError::NotTabular(_)));
    }

    #[test]
    fn test_scalar_row_is_rejected() {
        let err = parse_str(r#"[{"temp": 950}, 42]"#).unwrap_err();
        let shape = err.downcast_ref::<InputShapeError>().unwrap();
        assert!(matches!(shape, InputShapeError::RowNotObject(2)));
    }

    #[test]
    fn test_empty_array_is_rejected() {
        let err = parse_str("[]").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InputShapeError>(),
            Some(InputShapeError::Empty)
        ));
    }

    #[test]
    fn test_ndjson() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.ndjson");
        std::fs::write(&path, "{\"temp\": 950}\n\n{\"temp\": 1013}\n").unwrap();

        let table = JsonParser.parse(&path, &Config::default()).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[1].cells, vec![CellValue::Int(1013)]);
    }
}
