//! CSV file parser

use std::borrow::Cow;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::model::{CellValue, Column, Table};

use super::Parser;

/// Parser for CSV files
pub struct CsvParser;

impl Parser for CsvParser {
    fn parse(&self, path: &Path, _config: &Config) -> Result<Table> {
        let file =
            File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        // Read headers
        let headers = csv_reader
            .headers()
            .context("Failed to read CSV headers")?
            .clone();

        let columns: Vec<Column> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| Column::new(name.to_string(), i))
            .collect();

        let mut table = Table::new(columns);

        // Read rows
        for (line_num, result) in csv_reader.records().enumerate() {
            let record = result
                .with_context(|| format!("Failed to read CSV row {}", line_num + 2))?; // +2 for 1-indexing and header

            let mut cells: Vec<CellValue> = record.iter().map(parse_cell_value).collect();

            // Short rows pad with nulls; extra unnamed cells are dropped so
            // every row keeps exactly the header's column set
            cells.resize(table.column_count(), CellValue::Null);

            table.add_row(cells, line_num + 2); // +2 for 1-indexing and header
        }

        super::infer_column_types(&mut table);

        Ok(table)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "csv" | "tsv" | "txt")
    }
}

/// Parse a string value into a CellValue with type inference
fn parse_cell_value(s: &str) -> CellValue {
    let trimmed = s.trim();

    // Check for empty/null
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed.eq_ignore_ascii_case("nan")
        || trimmed == "NA"
    {
        return CellValue::Null;
    }

    // Try parsing as boolean
    if trimmed.eq_ignore_ascii_case("true") || trimmed.eq_ignore_ascii_case("yes") {
        return CellValue::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed.eq_ignore_ascii_case("no") {
        return CellValue::Bool(false);
    }

    // Try parsing as integer
    if let Ok(i) = trimmed.parse::<i64>() {
        return CellValue::Int(i);
    }

    // Try parsing as float
    if let Ok(f) = trimmed.parse::<f64>() {
        return CellValue::Float(f);
    }

    // Try parsing as date
    if let Ok(date) = chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return CellValue::Date(date);
    }

    // Try parsing as datetime (ISO 8601)
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return CellValue::DateTime(dt);
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return CellValue::DateTime(dt);
    }

    // Default to string
    CellValue::String(Cow::Owned(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::model::CellType;

    use super::*;

    #[test]
    fn test_parse_cell_value() {
        assert_eq!(parse_cell_value(""), CellValue::Null);
        assert_eq!(parse_cell_value("null"), CellValue::Null);
        assert_eq!(parse_cell_value("NA"), CellValue::Null);
        assert_eq!(parse_cell_value("NaN"), CellValue::Null);
        assert_eq!(parse_cell_value("true"), CellValue::Bool(true));
        assert_eq!(parse_cell_value("false"), CellValue::Bool(false));
        assert_eq!(parse_cell_value("42"), CellValue::Int(42));
        assert_eq!(parse_cell_value("3.14"), CellValue::Float(3.14));
        assert_eq!(
            parse_cell_value("hello"),
            CellValue::String(Cow::Owned("hello".to_string()))
        );
    }

    #[test]
    fn test_parse_file_with_missing_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("furnace.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "temp,grade").unwrap();
        writeln!(file, "950,").unwrap();
        writeln!(file, ",A").unwrap();
        writeln!(file, "1013").unwrap();

        let table = CsvParser.parse(&path, &Config::default()).unwrap();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.rows[0].cells, vec![CellValue::Int(950), CellValue::Null]);
        assert_eq!(table.rows[1].cells, vec![CellValue::Null, CellValue::from("A")]);
        // Short row padded out to the full column set
        assert_eq!(table.rows[2].cells, vec![CellValue::Int(1013), CellValue::Null]);
        assert_eq!(table.rows[2].source_line, 4);
    }

    #[test]
    fn test_inferred_column_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "temp,carbon_pct,grade").unwrap();
        writeln!(file, "950,0.4,A").unwrap();
        writeln!(file, "1013,,B").unwrap();

        let table = CsvParser.parse(&path, &Config::default()).unwrap();
        assert_eq!(table.columns[0].inferred_type, CellType::Int);
        assert_eq!(table.columns[1].inferred_type, CellType::Float);
        assert_eq!(table.columns[2].inferred_type, CellType::String);
    }
}
