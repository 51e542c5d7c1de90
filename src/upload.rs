//! Row normalization and the upload pipeline

use std::io::Write;

use anyhow::{Context, Result};
use indexmap::IndexMap;

use crate::firestore::{CollectionPath, FirestoreClient};
use crate::model::{CellValue, Column, Row, Table};
use crate::report::Reporter;

/// Where normalized row documents get written
pub trait DocumentSink {
    /// Add one document, returning its assigned id
    fn add_document(&mut self, fields: &IndexMap<String, CellValue>) -> Result<String>;
}

/// Convert a row into its document form: the full column set, in column
/// order, with missing cells replaced by explicit nulls. Pure.
pub fn normalize_document(row: &Row, columns: &[Column]) -> IndexMap<String, CellValue> {
    columns
        .iter()
        .map(|col| {
            let cell = row.get(col.index).cloned().unwrap_or(CellValue::Null);
            let cell = if cell.is_missing() {
                CellValue::Null
            } else {
                cell
            };
            (col.name.clone(), cell)
        })
        .collect()
}

/// Result of a completed run
#[derive(Debug, Clone, Copy)]
pub struct UploadOutcome {
    pub documents: usize,
}

/// Upload every row of the table through the sink, strictly sequential and
/// in source order. The first failure aborts the run; rows already written
/// stay written.
pub fn upload_table(
    table: &Table,
    sink: &mut dyn DocumentSink,
    reporter: &Reporter,
) -> Result<UploadOutcome> {
    let total = table.row_count();
    for (i, row) in table.rows.iter().enumerate() {
        let fields = normalize_document(row, &table.columns);
        sink.add_document(&fields).with_context(|| {
            format!(
                "failed to upload row {} of {} (source line {})",
                i + 1,
                total,
                row.source_line
            )
        })?;
        reporter.progress(i + 1, total);
    }
    Ok(UploadOutcome { documents: total })
}

/// Sink that writes documents to Cloud Firestore
pub struct FirestoreSink {
    client: FirestoreClient,
    path: CollectionPath,
}

impl FirestoreSink {
    pub fn new(client: FirestoreClient, path: CollectionPath) -> Self {
        Self { client, path }
    }
}

impl DocumentSink for FirestoreSink {
    fn add_document(&mut self, fields: &IndexMap<String, CellValue>) -> Result<String> {
        Ok(self.client.create_document(&self.path, fields)?)
    }
}

/// Sink that prints each would-be document instead of uploading it
pub struct DryRunSink<W: Write> {
    writer: W,
    next: usize,
}

impl<W: Write> DryRunSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, next: 0 }
    }
}

impl<W: Write> DocumentSink for DryRunSink<W> {
    fn add_document(&mut self, fields: &IndexMap<String, CellValue>) -> Result<String> {
        self.next += 1;
        let preview = serde_json::to_string(fields).context("Failed to render document")?;
        writeln!(self.writer, "dry-run[{}]: {}", self.next, preview)
            .context("Failed to write dry-run output")?;
        Ok(format!("dry_{:06}", self.next))
    }
}

#[cfg(test)]
mod tests {
    use anyhow::bail;

    use crate::model::Column;

    use super::*;

    /// Records every document instead of sending it anywhere
    #[derive(Default)]
    struct RecordingSink {
        documents: Vec<IndexMap<String, CellValue>>,
        fail_on: Option<usize>,
    }

    impl DocumentSink for RecordingSink {
        fn add_document(&mut self, fields: &IndexMap<String, CellValue>) -> Result<String> {
            if self.fail_on == Some(self.documents.len() + 1) {
                bail!("sink refused the document");
            }
            self.documents.push(fields.clone());
            Ok(format!("doc_{}", self.documents.len()))
        }
    }

    fn furnace_table() -> Table {
        let mut table = Table::new(vec![Column::new("temp", 0), Column::new("grade", 1)]);
        table.add_row(vec![CellValue::Int(950), CellValue::Null], 2);
        table.add_row(vec![CellValue::Null, CellValue::from("A")], 3);
        table
    }

    #[test]
    fn test_normalize_document_keeps_key_set() {
        let table = furnace_table();
        let doc = normalize_document(&table.rows[0], &table.columns);
        let keys: Vec<_> = doc.keys().cloned().collect();
        assert_eq!(keys, vec!["temp", "grade"]);
    }

    #[test]
    fn test_normalize_replaces_missing_with_null() {
        let columns = vec![Column::new("temp", 0), Column::new("carbon_pct", 1)];
        let row = Row::new(vec![CellValue::Float(f64::NAN), CellValue::Float(0.4)], 2);

        let doc = normalize_document(&row, &columns);
        assert_eq!(doc["temp"], CellValue::Null);
        assert_eq!(doc["carbon_pct"], CellValue::Float(0.4));
    }

    #[test]
    fn test_normalize_pads_short_rows() {
        let columns = vec![Column::new("temp", 0), Column::new("grade", 1)];
        let row = Row::new(vec![CellValue::Int(950)], 2);

        let doc = normalize_document(&row, &columns);
        assert_eq!(doc.len(), 2);
        assert_eq!(doc["grade"], CellValue::Null);
    }

    #[test]
    fn test_upload_issues_one_call_per_row_in_order() {
        let table = furnace_table();
        let mut sink = RecordingSink::default();

        let outcome = upload_table(&table, &mut sink, &Reporter::new(true)).unwrap();
        assert_eq!(outcome.documents, 2);
        assert_eq!(sink.documents.len(), 2);

        // Source order and the end-to-end vector from the field deployment:
        // {"temp": 950, "grade": null} then {"temp": null, "grade": "A"}
        assert_eq!(sink.documents[0]["temp"], CellValue::Int(950));
        assert_eq!(sink.documents[0]["grade"], CellValue::Null);
        assert_eq!(sink.documents[1]["temp"], CellValue::Null);
        assert_eq!(sink.documents[1]["grade"], CellValue::from("A"));
    }

    #[test]
    fn test_first_failure_aborts() {
        let mut table = furnace_table();
        table.add_row(vec![CellValue::Int(1013), CellValue::from("B")], 4);
        let mut sink = RecordingSink {
            fail_on: Some(2),
            ..Default::default()
        };

        let err = upload_table(&table, &mut sink, &Reporter::new(true)).unwrap_err();
        assert!(err.to_string().contains("row 2 of 3"));
        // The first document is already written and stays written
        assert_eq!(sink.documents.len(), 1);
    }

    #[test]
    fn test_dry_run_sink_prints_documents() {
        let table = furnace_table();
        let mut out = Vec::new();
        {
            let mut sink = DryRunSink::new(&mut out);
            upload_table(&table, &mut sink, &Reporter::new(true)).unwrap();
        }

        let rendered = String::from_utf8(out).unwrap();
        assert_eq!(rendered.lines().count(), 2);
        assert!(rendered.contains(r#"dry-run[1]: {"temp":950,"grade":null}"#));
        assert!(rendered.contains(r#"dry-run[2]: {"temp":null,"grade":"A"}"#));
    }
}
