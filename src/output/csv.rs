//! CSV export
//!
//! The header is the first record's fields followed by any field first seen
//! in a later record; cells a record lacks are left empty. Nested values
//! (lists, maps) are written as compact JSON.

use crate::output::traits::{ExportResult, Exporter};
use crate::store::PageRecord;
use serde_json::{Map, Value};
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
pub struct CsvExporter;

impl Exporter for CsvExporter {
    fn write(&self, records: &[PageRecord], path: &Path) -> ExportResult<()> {
        let rows = records
            .iter()
            .map(to_row)
            .collect::<Result<Vec<_>, _>>()?;
        let header = reconcile_header(&rows);

        let mut writer = csv::Writer::from_path(path)?;
        if !header.is_empty() {
            writer.write_record(&header)?;
        }

        for row in &rows {
            let cells = header
                .iter()
                .map(|field| row.get(field).map(cell).unwrap_or_default());
            writer.write_record(cells)?;
        }

        writer.flush()?;
        Ok(())
    }
}

fn to_row(record: &PageRecord) -> serde_json::Result<Map<String, Value>> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

/// Field names in order of first appearance across rows
pub(crate) fn reconcile_header(rows: &[Map<String, Value>]) -> Vec<String> {
    let mut header: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !header.contains(key) {
                header.push(key.clone());
            }
        }
    }
    header
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_header_follows_first_record_then_new_fields() {
        let rows = vec![
            json!({"url": "a", "title": "A"}).as_object().unwrap().clone(),
            json!({"url": "b", "extra": 1, "title": "B"})
                .as_object()
                .unwrap()
                .clone(),
        ];

        assert_eq!(reconcile_header(&rows), vec!["url", "title", "extra"]);
    }

    #[test]
    fn test_cells() {
        assert_eq!(cell(&Value::Null), "");
        assert_eq!(cell(&json!("text")), "text");
        assert_eq!(cell(&json!(42)), "42");
        assert_eq!(cell(&json!(["a", "b"])), r#"["a","b"]"#);
    }

    #[test]
    fn test_write_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut first = PageRecord::new("https://example.com/", 200);
        first.title = "Home, sweet home".to_string();
        let second = PageRecord::new("https://example.com/about", 200);

        CsvExporter.write(&[first, second], &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "url");
        assert_eq!(&headers[3], "title");

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][3], "Home, sweet home");
        assert_eq!(rows[0].len(), headers.len());
    }

    #[test]
    fn test_empty_corpus_writes_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        CsvExporter.write(&[], &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }
}
