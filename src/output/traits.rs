//! Exporter trait and error types

use crate::store::PageRecord;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while exporting a corpus
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Writes a sequence of page records to a file in one encoding
pub trait Exporter {
    /// Writes `records` to `path`, which may already exist
    fn write(&self, records: &[PageRecord], path: &Path) -> ExportResult<()>;
}
