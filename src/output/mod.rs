//! Output module for exporting the crawled corpus
//!
//! This module handles:
//! - Serializing page records as JSON, CSV or SQLite rows
//! - Writing through a `.partial` file so a failed export never looks complete
//! - Summarizing the corpus for the operator

mod csv;
mod json;
mod sqlite;
pub mod stats;
mod traits;

pub use self::csv::CsvExporter;
pub use json::JsonExporter;
pub use sqlite::{SqliteExporter, SqliteLayout};
pub use stats::{print_statistics, CorpusStatistics};
pub use traits::{ExportError, ExportResult, Exporter};

use crate::config::{ExportFormat, OutputConfig, Profile};
use crate::store::PageRecord;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Final path of an export: `<stem>.<ext>`
pub fn output_path(output: &OutputConfig) -> PathBuf {
    PathBuf::from(format!("{}.{}", output.stem, output.format.extension()))
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

/// Picks the exporter for a format; the SQLite table follows the profile
pub fn exporter_for(format: ExportFormat, profile: Profile) -> Box<dyn Exporter + Send + Sync> {
    match format {
        ExportFormat::Json => Box::new(JsonExporter),
        ExportFormat::Csv => Box::new(CsvExporter),
        ExportFormat::Sqlite => Box::new(SqliteExporter::new(match profile {
            Profile::Basic => SqliteLayout::Basic,
            Profile::Advanced => SqliteLayout::Advanced,
        })),
    }
}

/// Exports `records` to the configured destination
///
/// The data is written to `<stem>.<ext>.partial` and renamed into place
/// once complete. On failure the partial file is removed and the final
/// path is left untouched. SQLite exports start from a copy of any
/// existing database so rows are appended.
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the completed export
/// * `Err(ExportError)` - Failed to write the export
pub fn export(
    records: &[PageRecord],
    output: &OutputConfig,
    profile: Profile,
) -> ExportResult<PathBuf> {
    let path = output_path(output);
    let partial = partial_path(&path);
    let exporter = exporter_for(output.format, profile);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    debug!("Writing {} records to {}", records.len(), partial.display());

    let result = prepare_partial(&path, &partial, output.format)
        .and_then(|()| exporter.write(records, &partial))
        .and_then(|()| std::fs::rename(&partial, &path).map_err(ExportError::from));

    match result {
        Ok(()) => {
            info!(
                "Exported {} records to {} ({})",
                records.len(),
                path.display(),
                output.format
            );
            Ok(path)
        }
        Err(e) => {
            if partial.exists() {
                if let Err(remove_err) = std::fs::remove_file(&partial) {
                    warn!(
                        "Failed to remove partial export {}: {}",
                        partial.display(),
                        remove_err
                    );
                }
            }
            Err(e)
        }
    }
}

fn prepare_partial(path: &Path, partial: &Path, format: ExportFormat) -> ExportResult<()> {
    if partial.exists() {
        std::fs::remove_file(partial)?;
    }
    if format == ExportFormat::Sqlite && path.exists() {
        std::fs::copy(path, partial)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use tempfile::tempdir;

    fn output_in(dir: &Path, format: ExportFormat) -> OutputConfig {
        OutputConfig {
            format,
            stem: dir.join("results").to_string_lossy().into_owned(),
        }
    }

    #[test]
    fn test_output_path_extension() {
        let output = OutputConfig {
            format: ExportFormat::Sqlite,
            stem: "out/run".to_string(),
        };
        assert_eq!(output_path(&output), PathBuf::from("out/run.db"));
        assert_eq!(
            partial_path(&output_path(&output)),
            PathBuf::from("out/run.db.partial")
        );
    }

    #[test]
    fn test_json_export_renames_partial() {
        let dir = tempdir().unwrap();
        let output = output_in(dir.path(), ExportFormat::Json);
        let records = vec![
            PageRecord::new("https://example.com/", 200),
            PageRecord::new("https://example.com/about", 200),
        ];

        let path = export(&records, &output, Profile::Basic).unwrap();

        assert!(path.ends_with("results.json"));
        assert!(!partial_path(&path).exists());

        let parsed: Vec<serde_json::Value> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let urls: Vec<&str> = parsed.iter().map(|r| r["url"].as_str().unwrap()).collect();
        assert_eq!(urls, vec!["https://example.com/", "https://example.com/about"]);
    }

    #[test]
    fn test_empty_export_is_valid() {
        let dir = tempdir().unwrap();
        let output = output_in(dir.path(), ExportFormat::Json);

        let path = export(&[], &output, Profile::Advanced).unwrap();
        let parsed: Vec<serde_json::Value> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_sqlite_export_appends_to_existing_database() {
        let dir = tempdir().unwrap();
        let output = output_in(dir.path(), ExportFormat::Sqlite);

        export(
            &[PageRecord::new("https://example.com/a", 200)],
            &output,
            Profile::Advanced,
        )
        .unwrap();
        let path = export(
            &[PageRecord::new("https://example.com/b", 200)],
            &output,
            Profile::Advanced,
        )
        .unwrap();

        let conn = Connection::open(&path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM advanced_crawled_data", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_failed_export_leaves_no_partial_file() {
        let dir = tempdir().unwrap();
        let stem = dir.path().join("results");
        // A directory squatting on the final path makes the rename fail
        std::fs::create_dir(dir.path().join("results.csv")).unwrap();
        std::fs::write(dir.path().join("results.csv").join("keep"), b"x").unwrap();

        let output = OutputConfig {
            format: ExportFormat::Csv,
            stem: stem.to_string_lossy().into_owned(),
        };

        let result = export(&[PageRecord::new("https://example.com/", 200)], &output, Profile::Basic);

        assert!(result.is_err());
        assert!(!dir.path().join("results.csv.partial").exists());
    }
}
