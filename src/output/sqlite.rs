//! SQLite export
//!
//! One fixed-schema table per profile. Rows are appended inside a single
//! transaction; the table is created if missing.

use crate::output::traits::{ExportResult, Exporter};
use crate::store::PageRecord;
use rusqlite::{params, Connection};
use std::path::Path;

const BASIC_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS crawled_data (
    url TEXT,
    title TEXT,
    meta_description TEXT,
    links_count INTEGER,
    images_count INTEGER,
    forms_count INTEGER,
    text_length INTEGER
);
";

const ADVANCED_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS advanced_crawled_data (
    url TEXT,
    title TEXT,
    meta_description TEXT,
    links_count INTEGER,
    images_count INTEGER,
    forms_count INTEGER,
    text_length INTEGER,
    technologies TEXT,
    security_score INTEGER,
    secrets_count INTEGER
);
";

/// Table layout written by the SQLite exporter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqliteLayout {
    /// `crawled_data` with the seven core columns
    Basic,
    /// `advanced_crawled_data`, adding technologies, security score and secrets count
    Advanced,
}

impl SqliteLayout {
    pub fn table(&self) -> &'static str {
        match self {
            Self::Basic => "crawled_data",
            Self::Advanced => "advanced_crawled_data",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SqliteExporter {
    pub layout: SqliteLayout,
}

impl SqliteExporter {
    pub fn new(layout: SqliteLayout) -> Self {
        Self { layout }
    }
}

impl Exporter for SqliteExporter {
    fn write(&self, records: &[PageRecord], path: &Path) -> ExportResult<()> {
        let mut conn = Connection::open(path)?;

        let schema = match self.layout {
            SqliteLayout::Basic => BASIC_SCHEMA,
            SqliteLayout::Advanced => ADVANCED_SCHEMA,
        };
        conn.execute_batch(schema)?;

        let tx = conn.transaction()?;
        {
            let mut stmt = match self.layout {
                SqliteLayout::Basic => tx.prepare(
                    "INSERT INTO crawled_data VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )?,
                SqliteLayout::Advanced => tx.prepare(
                    "INSERT INTO advanced_crawled_data VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                )?,
            };

            for record in records {
                let links = record.links.len() as i64;
                let images = record.images.len() as i64;
                let forms = record.forms.len() as i64;
                let text_length = record.text_content.chars().count() as i64;

                match self.layout {
                    SqliteLayout::Basic => stmt.execute(params![
                        record.url,
                        record.title,
                        record.meta_description,
                        links,
                        images,
                        forms,
                        text_length,
                    ])?,
                    SqliteLayout::Advanced => stmt.execute(params![
                        record.url,
                        record.title,
                        record.meta_description,
                        links,
                        images,
                        forms,
                        text_length,
                        record.technologies.join(", "),
                        record.security_score() as i64,
                        record.secrets_count() as i64,
                    ])?,
                };
            }
        }
        tx.commit()?;

        Ok(())
    }
}
