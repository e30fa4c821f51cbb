//! Result store
//!
//! Append-only, completion-ordered collection of `PageRecord`s shared by
//! every worker of a run.

mod record;

pub use record::{
    CertificateInfo, ExtractionWarning, FormInfo, ImageInfo, InputInfo, LinkInfo, PageRecord,
};

use parking_lot::Mutex;

/// Thread-safe, append-only record store
#[derive(Debug, Default)]
pub struct ResultStore {
    records: Mutex<Vec<PageRecord>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record; completion order is insertion order
    pub fn append(&self, record: PageRecord) {
        self.records.lock().push(record);
    }

    /// Snapshot of all records in insertion order
    pub fn all(&self) -> Vec<PageRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_append_preserves_order() {
        let store = ResultStore::new();
        store.append(PageRecord::new("https://example.com/a", 200));
        store.append(PageRecord::new("https://example.com/b", 200));

        let urls: Vec<String> = store.all().into_iter().map(|r| r.url).collect();
        assert_eq!(urls, vec!["https://example.com/a", "https://example.com/b"]);
    }

    #[test]
    fn test_concurrent_appends() {
        let store = Arc::new(ResultStore::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for j in 0..25 {
                        store.append(PageRecord::new(format!("https://example.com/{}/{}", i, j), 200));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 200);
    }
}
