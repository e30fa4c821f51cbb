//! Corpus statistics printed after a run

use crate::store::PageRecord;
use std::collections::{BTreeMap, BTreeSet};

/// Aggregate figures over every stored page record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorpusStatistics {
    pub total_pages: usize,
    pub total_links: usize,
    pub total_images: usize,
    pub total_forms: usize,

    /// Unique matched values per pattern name
    pub unique_matches: BTreeMap<String, BTreeSet<String>>,

    /// Every technology seen on at least one page
    pub technologies: BTreeSet<String>,

    /// Sum of captured security headers across pages
    pub security_headers: usize,
}

impl CorpusStatistics {
    pub fn from_records(records: &[PageRecord]) -> Self {
        let mut stats = Self {
            total_pages: records.len(),
            ..Self::default()
        };

        for record in records {
            stats.total_links += record.links.len();
            stats.total_images += record.images.len();
            stats.total_forms += record.forms.len();
            stats.security_headers += record.security_score();
            stats
                .technologies
                .extend(record.technologies.iter().cloned());

            for (name, values) in &record.secrets {
                stats
                    .unique_matches
                    .entry(name.clone())
                    .or_default()
                    .extend(values.iter().cloned());
            }
        }

        stats
    }

    fn per_page(&self, total: usize) -> f64 {
        if self.total_pages == 0 {
            0.0
        } else {
            total as f64 / self.total_pages as f64
        }
    }

    pub fn average_links(&self) -> f64 {
        self.per_page(self.total_links)
    }

    pub fn average_images(&self) -> f64 {
        self.per_page(self.total_images)
    }

    pub fn average_forms(&self) -> f64 {
        self.per_page(self.total_forms)
    }

    pub fn average_security_headers(&self) -> f64 {
        self.per_page(self.security_headers)
    }

    /// Number of unique values matched by `pattern`, zero if it never matched
    pub fn unique_count(&self, pattern: &str) -> usize {
        self.unique_matches.get(pattern).map_or(0, BTreeSet::len)
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CorpusStatistics) {
    if stats.total_pages == 0 {
        println!("No data crawled yet.");
        return;
    }

    println!("\n=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Total pages crawled: {}", stats.total_pages);
    println!("  Total links found: {}", stats.total_links);
    println!("  Total images found: {}", stats.total_images);
    println!("  Total forms found: {}", stats.total_forms);
    println!("  Average links per page: {:.2}", stats.average_links());
    println!("  Average images per page: {:.2}", stats.average_images());
    println!("  Average forms per page: {:.2}", stats.average_forms());
    println!();

    println!("Contacts:");
    println!("  Unique emails: {}", stats.unique_count("emails"));
    println!("  Unique phone numbers: {}", stats.unique_count("phones"));
    println!("  Unique social handles: {}", stats.unique_count("social_media"));
    println!();

    println!("Security Analysis:");
    println!(
        "  Average security headers: {:.2}",
        stats.average_security_headers()
    );
    if stats.technologies.is_empty() {
        println!("  Technologies detected: none");
    } else {
        let technologies: Vec<&str> = stats.technologies.iter().map(String::as_str).collect();
        println!("  Technologies detected: {}", technologies.join(", "));
    }
    println!();

    if !stats.unique_matches.is_empty() {
        println!("Patterns Discovered:");
        for (name, values) in &stats.unique_matches {
            println!("  {}: {} unique values", name, values.len());
        }
        println!();
    }
}
