//! Crawl engine
//!
//! This module contains the core crawling logic, including:
//! - The frontier and visited set
//! - HTTP fetching
//! - HTML parsing and page record extraction
//! - The worker pool and per-task state machine
//! - Overall crawl coordination

mod certificate;
mod coordinator;
mod extractor;
mod fetcher;
mod fingerprint;
mod frontier;
mod parser;
mod scheduler;

pub use certificate::{fetch_certificate, inspect_certificate};
pub use coordinator::{CrawlReport, Crawler, ShutdownHandle};
pub use extractor::{Extractor, SECURITY_HEADERS};
pub use fetcher::{fetch_page, FetchedPage, ResponseMeta};
pub use fingerprint::detect_technologies;
pub use frontier::{CrawlTask, Frontier, FrontierStats};
pub use parser::{collapse_whitespace, parse_html, ParsedPage};
pub use scheduler::{SkipReason, TaskOutcome};

use crate::config::Config;
use crate::store::PageRecord;
use crate::NetrError;

/// Runs a complete crawl and returns its report and records
///
/// # Example
///
/// ```no_run
/// use netr::config::Config;
///
/// # async fn example() -> Result<(), netr::NetrError> {
/// let (report, records) = netr::crawl(Config::default(), "https://example.com/").await?;
/// println!("{} pages in {:?}", records.len(), report.elapsed);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: Config, seed: &str) -> Result<(CrawlReport, Vec<PageRecord>), NetrError> {
    let crawler = Crawler::new(config)?;
    let report = crawler.run(seed).await?;
    Ok((report, crawler.results().all()))
}
