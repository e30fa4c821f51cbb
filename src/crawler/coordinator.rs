//! Crawler coordinator - run orchestration
//!
//! Builds the shared context of a run (frontier, politeness, extractor,
//! result store), seeds the frontier, runs the worker pool to completion,
//! and summarizes the run.

use crate::config::Config;
use crate::crawler::extractor::Extractor;
use crate::crawler::frontier::Frontier;
use crate::crawler::scheduler::{run_workers, CrawlContext, TaskCounters};
use crate::politeness::PolitenessController;
use crate::store::ResultStore;
use crate::url::normalize_url;
use crate::NetrError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,

    /// Records in the result store
    pub pages_stored: usize,

    /// URLs admitted to the frontier
    pub visited: usize,
    pub elapsed: Duration,

    /// Whether the run was stopped by a shutdown request
    pub interrupted: bool,
}

/// Stops a running crawl from another task (e.g. a Ctrl-C handler)
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    frontier: Arc<Frontier>,
    interrupted: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Stops dispatching; in-flight fetches finish or time out
    pub fn shutdown(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
        let discarded = self.frontier.close();
        tracing::info!("Shutdown requested, discarded {} queued tasks", discarded);
    }
}

/// Main crawler structure
///
/// A `Crawler` performs a single run; its frontier is closed afterwards.
pub struct Crawler {
    ctx: Arc<CrawlContext>,
    interrupted: Arc<AtomicBool>,
}

impl Crawler {
    /// Creates a crawler for the given configuration
    ///
    /// The configuration is expected to be validated already.
    pub fn new(config: Config) -> Result<Self, NetrError> {
        let politeness = PolitenessController::new(&config)?;
        let extractor = Extractor::from_config(&config);
        let frontier = Arc::new(Frontier::new(
            config.crawler.max_depth,
            config.crawler.max_pages,
        ));

        let ctx = CrawlContext {
            config: Arc::new(config),
            frontier,
            politeness,
            extractor,
            store: Arc::new(ResultStore::new()),
            counters: TaskCounters::default(),
            started: Instant::now(),
        };

        Ok(Self {
            ctx: Arc::new(ctx),
            interrupted: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Shared handle to the result store, usable during and after the run
    pub fn results(&self) -> Arc<ResultStore> {
        Arc::clone(&self.ctx.store)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            frontier: Arc::clone(&self.ctx.frontier),
            interrupted: Arc::clone(&self.interrupted),
        }
    }

    pub fn config(&self) -> &Config {
        &self.ctx.config
    }

    /// Crawls outward from `seed` until the frontier is exhausted, the page
    /// bound is reached, or shutdown is requested
    ///
    /// # Errors
    ///
    /// Only an unusable seed URL is an error; per-page failures are counted
    /// in the report.
    pub async fn run(&self, seed: &str) -> Result<CrawlReport, NetrError> {
        let seed = normalize_url(seed)?;
        let started = Instant::now();

        if !self.ctx.frontier.try_admit(&seed, 0) {
            tracing::warn!("Seed {} was not admitted; frontier already used", seed);
        }

        tracing::info!(
            "Starting crawl of {} with {} workers (max depth {}, max pages {})",
            seed,
            self.ctx.config.crawler.max_threads,
            self.ctx.config.crawler.max_depth,
            self.ctx.config.crawler.max_pages
        );

        run_workers(Arc::clone(&self.ctx), self.ctx.config.crawler.max_threads).await;

        let counters = &self.ctx.counters;
        let report = CrawlReport {
            succeeded: counters.succeeded.load(Ordering::Relaxed),
            failed: counters.failed.load(Ordering::Relaxed),
            skipped: counters.skipped.load(Ordering::Relaxed),
            pages_stored: self.ctx.store.len(),
            visited: self.ctx.frontier.size(),
            elapsed: started.elapsed(),
            interrupted: self.interrupted.load(Ordering::SeqCst),
        };

        tracing::info!(
            "Crawl completed: {} succeeded, {} failed, {} skipped in {:.2?}",
            report.succeeded,
            report.failed,
            report.skipped,
            report.elapsed
        );

        Ok(report)
    }
}
