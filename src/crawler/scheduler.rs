//! Worker pool and per-task state machine
//!
//! A fixed number of workers pull tasks from the frontier. Each task runs
//! in its own spawned future so a panic inside fetching or extraction is
//! contained to that task; the worker logs it and moves on.
//!
//! # Task lifecycle
//!
//! | From | To | When |
//! |------|----|------|
//! | Queued | Dispatched | a worker pops the task |
//! | Dispatched | Skipped | depth bound exceeded, robots.txt denies the URL, or shutdown |
//! | Dispatched | Fetching | politeness approved and the pacing slot arrived |
//! | Fetching | Succeeded | HTTP 200, record extracted and stored, links offered |
//! | Fetching | Failed | timeout, connection error, non-200 status, or panic |
//! | Fetching | Skipped | a redirect landed on a URL another task owns |
//!
//! A shutdown interrupts the pacing wait, so no request starts after it.

use crate::config::Config;
use crate::crawler::certificate::fetch_certificate;
use crate::crawler::extractor::Extractor;
use crate::crawler::fetcher::fetch_page;
use crate::crawler::frontier::{CrawlTask, Frontier};
use crate::politeness::PolitenessController;
use crate::state::TaskState;
use crate::store::ResultStore;
use crate::url::{normalize_parsed, normalize_url};
use crate::NetrError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{debug, error, info, trace, warn};

/// Why a task ended without storing a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    DepthExceeded,
    RobotsDisallowed,
    /// The run was shut down before the request started
    Shutdown,
    /// The response came from a redirect onto an already visited URL
    DuplicateRedirect,
}

/// Terminal result of one task
#[derive(Debug)]
pub enum TaskOutcome {
    Succeeded {
        /// Links on the page that were newly admitted to the frontier
        admitted: usize,
    },
    Failed(NetrError),
    Skipped(SkipReason),
}

impl TaskOutcome {
    pub fn state(&self) -> TaskState {
        match self {
            Self::Succeeded { .. } => TaskState::Succeeded,
            Self::Failed(_) => TaskState::Failed,
            Self::Skipped(_) => TaskState::Skipped,
        }
    }
}

/// Run-wide task counters
#[derive(Debug, Default)]
pub struct TaskCounters {
    pub succeeded: AtomicUsize,
    pub failed: AtomicUsize,
    pub skipped: AtomicUsize,
    pub completed: AtomicUsize,
}

impl TaskCounters {
    fn record(&self, state: TaskState) -> usize {
        let counter = match state {
            TaskState::Succeeded => &self.succeeded,
            TaskState::Skipped => &self.skipped,
            _ => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.completed.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Everything a worker needs, shared by the whole pool
pub struct CrawlContext {
    pub config: Arc<Config>,
    pub frontier: Arc<Frontier>,
    pub politeness: PolitenessController,
    pub extractor: Extractor,
    pub store: Arc<ResultStore>,
    pub counters: TaskCounters,
    pub started: Instant,
}

/// Runs `workers` workers until the frontier reports the run is over
pub async fn run_workers(ctx: Arc<CrawlContext>, workers: usize) {
    let mut pool = JoinSet::new();

    for id in 0..workers.max(1) {
        pool.spawn(worker_loop(Arc::clone(&ctx), id));
    }

    while let Some(result) = pool.join_next().await {
        if let Err(e) = result {
            error!("Worker exited abnormally: {}", e);
        }
    }
}

async fn worker_loop(ctx: Arc<CrawlContext>, id: usize) {
    trace!("Worker {} started", id);

    while let Some(task) = ctx.frontier.pop().await {
        let url = task.url.clone();

        let handle = tokio::spawn({
            let ctx = Arc::clone(&ctx);
            async move { process_task(&ctx, task).await }
        });

        let state = match handle.await {
            Ok(outcome) => {
                report_outcome(&url, &outcome);
                outcome.state()
            }
            Err(e) => {
                error!("Task for {} aborted: {}", url, e);
                TaskState::Failed
            }
        };

        ctx.frontier.complete();
        let completed = ctx.counters.record(state);

        if completed % 10 == 0 {
            log_progress(&ctx, completed);
        }
    }

    trace!("Worker {} finished", id);
}

/// Drives one task from Dispatched to a terminal state
pub async fn process_task(ctx: &CrawlContext, task: CrawlTask) -> TaskOutcome {
    match run_task(ctx, &task).await {
        Ok(outcome) => outcome,
        Err(e) => TaskOutcome::Failed(e),
    }
}

async fn run_task(ctx: &CrawlContext, task: &CrawlTask) -> Result<TaskOutcome, NetrError> {
    let state = TaskState::Queued.transition(TaskState::Dispatched)?;
    trace!("{} {} (depth {})", state, task.url, task.depth);

    if task.depth > ctx.config.crawler.max_depth {
        state.transition(TaskState::Skipped)?;
        return Ok(TaskOutcome::Skipped(SkipReason::DepthExceeded));
    }

    if !ctx.politeness.can_fetch(&task.url).await {
        state.transition(TaskState::Skipped)?;
        return Ok(TaskOutcome::Skipped(SkipReason::RobotsDisallowed));
    }

    if ctx.frontier.is_shut_down() {
        state.transition(TaskState::Skipped)?;
        return Ok(TaskOutcome::Skipped(SkipReason::Shutdown));
    }

    tokio::select! {
        _ = ctx.politeness.pace(&task.url) => {}
        _ = ctx.frontier.shut_down() => {
            state.transition(TaskState::Skipped)?;
            return Ok(TaskOutcome::Skipped(SkipReason::Shutdown));
        }
    }

    let state = state.transition(TaskState::Fetching)?;
    trace!("{} {}", state, task.url);

    let page = match fetch_page(ctx.politeness.select_client(), &task.url).await {
        Ok(page) => page,
        Err(e) => {
            state.transition(TaskState::Failed)?;
            return Ok(TaskOutcome::Failed(e));
        }
    };

    if let Some(landed) = page.meta.final_url.clone() {
        match normalize_parsed(landed) {
            Ok(landed) if landed != task.url && !ctx.frontier.mark_visited(&landed) => {
                debug!("{} redirected to already visited {}", task.url, landed);
                state.transition(TaskState::Skipped)?;
                return Ok(TaskOutcome::Skipped(SkipReason::DuplicateRedirect));
            }
            Ok(_) => {}
            Err(e) => debug!("Cannot normalize redirect target of {}: {}", task.url, e),
        }
    }

    let mut record = ctx.extractor.extract(&page.body, &task.url, &page.meta);
    if ctx.extractor.wants_certificate(&task.url) {
        let certificate = fetch_certificate(&task.url, ctx.config.crawler.timeout()).await;
        ctx.extractor.record_certificate(&mut record, certificate);
    }
    let links: Vec<String> = record.outbound_links().map(str::to_string).collect();
    ctx.store.append(record);
    state.transition(TaskState::Succeeded)?;

    let mut admitted = 0;
    if task.depth < ctx.config.crawler.max_depth {
        for link in links {
            match normalize_url(&link) {
                Ok(url) if ctx.frontier.try_admit(&url, task.depth + 1) => admitted += 1,
                Ok(_) => {}
                Err(e) => debug!("Dropping link {}: {}", link, e),
            }
        }
    }

    Ok(TaskOutcome::Succeeded { admitted })
}

fn report_outcome(url: &url::Url, outcome: &TaskOutcome) {
    match outcome {
        TaskOutcome::Succeeded { admitted } => {
            debug!("Crawled {} ({} new links)", url, admitted)
        }
        TaskOutcome::Failed(e) => warn!("Error crawling {}: {}", url, e),
        TaskOutcome::Skipped(reason) => debug!("Skipped {}: {:?}", url, reason),
    }
}

fn log_progress(ctx: &CrawlContext, completed: usize) {
    let stats = ctx.frontier.stats();
    let elapsed = ctx.started.elapsed().as_secs_f64();
    let rate = if elapsed > 0.0 {
        ctx.store.len() as f64 / elapsed
    } else {
        0.0
    };

    info!(
        "Progress: {} tasks done, {} pages stored, {} queued, {} in flight, {:.2} pages/sec",
        completed,
        ctx.store.len(),
        stats.queued,
        stats.in_flight,
        rate
    );
}
