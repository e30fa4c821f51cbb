//! URL frontier and visited set
//!
//! The visited set and the queue live behind one lock and are only reachable
//! through `try_admit` and `pop`, so the dedup and bound checks are always
//! made together with the insert they guard.

use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use tokio::sync::{watch, Notify};
use url::Url;

/// A unit of work: a normalized URL and its link depth from the seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: Url,
    pub depth: u32,
}

/// Point-in-time counters of a frontier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrontierStats {
    pub visited: usize,
    pub queued: usize,
    pub in_flight: usize,
    pub dispatched: usize,
}

#[derive(Debug, Default)]
struct FrontierState {
    visited: HashSet<String>,
    queue: VecDeque<CrawlTask>,
    in_flight: usize,
    dispatched: usize,
    closed: bool,
}

enum PopOutcome {
    Task(CrawlTask),
    Wait,
    Done,
}

/// Multi-producer, multi-consumer crawl frontier
#[derive(Debug)]
pub struct Frontier {
    state: Mutex<FrontierState>,
    notify: Notify,
    shutdown: watch::Sender<bool>,
    max_depth: u32,
    max_pages: usize,
}

impl Frontier {
    pub fn new(max_depth: u32, max_pages: usize) -> Self {
        Self {
            state: Mutex::new(FrontierState::default()),
            notify: Notify::new(),
            shutdown: watch::channel(false).0,
            max_depth,
            max_pages,
        }
    }

    /// Admits `url` at `depth` if it is new and within bounds
    ///
    /// Returns false without side effects when the URL was already admitted,
    /// `depth > max_depth`, the visited set has reached `max_pages`, or the
    /// frontier is closed. Concurrent calls for the same URL have exactly
    /// one winner.
    pub fn try_admit(&self, url: &Url, depth: u32) -> bool {
        if depth > self.max_depth {
            return false;
        }

        {
            let mut state = self.state.lock();

            if state.closed
                || state.visited.len() >= self.max_pages
                || state.visited.contains(url.as_str())
            {
                return false;
            }

            state.visited.insert(url.as_str().to_string());
            state.queue.push_back(CrawlTask {
                url: url.clone(),
                depth,
            });
        }

        self.notify.notify_one();
        true
    }

    /// Waits for the next task
    ///
    /// Returns None once the run is over: the queue is empty with nothing in
    /// flight, `max_pages` tasks have been dispatched, or the frontier was
    /// closed. Every task handed out must be followed by one `complete`.
    pub async fn pop(&self) -> Option<CrawlTask> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.next() {
                PopOutcome::Task(task) => return Some(task),
                PopOutcome::Done => return None,
                PopOutcome::Wait => notified.await,
            }
        }
    }

    /// Claims the URL a fetch actually landed on after redirects
    ///
    /// Returns false when another task already owns `url`. A new URL is
    /// recorded as visited only while the visited set is below `max_pages`.
    pub fn mark_visited(&self, url: &Url) -> bool {
        let mut state = self.state.lock();

        if state.visited.contains(url.as_str()) {
            return false;
        }
        if state.visited.len() < self.max_pages {
            state.visited.insert(url.as_str().to_string());
        }
        true
    }

    /// Marks a task handed out by `pop` as finished
    pub fn complete(&self) {
        let idle = {
            let mut state = self.state.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
            state.in_flight == 0 && state.queue.is_empty()
        };

        if idle {
            self.notify.notify_waiters();
        }
    }

    /// Stops dispatching: queued tasks are discarded and admissions refused
    ///
    /// Returns the number of discarded tasks. In-flight tasks that have not
    /// started their request yet observe `shut_down` and give up; requests
    /// already on the wire run to completion.
    pub fn close(&self) -> usize {
        let discarded = {
            let mut state = self.state.lock();
            state.closed = true;
            let discarded = state.queue.len();
            state.queue.clear();
            discarded
        };

        self.shutdown.send_replace(true);
        self.notify.notify_waiters();
        discarded
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// True once `close` was called
    ///
    /// Running out of work or reaching the dispatch bound also closes the
    /// frontier but does not count as a shutdown.
    pub fn is_shut_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Resolves once `close` was called
    pub async fn shut_down(&self) {
        let mut rx = self.shutdown.subscribe();
        let _ = rx.wait_for(|down| *down).await;
    }

    /// Current visited count
    pub fn size(&self) -> usize {
        self.state.lock().visited.len()
    }

    pub fn stats(&self) -> FrontierStats {
        let state = self.state.lock();
        FrontierStats {
            visited: state.visited.len(),
            queued: state.queue.len(),
            in_flight: state.in_flight,
            dispatched: state.dispatched,
        }
    }

    fn next(&self) -> PopOutcome {
        let mut state = self.state.lock();

        if state.closed {
            return PopOutcome::Done;
        }

        if state.dispatched >= self.max_pages {
            let drained = state.queue.len();
            state.queue.clear();
            state.closed = true;
            drop(state);

            if drained > 0 {
                tracing::debug!("Page bound reached, drained {} queued tasks", drained);
            }
            self.notify.notify_waiters();
            return PopOutcome::Done;
        }

        if let Some(task) = state.queue.pop_front() {
            state.in_flight += 1;
            state.dispatched += 1;
            return PopOutcome::Task(task);
        }

        if state.in_flight == 0 {
            state.closed = true;
            drop(state);
            self.notify.notify_waiters();
            return PopOutcome::Done;
        }

        PopOutcome::Wait
    }
}
