//! Dispatch pacing
//!
//! Every fetch first waits for a slot. In global scope all dispatches share
//! one slot sequence spaced `delay` apart, whatever the destination host.
//! In per-origin scope each origin has its own sequence, spaced by the
//! larger of `delay` and the origin's robots.txt `Crawl-delay`.

use crate::config::PacingScope;
use crate::state::OriginState;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Slot-reserving rate limiter
///
/// The lock is only held while a slot is reserved; callers sleep outside
/// of it, so a slow origin never blocks reservations for others.
#[derive(Debug)]
pub struct Pacer {
    scope: PacingScope,
    delay: Duration,
    global: Mutex<OriginState>,
    origins: Mutex<HashMap<String, OriginState>>,
}

impl Pacer {
    pub fn new(scope: PacingScope, delay: Duration) -> Self {
        Self {
            scope,
            delay,
            global: Mutex::new(OriginState::new()),
            origins: Mutex::new(HashMap::new()),
        }
    }

    pub fn scope(&self) -> PacingScope {
        self.scope
    }

    /// Interval between dispatches for an origin
    pub fn interval(&self, crawl_delay: Option<Duration>) -> Duration {
        match (self.scope, crawl_delay) {
            (PacingScope::PerOrigin, Some(robots_delay)) => self.delay.max(robots_delay),
            _ => self.delay,
        }
    }

    /// Reserves the next slot for `origin` and returns when it starts
    pub fn reserve(&self, origin: &str, crawl_delay: Option<Duration>, now: Instant) -> Instant {
        let interval = self.interval(crawl_delay);

        match self.scope {
            PacingScope::Global => self.global.lock().reserve(now, interval),
            PacingScope::PerOrigin => self
                .origins
                .lock()
                .entry(origin.to_string())
                .or_default()
                .reserve(now, interval),
        }
    }

    /// Waits until the caller is permitted to dispatch a fetch to `origin`
    pub async fn wait(&self, origin: &str, crawl_delay: Option<Duration>) {
        let slot = self.reserve(origin, crawl_delay, Instant::now());
        tokio::time::sleep_until(tokio::time::Instant::from_std(slot)).await;
    }

    /// Total number of slots handed out
    pub fn dispatch_count(&self) -> u64 {
        match self.scope {
            PacingScope::Global => self.global.lock().dispatch_count,
            PacingScope::PerOrigin => self
                .origins
                .lock()
                .values()
                .map(|state| state.dispatch_count)
                .sum(),
        }
    }
}
