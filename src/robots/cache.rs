//! Per-origin robots.txt cache
//!
//! Each origin owns a `OnceCell`; the first task to reach an origin fetches
//! robots.txt and every concurrent task for that origin awaits the same
//! fetch instead of issuing its own.

use crate::robots::{fetch_robots, RobotsPolicy};
use crate::url::origin_of;
use parking_lot::Mutex;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use url::Url;

type Slot = Arc<OnceCell<Arc<RobotsPolicy>>>;

/// Run-scoped robots.txt cache keyed by origin
#[derive(Debug, Default)]
pub struct RobotsCache {
    entries: Mutex<HashMap<String, Slot>>,
}

impl RobotsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the policy for the origin of `url`, fetching it on first use
    pub async fn policy_for(&self, client: &Client, url: &Url) -> Arc<RobotsPolicy> {
        let slot = self.slot(&origin_of(url));

        slot.get_or_init(|| async { Arc::new(fetch_robots(client, url).await) })
            .await
            .clone()
    }

    /// Inserts a known policy for an origin (used when robots.txt is ignored
    /// or already known)
    pub fn insert(&self, origin: &str, policy: RobotsPolicy) {
        let cell = OnceCell::new_with(Some(Arc::new(policy)));
        self.entries
            .lock()
            .insert(origin.to_string(), Arc::new(cell));
    }

    /// Returns the cached policy for an origin without fetching
    pub fn get(&self, origin: &str) -> Option<Arc<RobotsPolicy>> {
        self.entries
            .lock()
            .get(origin)
            .and_then(|slot| slot.get().cloned())
    }

    /// Number of origins seen so far
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn slot(&self, origin: &str) -> Slot {
        self.entries
            .lock()
            .entry(origin.to_string())
            .or_default()
            .clone()
    }
}
