//! Politeness controller
//!
//! Everything that stands between a dispatched task and its HTTP request:
//! robots.txt permission, dispatch pacing, and the choice of client
//! (direct or one of the configured proxies).

mod clients;
mod pacer;

pub use clients::{build_client_pool, build_http_client, session_headers};
pub use pacer::Pacer;

use crate::config::Config;
use crate::robots::RobotsCache;
use crate::url::origin_of;
use rand::seq::SliceRandom;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Upper bound on a robots.txt Crawl-delay honoured by the pacer
const MAX_CRAWL_DELAY_SECS: f64 = 60.0;

/// Gatekeeper applied before every fetch
pub struct PolitenessController {
    respect_robots: bool,
    agent: String,
    robots: RobotsCache,
    pacer: Pacer,
    direct: Client,
    proxied: Vec<Client>,
}

impl PolitenessController {
    /// Builds the controller and its HTTP clients from the run configuration
    pub fn new(config: &Config) -> crate::Result<Self> {
        let (direct, proxied) = build_client_pool(config)?;
        Ok(Self::with_clients(config, direct, proxied))
    }

    /// Builds the controller around already constructed clients
    pub fn with_clients(config: &Config, direct: Client, proxied: Vec<Client>) -> Self {
        Self {
            respect_robots: config.politeness.respect_robots,
            agent: config.robots_agent().to_string(),
            robots: RobotsCache::new(),
            pacer: Pacer::new(config.crawler.pacing, config.crawler.delay()),
            direct,
            proxied,
        }
    }

    /// Checks robots.txt for `url`, fetching the origin's policy on first use
    ///
    /// Always true when robots.txt is not respected.
    pub async fn can_fetch(&self, url: &Url) -> bool {
        if !self.respect_robots {
            return true;
        }

        let policy = self.robots.policy_for(self.select_client(), url).await;
        let allowed = policy.is_allowed(url.as_str(), &self.agent);
        if !allowed {
            debug!("robots.txt disallows {} for {}", url, self.agent);
        }
        allowed
    }

    /// Waits for this task's dispatch slot
    pub async fn pace(&self, url: &Url) {
        let origin = origin_of(url);
        let crawl_delay = self.crawl_delay(&origin);
        self.pacer.wait(&origin, crawl_delay).await;
    }

    /// Picks the client for the next request
    ///
    /// Uniformly random over the proxy pool; the direct client when no
    /// proxy is configured.
    pub fn select_client(&self) -> &Client {
        self.proxied
            .choose(&mut rand::thread_rng())
            .unwrap_or(&self.direct)
    }

    pub fn robots(&self) -> &RobotsCache {
        &self.robots
    }

    pub fn pacer(&self) -> &Pacer {
        &self.pacer
    }

    pub fn proxy_count(&self) -> usize {
        self.proxied.len()
    }

    fn crawl_delay(&self, origin: &str) -> Option<Duration> {
        if !self.respect_robots {
            return None;
        }

        self.robots
            .get(origin)
            .and_then(|policy| policy.crawl_delay(&self.agent))
            .map(|secs| Duration::from_secs_f64(secs.min(MAX_CRAWL_DELAY_SECS)))
    }
}
