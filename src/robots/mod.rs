//! Robots.txt handling module
//!
//! robots.txt is fetched at most once per origin per run, parsed, and
//! cached. A robots file that cannot be retrieved does not block crawling.

mod cache;
mod parser;

pub use cache::RobotsCache;
pub use parser::ParsedRobots;

use crate::url::robots_url;
use reqwest::Client;
use tracing::debug;
use url::Url;

/// What is known about an origin's robots.txt
#[derive(Debug, Clone)]
pub enum RobotsPolicy {
    /// robots.txt was fetched with a 2xx status and parsed
    Rules(ParsedRobots),
    /// robots.txt was missing, errored, or unreadable; everything is allowed
    Unavailable,
}

impl RobotsPolicy {
    /// Checks if a URL may be fetched by the given user agent token
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        match self {
            Self::Rules(robots) => robots.is_allowed(url, user_agent),
            Self::Unavailable => true,
        }
    }

    /// Crawl delay in seconds requested for the given user agent token
    pub fn crawl_delay(&self, user_agent: &str) -> Option<f64> {
        match self {
            Self::Rules(robots) => robots.crawl_delay(user_agent),
            Self::Unavailable => None,
        }
    }
}

/// Fetches robots.txt for the origin of `page_url`
///
/// Any status other than 2xx, a network error, or a body that cannot be
/// read yields `RobotsPolicy::Unavailable`.
pub async fn fetch_robots(client: &Client, page_url: &Url) -> RobotsPolicy {
    let Some(robots) = robots_url(page_url) else {
        return RobotsPolicy::Unavailable;
    };

    let response = match client.get(robots.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            debug!("robots.txt fetch failed for {}: {}", robots, e);
            return RobotsPolicy::Unavailable;
        }
    };

    if !response.status().is_success() {
        debug!(
            "robots.txt for {} returned {}, allowing all",
            robots,
            response.status()
        );
        return RobotsPolicy::Unavailable;
    }

    match response.text().await {
        Ok(body) => {
            debug!("Parsed robots.txt for {} ({} bytes)", robots, body.len());
            RobotsPolicy::Rules(ParsedRobots::from_content(&body))
        }
        Err(e) => {
            debug!("robots.txt body unreadable for {}: {}", robots, e);
            RobotsPolicy::Unavailable
        }
    }
}
