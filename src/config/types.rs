use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Which of the two crawler variants supplies the defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Profile {
    #[default]
    Basic,
    Advanced,
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "advanced" => Ok(Self::Advanced),
            other => Err(format!("unknown profile '{}'", other)),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic => write!(f, "basic"),
            Self::Advanced => write!(f, "advanced"),
        }
    }
}

/// Output encoding for the exported corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
    Sqlite,
}

impl ExportFormat {
    /// File extension written for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Sqlite => "db",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(format!("unknown export format '{}'", other)),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Scope of the dispatch pacer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PacingScope {
    /// One slot sequence shared by every dispatch, regardless of host
    #[default]
    Global,
    /// Independent slot sequence per origin
    PerOrigin,
}

impl FromStr for PacingScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "global" => Ok(Self::Global),
            "per-origin" | "per_origin" => Ok(Self::PerOrigin),
            other => Err(format!("unknown pacing scope '{}'", other)),
        }
    }
}

/// Size of the pattern library applied to page text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PatternSet {
    /// Contact and payment detectors
    #[default]
    Basic,
    /// Basic detectors plus identifiers, network artifacts and credentials
    Extended,
}

/// Main configuration structure for a crawl run
#[derive(Debug, Clone)]
pub struct Config {
    pub profile: Profile,
    pub crawler: CrawlerConfig,
    pub user_agent: String,
    pub politeness: PolitenessConfig,
    pub output: OutputConfig,
    pub capabilities: Capabilities,
}

/// Crawler behavior configuration
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Worker pool size
    pub max_threads: usize,

    /// Seconds between dispatches
    pub delay_secs: f64,

    /// Maximum link depth from the seed (seed is depth 0)
    pub max_depth: u32,

    /// Maximum number of URLs admitted to the frontier
    pub max_pages: usize,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Scope of the dispatch pacer
    pub pacing: PacingScope,
}

/// Longest accepted dispatch delay, in seconds
pub const MAX_DELAY_SECS: f64 = 3600.0;

impl CrawlerConfig {
    /// Dispatch delay, clamped to `0..=MAX_DELAY_SECS`
    pub fn delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay_secs.clamp(0.0, MAX_DELAY_SECS))
            .unwrap_or_default()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Robots, proxy and header settings
#[derive(Debug, Clone, Default)]
pub struct PolitenessConfig {
    /// Honour robots.txt rules
    pub respect_robots: bool,

    /// Proxy URLs, one chosen at random per request
    pub proxies: Vec<String>,

    /// Headers merged into the session defaults at startup
    pub headers: Vec<(String, String)>,
}

/// Output configuration
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: ExportFormat,

    /// Output path without extension
    pub stem: String,
}

/// Optional extraction and transport features
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub pattern_set: PatternSet,
    pub tls_inspection: bool,
    pub proxy_rotation: bool,
    pub security_headers: bool,
}

impl Config {
    /// Builds the default configuration of a profile
    pub fn for_profile(profile: Profile) -> Self {
        match profile {
            Profile::Basic => Self {
                profile,
                crawler: CrawlerConfig {
                    max_threads: 50,
                    delay_secs: 0.1,
                    max_depth: 5,
                    max_pages: 1000,
                    timeout_secs: 10,
                    pacing: PacingScope::Global,
                },
                user_agent: "Netr-Crawler/2.0 (Advanced Web Intelligence Tool)".to_string(),
                politeness: PolitenessConfig {
                    respect_robots: true,
                    proxies: Vec::new(),
                    headers: Vec::new(),
                },
                output: OutputConfig {
                    format: ExportFormat::Json,
                    stem: "netr_results".to_string(),
                },
                capabilities: Capabilities {
                    pattern_set: PatternSet::Basic,
                    tls_inspection: false,
                    proxy_rotation: false,
                    security_headers: false,
                },
            },
            Profile::Advanced => Self {
                profile,
                crawler: CrawlerConfig {
                    max_threads: 100,
                    delay_secs: 0.05,
                    max_depth: 10,
                    max_pages: 10000,
                    timeout_secs: 15,
                    pacing: PacingScope::Global,
                },
                user_agent: "Netr-Crawler/3.0 (Ultimate Web Intelligence Tool)".to_string(),
                politeness: PolitenessConfig {
                    respect_robots: true,
                    proxies: Vec::new(),
                    headers: vec![
                        (
                            "Accept".to_string(),
                            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
                                .to_string(),
                        ),
                        ("Accept-Language".to_string(), "en-US,en;q=0.5".to_string()),
                        ("Upgrade-Insecure-Requests".to_string(), "1".to_string()),
                    ],
                },
                output: OutputConfig {
                    format: ExportFormat::Json,
                    stem: "netr_advanced_results".to_string(),
                },
                capabilities: Capabilities {
                    pattern_set: PatternSet::Extended,
                    tls_inspection: true,
                    proxy_rotation: true,
                    security_headers: true,
                },
            },
        }
    }

    /// Product token used when matching robots.txt groups
    ///
    /// ```
    /// use netr::config::{Config, Profile};
    ///
    /// let config = Config::for_profile(Profile::Basic);
    /// assert_eq!(config.robots_agent(), "Netr-Crawler");
    /// ```
    pub fn robots_agent(&self) -> &str {
        self.user_agent
            .split('/')
            .next()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .unwrap_or("*")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::for_profile(Profile::Basic)
    }
}

/// Partial configuration read from a TOML file
///
/// Every field is optional; present fields override the profile defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigFile {
    pub profile: Option<Profile>,
    #[serde(default)]
    pub crawler: CrawlerSection,
    #[serde(default)]
    pub politeness: PolitenessSection,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub capabilities: CapabilitiesSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct CrawlerSection {
    pub threads: Option<usize>,
    pub delay: Option<f64>,
    pub max_depth: Option<u32>,
    pub max_pages: Option<usize>,
    pub timeout: Option<u64>,
    pub pacing: Option<PacingScope>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PolitenessSection {
    pub respect_robots: Option<bool>,
    #[serde(default)]
    pub proxies: Vec<String>,
    #[serde(default)]
    pub headers: Vec<HeaderEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderEntry {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct OutputSection {
    pub format: Option<ExportFormat>,
    pub stem: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct CapabilitiesSection {
    pub pattern_set: Option<PatternSet>,
    pub tls_inspection: Option<bool>,
    pub proxy_rotation: Option<bool>,
    pub security_headers: Option<bool>,
}

impl ConfigFile {
    /// Applies the file's settings on top of `config`
    pub fn apply(self, config: &mut Config) {
        let crawler = self.crawler;
        if let Some(threads) = crawler.threads {
            config.crawler.max_threads = threads;
        }
        if let Some(delay) = crawler.delay {
            config.crawler.delay_secs = delay;
        }
        if let Some(depth) = crawler.max_depth {
            config.crawler.max_depth = depth;
        }
        if let Some(pages) = crawler.max_pages {
            config.crawler.max_pages = pages;
        }
        if let Some(timeout) = crawler.timeout {
            config.crawler.timeout_secs = timeout;
        }
        if let Some(pacing) = crawler.pacing {
            config.crawler.pacing = pacing;
        }
        if let Some(agent) = crawler.user_agent {
            config.user_agent = agent;
        }

        let politeness = self.politeness;
        if let Some(respect) = politeness.respect_robots {
            config.politeness.respect_robots = respect;
        }
        config.politeness.proxies.extend(politeness.proxies);
        merge_headers(
            &mut config.politeness.headers,
            politeness
                .headers
                .into_iter()
                .map(|entry| (entry.name, entry.value)),
        );

        if let Some(format) = self.output.format {
            config.output.format = format;
        }
        if let Some(stem) = self.output.stem {
            config.output.stem = stem;
        }

        let caps = self.capabilities;
        if let Some(set) = caps.pattern_set {
            config.capabilities.pattern_set = set;
        }
        if let Some(tls) = caps.tls_inspection {
            config.capabilities.tls_inspection = tls;
        }
        if let Some(rotation) = caps.proxy_rotation {
            config.capabilities.proxy_rotation = rotation;
        }
        if let Some(headers) = caps.security_headers {
            config.capabilities.security_headers = headers;
        }
    }
}

/// Merges header pairs into `target`, replacing entries with the same
/// (case-insensitive) name
pub fn merge_headers(
    target: &mut Vec<(String, String)>,
    headers: impl IntoIterator<Item = (String, String)>,
) {
    for (name, value) in headers {
        match target
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => target.push((name, value)),
        }
    }
}
