//! Configuration module for Netr
//!
//! A run's configuration starts from a profile's defaults, is overlaid with
//! an optional TOML file, then with command-line flags, and is validated
//! once before the crawl starts. It is read-only afterwards.
//!
//! # Example
//!
//! ```no_run
//! use netr::config::{load_config_file, validate, Config, Profile};
//! use std::path::Path;
//!
//! let mut config = Config::for_profile(Profile::Advanced);
//! load_config_file(Path::new("netr.toml")).unwrap().apply(&mut config);
//! validate(&config).unwrap();
//! println!("Crawler will use {} workers", config.crawler.max_threads);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    merge_headers, Capabilities, Config, ConfigFile, CrawlerConfig, ExportFormat, OutputConfig,
    PacingScope, PatternSet, PolitenessConfig, Profile, MAX_DELAY_SECS,
};

// Re-export parser and validation functions
pub use parser::{compute_config_hash, load_config_file, load_config_with_hash, parse_header_list};
pub use validation::{validate, validate_seed};
