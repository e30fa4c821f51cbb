use crate::config::types::ConfigFile;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration overlay from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(ConfigFile)` - Successfully parsed overlay
/// * `Err(ConfigError)` - Failed to read or parse the file
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use netr::config::{load_config_file, Config};
///
/// let mut config = Config::default();
/// load_config_file(Path::new("netr.toml")).unwrap().apply(&mut config);
/// println!("Max depth: {}", config.crawler.max_depth);
/// ```
pub fn load_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let file: ConfigFile = toml::from_str(&content)?;
    Ok(file)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so a run can be tied to the exact file it used.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration overlay and returns it with its hash
pub fn load_config_with_hash(path: &Path) -> Result<(ConfigFile, String), ConfigError> {
    let file = load_config_file(path)?;
    let hash = compute_config_hash(path)?;
    Ok((file, hash))
}

/// Parses a `key1:value1,key2:value2` header list
///
/// Items without a `:` are ignored; names and values are trimmed.
///
/// ```
/// use netr::config::parse_header_list;
///
/// let headers = parse_header_list("X-Api: 1, Cookie:a=b:c,broken");
/// assert_eq!(headers, vec![
///     ("X-Api".to_string(), "1".to_string()),
///     ("Cookie".to_string(), "a=b:c".to_string()),
/// ]);
/// ```
pub fn parse_header_list(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .filter_map(|item| item.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .filter(|(name, _)| !name.is_empty())
        .collect()
}
