//! HTTP session construction
//!
//! Custom headers are merged into the session defaults once, when the
//! clients are built. With proxies configured one client is built per
//! proxy so that connection pools are never shared across exits.

use crate::config::Config;
use crate::ConfigError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Proxy};
use std::time::Duration;

/// Connect timeout applied below the overall request timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds the session-wide default header set from the configuration
pub fn session_headers(config: &Config) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::new();

    for (name, value) in &config.politeness.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ConfigError::InvalidHeader(format!("invalid header name '{}'", name)))?;
        let value = HeaderValue::from_str(value).map_err(|_| {
            ConfigError::InvalidHeader(format!("invalid value for header '{}'", name))
        })?;
        headers.insert(name, value);
    }

    Ok(headers)
}

/// Builds one HTTP client, optionally routed through a proxy
///
/// # Example
///
/// ```
/// use netr::config::Config;
/// use netr::politeness::build_http_client;
///
/// let client = build_http_client(&Config::default(), None).unwrap();
/// ```
pub fn build_http_client(config: &Config, proxy: Option<&str>) -> crate::Result<Client> {
    let connect_timeout = CONNECT_TIMEOUT.min(config.crawler.timeout());

    let mut builder = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(session_headers(config)?)
        .timeout(config.crawler.timeout())
        .connect_timeout(connect_timeout)
        .gzip(true)
        .brotli(true);

    if let Some(proxy) = proxy {
        let proxy = Proxy::all(proxy)
            .map_err(|e| ConfigError::InvalidProxy(format!("'{}': {}", proxy, e)))?;
        builder = builder.proxy(proxy);
    }

    Ok(builder.build()?)
}

/// Builds the direct client and one client per configured proxy
pub fn build_client_pool(config: &Config) -> crate::Result<(Client, Vec<Client>)> {
    let direct = build_http_client(config, None)?;

    let proxied = if config.capabilities.proxy_rotation {
        config
            .politeness
            .proxies
            .iter()
            .map(|proxy| build_http_client(config, Some(proxy)))
            .collect::<crate::Result<Vec<_>>>()?
    } else {
        Vec::new()
    };

    Ok((direct, proxied))
}
