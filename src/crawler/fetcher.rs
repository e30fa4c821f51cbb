//! HTTP fetcher implementation
//!
//! One GET per task, no retries. Anything but HTTP 200 is a failure, as is
//! a timeout or connection error. The client's own timeout bounds every
//! request, so a slow server never stalls a worker indefinitely.

use crate::NetrError;
use reqwest::header::{HeaderMap, CONTENT_TYPE, SERVER};
use reqwest::{Client, StatusCode};
use url::Url;

/// Response properties the extractor copies into a record
#[derive(Debug, Clone, Default)]
pub struct ResponseMeta {
    pub status_code: u16,

    /// URL after redirects, used as the base for relative links
    pub final_url: Option<Url>,
    pub content_type: String,

    /// Body size in bytes
    pub content_length: usize,
    pub server: String,
    pub x_powered_by: String,
    pub headers: HeaderMap,
}

impl ResponseMeta {
    /// Metadata for a plain 200 response without headers
    pub fn ok() -> Self {
        Self {
            status_code: 200,
            ..Self::default()
        }
    }
}

/// A successfully fetched page
#[derive(Debug)]
pub struct FetchedPage {
    pub meta: ResponseMeta,
    pub body: String,
}

/// Fetches `url` with the given client
///
/// # Errors
///
/// * `NetrError::Timeout` - the request or body read exceeded the client timeout
/// * `NetrError::Http` - connection, TLS, or protocol error
/// * `NetrError::HttpStatus` - any status other than 200
pub async fn fetch_page(client: &Client, url: &Url) -> Result<FetchedPage, NetrError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(NetrError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let final_url = response.url().clone();
    let headers = response.headers().clone();

    let bytes = response
        .bytes()
        .await
        .map_err(|e| classify_error(url, e))?;

    let meta = ResponseMeta {
        status_code: status.as_u16(),
        final_url: Some(final_url),
        content_type: header_str(&headers, CONTENT_TYPE.as_str()),
        content_length: bytes.len(),
        server: header_str(&headers, SERVER.as_str()),
        x_powered_by: header_str(&headers, "x-powered-by"),
        headers,
    };

    Ok(FetchedPage {
        meta,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

fn classify_error(url: &Url, error: reqwest::Error) -> NetrError {
    if error.is_timeout() {
        NetrError::Timeout {
            url: url.to_string(),
        }
    } else {
        NetrError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
