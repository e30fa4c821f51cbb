//! Page record extraction
//!
//! Turns a fetched body plus its response metadata into a `PageRecord`.
//! Sub-steps that can fail on their own (a JSON-LD block, the peer
//! certificate) leave a warning on the record instead of failing the page.
//! The certificate needs its own handshake, so the scheduler fetches it and
//! hands the result to `record_certificate`.

use crate::config::{Capabilities, Config};
use crate::crawler::fetcher::ResponseMeta;
use crate::crawler::fingerprint::detect_technologies;
use crate::crawler::parser::parse_html;
use crate::patterns::PatternLibrary;
use crate::store::{CertificateInfo, ExtractionWarning, PageRecord};
use std::collections::BTreeMap;
use url::Url;

/// Response headers copied into the record when header capture is enabled
pub const SECURITY_HEADERS: &[&str] = &[
    "X-Frame-Options",
    "X-Content-Type-Options",
    "X-XSS-Protection",
    "Strict-Transport-Security",
    "Content-Security-Policy",
    "Referrer-Policy",
];

/// Builds page records according to the run's capability set
#[derive(Debug, Clone)]
pub struct Extractor {
    patterns: PatternLibrary,
    capabilities: Capabilities,
}

impl Extractor {
    pub fn new(patterns: PatternLibrary, capabilities: Capabilities) -> Self {
        Self {
            patterns,
            capabilities,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            PatternLibrary::for_set(config.capabilities.pattern_set),
            config.capabilities,
        )
    }

    pub fn patterns(&self) -> &PatternLibrary {
        &self.patterns
    }

    /// Extracts a record for `url` from its HTML and response metadata
    ///
    /// Relative links resolve against the post-redirect URL when known.
    pub fn extract(&self, html: &str, url: &Url, meta: &ResponseMeta) -> PageRecord {
        let base = meta.final_url.as_ref().unwrap_or(url);
        let page = parse_html(html, base);

        let mut record = PageRecord::new(url.as_str(), meta.status_code);
        record.secrets = self.patterns.scan(&page.text);
        record.technologies = detect_technologies(&page.script_srcs, &page.stylesheet_hrefs);

        for (index, block) in page.json_ld.iter().enumerate() {
            match serde_json::from_str(block) {
                Ok(value) => record.structured_data.push(value),
                Err(e) => {
                    tracing::debug!("Skipping malformed JSON-LD block {} on {}: {}", index, url, e);
                    record.extraction_warnings.push(ExtractionWarning::new(
                        "structured_data",
                        format!("block {}: {}", index, e),
                    ));
                }
            }
        }

        if self.capabilities.security_headers {
            record.security_headers = security_headers(meta);
        }

        record.title = page.title;
        record.meta_description = page.meta_description;
        record.meta_keywords = page.meta_keywords;
        record.meta_viewport = page.meta_viewport;
        record.meta_charset = page.meta_charset;
        record.meta_tags = page.meta_tags;
        record.links = page.links;
        record.images = page.images;
        record.forms = page.forms;
        record.tables = page.tables;
        record.text_content = page.text;
        record.content_type = meta.content_type.clone();
        record.content_length = meta.content_length;
        record.server = meta.server.clone();
        record.x_powered_by = meta.x_powered_by.clone();

        record
    }

    /// True when `url` should have its certificate inspected
    pub fn wants_certificate(&self, url: &Url) -> bool {
        self.capabilities.tls_inspection && url.scheme() == "https"
    }

    /// Stores a handshake result on the record; a failure becomes a warning
    pub fn record_certificate(
        &self,
        record: &mut PageRecord,
        certificate: Result<CertificateInfo, String>,
    ) {
        match certificate {
            Ok(info) => record.ssl_certificate = Some(info),
            Err(detail) => {
                tracing::debug!("No certificate for {}: {}", record.url, detail);
                record
                    .extraction_warnings
                    .push(ExtractionWarning::new("ssl_certificate", detail));
            }
        }
    }
}

fn security_headers(meta: &ResponseMeta) -> BTreeMap<String, String> {
    SECURITY_HEADERS
        .iter()
        .filter_map(|name| {
            let value = meta.headers.get(*name)?.to_str().ok()?;
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Profile;
    use reqwest::header::HeaderValue;

    const PAGE: &str = r#"<html><head>
        <title>Shop</title>
        <meta name="description" content="Buy things">
        <script src="https://cdn.example.com/react.production.min.js"></script>
        <link rel="stylesheet" href="/css/tailwind.css">
        <script type="application/ld+json">{"@type": "Store", "name": "Shop"}</script>
        <script type="application/ld+json">{ not json </script>
    </head><body>
        <p>Contact sales@shop.example or 0x1111111111111111111111111111111111111111</p>
        <a href="/cart">Cart</a>
    </body></html>"#;

    fn url() -> Url {
        Url::parse("https://shop.example/").unwrap()
    }

    fn advanced() -> Extractor {
        Extractor::from_config(&Config::for_profile(Profile::Advanced))
    }

    #[test]
    fn test_extract_full_record() {
        let record = advanced().extract(PAGE, &url(), &ResponseMeta::ok());

        assert_eq!(record.url, "https://shop.example/");
        assert_eq!(record.status_code, 200);
        assert_eq!(record.title, "Shop");
        assert_eq!(record.meta_description, "Buy things");
        assert_eq!(record.links[0].resolved.as_deref(), Some("https://shop.example/cart"));
        assert_eq!(record.technologies, vec!["React", "Tailwind CSS"]);
        assert!(record.secrets["emails"].contains("sales@shop.example"));
        assert!(record.secrets.contains_key("ethereum"));
    }

    #[test]
    fn test_malformed_json_ld_becomes_warning() {
        let record = advanced().extract(PAGE, &url(), &ResponseMeta::ok());

        assert_eq!(record.structured_data.len(), 1);
        assert_eq!(record.structured_data[0]["name"], "Shop");
        assert!(record
            .extraction_warnings
            .iter()
            .any(|w| w.stage == "structured_data"));
    }

    #[test]
    fn test_security_headers_allowlist() {
        let mut meta = ResponseMeta::ok();
        meta.headers
            .insert("x-frame-options", HeaderValue::from_static("DENY"));
        meta.headers
            .insert("set-cookie", HeaderValue::from_static("a=b"));

        let record = advanced().extract("<p>hi</p>", &url(), &meta);
        assert_eq!(record.security_headers.len(), 1);
        assert_eq!(record.security_headers["X-Frame-Options"], "DENY");
        assert_eq!(record.security_score(), 1);
    }

    #[test]
    fn test_basic_profile_skips_headers_and_certificate() {
        let basic = Extractor::from_config(&Config::for_profile(Profile::Basic));
        let mut meta = ResponseMeta::ok();
        meta.headers
            .insert("x-frame-options", HeaderValue::from_static("DENY"));

        let record = basic.extract("<p>hi</p>", &url(), &meta);
        assert!(record.security_headers.is_empty());
        assert!(record.ssl_certificate.is_none());
        assert!(record.extraction_warnings.is_empty());
    }

    #[test]
    fn test_failed_handshake_does_not_fail_page() {
        let extractor = advanced();
        let mut record = extractor.extract("<title>Still here</title>", &url(), &ResponseMeta::ok());
        extractor.record_certificate(&mut record, Err("connection refused".to_string()));

        assert_eq!(record.title, "Still here");
        assert!(record.ssl_certificate.is_none());
        assert_eq!(record.extraction_warnings.len(), 1);
        assert_eq!(record.extraction_warnings[0].stage, "ssl_certificate");
    }

    #[test]
    fn test_certificate_stored_on_record() {
        let extractor = advanced();
        let mut record = extractor.extract("<p>hi</p>", &url(), &ResponseMeta::ok());
        let info = CertificateInfo {
            issuer: "CN=Test CA".to_string(),
            subject: "CN=shop.example".to_string(),
            version: 3,
            serial_number: "01".to_string(),
            not_before: "2025-01-01T00:00:00+00:00".to_string(),
            not_after: "2045-01-01T00:00:00+00:00".to_string(),
        };
        extractor.record_certificate(&mut record, Ok(info.clone()));

        assert_eq!(record.ssl_certificate, Some(info));
        assert!(record.extraction_warnings.is_empty());
    }

    #[test]
    fn test_certificate_only_for_https_when_enabled() {
        let plain = Url::parse("http://shop.example/").unwrap();
        let basic = Extractor::from_config(&Config::for_profile(Profile::Basic));

        assert!(advanced().wants_certificate(&url()));
        assert!(!advanced().wants_certificate(&plain));
        assert!(!basic.wants_certificate(&url()));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let extractor = advanced();
        let meta = ResponseMeta::ok();

        let mut first = extractor.extract(PAGE, &url(), &meta);
        let second = extractor.extract(PAGE, &url(), &meta);
        first.timestamp = second.timestamp;

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_response_metadata_copied() {
        let mut meta = ResponseMeta::ok();
        meta.content_type = "text/html; charset=utf-8".to_string();
        meta.content_length = 42;
        meta.server = "nginx".to_string();

        let record = advanced().extract("<p>hi</p>", &url(), &meta);
        assert_eq!(record.content_type, "text/html; charset=utf-8");
        assert_eq!(record.content_length, 42);
        assert_eq!(record.server, "nginx");
        assert_eq!(record.x_powered_by, "");
    }
}
