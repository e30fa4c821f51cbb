use crate::patterns::PatternMatches;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Structured result of one successful fetch
///
/// Field order here is the field order of every export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub status_code: u16,
    pub title: String,
    pub meta_description: String,
    pub meta_keywords: String,
    pub meta_viewport: String,
    pub meta_charset: String,

    /// Every `<meta name|property=.. content=..>` pair, keyed by name
    pub meta_tags: BTreeMap<String, String>,

    pub links: Vec<LinkInfo>,
    pub images: Vec<ImageInfo>,
    pub forms: Vec<FormInfo>,

    /// One row-major grid of cell text per `<table>`
    pub tables: Vec<Vec<Vec<String>>>,

    /// Visible text, whitespace-collapsed
    pub text_content: String,

    /// Parsed JSON-LD blocks
    pub structured_data: Vec<Value>,

    pub content_type: String,

    /// Body size in bytes
    pub content_length: usize,
    pub server: String,
    pub x_powered_by: String,

    /// Allowlisted security headers present on the response
    pub security_headers: BTreeMap<String, String>,

    /// Peer certificate of the TLS session, if inspected and parseable
    pub ssl_certificate: Option<CertificateInfo>,

    pub technologies: Vec<String>,

    /// Pattern name to unique matches; names without matches are absent
    pub secrets: PatternMatches,

    /// Sub-steps that failed without failing the page
    pub extraction_warnings: Vec<ExtractionWarning>,
}

/// An `<a href>` element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkInfo {
    pub text: String,
    pub href: String,

    /// Absolute, normalized target; None for non-http(s) or unresolvable hrefs
    pub resolved: Option<String>,
    pub title: String,
    pub rel: Vec<String>,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub src: String,
    pub alt: String,
    pub title: String,
    pub width: String,
    pub height: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormInfo {
    pub action: String,
    pub method: String,
    pub enctype: String,
    pub inputs: Vec<InputInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputInfo {
    #[serde(rename = "type")]
    pub input_type: String,
    pub name: String,
    pub value: String,
    pub placeholder: String,
    pub required: bool,
}

/// Summary of an X.509 peer certificate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateInfo {
    pub issuer: String,
    pub subject: String,
    pub version: u32,
    pub serial_number: String,
    pub not_before: String,
    pub not_after: String,
}

/// A localized extraction failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionWarning {
    /// Which extraction step failed (e.g. "structured_data")
    pub stage: String,
    pub detail: String,
}

impl ExtractionWarning {
    pub fn new(stage: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            detail: detail.into(),
        }
    }
}

impl PageRecord {
    /// Creates an empty record for `url` stamped with the current time
    pub fn new(url: impl Into<String>, status_code: u16) -> Self {
        Self {
            url: url.into(),
            timestamp: Utc::now(),
            status_code,
            title: String::new(),
            meta_description: String::new(),
            meta_keywords: String::new(),
            meta_viewport: String::new(),
            meta_charset: String::new(),
            meta_tags: BTreeMap::new(),
            links: Vec::new(),
            images: Vec::new(),
            forms: Vec::new(),
            tables: Vec::new(),
            text_content: String::new(),
            structured_data: Vec::new(),
            content_type: String::new(),
            content_length: 0,
            server: String::new(),
            x_powered_by: String::new(),
            security_headers: BTreeMap::new(),
            ssl_certificate: None,
            technologies: Vec::new(),
            secrets: PatternMatches::new(),
            extraction_warnings: Vec::new(),
        }
    }

    /// Resolved link targets, in document order
    pub fn outbound_links(&self) -> impl Iterator<Item = &str> {
        self.links.iter().filter_map(|link| link.resolved.as_deref())
    }

    /// Number of pattern kinds with at least one match
    pub fn secrets_count(&self) -> usize {
        self.secrets.len()
    }

    /// Number of captured security headers
    pub fn security_score(&self) -> usize {
        self.security_headers.len()
    }
}
