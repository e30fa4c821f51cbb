//! Pattern library: named regular-expression detectors applied to page text
//!
//! Two built-in sets exist. The basic set covers contact details and
//! cryptocurrency addresses; the extended set adds identifiers, network
//! artifacts and credential-shaped tokens. A library can be grown with
//! extra detectors without touching the extractor.
//!
//! Every detector reports its whole match, never a capture group.

use crate::config::PatternSet;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

/// Matches found on one page, keyed by detector name
///
/// Detectors without a match have no entry.
pub type PatternMatches = BTreeMap<String, BTreeSet<String>>;

/// A named regular expression
#[derive(Debug, Clone)]
pub struct Detector {
    pub name: String,
    pub regex: Regex,
}

impl Detector {
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            regex: Regex::new(pattern)?,
        })
    }
}

const EMAILS: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b";
const PHONES: &str = r"(\+\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}";
const URLS: &str =
    r"https?://(?:[-\w.])+(?:[:\d]+)?(?:/(?:[\w/_.])*(?:\?(?:[\w&=%.])*)?(?:#(?:[\w.])*)?)?";
const SOCIAL_MEDIA: &str = r#"(?:facebook\.com|twitter\.com|linkedin\.com|instagram\.com|youtube\.com)/[^\s<>"']+"#;
const SOCIAL_MEDIA_EXTENDED: &str = r#"(?:facebook\.com|twitter\.com|linkedin\.com|instagram\.com|youtube\.com|tiktok\.com|snapchat\.com)/[^\s<>"']+"#;
const BITCOIN: &str = r"[13][a-km-zA-HJ-NP-Z1-9]{25,34}";
const ETHEREUM: &str = r"0x[a-fA-F0-9]{40}";

const CREDIT_CARDS: &str = r"\b\d{4}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{4}\b";
const SSN: &str = r"\b\d{3}-\d{2}-\d{4}\b";
const IP_ADDRESSES: &str = r"\b(?:\d{1,3}\.){3}\d{1,3}\b";
const MAC_ADDRESSES: &str = r"\b(?:[0-9A-Fa-f]{2}[:-]){5}[0-9A-Fa-f]{2}\b";
const FILE_PATHS: &str = r#"[A-Za-z]:\\(?:[^\\/:*?"<>|\r\n]+\\)*[^\\/:*?"<>|\r\n]*"#;
const API_KEYS: &str = r"[a-zA-Z0-9]{32,}";
const JWT_TOKENS: &str = r"eyJ[A-Za-z0-9_=-]+\.[A-Za-z0-9_=-]+\.?[A-Za-z0-9_.+/=-]*";
const AWS_KEYS: &str = r"AKIA[0-9A-Z]{16}";
const GOOGLE_KEYS: &str = r"AIza[0-9A-Za-z_-]{35}";
const GITHUB_TOKENS: &str = r"ghp_[a-zA-Z0-9]{36}";

fn build(table: &[(&str, &str)]) -> Vec<Detector> {
    table
        .iter()
        .map(|(name, pattern)| {
            Detector::new(*name, pattern).expect("hardcoded detector pattern is valid")
        })
        .collect()
}

static BASIC: Lazy<Vec<Detector>> = Lazy::new(|| {
    build(&[
        ("emails", EMAILS),
        ("phones", PHONES),
        ("urls", URLS),
        ("social_media", SOCIAL_MEDIA),
        ("bitcoin", BITCOIN),
        ("ethereum", ETHEREUM),
    ])
});

static EXTENDED: Lazy<Vec<Detector>> = Lazy::new(|| {
    build(&[
        ("emails", EMAILS),
        ("phones", PHONES),
        ("urls", URLS),
        ("social_media", SOCIAL_MEDIA_EXTENDED),
        ("bitcoin", BITCOIN),
        ("ethereum", ETHEREUM),
        ("credit_cards", CREDIT_CARDS),
        ("ssn", SSN),
        ("ip_addresses", IP_ADDRESSES),
        ("mac_addresses", MAC_ADDRESSES),
        ("file_paths", FILE_PATHS),
        ("api_keys", API_KEYS),
        ("jwt_tokens", JWT_TOKENS),
        ("aws_keys", AWS_KEYS),
        ("google_keys", GOOGLE_KEYS),
        ("github_tokens", GITHUB_TOKENS),
    ])
});

/// An ordered collection of detectors
#[derive(Debug, Clone)]
pub struct PatternLibrary {
    detectors: Vec<Detector>,
}

impl PatternLibrary {
    /// Builds the library for a configured pattern set
    pub fn for_set(set: PatternSet) -> Self {
        match set {
            PatternSet::Basic => Self::basic(),
            PatternSet::Extended => Self::extended(),
        }
    }

    pub fn basic() -> Self {
        Self {
            detectors: BASIC.clone(),
        }
    }

    pub fn extended() -> Self {
        Self {
            detectors: EXTENDED.clone(),
        }
    }

    /// Adds a detector, replacing any existing one with the same name
    pub fn with_detector(mut self, detector: Detector) -> Self {
        self.detectors.retain(|d| d.name != detector.name);
        self.detectors.push(detector);
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.detectors.iter().map(|d| d.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Runs every detector over `text`
    ///
    /// ```
    /// use netr::patterns::PatternLibrary;
    ///
    /// let found = PatternLibrary::basic().scan("write to ops@example.org");
    /// assert!(found["emails"].contains("ops@example.org"));
    /// assert!(!found.contains_key("bitcoin"));
    /// ```
    pub fn scan(&self, text: &str) -> PatternMatches {
        let mut matches = PatternMatches::new();

        for detector in &self.detectors {
            let found: BTreeSet<String> = detector
                .regex
                .find_iter(text)
                .map(|m| m.as_str().to_string())
                .collect();

            if !found.is_empty() {
                matches.insert(detector.name.clone(), found);
            }
        }

        matches
    }
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::basic()
    }
}
