//! Technology fingerprinting from script and stylesheet URLs
//!
//! Substring heuristics only; a hit means "probably uses", nothing more.

/// Substring in a script `src` and the technology it signals
const SCRIPT_SIGNATURES: &[(&str, &str)] = &[
    ("jquery", "jQuery"),
    ("react", "React"),
    ("angular", "Angular"),
    ("vue", "Vue.js"),
];

/// Substring in a stylesheet `href` and the technology it signals
const STYLESHEET_SIGNATURES: &[(&str, &str)] =
    &[("bootstrap", "Bootstrap"), ("tailwind", "Tailwind CSS")];

/// Detects technologies from script sources and stylesheet hrefs
///
/// Each technology is reported once, in order of first detection.
///
/// ```
/// use netr::crawler::detect_technologies;
///
/// let found = detect_technologies(
///     &["/static/jquery-3.7.min.js".to_string()],
///     &["https://cdn.example.com/bootstrap.css".to_string()],
/// );
/// assert_eq!(found, vec!["jQuery", "Bootstrap"]);
/// ```
pub fn detect_technologies(script_srcs: &[String], stylesheet_hrefs: &[String]) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    scan(&mut found, script_srcs, SCRIPT_SIGNATURES);
    scan(&mut found, stylesheet_hrefs, STYLESHEET_SIGNATURES);
    found
}

fn scan(found: &mut Vec<String>, sources: &[String], signatures: &[(&str, &str)]) {
    for source in sources {
        let source = source.to_lowercase();
        for (needle, name) in signatures {
            if source.contains(*needle) && !found.iter().any(|f| f == *name) {
                found.push(name.to_string());
            }
        }
    }
}
