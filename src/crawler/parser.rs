//! HTML parser for extracting page structure
//!
//! The document is walked once, depth-first in document order. Each element
//! kind of interest is captured as it is met; text nodes outside `script`,
//! `style`, `noscript` and `template` make up the visible text.

use crate::store::{FormInfo, ImageInfo, InputInfo, LinkInfo};
use crate::url::resolve_link;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::BTreeMap;
use url::Url;

static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("hardcoded selector is valid"));
static CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td, th").expect("hardcoded selector is valid"));
static INPUT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("input").expect("hardcoded selector is valid"));

/// Elements whose text is never visible
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Structure extracted from an HTML page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPage {
    /// Text of the first `<title>`
    pub title: String,
    pub meta_description: String,
    pub meta_keywords: String,
    pub meta_viewport: String,
    pub meta_charset: String,

    /// `<meta name|property=.. content=..>` pairs
    pub meta_tags: BTreeMap<String, String>,

    pub links: Vec<LinkInfo>,
    pub images: Vec<ImageInfo>,
    pub forms: Vec<FormInfo>,
    pub tables: Vec<Vec<Vec<String>>>,

    /// Visible text, whitespace-collapsed
    pub text: String,

    /// Raw bodies of `<script type="application/ld+json">`
    pub json_ld: Vec<String>,

    /// `src` of every `<script src>`
    pub script_srcs: Vec<String>,

    /// `href` of every `<link rel="stylesheet">`
    pub stylesheet_hrefs: Vec<String>,
}

/// Parses HTML content and extracts its structure
///
/// Malformed markup never fails: the HTML5 parser recovers the same way a
/// browser would.
///
/// # Example
///
/// ```
/// use netr::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title, "Test");
/// assert_eq!(parsed.links[0].resolved.as_deref(), Some("https://example.com/page"));
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);
    let mut page = ParsedPage::default();
    let mut text_parts: Vec<&str> = Vec::new();
    let mut seen_title = false;

    let mut stack = vec![(document.tree.root(), false)];

    while let Some((node, hidden)) = stack.pop() {
        let mut child_hidden = hidden;

        match node.value() {
            Node::Text(text) => {
                if !hidden {
                    text_parts.push(text);
                }
            }
            Node::Element(element) => {
                let name = element.name();
                child_hidden = hidden || HIDDEN_ELEMENTS.contains(&name);

                if let Some(element) = ElementRef::wrap(node) {
                    match name {
                        "title" if !seen_title => {
                            seen_title = true;
                            page.title = collapse_whitespace(&element.text().collect::<String>());
                        }
                        "meta" => capture_meta(&mut page, element),
                        "a" => {
                            if let Some(link) = capture_link(element, base_url) {
                                page.links.push(link);
                            }
                        }
                        "img" => page.images.push(capture_image(element)),
                        "form" => page.forms.push(capture_form(element)),
                        "table" => page.tables.push(capture_table(element)),
                        "script" => capture_script(&mut page, element),
                        "link" => capture_stylesheet(&mut page, element),
                        _ => {}
                    }
                }
            }
            _ => {}
        }

        // Reverse so children pop in document order
        for child in node.children().rev() {
            stack.push((child, child_hidden));
        }
    }

    page.text = collapse_whitespace(&text_parts.join(" "));
    page
}

/// Collapses runs of whitespace into single spaces and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn attr(element: &ElementRef<'_>, name: &str) -> String {
    element.value().attr(name).unwrap_or_default().to_string()
}

fn element_text(element: &ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

fn capture_meta(page: &mut ParsedPage, element: ElementRef<'_>) {
    if let Some(charset) = element.value().attr("charset") {
        page.meta_charset = charset.trim().to_string();
    }

    let key = element
        .value()
        .attr("name")
        .or_else(|| element.value().attr("property"));
    let (Some(key), Some(content)) = (key, element.value().attr("content")) else {
        return;
    };

    let key = key.trim().to_lowercase();
    match key.as_str() {
        "description" => page.meta_description = content.to_string(),
        "keywords" => page.meta_keywords = content.to_string(),
        "viewport" => page.meta_viewport = content.to_string(),
        _ => {}
    }
    page.meta_tags.insert(key, content.to_string());
}

fn capture_link(element: ElementRef<'_>, base_url: &Url) -> Option<LinkInfo> {
    let href = element.value().attr("href")?;

    Some(LinkInfo {
        text: element_text(&element),
        href: href.to_string(),
        resolved: resolve_link(href, base_url).map(String::from),
        title: attr(&element, "title"),
        rel: element
            .value()
            .attr("rel")
            .map(|rel| rel.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default(),
        target: attr(&element, "target"),
    })
}

fn capture_image(element: ElementRef<'_>) -> ImageInfo {
    ImageInfo {
        src: attr(&element, "src"),
        alt: attr(&element, "alt"),
        title: attr(&element, "title"),
        width: attr(&element, "width"),
        height: attr(&element, "height"),
    }
}

fn capture_form(element: ElementRef<'_>) -> FormInfo {
    let inputs = element
        .select(&INPUT_SELECTOR)
        .map(|input| InputInfo {
            input_type: attr(&input, "type"),
            name: attr(&input, "name"),
            value: attr(&input, "value"),
            placeholder: attr(&input, "placeholder"),
            required: input.value().attr("required").is_some(),
        })
        .collect();

    FormInfo {
        action: attr(&element, "action"),
        method: attr(&element, "method"),
        enctype: attr(&element, "enctype"),
        inputs,
    }
}

fn capture_table(element: ElementRef<'_>) -> Vec<Vec<String>> {
    element
        .select(&ROW_SELECTOR)
        .map(|row| {
            row.select(&CELL_SELECTOR)
                .map(|cell| element_text(&cell))
                .collect::<Vec<_>>()
        })
        .filter(|row| !row.is_empty())
        .collect()
}

fn capture_script(page: &mut ParsedPage, element: ElementRef<'_>) {
    if let Some(src) = element.value().attr("src") {
        page.script_srcs.push(src.to_string());
    }

    let is_json_ld = element
        .value()
        .attr("type")
        .is_some_and(|t| t.trim().eq_ignore_ascii_case("application/ld+json"));
    if is_json_ld {
        page.json_ld.push(element.text().collect());
    }
}

fn capture_stylesheet(page: &mut ParsedPage, element: ElementRef<'_>) {
    let is_stylesheet = element
        .value()
        .attr("rel")
        .is_some_and(|rel| {
            rel.split_whitespace()
                .any(|r| r.eq_ignore_ascii_case("stylesheet"))
        });

    if let (true, Some(href)) = (is_stylesheet, element.value().attr("href")) {
        page.stylesheet_hrefs.push(href.to_string());
    }
}
