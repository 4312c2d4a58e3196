//! HTML parser for page records
//!
//! This module handles parsing HTML content to extract:
//! - Title, meta description and meta keywords
//! - Visible body text (scripts and styles excluded)
//! - Headings h1 through h6
//! - Anchors with their text, `[src]` references and images

use crate::records::{Headings, ImageRef};
use scraper::{Html, Node, Selector};
use url::Url;

/// An `<a href>` found on a page
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    /// Absolute URL with the fragment removed
    pub url: Url,
    /// Anchor text, whitespace collapsed
    pub text: String,
}

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// The page title (from the `<title>` tag), empty when absent
    pub title: String,

    /// Visible body text, text nodes joined by single spaces
    pub text: String,

    pub meta_description: String,
    pub meta_keywords: String,
    pub headings: Headings,

    /// All anchors with a usable href, in document order
    pub anchors: Vec<Anchor>,

    /// Targets of every element with a `src` attribute (images, scripts,
    /// iframes, embeds), in document order
    pub resources: Vec<Url>,

    pub images: Vec<ImageRef>,
}

/// Parses HTML content into the parts a page record is built from
///
/// # Link Extraction Rules
///
/// **Skipped:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links (same-page anchors)
/// - Anything that does not resolve to HTTP(S)
///
/// Fragments are removed from every resolved URL.
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The URL the page was served from, for relative links
///
/// # Example
///
/// ```
/// use webharvest::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page#top">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title, "Test");
/// assert_eq!(parsed.anchors[0].url.as_str(), "https://example.com/page");
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        text: extract_body_text(&document),
        meta_description: extract_meta(&document, "description"),
        meta_keywords: extract_meta(&document, "keywords"),
        headings: extract_headings(&document),
        anchors: extract_anchors(&document, base_url),
        resources: extract_resources(&document, base_url),
        images: extract_images(&document, base_url),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> String {
    Selector::parse("title")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .map(|element| element.text().collect::<String>().trim().to_string())
        })
        .unwrap_or_default()
}

/// Collects trimmed body text nodes outside `script` and `style`
///
/// Walks the tree with an explicit stack; nesting depth is bounded only by
/// the parser.
fn extract_body_text(document: &Html) -> String {
    let mut parts = Vec::new();
    let Ok(selector) = Selector::parse("body") else {
        return String::new();
    };

    for body in document.select(&selector) {
        let mut stack: Vec<_> = body.children().collect();
        stack.reverse();

        while let Some(node) = stack.pop() {
            match node.value() {
                Node::Text(text) => {
                    let text = text.trim();
                    if !text.is_empty() {
                        parts.push(text.to_string());
                    }
                }
                Node::Element(el) if el.name() == "script" || el.name() == "style" => {}
                Node::Element(_) => {
                    let start = stack.len();
                    stack.extend(node.children());
                    stack[start..].reverse();
                }
                _ => {}
            }
        }
    }

    parts.join(" ")
}

/// Returns the `content` of `<meta name="...">`, empty when absent
fn extract_meta(document: &Html, name: &str) -> String {
    Selector::parse(&format!("meta[name=\"{}\"]", name))
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .find_map(|element| element.value().attr("content"))
                .map(|content| content.trim().to_string())
        })
        .unwrap_or_default()
}

fn extract_headings(document: &Html) -> Headings {
    let mut headings = Headings::default();

    for level in 1..=6u8 {
        let Ok(selector) = Selector::parse(&format!("h{}", level)) else {
            continue;
        };
        if let Some(texts) = headings.level_mut(level) {
            texts.extend(
                document
                    .select(&selector)
                    .map(|element| collapse_whitespace(&element.text().collect::<String>()))
                    .filter(|text| !text.is_empty()),
            );
        }
    }

    headings
}

fn extract_anchors(document: &Html, base_url: &Url) -> Vec<Anchor> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| {
            let url = resolve_link(element.value().attr("href")?, base_url)?;
            let text = collapse_whitespace(&element.text().collect::<String>());
            Some(Anchor { url, text })
        })
        .collect()
}

fn extract_resources(document: &Html, base_url: &Url) -> Vec<Url> {
    let Ok(selector) = Selector::parse("[src]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| resolve_link(element.value().attr("src")?, base_url))
        .collect()
}

fn extract_images(document: &Html, base_url: &Url) -> Vec<ImageRef> {
    let Ok(selector) = Selector::parse("img[src]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| {
            let url = resolve_link(element.value().attr("src")?, base_url)?;
            Some(ImageRef {
                url: url.to_string(),
                alt: element.value().attr("alt").unwrap_or_default().to_string(),
            })
        })
        .collect()
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only hrefs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }
    absolute_url.set_fragment(None);
    Some(absolute_url)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
