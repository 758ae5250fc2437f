//! Plain-text rendering of an HTML document

use html_escape::decode_html_entities;
use regex::Regex;
use std::sync::LazyLock;

static RE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("invalid regex: tag"));

static RE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("invalid regex: whitespace"));

/// Returns a normalized, tag-free representation of the HTML content
///
/// Tags become a single space, entities are decoded, whitespace runs
/// (including decoded `&nbsp;`) collapse to one space and the result is
/// trimmed.
///
/// # Example
///
/// ```
/// use pool_logger::scraper::extract_visible_text;
///
/// let text = extract_visible_text("<div>Anzahl&nbsp;G&auml;ste <b>73</b></div>");
/// assert_eq!(text, "Anzahl Gäste 73");
/// ```
pub fn extract_visible_text(html: &str) -> String {
    let stripped = RE_TAG.replace_all(html, " ");
    let decoded = decode_html_entities(&stripped);
    RE_WHITESPACE.replace_all(&decoded, " ").trim().to_string()
}
