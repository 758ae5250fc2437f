//! Primary extraction of the guest count from the pool page
//!
//! Extraction runs an ordered list of strategies over two views of the same
//! document, the raw markup and its normalized text:
//!
//! | Order | Strategy | Input | Anchor |
//! |-------|----------|-------|--------|
//! | 1 | Structured cell | raw HTML | `<td id="SSD-<n>_visitornumber">` |
//! | 2 | Free text | normalized text | "Anzahl Gäste" phrase |
//!
//! The first strategy that yields a count wins. Capacity is then looked up
//! in a short text window after the count.

use super::normalize::extract_visible_text;
use super::{GuestCountError, Observation};
use regex::Regex;
use std::sync::LazyLock;

/// Characters after the count that are searched for a capacity figure
const CAPACITY_WINDOW_CHARS: usize = 100;

static RE_COUNT_CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<td[^>]*id=["']SSD-\d+_visitornumber["'][^>]*>\s*(\d+)\s*<"#)
        .expect("invalid regex: count cell")
});

static RE_COUNT_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Anzahl\s+G[äa]ste[^0-9]*(\d+)").expect("invalid regex: count text")
});

static RE_CAPACITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:max\.?\s*)?(?:Kapazit[aä]t|von)\s*(\d+)").expect("invalid regex: capacity")
});

/// A count located by one strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountMatch<'a> {
    /// Parsed guest count
    pub count: u64,

    /// Slice of the normalized text to search for the capacity
    pub capacity_window: &'a str,
}

/// Signature shared by all extraction strategies: `(raw_html, text)`
pub type Strategy = for<'a> fn(&'a str, &'a str) -> Option<CountMatch<'a>>;

/// Extraction strategies in the order they are tried
pub const STRATEGIES: &[(&str, Strategy)] = &[
    ("structured-cell", match_count_cell),
    ("free-text", match_count_text),
];

/// Extracts the guest count (and optionally capacity) from the page HTML
///
/// # Returns
///
/// * `Ok(Observation)` - Count found, stamped with the current instant
/// * `Err(GuestCountError::NotFound)` - No strategy matched
///
/// # Example
///
/// ```
/// use pool_logger::scraper::parse_guest_count;
///
/// let observation = parse_guest_count("<span>Anzahl Gäste 73 von 250</span>").unwrap();
/// assert_eq!(observation.count, 73);
/// assert_eq!(observation.capacity, Some(250));
/// ```
pub fn parse_guest_count(html: &str) -> Result<Observation, GuestCountError> {
    let text = extract_visible_text(html);

    for (name, strategy) in STRATEGIES {
        if let Some(found) = strategy(html, &text) {
            tracing::debug!("Guest count matched by {} strategy", name);
            let capacity = extract_capacity(found.capacity_window);
            return Ok(Observation::now(found.count, capacity));
        }
        tracing::debug!("{} strategy found no guest count", name);
    }

    Err(GuestCountError::NotFound)
}

/// Looks for a capacity figure ("Kapazität 120", "von 250") in `window`
///
/// Absence, or a figure that does not fit the integer type, yields `None`.
pub fn extract_capacity(window: &str) -> Option<u64> {
    RE_CAPACITY
        .captures(window)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
}

/// Visitor-number table cell rendered by the page component
fn match_count_cell<'a>(html: &'a str, text: &'a str) -> Option<CountMatch<'a>> {
    let digits = RE_COUNT_CELL.captures(html)?.get(1)?.as_str();
    let count = digits.parse().ok()?;

    // The cell content also appears in the text; capacity usually follows it
    let capacity_window = match text.find(digits) {
        Some(start) => take_chars(&text[start..], CAPACITY_WINDOW_CHARS),
        None => text,
    };

    Some(CountMatch {
        count,
        capacity_window,
    })
}

/// "Anzahl Gäste ... <n>" phrase in the visible text
fn match_count_text<'a>(_html: &'a str, text: &'a str) -> Option<CountMatch<'a>> {
    let caps = RE_COUNT_TEXT.captures(text)?;
    let count = caps.get(1)?.as_str().parse().ok()?;
    let end = caps.get(0)?.end();

    Some(CountMatch {
        count,
        capacity_window: take_chars(&text[end..], CAPACITY_WINDOW_CHARS),
    })
}

/// Returns the prefix of `s` holding at most `n` characters
fn take_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
