//! Facility identifier recovery
//!
//! The page embeds a data table whose (JSON-encoded) rows carry cell ids like
//! `SSD-4_visitornumber`. The `SSD-4` part keys the facility in the live feed.

use regex::Regex;
use std::sync::LazyLock;

static RE_FACILITY_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(SSD-\d+)_visitornumber").expect("invalid regex: facility id")
});

/// Extracts the facility identifier (e.g. `SSD-4`) from raw markup
///
/// Operates on the raw HTML only: decoding entities or stripping tags can
/// break the token apart.
pub fn extract_facility_id(html: &str) -> Option<&str> {
    RE_FACILITY_ID
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
