//! Fetch orchestration
//!
//! This module owns the page request and drives the strategy decision:
//!
//! ```text
//! Start → Fetching ─┬─ FetchFailed
//!                   └─ Parsing ─┬─ Success
//!                               └─ RecoveringIdentifier ─┬─ NotFound (no identifier)
//!                                                        └─ ConnectingFeed ─┬─ Success
//!                                                                           └─ FeedFailed
//! ```
//!
//! Each call makes exactly one attempt; there is no retry edge.

use super::extract::parse_guest_count;
use super::feed::{fetch_count_via_feed, FeedOptions};
use super::identifier::extract_facility_id;
use super::{GuestCountError, Observation};
use crate::config::ScraperConfig;
use reqwest::header::{ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{redirect::Policy, Client};
use std::path::Path;

/// Builds an HTTP client for the pool page
///
/// Redirects are followed; the user agent and language preference are also
/// set on every request so that an externally supplied client behaves the
/// same way.
///
/// # Example
///
/// ```no_run
/// use pool_logger::config::ScraperConfig;
/// use pool_logger::scraper::build_http_client;
///
/// let client = build_http_client(&ScraperConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &ScraperConfig) -> Result<Client, GuestCountError> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.request_timeout())
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
        .map_err(|e| GuestCountError::ClientSetup(format!("HTTP client: {}", e)))
}

/// Fetches the current guest count
///
/// # Request Flow
///
/// 1. GET the pool page (`Accept-Language: de`, request timeout, redirects)
///    - transport error or non-2xx → `FetchFailed`, no fallback
/// 2. Run the primary extraction strategies on the body
/// 3. On failure, recover the facility identifier from the same body
///    - none → dump the body for debugging, then `NotFound`
///    - found → read the live feed; its failure is `FeedFailed`
///
/// # Arguments
///
/// * `config` - Engine settings (URLs, user agent, timeouts)
/// * `client` - Optional shared client; one is built for this call otherwise
pub async fn fetch_guest_count(
    config: &ScraperConfig,
    client: Option<&Client>,
) -> Result<Observation, GuestCountError> {
    let html = fetch_page(config, client).await?;

    let parse_error = match parse_guest_count(&html) {
        Ok(observation) => {
            tracing::info!(
                "Fetched guest count: {} (capacity {:?})",
                observation.count,
                observation.capacity
            );
            return Ok(observation);
        }
        Err(e) => e,
    };

    let Some(uid) = extract_facility_id(&html) else {
        if let Some(path) = &config.debug_dump_path {
            dump_html_for_debug(path, &html).await;
        }
        return Err(parse_error);
    };

    tracing::debug!("Falling back to live feed for uid={}", uid);
    let observation = read_feed(config, uid).await?;
    tracing::info!(
        "Fetched guest count via live feed: {} (capacity {:?})",
        observation.count,
        observation.capacity
    );
    Ok(observation)
}

/// Fetches the page and goes straight to the live feed
///
/// Skips primary extraction; useful to check the fallback path while the
/// page still carries the count.
///
/// # Errors
///
/// `IdentifierMissing` when the page has no facility identifier, otherwise
/// as [`fetch_guest_count`].
pub async fn fetch_guest_count_via_feed(
    config: &ScraperConfig,
    client: Option<&Client>,
) -> Result<Observation, GuestCountError> {
    let html = fetch_page(config, client).await?;
    let uid = extract_facility_id(&html).ok_or(GuestCountError::IdentifierMissing)?;
    read_feed(config, uid).await
}

async fn read_feed(config: &ScraperConfig, uid: &str) -> Result<Observation, GuestCountError> {
    let options = FeedOptions {
        url: config.feed_url.clone(),
        user_agent: config.user_agent.clone(),
        frame_timeout: config.frame_timeout(),
        max_frames: config.max_frames,
    };

    match fetch_count_via_feed(uid, &options).await {
        Ok(reading) => Ok(Observation::now(reading.count, reading.capacity)),
        Err(e) => {
            tracing::warn!("Live feed fallback failed: {}", e);
            Err(e)
        }
    }
}

/// Issues the page request and returns the body
async fn fetch_page(config: &ScraperConfig, client: Option<&Client>) -> Result<String, GuestCountError> {
    // A client built here is dropped when this function returns
    let owned;
    let client = match client {
        Some(client) => client,
        None => {
            owned = build_http_client(config)?;
            &owned
        }
    };

    let url = config.target_url.as_str();
    tracing::debug!("Fetching guest count from {}", url);

    let fetch_failed = |reason: String| GuestCountError::FetchFailed {
        url: url.to_string(),
        reason,
    };

    let response = client
        .get(url)
        .header(USER_AGENT, config.user_agent.as_str())
        .header(ACCEPT_LANGUAGE, "de")
        .timeout(config.request_timeout())
        .send()
        .await
        .map_err(|e| {
            tracing::error!("HTTP error while fetching guest count: {}", e);
            fetch_failed(classify_transport_error(&e))
        })?;

    let status = response.status();
    if !status.is_success() {
        tracing::error!("Pool page returned HTTP {}", status.as_u16());
        return Err(fetch_failed(format!("HTTP {}", status.as_u16())));
    }

    response
        .text()
        .await
        .map_err(|e| fetch_failed(format!("reading body: {}", e)))
}

fn classify_transport_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        "Connection refused".to_string()
    } else if error.is_redirect() {
        "Too many redirects".to_string()
    } else {
        error.to_string()
    }
}

/// Writes the last fetched page to disk to aid debugging
///
/// Best effort: failures are logged and swallowed.
async fn dump_html_for_debug(path: &Path, html: &str) {
    let result = async {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, html).await
    }
    .await;

    match result {
        Ok(()) => tracing::debug!("Wrote HTML response to {} for debugging", path.display()),
        Err(e) => tracing::debug!("Failed to write HTML debug dump: {}", e),
    }
}
