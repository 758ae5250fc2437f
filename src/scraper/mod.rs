//! Guest count extraction engine
//!
//! This module contains the scraping pipeline, including:
//! - Fetching the municipal pool page
//! - Normalizing markup into plain text
//! - Pattern-based extraction of the guest count and capacity
//! - Recovering the facility identifier from the markup
//! - Falling back to the crowd-monitoring live feed
//!
//! Every call is a single stateless attempt; retry policy belongs to the
//! caller.

mod extract;
mod feed;
mod fetcher;
mod identifier;
mod normalize;

pub use extract::{extract_capacity, parse_guest_count, CountMatch, Strategy, STRATEGIES};
pub use feed::{fetch_count_via_feed, scan_frame, FeedOptions, FeedReading};
pub use fetcher::{build_http_client, fetch_guest_count, fetch_guest_count_via_feed};
pub use identifier::extract_facility_id;
pub use normalize::extract_visible_text;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// One occupancy reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Observation {
    /// When the reading was taken (receipt time, the sources carry none)
    pub timestamp: DateTime<Utc>,

    /// Current number of guests
    pub count: u64,

    /// Maximum occupancy, when the source publishes it
    pub capacity: Option<u64>,
}

impl Observation {
    /// Creates an observation stamped with the current instant
    pub fn now(count: u64, capacity: Option<u64>) -> Self {
        Self {
            timestamp: Utc::now(),
            count,
            capacity,
        }
    }
}

/// Failures of a single engine invocation
#[derive(Debug, Error)]
pub enum GuestCountError {
    /// A client or request could not be constructed; no network attempt was made
    #[error("Client setup failed: {0}")]
    ClientSetup(String),

    #[error("Failed to fetch guest count from {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("Could not find guest count in page")]
    NotFound,

    #[error("No facility identifier found in page markup")]
    IdentifierMissing,

    #[error("Live feed lookup for {uid} failed: {reason}")]
    FeedFailed { uid: String, reason: String },
}

impl GuestCountError {
    /// True for the "page had nothing usable" outcomes
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound | Self::IdentifierMissing)
    }

    /// True when an upstream service (page or feed) is at fault
    pub fn is_upstream(&self) -> bool {
        !matches!(self, Self::ClientSetup(_))
    }
}
