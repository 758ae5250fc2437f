//! Storage module for persisting observations
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Appending guest count observations
//! - Latest/history queries and per-day aggregates for the read API

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{ObservationStore, StorageError, StorageResult};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// A persisted observation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationRecord {
    pub id: i64,
    pub recorded_at: DateTime<Utc>,
    pub count: u64,
    pub capacity: Option<u64>,
}

/// Aggregated counts for one UTC calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub average: Option<f64>,
    pub max: Option<u64>,
    pub min: Option<u64>,
}
