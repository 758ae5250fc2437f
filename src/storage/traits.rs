//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::scraper::Observation;
use crate::storage::{DailySummary, ObservationRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Corrupt value in column {column}: {value}")]
    Corrupt { column: &'static str, value: String },

    #[error("Value out of range: {0}")]
    OutOfRange(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Append-only store of guest count observations
pub trait ObservationStore {
    /// Appends an observation and returns the stored record
    fn record(&mut self, observation: &Observation) -> StorageResult<ObservationRecord>;

    /// Gets the most recent observation
    fn latest(&self) -> StorageResult<Option<ObservationRecord>>;

    /// Gets up to `limit` observations, newest first
    fn history(&self, limit: u32) -> StorageResult<Vec<ObservationRecord>>;

    /// Aggregates observations of the last `days` days by UTC date
    ///
    /// Days are returned in ascending order; days without observations are
    /// absent.
    fn daily_summary(&self, days: u32) -> StorageResult<Vec<DailySummary>>;

    /// Gets the total number of observations
    fn count(&self) -> StorageResult<u64>;
}
