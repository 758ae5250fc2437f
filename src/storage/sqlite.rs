//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ObservationStore trait.

use crate::scraper::Observation;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ObservationStore, StorageError, StorageResult};
use crate::storage::{DailySummary, ObservationRecord};
use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

/// Row as stored, before conversion
type RawRecord = (i64, String, i64, Option<i64>);

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// Creates the parent directory of `path` when it does not exist yet.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Aggregates observations recorded at or after `cutoff` by UTC date
    pub fn daily_summary_since(&self, cutoff: DateTime<Utc>) -> StorageResult<Vec<DailySummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT date(recorded_at) AS day, AVG(count), MAX(count), MIN(count)
             FROM guest_logs
             WHERE recorded_at >= ?1
             GROUP BY day
             ORDER BY day",
        )?;

        let rows = stmt
            .query_map(params![format_timestamp(&cutoff)], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<f64>>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                    row.get::<_, Option<i64>>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(day, average, max, min)| -> StorageResult<DailySummary> {
                let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d").map_err(|_| {
                    StorageError::Corrupt {
                        column: "recorded_at",
                        value: day.clone(),
                    }
                })?;
                Ok(DailySummary {
                    date,
                    average,
                    max: max.map(to_unsigned).transpose()?,
                    min: min.map(to_unsigned).transpose()?,
                })
            })
            .collect()
    }
}

impl ObservationStore for SqliteStorage {
    fn record(&mut self, observation: &Observation) -> StorageResult<ObservationRecord> {
        let count = to_signed(observation.count)?;
        let capacity = observation.capacity.map(to_signed).transpose()?;

        self.conn.execute(
            "INSERT INTO guest_logs (recorded_at, count, capacity) VALUES (?1, ?2, ?3)",
            params![format_timestamp(&observation.timestamp), count, capacity],
        )?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!("Stored observation {} ({} guests)", id, observation.count);

        Ok(ObservationRecord {
            id,
            recorded_at: observation.timestamp,
            count: observation.count,
            capacity: observation.capacity,
        })
    }

    fn latest(&self) -> StorageResult<Option<ObservationRecord>> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, recorded_at, count, capacity FROM guest_logs
                 ORDER BY recorded_at DESC, id DESC LIMIT 1",
                [],
                read_raw,
            )
            .optional()?;

        raw.map(convert_record).transpose()
    }

    fn history(&self, limit: u32) -> StorageResult<Vec<ObservationRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, recorded_at, count, capacity FROM guest_logs
             ORDER BY recorded_at DESC, id DESC LIMIT ?1",
        )?;

        let raw = stmt
            .query_map(params![limit], read_raw)?
            .collect::<Result<Vec<_>, _>>()?;

        raw.into_iter().map(convert_record).collect()
    }

    fn daily_summary(&self, days: u32) -> StorageResult<Vec<DailySummary>> {
        let cutoff = Utc::now() - Duration::days(i64::from(days));
        self.daily_summary_since(cutoff)
    }

    fn count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM guest_logs", [], |row| row.get(0))?;
        to_unsigned(count)
    }
}

/// Millisecond RFC 3339 in UTC; sorts lexicographically and is understood by
/// SQLite's date functions
fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn read_raw(row: &Row<'_>) -> rusqlite::Result<RawRecord> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn convert_record((id, recorded_at, count, capacity): RawRecord) -> StorageResult<ObservationRecord> {
    let recorded_at = DateTime::parse_from_rfc3339(&recorded_at)
        .map_err(|_| StorageError::Corrupt {
            column: "recorded_at",
            value: recorded_at.clone(),
        })?
        .with_timezone(&Utc);

    Ok(ObservationRecord {
        id,
        recorded_at,
        count: to_unsigned(count)?,
        capacity: capacity.map(to_unsigned).transpose()?,
    })
}

fn to_signed(value: u64) -> StorageResult<i64> {
    i64::try_from(value).map_err(|_| StorageError::OutOfRange(value.to_string()))
}

fn to_unsigned(value: i64) -> StorageResult<u64> {
    u64::try_from(value).map_err(|_| StorageError::OutOfRange(value.to_string()))
}
