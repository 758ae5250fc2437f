//! Database schema definitions
//!
//! This module contains the SQL schema for the observation database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per guest count observation
CREATE TABLE IF NOT EXISTS guest_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    recorded_at TEXT NOT NULL,
    count INTEGER NOT NULL CHECK (count >= 0),
    capacity INTEGER CHECK (capacity IS NULL OR capacity >= 0)
);

CREATE INDEX IF NOT EXISTS idx_guest_logs_recorded_at ON guest_logs(recorded_at);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
