//! Storage layer for library attendance logs.
//!
//! Provides the persistence collaborator for [`stil_core::SessionStore`]
//! using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization. The CLI additionally
//! takes a file lock so that separate processes do not interleave a
//! read-modify-write of the session collection.
//!
//! # Schema
//!
//! The store is a table of named slots. The session collection lives in the
//! `logs` slot as a JSON array of objects with exactly the keys `first`,
//! `last`, `timeIn`, `timeOut` and `consumed`. Each save replaces the slot
//! value as a whole inside a transaction; an absent slot reads as an empty
//! collection.
//!
//! `updated_at` is ISO 8601 UTC with millisecond precision and is informational
//! only.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use stil_core::{LogStore, SessionRecord, StoreError};

/// Slot name holding the session collection.
pub const LOGS_SLOT: &str = "logs";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// The slot value could not be encoded or decoded.
    #[error("invalid JSON in slot {slot}")]
    Json {
        slot: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        Self::with_source("database operation failed", err)
    }
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- Named slots, each holding one serialized value
            -- updated_at: ISO 8601 format (e.g., '2024-01-15T10:30:00.000Z')
            CREATE TABLE IF NOT EXISTS slots (
                name TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Reads the raw value of a slot, if present.
    pub fn read_slot(&self, name: &str) -> Result<Option<String>, DbError> {
        let value = self
            .conn
            .query_row("SELECT value FROM slots WHERE name = ?", [name], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Replaces the value of a slot.
    pub fn write_slot(&mut self, name: &str, value: &str) -> Result<(), DbError> {
        self.write_slot_at(name, value, Utc::now())
    }

    fn write_slot_at(
        &mut self,
        name: &str,
        value: &str,
        now: DateTime<Utc>,
    ) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "
            INSERT INTO slots (name, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
            params![name, value, format_timestamp(now)],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Deletes a slot. Returns whether a slot was removed.
    pub fn delete_slot(&mut self, name: &str) -> Result<bool, DbError> {
        let removed = self
            .conn
            .execute("DELETE FROM slots WHERE name = ?", [name])?;
        Ok(removed > 0)
    }

    /// Loads the session collection from the `logs` slot.
    pub fn load_logs(&self) -> Result<Vec<SessionRecord>, DbError> {
        let Some(value) = self.read_slot(LOGS_SLOT)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&value).map_err(|source| DbError::Json {
            slot: LOGS_SLOT.to_string(),
            source,
        })
    }

    /// Replaces the session collection in the `logs` slot.
    pub fn save_logs(&mut self, records: &[SessionRecord]) -> Result<(), DbError> {
        let value = serde_json::to_string(records).map_err(|source| DbError::Json {
            slot: LOGS_SLOT.to_string(),
            source,
        })?;
        self.write_slot(LOGS_SLOT, &value)
    }
}

impl LogStore for Database {
    fn load(&self) -> Result<Vec<SessionRecord>, StoreError> {
        Ok(self.load_logs()?)
    }

    fn save(&mut self, records: &[SessionRecord]) -> Result<(), StoreError> {
        Ok(self.save_logs(records)?)
    }

    fn remove(&mut self) -> Result<(), StoreError> {
        let removed = self.delete_slot(LOGS_SLOT)?;
        tracing::debug!(removed, "removed logs slot");
        Ok(())
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
