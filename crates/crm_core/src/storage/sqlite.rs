//! SQLite-backed key/value store.
//!
//! # Invariants
//! - Values live in `kv_entries`, one row per key, replaced by upsert.
//! - A store is only handed out after its file reached `schema::latest_version()`.

use super::schema::{file_version, upgrade};
use super::{KeyValueStore, StorageResult};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Key/value store owning one SQLite connection.
pub struct SqliteKeyValueStore {
    conn: Connection,
}

impl SqliteKeyValueStore {
    /// Opens (or creates) a database file.
    ///
    /// # Errors
    /// - SQLite failures while opening or upgrading the file.
    /// - `UnsupportedSchemaVersion` for files written by a newer build.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::connect("file", || Connection::open(path))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::connect("memory", Connection::open_in_memory)
    }

    /// Layout version of the underlying file.
    pub fn schema_version(&self) -> StorageResult<u32> {
        file_version(&self.conn)
    }

    fn connect(
        mode: &'static str,
        open: impl FnOnce() -> rusqlite::Result<Connection>,
    ) -> StorageResult<Self> {
        let started_at = Instant::now();
        match bootstrap(open) {
            Ok((conn, previous)) => {
                info!(
                    "event=db_open module=storage status=ok mode={} duration_ms={} schema_from={}",
                    mode,
                    started_at.elapsed().as_millis(),
                    previous
                );
                Ok(Self { conn })
            }
            Err(err) => {
                error!(
                    "event=db_open module=storage status=error mode={} duration_ms={} error={}",
                    mode,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

fn bootstrap(
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> StorageResult<(Connection, u32)> {
    let mut conn = open()?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    let previous = upgrade(&mut conn)?;
    Ok((conn, previous))
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value)
             VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }
}
