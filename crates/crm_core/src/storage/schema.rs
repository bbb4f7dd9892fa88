//! Table layout of the SQLite key/value file.
//!
//! # Invariants
//! - Step `n` (0-based) upgrades a file from version `n` to `n + 1`.
//! - The file version lives in `PRAGMA user_version`; a file written by a
//!   newer build is refused rather than downgraded.
//! - Collection documents are opaque text here; their JSON shape is not
//!   versioned by this module.

use super::{StorageError, StorageResult};
use log::info;
use rusqlite::Connection;

const STEPS: &[&str] = &[include_str!("sql/0001_kv_entries.sql")];

/// Layout version written by this build.
pub fn latest_version() -> u32 {
    STEPS.len() as u32
}

/// Reads the layout version of an open file (0 for a fresh file).
pub fn file_version(conn: &Connection) -> StorageResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Brings the file up to `latest_version()` in one transaction.
///
/// Returns the version the file had before.
pub(crate) fn upgrade(conn: &mut Connection) -> StorageResult<u32> {
    let found = file_version(conn)?;
    let supported = latest_version();
    if found > supported {
        return Err(StorageError::UnsupportedSchemaVersion { found, supported });
    }
    if found == supported {
        return Ok(found);
    }

    let tx = conn.transaction()?;
    for sql in &STEPS[found as usize..] {
        tx.execute_batch(sql)?;
    }
    tx.pragma_update(None, "user_version", supported)?;
    tx.commit()?;

    info!("event=schema_upgrade module=storage status=ok from={found} to={supported}");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::{file_version, latest_version, upgrade};
    use crate::storage::StorageError;
    use rusqlite::Connection;

    #[test]
    fn fresh_file_is_upgraded_once() {
        let mut conn = Connection::open_in_memory().unwrap();

        assert_eq!(upgrade(&mut conn).unwrap(), 0);
        assert_eq!(file_version(&conn).unwrap(), latest_version());
        assert_eq!(upgrade(&mut conn).unwrap(), latest_version());
    }

    #[test]
    fn newer_file_is_refused() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA user_version = 7;").unwrap();

        let err = upgrade(&mut conn).unwrap_err();
        assert!(matches!(
            err,
            StorageError::UnsupportedSchemaVersion {
                found: 7,
                supported
            } if supported == latest_version()
        ));
    }
}
