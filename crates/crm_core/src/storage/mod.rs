//! Durable key/value storage for collection documents.
//!
//! # Responsibility
//! - Model local storage: string keys mapped to serialized JSON documents.
//! - Provide SQLite-backed and in-process implementations, and the SQLite
//!   file layout (`schema`).
//!
//! # Invariants
//! - `set` replaces the whole value stored under a key.
//! - A successful `set` is visible to every later `get` on the same store.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
pub mod schema;
mod sqlite;

pub use memory::MemoryKeyValueStore;
pub use sqlite::SqliteKeyValueStore;

pub type StorageResult<T> = Result<T, StorageError>;

/// Failure of a key/value backend.
#[derive(Debug)]
pub enum StorageError {
    Sqlite(rusqlite::Error),
    /// The SQLite file was written by a newer build.
    UnsupportedSchemaVersion { found: u32, supported: u32 },
    /// Failure reported by a custom backend.
    Backend(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::UnsupportedSchemaVersion { found, supported } => write!(
                f,
                "store file schema version {found} is newer than supported {supported}"
            ),
            Self::Backend(message) => write!(f, "storage backend failure: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::Backend(_) => None,
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// String key/value store holding one document per collection.
pub trait KeyValueStore {
    /// Returns the value stored under `key`, or `None` when never written.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }
}
