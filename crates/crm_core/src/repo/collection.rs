//! Write-through entity collection.
//!
//! # Responsibility
//! - Hold one insertion-ordered collection in memory.
//! - Serialize the full collection to its storage key on every mutation.
//!
//! # Invariants
//! - Records are only appended, patched in place or filtered out; never
//!   reordered.
//! - Update/remove of an unknown id leaves records untouched but still writes.

use crate::model::{Entity, Patch};
use crate::storage::{KeyValueStore, StorageError};
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for collection persistence.
#[derive(Debug)]
pub enum RepoError {
    Storage(StorageError),
    Serialization(serde_json::Error),
    /// The encoded document would not parse back (e.g. NaN became `null`);
    /// the write was refused.
    NotReloadable(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "failed to encode collection: {err}"),
            Self::NotReloadable(err) => {
                write!(f, "encoded collection would not load back: {err}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Serialization(err) | Self::NotReloadable(err) => Some(err),
        }
    }
}

impl From<StorageError> for RepoError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Result of reading one collection document.
#[derive(Debug)]
pub enum Loaded<E> {
    /// Nothing was ever stored under the key.
    Absent,
    /// The document parsed into records.
    Present(Vec<E>),
    /// The document exists but does not parse.
    Corrupt { raw: String, error: String },
}

/// Reads and classifies the document stored for `E`.
///
/// Only backend failures are errors; malformed content is reported as
/// `Loaded::Corrupt`.
pub fn load_collection<E: Entity>(store: &dyn KeyValueStore) -> RepoResult<Loaded<E>> {
    let Some(raw) = store.get(E::STORAGE_KEY)? else {
        return Ok(Loaded::Absent);
    };

    match serde_json::from_str::<Vec<E>>(&raw) {
        Ok(items) => Ok(Loaded::Present(items)),
        Err(err) => {
            warn!(
                "event=collection_load module=repo status=corrupt key={} line={} column={}",
                E::STORAGE_KEY,
                err.line(),
                err.column()
            );
            Ok(Loaded::Corrupt {
                raw,
                error: err.to_string(),
            })
        }
    }
}

/// Serializes `items` and writes them under the key for `E`.
///
/// # Errors
/// - `NotReloadable` when the encoded document does not parse back into
///   records; nothing is written.
pub fn save_collection<E: Entity>(store: &mut dyn KeyValueStore, items: &[E]) -> RepoResult<()> {
    let encoded = serde_json::to_string(items)?;
    if let Err(err) = serde_json::from_str::<Vec<E>>(&encoded) {
        warn!(
            "event=collection_write module=repo status=refused key={} records={}",
            E::STORAGE_KEY,
            items.len()
        );
        return Err(RepoError::NotReloadable(err));
    }
    store.set(E::STORAGE_KEY, &encoded)?;
    debug!(
        "event=collection_write module=repo status=ok key={} records={} bytes={}",
        E::STORAGE_KEY,
        items.len(),
        encoded.len()
    );
    Ok(())
}

/// In-memory collection persisted on every mutation.
#[derive(Debug, Clone)]
pub struct Collection<E: Entity> {
    items: Vec<E>,
}

impl<E: Entity> Default for Collection<E> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<E: Entity> Collection<E> {
    /// Wraps already-loaded records without writing.
    pub fn from_items(items: Vec<E>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Finds one record by id.
    pub fn get(&self, id: &str) -> Option<&E> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Writes the current records without changing them.
    pub fn persist(&self, store: &mut dyn KeyValueStore) -> RepoResult<()> {
        save_collection(store, &self.items)
    }

    /// Appends one record.
    pub fn insert(&mut self, store: &mut dyn KeyValueStore, entity: E) -> RepoResult<()> {
        let mut next = self.items.clone();
        next.push(entity);
        self.commit(store, next)
    }

    /// Shallow-merges `patch` over the record with `id`.
    ///
    /// Returns whether a record matched.
    pub fn update<P: Patch<E>>(
        &mut self,
        store: &mut dyn KeyValueStore,
        id: &str,
        patch: P,
    ) -> RepoResult<bool> {
        let mut next = self.items.clone();
        let matched = match next.iter_mut().find(|item| item.id() == id) {
            Some(item) => {
                patch.apply_to(item);
                true
            }
            None => false,
        };
        self.commit(store, next)?;
        Ok(matched)
    }

    /// Removes the record with `id`.
    ///
    /// Returns whether a record matched.
    pub fn remove(&mut self, store: &mut dyn KeyValueStore, id: &str) -> RepoResult<bool> {
        let mut next = self.items.clone();
        next.retain(|item| item.id() != id);
        let matched = next.len() != self.items.len();
        self.commit(store, next)?;
        Ok(matched)
    }

    fn commit(&mut self, store: &mut dyn KeyValueStore, next: Vec<E>) -> RepoResult<()> {
        save_collection(store, &next)?;
        self.items = next;
        Ok(())
    }
}
