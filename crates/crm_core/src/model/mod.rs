//! CRM domain model.
//!
//! # Responsibility
//! - Define the flat records held by each store collection.
//! - Define the shared contracts (`Entity`, `Patch`) the repository layer
//!   uses to treat every collection uniformly.
//!
//! # Invariants
//! - Every record carries a generated `id` and a creation instant.
//! - Serialized field names are camelCase and match the persisted documents.
//! - Cross-entity links (`contact_id`) are informational, never enforced.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod activity;
pub mod chat;
pub mod contact;
pub mod id;
pub mod proposal;
pub mod task;

/// Identifier of a record within its collection.
///
/// Generated ids are decimal millisecond timestamps; seed and imported
/// records may carry arbitrary strings.
pub type EntityId = String;

/// A record type stored as one persisted collection.
pub trait Entity: Clone + Serialize + DeserializeOwned {
    /// Caller-supplied fields, i.e. the record minus `id` and creation time.
    type Draft;

    /// Storage key of the collection document.
    const STORAGE_KEY: &'static str;

    /// Builds a record from generated identity plus caller input.
    fn from_draft(id: EntityId, created_at: DateTime<Utc>, draft: Self::Draft) -> Self;

    /// Returns the record id.
    fn id(&self) -> &str;
}

/// Partial update applied as a shallow merge over one record.
pub trait Patch<E> {
    /// Overwrites the fields named by this patch; all others are kept.
    fn apply_to(self, target: &mut E);
}

/// Assigns `value` into `slot` when present.
pub(crate) fn merge<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}
