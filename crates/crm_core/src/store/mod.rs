//! Entity store: the single owner of every CRM collection.
//!
//! # Responsibility
//! - Load or initialize all collections from a key/value backend.
//! - Expose typed add/update/delete operations per collection.
//!
//! # Invariants
//! - Each successful mutation writes exactly its own collection, once.
//! - Team members are fixed for the store lifetime and never persisted.
//! - Deleting a contact never touches records that reference it.

mod entity_store;
pub mod seed;

pub use entity_store::{
    CorruptCollection, EntityStore, LoadReport, OutOfRangeId, StoreOptions, StoreSnapshot,
};
