//! Repository layer over persisted collection documents.
//!
//! # Responsibility
//! - Load one collection document and classify it as absent, present or
//!   corrupt.
//! - Apply insert/patch/remove mutations with write-through persistence.
//!
//! # Invariants
//! - Every mutation performs exactly one full-collection write.
//! - In-memory state is replaced only after the write succeeded.

pub mod collection;
