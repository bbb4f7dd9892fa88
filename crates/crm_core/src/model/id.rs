//! Record id and creation-time source.
//!
//! # Invariants
//! - Ids are strictly increasing decimal millisecond values per source.
//! - The creation instant handed out with an id never precedes the previous one
//!   and equals the id's millisecond value.
//! - Only representable instants become the floor, so bumping never overflows.

use super::EntityId;
use chrono::{DateTime, Utc};

/// Monotonic generator for timestamp-derived ids.
#[derive(Debug, Clone, Default)]
pub struct IdSource {
    last_ms: i64,
}

impl IdSource {
    /// Creates a source that starts from the wall clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source that never hands out a value `<= last_ms`.
    pub fn resume_after(last_ms: i64) -> Self {
        let mut source = Self::new();
        source.observe(last_ms);
        source
    }

    /// Raises the floor so future ids stay above `ms`.
    ///
    /// Returns `false` and keeps the floor when `ms` is not a representable
    /// instant.
    pub fn observe(&mut self, ms: i64) -> bool {
        if DateTime::from_timestamp_millis(ms).is_none() {
            return false;
        }
        self.last_ms = self.last_ms.max(ms);
        true
    }

    /// Raises the floor from an existing id when it is numeric.
    ///
    /// Returns `false` only for numeric ids outside the instant range; such
    /// ids are kept as-is in their collection but never become the floor.
    pub fn observe_id(&mut self, id: &str) -> bool {
        match id.parse::<i64>() {
            Ok(ms) => self.observe(ms),
            Err(_) => true,
        }
    }

    /// Returns the next id and its creation instant, in whole milliseconds.
    pub fn next(&mut self) -> (EntityId, DateTime<Utc>) {
        let now_ms = Utc::now().timestamp_millis();
        self.last_ms = if now_ms > self.last_ms {
            now_ms
        } else {
            // Same millisecond (or a clock step back): bump past the last value.
            self.last_ms.saturating_add(1)
        };
        let created_at =
            DateTime::from_timestamp_millis(self.last_ms).unwrap_or(DateTime::<Utc>::MAX_UTC);
        (self.last_ms.to_string(), created_at)
    }
}
