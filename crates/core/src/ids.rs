//! Monotonic record id generation.
//!
//! Ids stay close to the creation time in Unix milliseconds, which keeps them
//! compatible with files written by earlier versions of the service, but two
//! ids handed out by the same generator are always strictly increasing even
//! when they are requested within the same millisecond.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

use crate::types::DbId;

/// Hands out unique, strictly increasing ids for one collection.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator that never returns an id at or below `floor`.
    ///
    /// Repositories seed this with the largest id found in their collection at
    /// load time.
    pub fn starting_after(floor: DbId) -> Self {
        Self {
            last: AtomicI64::new(floor),
        }
    }

    /// Return the next id: the current time in milliseconds, or one past the
    /// previous id if the clock has not moved forward.
    pub fn next_id(&self) -> DbId {
        let now = Utc::now().timestamp_millis();
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        now.max(previous + 1)
    }
}
