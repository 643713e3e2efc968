//! Per-user cooldown bookkeeping.
//!
//! Entries self-expire on read; there is no background sweep. A walk
//! that never started never writes an entry.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct CooldownTracker {
    entries: Mutex<HashMap<Uuid, DateTime<Utc>>>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> MutexGuard<'_, HashMap<Uuid, DateTime<Utc>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// True while `now` is before the stored eligibility time.
    /// Expired entries are evicted as a side effect.
    pub fn is_on_cooldown(&self, user: Uuid, now: DateTime<Utc>) -> bool {
        let mut entries = self.map();
        match entries.get(&user) {
            Some(&eligible_at) if now < eligible_at => true,
            Some(_) => {
                entries.remove(&user);
                false
            }
            None => false,
        }
    }

    /// Whole seconds until eligibility, 0 when not on cooldown.
    pub fn remaining_secs(&self, user: Uuid, now: DateTime<Utc>) -> i64 {
        self.map()
            .get(&user)
            .map(|eligible_at| (*eligible_at - now).num_seconds().max(0))
            .unwrap_or(0)
    }

    /// Overwrite the user's entry with `now + duration_secs`.
    pub fn set(&self, user: Uuid, now: DateTime<Utc>, duration_secs: u64) {
        let eligible_at = now + Duration::seconds(duration_secs as i64);
        self.map().insert(user, eligible_at);
    }
}
