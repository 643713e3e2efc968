//! Active walk sessions.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One user's walk in progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
    pub user_name: String,
    /// Slot in the sorted waypoint sequence currently displayed.
    /// Non-decreasing while the session lives.
    pub current_slot: usize,
    pub started_at: DateTime<Utc>,
}

/// Owns the set of active sessions, at most one per user.
///
/// The map never leaves this type; `try_begin` is the single atomic
/// check-and-insert that enforces exclusivity.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<Uuid, Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> MutexGuard<'_, HashMap<Uuid, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a fresh session unless one already exists.
    /// Returns false without mutating when the user is already active.
    pub fn try_begin(&self, user: Uuid, name: &str, now: DateTime<Utc>) -> bool {
        match self.map().entry(user) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Session {
                    user_id: user,
                    user_name: name.to_string(),
                    current_slot: 0,
                    started_at: now,
                });
                true
            }
        }
    }

    /// Remove and return the session, if any.
    pub fn end(&self, user: Uuid) -> Option<Session> {
        self.map().remove(&user)
    }

    pub fn get(&self, user: Uuid) -> Option<Session> {
        self.map().get(&user).cloned()
    }

    /// Move an existing session to `slot`. Returns false when the
    /// session vanished concurrently (stopped or disconnected between
    /// timer arming and firing).
    pub fn advance(&self, user: Uuid, slot: usize) -> bool {
        match self.map().get_mut(&user) {
            Some(session) => {
                session.current_slot = slot;
                true
            }
            None => false,
        }
    }

    pub fn active_users(&self) -> Vec<Uuid> {
        self.map().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map().is_empty()
    }
}
