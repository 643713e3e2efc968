//! Lifecycle notifications.
//!
//! Observers are synchronous callbacks. `on_start` runs before the
//! session is created and may veto it; the other notifications fire
//! after the state change they describe and cannot influence it.
//!
//! Observers are invoked while the engine holds the user's operation
//! lock and must not call back into `start`/`stop` for the same user.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Verdict returned by [`WalkObserver::on_start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartDecision {
    Allow,
    /// Block the walk from starting, optionally telling the user why.
    Deny(Option<String>),
}

/// Every interested party implements this trait. All methods default
/// to no-ops so an observer only overrides what it cares about.
pub trait WalkObserver: Send + Sync {
    /// Called before a walk starts. The first observer to deny wins.
    fn on_start(&self, _user: Uuid) -> StartDecision {
        StartDecision::Allow
    }

    /// Called after the displayed slot changed. On the very first step
    /// `from` and `to` are both 0.
    fn on_step_change(&self, _user: Uuid, _from: usize, _to: usize, _total: usize) {}

    /// Called after a walk ended early (explicit stop or disconnect).
    fn on_stop(
        &self,
        _user: Uuid,
        _started_at: DateTime<Utc>,
        _steps_completed: usize,
        _total: usize,
    ) {
    }

    /// Called after the final waypoint's dwell time elapsed.
    fn on_complete(&self, _user: Uuid, _started_at: DateTime<Utc>, _total_steps: usize) {}
}
