//! Per-user step timers.
//!
//! At most one live timer exists per user. Arming a user who already
//! has a timer cancels the old one first, so a rapid stop/start can
//! never leave two timers in flight. Cancellation is idempotent.
//!
//! A cancelled timer may already be inside its callback; callbacks are
//! expected to re-validate the session before acting.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use uuid::Uuid;

/// Owns the pending timers. Requires a running tokio runtime.
#[derive(Debug, Default)]
pub struct StepScheduler {
    timers: Mutex<HashMap<Uuid, JoinHandle<()>>>,
}

impl StepScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> MutexGuard<'_, HashMap<Uuid, JoinHandle<()>>> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Arm a timer that runs `on_fire` after `delay`, replacing (and
    /// cancelling) any live timer for the same user.
    pub fn arm<F>(&self, user: Uuid, delay: Duration, on_fire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire();
        });
        if let Some(old) = self.map().insert(user, handle) {
            old.abort();
        }
    }

    /// Cancel the user's pending timer, if any. No-op otherwise.
    pub fn cancel(&self, user: Uuid) {
        if let Some(handle) = self.map().remove(&user) {
            handle.abort();
        }
    }

    /// Cancel every outstanding timer. Used on shutdown.
    pub fn cancel_all(&self) {
        for (_, handle) in self.map().drain() {
            handle.abort();
        }
    }

    /// True while a timer for the user has been armed and not yet
    /// fired or been cancelled.
    pub fn has_pending(&self, user: Uuid) -> bool {
        self.map()
            .get(&user)
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn armed_timer_fires_after_delay() {
        let scheduler = StepScheduler::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let user = Uuid::new_v4();

        let counter = fired.clone();
        scheduler.arm(user, Duration::from_secs(2), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(scheduler.has_pending(user));

        tokio::time::sleep(Duration::from_millis(1900)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_firing() {
        let scheduler = StepScheduler::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let user = Uuid::new_v4();

        let counter = fired.clone();
        scheduler.arm(user, Duration::from_secs(1), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        scheduler.cancel(user);
        assert!(!scheduler.has_pending(user));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_is_idempotent() {
        let scheduler = StepScheduler::new();
        let user = Uuid::new_v4();
        scheduler.cancel(user);
        scheduler.arm(user, Duration::from_secs(1), || {});
        scheduler.cancel(user);
        scheduler.cancel(user);
        assert!(!scheduler.has_pending(user));
    }

    #[tokio::test(start_paused = true)]
    async fn rearm_replaces_previous_timer() {
        let scheduler = StepScheduler::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let user = Uuid::new_v4();

        let first = fired.clone();
        scheduler.arm(user, Duration::from_secs(1), move || {
            first.fetch_add(10, Ordering::SeqCst);
        });
        let second = fired.clone();
        scheduler.arm(user, Duration::from_secs(3), move || {
            second.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_secs(4)).await;
        // Only the replacement fired; the first was aborted.
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn timers_for_different_users_are_independent() {
        let scheduler = StepScheduler::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        for user in [a, b] {
            let counter = fired.clone();
            scheduler.arm(user, Duration::from_secs(1), move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        scheduler.cancel(a);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
