//! Guided-walk engine.
//!
//! The engine composes the session registry, the cooldown tracker and
//! the step scheduler, and owns no thread of its own: a walk advances
//! when the per-user timer armed by the previous step fires.
//!
//! ## State transitions
//!
//! ```text
//! Idle -> Active -> Idle
//! ```
//!
//! `current_slot` tracks progress within Active. Lifecycle operations
//! for the same user (start, stop, timer fire, disconnect) run under a
//! per-user operation lock, so a step display can never land after a
//! stop has returned. A timer that fires for a session that no longer
//! exists is dropped without effect.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use std::time::Duration;

use tracing::{debug, info, trace};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{Result, StartError, StopError};
use crate::observer::{StartDecision, WalkObserver};
use crate::present::{CommandDispatcher, HeadingTiming, Presenter};
use crate::walk::cooldown::CooldownTracker;
use crate::walk::restrictions::{self, MoveVerdict};
use crate::walk::scheduler::StepScheduler;
use crate::walk::session::{Session, SessionRegistry};
use crate::walk::waypoint::{Position, WaypointSequence, WaypointStore};

/// Engine-facing settings snapshot. Built from
/// [`crate::storage::Config::walk_settings`] in production, by hand in
/// tests.
#[derive(Debug, Clone)]
pub struct WalkSettings {
    pub title: String,
    /// Progress line with `{current}`/`{total}` placeholders.
    pub subtitle: String,
    /// Dwell time on each waypoint before advancing.
    pub step_delay_secs: u64,
    pub cooldown_secs: u64,
    pub freeze_movement: bool,
    pub block_commands: bool,
    /// Run on completion, `{player}` replaced by the user's name.
    pub completion_commands: Vec<String>,
    pub starting_message: String,
    pub stopped_message: String,
    pub complete_messages: Vec<String>,
}

impl Default for WalkSettings {
    fn default() -> Self {
        Self {
            title: "Guided Tour".into(),
            subtitle: "Step {current} of {total}".into(),
            step_delay_secs: 5,
            cooldown_secs: 300,
            freeze_movement: true,
            block_commands: true,
            completion_commands: Vec::new(),
            starting_message: "Starting the guided tour...".into(),
            stopped_message: "Tour stopped.".into(),
            complete_messages: vec![
                "Tour complete!".into(),
                "Thanks for walking with us.".into(),
            ],
        }
    }
}

/// Orchestrates guided walks. Cheap to clone; all clones share state.
///
/// Requires a running tokio runtime (step timers are spawned tasks).
#[derive(Clone)]
pub struct WalkEngine {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn WaypointStore>,
    presenter: Arc<dyn Presenter>,
    dispatcher: Arc<dyn CommandDispatcher>,
    clock: Arc<dyn Clock>,
    registry: SessionRegistry,
    cooldowns: CooldownTracker,
    scheduler: StepScheduler,
    settings: RwLock<WalkSettings>,
    sequence: RwLock<Arc<WaypointSequence>>,
    observers: RwLock<Vec<Arc<dyn WalkObserver>>>,
    /// Serializes lifecycle operations per user. Entries are retained
    /// after a session ends; they are two pointers each.
    user_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
    self_ref: Weak<Inner>,
}

impl WalkEngine {
    /// Build an engine and load the waypoint sequence from the store.
    pub fn new(
        settings: WalkSettings,
        store: Arc<dyn WaypointStore>,
        presenter: Arc<dyn Presenter>,
        dispatcher: Arc<dyn CommandDispatcher>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let sequence = WaypointSequence::from_unsorted(store.load_sequence()?);
        info!(steps = sequence.len(), "waypoint sequence loaded");
        let inner = Arc::new_cyclic(|self_ref| Inner {
            store,
            presenter,
            dispatcher,
            clock,
            registry: SessionRegistry::new(),
            cooldowns: CooldownTracker::new(),
            scheduler: StepScheduler::new(),
            settings: RwLock::new(settings),
            sequence: RwLock::new(Arc::new(sequence)),
            observers: RwLock::new(Vec::new()),
            user_locks: Mutex::new(HashMap::new()),
            self_ref: self_ref.clone(),
        });
        Ok(Self { inner })
    }

    pub fn register_observer(&self, observer: Arc<dyn WalkObserver>) {
        write_guard(&self.inner.observers).push(observer);
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Begin a walk: exclusivity gate, cooldown gate, configuration
    /// gate, observer veto, then session creation and the immediate
    /// display of the first waypoint.
    pub fn start(&self, user: Uuid, name: &str) -> Result<(), StartError> {
        self.inner.start(user, name)
    }

    /// End a walk explicitly. Cancels the pending timer, notifies
    /// observers and sets the cooldown before returning.
    pub fn stop(&self, user: Uuid) -> Result<(), StopError> {
        let lock = self.inner.user_lock(user);
        let _op = lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.inner.stop_walk(user, false).map(|_| ())
    }

    /// The user went away. Ends any active walk without presentation
    /// calls; returns whether a walk was ended.
    pub fn handle_disconnect(&self, user: Uuid) -> bool {
        let lock = self.inner.user_lock(user);
        let _op = lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.inner.stop_walk(user, true).is_ok()
    }

    /// Swap in new settings and re-read the waypoint sequence from the
    /// store. In-flight walks see either the old or the new sequence
    /// in full, never a mix.
    pub fn reload(&self, settings: WalkSettings) -> Result<()> {
        let sequence = WaypointSequence::from_unsorted(self.inner.store.load_sequence()?);
        let steps = sequence.len();
        *write_guard(&self.inner.settings) = settings;
        *write_guard(&self.inner.sequence) = Arc::new(sequence);
        info!(steps, "configuration reloaded");
        Ok(())
    }

    /// Drain every active session and cancel every outstanding timer.
    pub fn shutdown(&self) {
        for user in self.inner.registry.active_users() {
            let lock = self.inner.user_lock(user);
            let _op = lock.lock().unwrap_or_else(PoisonError::into_inner);
            let _ = self.inner.stop_walk(user, false);
        }
        self.inner.scheduler.cancel_all();
        info!("walk engine shut down");
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self, user: Uuid) -> Option<Session> {
        self.inner.registry.get(user)
    }

    pub fn has_active_session(&self, user: Uuid) -> bool {
        self.inner.registry.get(user).is_some()
    }

    pub fn active_session_count(&self) -> usize {
        self.inner.registry.len()
    }

    pub fn is_on_cooldown(&self, user: Uuid) -> bool {
        self.inner.cooldowns.is_on_cooldown(user, self.inner.clock.now())
    }

    pub fn cooldown_remaining_secs(&self, user: Uuid) -> i64 {
        self.inner.cooldowns.remaining_secs(user, self.inner.clock.now())
    }

    pub fn step_count(&self) -> usize {
        self.inner.sequence().len()
    }

    pub fn has_pending_timer(&self, user: Uuid) -> bool {
        self.inner.scheduler.has_pending(user)
    }

    // ── Restriction hooks ────────────────────────────────────────────

    /// Filter a movement attempt. Only restricts users with an active
    /// walk while `freeze_movement` is on.
    pub fn filter_move(&self, user: Uuid, from: &Position, to: &Position) -> MoveVerdict {
        if !self.inner.settings().freeze_movement || self.inner.registry.get(user).is_none() {
            return MoveVerdict::Allow;
        }
        restrictions::filter_move(from, to)
    }

    /// Whether the user may run `command` right now. Walks' own entry
    /// points always pass so a user can end their walk.
    pub fn command_allowed(&self, user: Uuid, command: &str) -> bool {
        if !self.inner.settings().block_commands || self.inner.registry.get(user).is_none() {
            return true;
        }
        restrictions::command_allowed(command)
    }
}

impl Inner {
    fn start(&self, user: Uuid, name: &str) -> Result<(), StartError> {
        let lock = self.user_lock(user);
        let _op = lock.lock().unwrap_or_else(PoisonError::into_inner);

        if self.registry.get(user).is_some() {
            return Err(StartError::AlreadyActive);
        }
        let now = self.clock.now();
        if self.cooldowns.is_on_cooldown(user, now) {
            return Err(StartError::OnCooldown {
                remaining_secs: self.cooldowns.remaining_secs(user, now),
            });
        }
        let sequence = self.sequence();
        if sequence.is_empty() {
            return Err(StartError::NotConfigured);
        }
        for observer in self.observers() {
            if let StartDecision::Deny(reason) = observer.on_start(user) {
                debug!(user = %user, "walk start vetoed");
                return Err(StartError::Vetoed { reason });
            }
        }
        if !self.registry.try_begin(user, name, now) {
            return Err(StartError::AlreadyActive);
        }
        info!(user = %user, name, steps = sequence.len(), "walk started");

        let settings = self.settings();
        if !settings.starting_message.is_empty() {
            let _ = self
                .presenter
                .show_message(user, std::slice::from_ref(&settings.starting_message));
        }
        self.display_step(user, 0, &sequence);
        Ok(())
    }

    /// Show the waypoint at `slot` and arm the advance timer, or
    /// complete the walk when `slot` is past the end.
    ///
    /// Caller holds the user's operation lock.
    fn display_step(&self, user: Uuid, slot: usize, sequence: &WaypointSequence) {
        if slot >= sequence.len() {
            self.complete_walk(user, sequence.len());
            return;
        }
        let Some(session) = self.registry.get(user) else {
            trace!(user = %user, "step display for finished walk dropped");
            return;
        };
        let Some(waypoint) = sequence.get(slot) else {
            return;
        };

        // The relocate doubles as the reachability probe: a user who
        // cannot be moved is gone, and the step must not be shown.
        if self.presenter.relocate(user, &waypoint.position).is_err() {
            debug!(user = %user, "user unreachable, ending walk");
            let _ = self.stop_walk(user, true);
            return;
        }

        let from = session.current_slot;
        if !self.registry.advance(user, slot) {
            return;
        }
        let total = sequence.len();
        for observer in self.observers() {
            observer.on_step_change(user, from, slot, total);
        }

        let settings = self.settings();
        let progress = settings
            .subtitle
            .replace("{current}", &(slot + 1).to_string())
            .replace("{total}", &total.to_string());
        let heading = if slot == 0 {
            self.presenter
                .show_heading(user, &settings.title, &progress, HeadingTiming::first_step())
        } else {
            self.presenter
                .show_heading(user, "", &progress, HeadingTiming::progress_only())
        };
        let lines: Vec<String> = waypoint
            .message_lines
            .iter()
            .filter(|line| !line.is_empty())
            .cloned()
            .collect();
        let messages = if lines.is_empty() {
            Ok(())
        } else {
            self.presenter.show_message(user, &lines)
        };
        if heading.is_err() || messages.is_err() {
            debug!(user = %user, "user unreachable mid-step, ending walk");
            let _ = self.stop_walk(user, true);
            return;
        }
        debug!(user = %user, slot, total, "waypoint displayed");

        let delay = Duration::from_secs(settings.step_delay_secs);
        let inner = self.self_ref.clone();
        self.scheduler.arm(user, delay, move || {
            if let Some(inner) = inner.upgrade() {
                inner.on_timer(user);
            }
        });
    }

    /// Timer callback: advance to the next slot if the session is
    /// still there, otherwise drop silently.
    fn on_timer(&self, user: Uuid) {
        let lock = self.user_lock(user);
        let _op = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(session) = self.registry.get(user) else {
            trace!(user = %user, "timer fired for finished walk, dropped");
            return;
        };
        let sequence = self.sequence();
        self.display_step(user, session.current_slot + 1, &sequence);
    }

    /// The dwell time of the final waypoint elapsed.
    ///
    /// Caller holds the user's operation lock.
    fn complete_walk(&self, user: Uuid, total: usize) {
        let Some(session) = self.registry.end(user) else {
            return;
        };
        self.scheduler.cancel(user);
        for observer in self.observers() {
            observer.on_complete(user, session.started_at, total);
        }

        let settings = self.settings();
        let lines: Vec<String> = settings
            .complete_messages
            .iter()
            .filter(|line| !line.is_empty())
            .cloned()
            .collect();
        if !lines.is_empty() {
            let _ = self.presenter.show_message(user, &lines);
        }
        for command in &settings.completion_commands {
            let command = command.replace("{player}", &session.user_name);
            self.dispatcher.dispatch(&command);
        }
        self.cooldowns.set(user, self.clock.now(), settings.cooldown_secs);
        self.presenter.clear_heading(user);
        info!(user = %user, steps = total, "walk completed");
    }

    /// End an active walk: remove the session, cancel the timer,
    /// notify observers, set the cooldown.
    ///
    /// Caller holds the user's operation lock.
    fn stop_walk(&self, user: Uuid, quiet: bool) -> Result<Session, StopError> {
        let Some(session) = self.registry.end(user) else {
            return Err(StopError::NotActive);
        };
        self.scheduler.cancel(user);
        let total = self.sequence().len();
        for observer in self.observers() {
            observer.on_stop(user, session.started_at, session.current_slot, total);
        }
        let settings = self.settings();
        self.cooldowns.set(user, self.clock.now(), settings.cooldown_secs);
        if !quiet {
            if !settings.stopped_message.is_empty() {
                let _ = self
                    .presenter
                    .show_message(user, std::slice::from_ref(&settings.stopped_message));
            }
            self.presenter.clear_heading(user);
        }
        debug!(user = %user, steps_completed = session.current_slot, "walk stopped");
        Ok(session)
    }

    // ── Shared-state accessors ───────────────────────────────────────

    fn user_lock(&self, user: Uuid) -> Arc<Mutex<()>> {
        self.user_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(user)
            .or_default()
            .clone()
    }

    /// Snapshot of the observer list so no lock is held across
    /// observer callbacks.
    fn observers(&self) -> Vec<Arc<dyn WalkObserver>> {
        read_guard(&self.observers).clone()
    }

    fn settings(&self) -> WalkSettings {
        read_guard(&self.settings).clone()
    }

    fn sequence(&self) -> Arc<WaypointSequence> {
        read_guard(&self.sequence).clone()
    }
}

fn read_guard<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_guard<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
