//! # Wayguide Core Library
//!
//! This library provides the core business logic for Wayguide, a
//! guided-walk system that moves a user through an ordered sequence of
//! waypoints, each displayed for a configured dwell time. All
//! operations are available through the standalone CLI binary; a host
//! embedding the engine (game server, kiosk, ...) is a thin layer over
//! the same library.
//!
//! ## Architecture
//!
//! - **Walk Engine**: a per-user state machine driven by armed step
//!   timers; exactly one walk per user, with cooldown between walks
//! - **Storage**: TOML-based configuration holding the waypoint table,
//!   timing and user-facing texts
//! - **Seams**: injected `Clock`, `Presenter`, `CommandDispatcher` and
//!   `WalkObserver` traits keep the engine free of I/O
//!
//! ## Key Components
//!
//! - [`WalkEngine`]: session lifecycle and step scheduling
//! - [`Config`]: application configuration management
//! - [`ConfigStore`]: config-backed [`WaypointStore`]
//! - [`WalkObserver`]: lifecycle notifications with start veto

pub mod clock;
pub mod error;
pub mod observer;
pub mod present;
pub mod storage;
pub mod walk;

pub use clock::{Clock, SystemClock};
pub use error::{ConfigError, CoreError, Result, StartError, StopError};
pub use observer::{StartDecision, WalkObserver};
pub use present::{CommandDispatcher, HeadingTiming, Presenter, Unreachable};
pub use storage::{format_time, Config, ConfigStore};
pub use walk::{
    MoveVerdict, Position, Session, WalkEngine, WalkSettings, Waypoint, WaypointSequence,
    WaypointStore,
};
