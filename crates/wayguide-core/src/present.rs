//! Presentation and command-dispatch seams.
//!
//! The engine talks to the outside world through these traits: moving
//! the user, showing text, and running configured completion commands.
//! A `Presenter` error means the user cannot be reached anymore and is
//! treated by the engine like a disconnect.

use thiserror::Error;
use uuid::Uuid;

use crate::walk::Position;

/// The user is gone (logged off, closed the client, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("user is not reachable")]
pub struct Unreachable;

/// Fade-in / hold / fade-out of a heading, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingTiming {
    pub fade_in_ms: u64,
    pub stay_ms: u64,
    pub fade_out_ms: u64,
}

impl HeadingTiming {
    /// Timing for the prominent first-step heading.
    pub fn first_step() -> Self {
        Self {
            fade_in_ms: 500,
            stay_ms: 5_000,
            fade_out_ms: 500,
        }
    }

    /// Timing for the progress-only heading of later steps.
    pub fn progress_only() -> Self {
        Self {
            fade_in_ms: 500,
            stay_ms: 3_000,
            fade_out_ms: 500,
        }
    }
}

/// Moves users around and puts text in front of them.
pub trait Presenter: Send + Sync {
    fn relocate(&self, user: Uuid, position: &Position) -> Result<(), Unreachable>;

    fn show_message(&self, user: Uuid, lines: &[String]) -> Result<(), Unreachable>;

    /// Show a heading with a progress line. `title` is empty for the
    /// progress-only variant.
    fn show_heading(
        &self,
        user: Uuid,
        title: &str,
        progress: &str,
        timing: HeadingTiming,
    ) -> Result<(), Unreachable>;

    fn clear_heading(&self, user: Uuid);
}

/// Consumes completion commands after placeholder substitution.
pub trait CommandDispatcher: Send + Sync {
    fn dispatch(&self, command: &str);
}
