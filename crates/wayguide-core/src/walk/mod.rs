mod cooldown;
mod engine;
pub mod restrictions;
mod scheduler;
mod session;
mod waypoint;

pub use cooldown::CooldownTracker;
pub use engine::{WalkEngine, WalkSettings};
pub use restrictions::MoveVerdict;
pub use scheduler::StepScheduler;
pub use session::{Session, SessionRegistry};
pub use waypoint::{Position, Waypoint, WaypointSequence, WaypointStore};
