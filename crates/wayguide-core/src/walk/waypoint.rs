//! Waypoint data model.
//!
//! A waypoint couples a spatial position with the message lines shown
//! while the user is parked there. Index values order the sequence but
//! need not be contiguous; the engine addresses waypoints by their slot
//! in the sorted sequence, never by raw index.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A spatial position plus view orientation in a named space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub space: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default)]
    pub yaw: f32,
    #[serde(default)]
    pub pitch: f32,
}

impl Position {
    pub fn new(space: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self {
            space: space.into(),
            x,
            y,
            z,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// True when the two positions differ in space or coordinates.
    /// View direction (yaw/pitch) is not considered movement.
    pub fn moved_from(&self, other: &Position) -> bool {
        self.space != other.space || self.x != other.x || self.y != other.y || self.z != other.z
    }
}

/// A single stop in the guided walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Waypoint {
    pub index: u32,
    pub position: Position,
    pub message_lines: Vec<String>,
}

/// The loaded waypoint sequence, sorted ascending by index.
///
/// Slots are the 0..N-1 positions of the sorted sequence; a sequence
/// with indices {0, 2, 5} has slots {0, 1, 2}.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaypointSequence {
    waypoints: Vec<Waypoint>,
}

impl WaypointSequence {
    pub fn from_unsorted(mut waypoints: Vec<Waypoint>) -> Self {
        waypoints.sort_by_key(|w| w.index);
        Self { waypoints }
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<&Waypoint> {
        self.waypoints.get(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.iter()
    }
}

/// Backing store for the waypoint sequence.
///
/// The store resolves per-waypoint message fallbacks and drops
/// malformed entries; the engine only ever sees a clean sequence.
/// Administrative writes take effect on the next `load_sequence`.
pub trait WaypointStore: Send + Sync {
    fn load_sequence(&self) -> Result<Vec<Waypoint>>;

    fn set_waypoint(&self, index: u32, position: Position) -> Result<()>;

    /// Overwrite one message line of a waypoint, growing the line list
    /// with empty lines if `line` is past the end.
    fn set_message_line(&self, index: u32, line: usize, text: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn waypoint(index: u32) -> Waypoint {
        Waypoint {
            index,
            position: Position::new("hub", index as f64, 64.0, 0.0),
            message_lines: vec![],
        }
    }

    #[test]
    fn sequence_sorts_by_index() {
        let seq = WaypointSequence::from_unsorted(vec![waypoint(5), waypoint(0), waypoint(2)]);
        let indices: Vec<u32> = seq.iter().map(|w| w.index).collect();
        assert_eq!(indices, vec![0, 2, 5]);
    }

    #[test]
    fn slots_are_contiguous_for_sparse_indices() {
        let seq = WaypointSequence::from_unsorted(vec![waypoint(2), waypoint(7)]);
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.get(0).unwrap().index, 2);
        assert_eq!(seq.get(1).unwrap().index, 7);
        assert!(seq.get(2).is_none());
    }

    #[test]
    fn moved_from_ignores_view_direction() {
        let a = Position::new("hub", 1.0, 2.0, 3.0);
        let mut b = a.clone();
        b.yaw = 90.0;
        b.pitch = -10.0;
        assert!(!b.moved_from(&a));

        b.x += 0.5;
        assert!(b.moved_from(&a));
    }

    #[test]
    fn moved_from_detects_space_change() {
        let a = Position::new("hub", 1.0, 2.0, 3.0);
        let b = Position::new("arena", 1.0, 2.0, 3.0);
        assert!(b.moved_from(&a));
    }
}
