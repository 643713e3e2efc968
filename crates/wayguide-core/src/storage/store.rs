//! Config-file-backed waypoint store.
//!
//! Waypoints live in the `[waypoints]` table of the TOML config, keyed
//! by index. Malformed entries (non-numeric key, unresolvable space)
//! are skipped with a warning so one bad entry cannot take down the
//! rest of the sequence.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::warn;

use super::config::{Config, WaypointConfig};
use crate::error::Result;
use crate::walk::{Position, Waypoint, WaypointStore};

pub struct ConfigStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles on the backing file.
    write_lock: Mutex<()>,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store over the default config path.
    pub fn at_default_path() -> Result<Self> {
        Ok(Self::new(super::data_dir()?.join("config.toml")))
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn load(&self) -> Result<Config> {
        Ok(Config::load_from(&self.path)?)
    }
}

impl WaypointStore for ConfigStore {
    fn load_sequence(&self) -> Result<Vec<Waypoint>> {
        let config = self.load()?;
        Ok(sequence_from_config(&config))
    }

    fn set_waypoint(&self, index: u32, position: Position) -> Result<()> {
        let _guard = self.guard();
        let mut config = self.load()?;
        let entry = config
            .waypoints
            .entry(index.to_string())
            .or_insert_with(default_entry);
        entry.space = position.space;
        entry.x = position.x;
        entry.y = position.y;
        entry.z = position.z;
        entry.yaw = position.yaw;
        entry.pitch = position.pitch;
        config.save_to(&self.path)?;
        Ok(())
    }

    fn set_message_line(&self, index: u32, line: usize, text: &str) -> Result<()> {
        let _guard = self.guard();
        let mut config = self.load()?;
        let entry = config
            .waypoints
            .entry(index.to_string())
            .or_insert_with(default_entry);
        while entry.motd.len() <= line {
            entry.motd.push(String::new());
        }
        entry.motd[line] = text.to_string();
        config.save_to(&self.path)?;
        Ok(())
    }
}

fn default_entry() -> WaypointConfig {
    WaypointConfig {
        space: String::new(),
        x: 0.0,
        y: 0.0,
        z: 0.0,
        yaw: 0.0,
        pitch: 0.0,
        motd: Vec::new(),
    }
}

/// Decode the `[waypoints]` table into a sorted sequence, applying the
/// global MOTD fallback for waypoints without their own lines.
fn sequence_from_config(config: &Config) -> Vec<Waypoint> {
    let mut waypoints = Vec::new();
    for (key, entry) in &config.waypoints {
        let Ok(index) = key.parse::<u32>() else {
            warn!(key = %key, "invalid waypoint key in config, skipping");
            continue;
        };
        if entry.space.is_empty() {
            warn!(index, "waypoint has no space, skipping");
            continue;
        }
        let message_lines = if entry.motd.is_empty() {
            config.walk.motd.clone()
        } else {
            entry.motd.clone()
        };
        waypoints.push(Waypoint {
            index,
            position: Position {
                space: entry.space.clone(),
                x: entry.x,
                y: entry.y,
                z: entry.z,
                yaw: entry.yaw,
                pitch: entry.pitch,
            },
            message_lines,
        });
    }
    waypoints.sort_by_key(|w| w.index);
    waypoints
}
