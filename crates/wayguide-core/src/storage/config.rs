//! TOML-based application configuration.
//!
//! Stores the tour definition and user-facing texts:
//! - Title, subtitle format and dwell/cooldown timing
//! - Movement and command restriction flags
//! - Global fallback message lines and completion commands
//! - The waypoint table, keyed by index
//! - The messages table for every rejection and lifecycle moment
//!
//! Configuration is stored at `~/.config/wayguide/config.toml`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::walk::WalkSettings;

/// Walk behaviour configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkConfig {
    #[serde(default = "default_title")]
    pub title: String,
    /// Progress line with `{current}`/`{total}` placeholders.
    #[serde(default = "default_subtitle")]
    pub subtitle: String,
    /// Dwell time on each waypoint, in seconds.
    #[serde(default = "default_step_delay")]
    pub step_delay_secs: u64,
    /// Wait required between two walks of the same user, in seconds.
    #[serde(default = "default_cooldown")]
    pub cooldown_secs: u64,
    #[serde(default = "default_true")]
    pub freeze_movement: bool,
    #[serde(default = "default_true")]
    pub block_commands: bool,
    /// Fallback message lines for waypoints that define none.
    #[serde(default)]
    pub motd: Vec<String>,
    /// Commands run on completion; `{player}` is replaced by the
    /// user's name.
    #[serde(default)]
    pub completion_commands: Vec<String>,
}

/// User-facing message texts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesConfig {
    #[serde(default = "default_msg_already_active")]
    pub already_active: String,
    /// `{time}` is replaced by the formatted remaining cooldown.
    #[serde(default = "default_msg_on_cooldown")]
    pub on_cooldown: String,
    #[serde(default = "default_msg_not_configured")]
    pub not_configured: String,
    #[serde(default = "default_msg_starting")]
    pub starting: String,
    #[serde(default = "default_msg_stopped")]
    pub stopped: String,
    #[serde(default = "default_msg_not_active")]
    pub not_active: String,
    #[serde(default = "default_msg_complete_heading")]
    pub complete_heading: String,
    #[serde(default = "default_msg_complete_note")]
    pub complete_note: String,
    #[serde(default = "default_msg_command_blocked")]
    pub command_blocked: String,
}

impl MessagesConfig {
    /// The cooldown rejection text with `{time}` filled in.
    pub fn on_cooldown_text(&self, remaining_secs: i64) -> String {
        self.on_cooldown.replace("{time}", &format_time(remaining_secs))
    }
}

/// One waypoint as stored in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaypointConfig {
    /// Named space the coordinates live in. Entries with an empty
    /// space cannot be resolved and are skipped at load.
    #[serde(default)]
    pub space: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default)]
    pub yaw: f32,
    #[serde(default)]
    pub pitch: f32,
    /// Message lines for this waypoint; empty means use the global
    /// fallback.
    #[serde(default)]
    pub motd: Vec<String>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/wayguide/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub walk: WalkConfig,
    #[serde(default)]
    pub messages: MessagesConfig,
    /// Waypoints keyed by their index as a string (TOML table keys).
    #[serde(default)]
    pub waypoints: BTreeMap<String, WaypointConfig>,
}

// Default functions
fn default_title() -> String {
    "Guided Tour".into()
}
fn default_subtitle() -> String {
    "Step {current} of {total}".into()
}
fn default_step_delay() -> u64 {
    5
}
fn default_cooldown() -> u64 {
    300
}
fn default_true() -> bool {
    true
}
fn default_msg_already_active() -> String {
    "A walk is already in progress.".into()
}
fn default_msg_on_cooldown() -> String {
    "You can start again in {time}.".into()
}
fn default_msg_not_configured() -> String {
    "No waypoints are configured yet.".into()
}
fn default_msg_starting() -> String {
    "Starting the guided tour...".into()
}
fn default_msg_stopped() -> String {
    "Tour stopped.".into()
}
fn default_msg_not_active() -> String {
    "No tour is active.".into()
}
fn default_msg_complete_heading() -> String {
    "Tour complete!".into()
}
fn default_msg_complete_note() -> String {
    "Thanks for walking with us.".into()
}
fn default_msg_command_blocked() -> String {
    "Commands are disabled during the tour.".into()
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            subtitle: default_subtitle(),
            step_delay_secs: default_step_delay(),
            cooldown_secs: default_cooldown(),
            freeze_movement: true,
            block_commands: true,
            motd: Vec::new(),
            completion_commands: Vec::new(),
        }
    }
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            already_active: default_msg_already_active(),
            on_cooldown: default_msg_on_cooldown(),
            not_configured: default_msg_not_configured(),
            starting: default_msg_starting(),
            stopped: default_msg_stopped(),
            not_active: default_msg_not_active(),
            complete_heading: default_msg_complete_heading(),
            complete_note: default_msg_complete_note(),
            command_blocked: default_msg_command_blocked(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| {
                                    invalid(format!("cannot parse '{value}' as number"))
                                })?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        }

        Err(ConfigError::UnknownKey(key.to_string()))
    }

    fn path() -> crate::error::Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default path, writing defaults on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be
    /// parsed, or if the default config cannot be written to disk.
    pub fn load() -> crate::error::Result<Self> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)
                    .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Load from an explicit path; a missing file yields defaults
    /// without writing anything.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default path.
    pub fn save(&self) -> crate::error::Result<()> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(())
    }

    /// Persist to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| failed(e.to_string()))?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| failed(e.to_string()))?;
        Ok(())
    }

    /// Load from the default path, returning defaults on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key and persist to the default path.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be
    /// parsed, or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> crate::error::Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json)?;
        self.save()?;
        Ok(())
    }

    /// The engine-facing settings snapshot.
    pub fn walk_settings(&self) -> WalkSettings {
        WalkSettings {
            title: self.walk.title.clone(),
            subtitle: self.walk.subtitle.clone(),
            step_delay_secs: self.walk.step_delay_secs,
            cooldown_secs: self.walk.cooldown_secs,
            freeze_movement: self.walk.freeze_movement,
            block_commands: self.walk.block_commands,
            completion_commands: self.walk.completion_commands.clone(),
            starting_message: self.messages.starting.clone(),
            stopped_message: self.messages.stopped.clone(),
            complete_messages: vec![
                self.messages.complete_heading.clone(),
                self.messages.complete_note.clone(),
            ],
        }
    }
}

/// Render a second count as `"4m 30s"` / `"45s"`.
pub fn format_time(secs: i64) -> String {
    let secs = secs.max(0);
    let minutes = secs / 60;
    let seconds = secs % 60;
    if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.walk.step_delay_secs, 5);
        assert_eq!(parsed.walk.cooldown_secs, 300);
        assert!(parsed.walk.freeze_movement);
        assert!(parsed.waypoints.is_empty());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("walk.freeze_movement").as_deref(), Some("true"));
        assert_eq!(cfg.get("walk.step_delay_secs").as_deref(), Some("5"));
        assert_eq!(cfg.get("walk.title").as_deref(), Some("Guided Tour"));
        assert!(cfg.get("walk.missing_key").is_none());
    }

    #[test]
    fn set_json_value_by_path_updates_nested_bool() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        Config::set_json_value_by_path(&mut json, "walk.freeze_movement", "false").unwrap();
        assert_eq!(
            Config::get_json_value_by_path(&json, "walk.freeze_movement").unwrap(),
            &serde_json::Value::Bool(false)
        );
    }

    #[test]
    fn set_json_value_by_path_updates_nested_number() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        Config::set_json_value_by_path(&mut json, "walk.cooldown_secs", "600").unwrap();
        assert_eq!(
            Config::get_json_value_by_path(&json, "walk.cooldown_secs").unwrap(),
            &serde_json::Value::Number(600.into())
        );
    }

    #[test]
    fn set_json_value_by_path_rejects_unknown_key() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        let result = Config::set_json_value_by_path(&mut json, "walk.nonexistent_key", "value");
        assert!(matches!(result, Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn set_json_value_by_path_rejects_invalid_type() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        let result = Config::set_json_value_by_path(&mut json, "walk.freeze_movement", "maybe");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn walk_settings_carries_messages() {
        let mut cfg = Config::default();
        cfg.walk.title = "Harbour Tour".into();
        cfg.messages.starting = "Off we go".into();
        let settings = cfg.walk_settings();
        assert_eq!(settings.title, "Harbour Tour");
        assert_eq!(settings.starting_message, "Off we go");
        assert_eq!(settings.complete_messages.len(), 2);
    }

    #[test]
    fn on_cooldown_text_substitutes_time() {
        let messages = MessagesConfig::default();
        assert_eq!(
            messages.on_cooldown_text(270),
            "You can start again in 4m 30s."
        );
    }

    #[test]
    fn format_time_renders_minutes_and_seconds() {
        assert_eq!(format_time(0), "0s");
        assert_eq!(format_time(45), "45s");
        assert_eq!(format_time(60), "1m 0s");
        assert_eq!(format_time(270), "4m 30s");
        assert_eq!(format_time(-5), "0s");
    }

    #[test]
    fn waypoints_parse_from_toml_table() {
        let toml_str = r#"
            [walk]
            title = "Harbour Tour"

            [waypoints.0]
            space = "hub"
            x = 10.0
            y = 64.0
            z = -3.5
            motd = ["Welcome to the harbour"]

            [waypoints.2]
            space = "hub"
            x = 20.0
            y = 64.0
            z = 7.0
        "#;
        let cfg: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.waypoints.len(), 2);
        assert_eq!(cfg.waypoints["0"].motd.len(), 1);
        assert!(cfg.waypoints["2"].motd.is_empty());
    }
}
