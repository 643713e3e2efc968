mod config;
mod store;

pub use config::{format_time, Config, MessagesConfig, WalkConfig, WaypointConfig};
pub use store::ConfigStore;

use std::path::PathBuf;

/// Returns `~/.config/wayguide[-dev]/` based on WAYGUIDE_ENV.
///
/// Set WAYGUIDE_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> crate::error::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("WAYGUIDE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("wayguide-dev")
    } else {
        base_dir.join("wayguide")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
