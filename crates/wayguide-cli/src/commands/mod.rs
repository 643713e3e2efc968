pub mod admin;
pub mod config;
pub mod tour;

use std::path::PathBuf;

/// Resolve the config file path: explicit flag or the default under
/// the wayguide data directory.
pub(crate) fn config_path(
    path: Option<PathBuf>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(path),
        None => Ok(wayguide_core::storage::data_dir()?.join("config.toml")),
    }
}
