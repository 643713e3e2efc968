//! Core error types for wayguide-core.
//!
//! Rejections (`StartError`, `StopError`) are deliberately separate from
//! `CoreError`: they are expected outcomes of the engine's precondition
//! checks, reported to the caller as user-visible text and never logged
//! as errors.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for wayguide-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Reasons a walk cannot start. The `Display` text is what the user sees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StartError {
    /// A walk for this user is already running.
    #[error("a walk is already active")]
    AlreadyActive,

    /// The user finished or aborted a walk too recently.
    #[error("on cooldown for another {remaining_secs}s")]
    OnCooldown { remaining_secs: i64 },

    /// The waypoint sequence is empty.
    #[error("no waypoints are configured")]
    NotConfigured,

    /// An observer denied the start.
    #[error("{}", .reason.as_deref().unwrap_or("start was vetoed"))]
    Vetoed { reason: Option<String> },
}

/// Reasons a walk cannot stop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StopError {
    /// No walk is running for this user.
    #[error("no walk is active")]
    NotActive,
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
