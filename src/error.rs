//! # Error Types
//!
//! Errors surfaced by the streaming world. Coordinate-math invariant
//! violations are not represented here: those panic at the point of detection.

use thiserror::Error;

/// Errors returned by world construction, configuration loading and ticking.
#[derive(Debug, Error)]
pub enum WorldError {
    /// The configuration failed validation.
    #[error("invalid world configuration: {0}")]
    InvalidConfig(String),

    /// The configuration file could not be read.
    #[error("failed to read world configuration: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// The configuration file is not valid JSON for `WorldConfig`.
    #[error("failed to parse world configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// The background updater thread has terminated. World streaming can no
    /// longer make progress.
    #[error("background world updater is no longer running")]
    UpdaterStalled,

    /// The OS refused to start the background updater thread.
    #[error("failed to spawn background world updater: {0}")]
    UpdaterSpawn(#[source] std::io::Error),
}
