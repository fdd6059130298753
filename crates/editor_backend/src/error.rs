//! Error types for the gizmo subsystem.
//!
//! Only precondition violations surface as errors. Ray misses, unknown ids and
//! missing physics bodies are ordinary outcomes and come back as `Option`/`bool`.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating [`crate::GizmoSettings`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read gizmo settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse gizmo settings: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Invalid gizmo setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Errors raised while constructing gizmos and their controls.
#[derive(Debug, Error)]
pub enum GizmoError {
    #[error("Viewport has no drawable area: {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },

    #[error("Missing layer '{0}' required to place the gizmo overlay")]
    MissingLayer(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
