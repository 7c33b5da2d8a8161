//! Error types for the SkyTrail playback engine.

use thiserror::Error;

/// Errors raised while loading or configuring a playback.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The flight record payload could not be decoded
    #[error("Failed to parse flight samples: {0}")]
    Parse(#[from] serde_json::Error),

    /// `initialize` was called on a playback that already holds samples
    #[error("Playback already loaded with {0} samples")]
    AlreadyLoaded(usize),

    /// A configuration value is outside its valid domain
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CoreError {
    /// Creates an invalid-configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

/// Errors reported by a [`SceneRenderer`](crate::renderer::SceneRenderer) back-end.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Trail positions and colors must be the same length
    #[error("Trail geometry mismatch: {positions} positions, {colors} colors")]
    TrailMismatch { positions: usize, colors: usize },

    /// The back-end failed to accept a draw call
    #[error("Render backend error: {0}")]
    Backend(String),
}

impl RenderError {
    /// Creates a back-end error from any displayable cause.
    pub fn backend(cause: impl std::fmt::Display) -> Self {
        Self::Backend(cause.to_string())
    }
}
