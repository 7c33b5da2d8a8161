//! Error types for the SkyTrail environment abstraction.

use thiserror::Error;

/// Errors that can occur while obtaining flight data.
///
/// Every variant means the same thing to the player: the data is
/// unavailable and playback never starts.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Reading the recording failed
    #[error("I/O error reading {source_name}: {cause}")]
    Io {
        source_name: String,
        #[source]
        cause: std::io::Error,
    },

    /// The recording is not a valid sample sequence
    #[error("Unparseable flight data from {source_name}: {cause}")]
    Parse {
        source_name: String,
        #[source]
        cause: skytrail_core::CoreError,
    },

    /// The loading task ended without delivering a result
    #[error("Data source dropped before resolving: {0}")]
    SourceDropped(String),
}

impl EnvError {
    /// Creates an I/O error for a named source.
    pub fn io(source_name: impl Into<String>, cause: std::io::Error) -> Self {
        Self::Io {
            source_name: source_name.into(),
            cause,
        }
    }

    /// Creates a parse error for a named source.
    pub fn parse(source_name: impl Into<String>, cause: skytrail_core::CoreError) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            cause,
        }
    }
}
