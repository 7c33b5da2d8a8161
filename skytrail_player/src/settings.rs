//! Configuration file for the `skytrail` binary.
//!
//! Every field is optional; missing sections fall back to their defaults:
//!
//! ```json
//! {
//!   "playback": { "stride": 4, "ground_level": 0.0 },
//!   "scene": { "earth_radius": 6371000.0, "balloon_radius": 150.0 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use skytrail_core::{PlaybackConfig, SceneSettings};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {cause}")]
    Io {
        path: String,
        #[source]
        cause: std::io::Error,
    },

    #[error("Invalid config {path}: {cause}")]
    Parse {
        path: String,
        #[source]
        cause: serde_json::Error,
    },
}

/// Playback and scene settings loaded from a JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkytrailConfig {
    pub playback: PlaybackConfig,
    pub scene: SceneSettings,
}

impl SkytrailConfig {
    /// Parses a configuration document.
    pub fn from_json(json: &str, path: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|cause| ConfigError::Parse {
            path: path.to_string(),
            cause,
        })
    }

    /// Reads and parses a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let json = std::fs::read_to_string(path).map_err(|cause| ConfigError::Io {
            path: display.clone(),
            cause,
        })?;
        Self::from_json(&json, &display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config() {
        let config = SkytrailConfig::from_json(
            r#"{"playback": {"stride": 4}, "scene": {"balloon_radius": 150.0}}"#,
            "inline",
        )
        .unwrap();
        assert_eq!(config.playback.stride, 4);
        assert_eq!(config.playback.ground_level, 0.0);
        assert_eq!(config.scene.balloon_radius, 150.0);
        assert_eq!(config.scene.tether_color, 0x555555);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = SkytrailConfig::from_json("{}", "inline").unwrap();
        assert_eq!(config.playback.stride, 2);
        assert_eq!(config.scene, SceneSettings::default());
    }

    #[test]
    fn test_bad_config_names_path() {
        let err = SkytrailConfig::from_json("[1, 2]", "scene.json").unwrap_err();
        assert!(err.to_string().contains("scene.json"));
    }
}
