//! Recorded flight samples.
//!
//! A flight recording is a JSON array of records, one per sample time, in
//! playback order:
//!
//! ```text
//! [{"x": 7.07, "y": 7.07, "z": 0.0, "radiation": 0.09, "wind": 10.0}, ...]
//! ```
//!
//! `wind` is optional. Extra fields are ignored.

use crate::error::CoreError;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// One recorded observation of the balloon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightSample {
    /// East-west displacement (meters)
    pub x: f64,

    /// North-south displacement (meters)
    pub y: f64,

    /// Altitude above the ground reference (meters)
    pub z: f64,

    /// Radiation reading (µSv/h)
    pub radiation: f64,

    /// Wind speed at the sample (m/s), when the recording carries it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind: Option<f64>,
}

impl FlightSample {
    /// Creates a sample without wind information.
    pub fn new(x: f64, y: f64, z: f64, radiation: f64) -> Self {
        Self {
            x,
            y,
            z,
            radiation,
            wind: None,
        }
    }

    /// Returns the sample position as a vector.
    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }
}

/// Decodes a flight recording from JSON bytes.
pub fn parse_samples(bytes: &[u8]) -> Result<Vec<FlightSample>, CoreError> {
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recording() {
        let json = br#"[
            {"x": 0.0, "y": 0.0, "z": 0.0, "radiation": 0.05},
            {"x": 7.5, "y": 7.5, "z": 8.0, "radiation": 0.11, "wind": 10.016}
        ]"#;

        let samples = parse_samples(json).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].wind, None);
        assert_eq!(samples[1].wind, Some(10.016));
        assert_eq!(samples[1].position(), Vector3::new(7.5, 7.5, 8.0));
    }

    #[test]
    fn test_parse_ignores_unknown_fields() {
        let json = br#"[{"x": 1, "y": 2, "z": 3, "radiation": 0.2, "t": 17}]"#;
        let samples = parse_samples(json).unwrap();
        assert_eq!(samples[0], FlightSample::new(1.0, 2.0, 3.0, 0.2));
    }

    #[test]
    fn test_parse_empty_recording() {
        assert!(parse_samples(b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_missing_radiation() {
        let err = parse_samples(br#"[{"x": 1, "y": 2, "z": 3}]"#).unwrap_err();
        assert!(matches!(err, CoreError::Parse(_)));
    }
}
