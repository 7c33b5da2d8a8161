//! Radiation color mapping.
//!
//! Readings are rescaled through a [`NormalizationWindow`] into `[0, 1]` and
//! mapped onto a cool-to-hot palette: low radiation is blue, high radiation
//! is red. The palette is a fixed heuristic, not perceptually uniform.

use crate::error::CoreError;
use crate::sample::FlightSample;
use serde::{Deserialize, Serialize};

/// RGB color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl TrailColor {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from a `0xRRGGBB` literal.
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f64 / 255.0,
            g: ((hex >> 8) & 0xff) as f64 / 255.0,
            b: (hex & 0xff) as f64 / 255.0,
        }
    }

    /// Returns the channels as an array.
    pub fn to_array(self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }

    /// Quantizes to opaque 8-bit RGBA.
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), 255]
    }
}

/// Radiation range that maps linearly onto `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationWindow {
    /// Reading mapped to 0
    pub low: f64,
    /// Reading mapped to 1
    pub high: f64,
}

impl Default for NormalizationWindow {
    fn default() -> Self {
        Self {
            low: 0.05,
            high: 0.45,
        }
    }
}

impl NormalizationWindow {
    /// Creates a window, rejecting non-finite or inverted bounds.
    ///
    /// `low == high` is accepted and maps every reading to 0.
    pub fn new(low: f64, high: f64) -> Result<Self, CoreError> {
        if !low.is_finite() || !high.is_finite() {
            return Err(CoreError::invalid_config(format!(
                "normalization window [{}, {}] must be finite",
                low, high
            )));
        }
        if high < low {
            return Err(CoreError::invalid_config(format!(
                "normalization window [{}, {}] is inverted",
                low, high
            )));
        }
        Ok(Self { low, high })
    }

    /// Derives the window from the recorded radiation extremes.
    ///
    /// Returns the default window for an empty recording.
    pub fn from_samples(samples: &[FlightSample]) -> Self {
        let mut readings = samples.iter().map(|s| s.radiation).filter(|r| r.is_finite());
        let Some(first) = readings.next() else {
            return Self::default();
        };
        let (low, high) = readings.fold((first, first), |(lo, hi), r| (lo.min(r), hi.max(r)));
        Self { low, high }
    }

    /// Rescales a reading. Values outside the window fall outside `[0, 1]`;
    /// a degenerate window (`high <= low`) maps everything to 0.
    pub fn normalize(&self, radiation: f64) -> f64 {
        let span = self.high - self.low;
        if span <= 0.0 {
            return 0.0;
        }
        (radiation - self.low) / span
    }
}

/// Maps a normalized value onto the trail palette.
///
/// `t` is clamped to `[0, 1]` (NaN counts as 0) before the channel formulas
/// are applied, so every channel of the result lies in `[0, 1]`.
pub fn color_map(t: f64) -> TrailColor {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    TrailColor {
        r: (1.5 * t).min(1.0),
        g: (1.2 * (t - 0.4)).max(0.0),
        b: (1.0 - 1.3 * t).max(0.0),
    }
}

/// Normalizes a reading through `window` and maps it to a color.
pub fn radiation_color(radiation: f64, window: &NormalizationWindow) -> TrailColor {
    color_map(window.normalize(radiation))
}
