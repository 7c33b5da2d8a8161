//! Flight Playback Engine
//! ======================
//!
//! Deterministic, monotonic traversal of a recorded flight. Each tick reads
//! the sample under the cursor, derives the balloon position, the tether down
//! to the ground reference and the radiation color, appends to the trail and
//! advances the cursor by the configured stride.
//!
//! Lifecycle:
//!
//! ```text
//!   Loading ──initialize()──► Playing ──cursor >= len──► Finished
//! ```
//!
//! There is no way back: `tick()` in `Loading` or `Finished` returns `None`
//! and mutates nothing.

use crate::colormap::{radiation_color, NormalizationWindow, TrailColor};
use crate::error::CoreError;
use crate::sample::FlightSample;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_4;
use std::sync::Arc;

/// Wind heading used when the track has no horizontal drift (radians from +x)
pub const DEFAULT_WIND_HEADING: f64 = FRAC_PI_4;

/// Playback tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Samples advanced per tick (playback speed)
    pub stride: usize,

    /// Height of the tether's ground endpoint (meters)
    pub ground_level: f64,

    /// Added to every sample's `z` before display (meters)
    pub altitude_offset: f64,

    /// Radiation range rescaled into `[0, 1]` for coloring
    pub window: NormalizationWindow,

    /// Replace `window` with the recording's radiation extremes on load
    pub auto_window: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            stride: 2,
            ground_level: 0.0,
            altitude_offset: 0.0,
            window: NormalizationWindow::default(),
            auto_window: false,
        }
    }
}

impl PlaybackConfig {
    /// Checks that the configuration can drive a playback.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.stride == 0 {
            return Err(CoreError::invalid_config("stride must be at least 1"));
        }
        if !self.ground_level.is_finite() || !self.altitude_offset.is_finite() {
            return Err(CoreError::invalid_config(
                "ground level and altitude offset must be finite",
            ));
        }
        NormalizationWindow::new(self.window.low, self.window.high)?;
        Ok(())
    }

    /// Sets the stride.
    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride;
        self
    }

    /// Sets the ground reference height.
    pub fn with_ground_level(mut self, ground_level: f64) -> Self {
        self.ground_level = ground_level;
        self
    }

    /// Sets the normalization window.
    pub fn with_window(mut self, window: NormalizationWindow) -> Self {
        self.window = window;
        self
    }
}

/// Index of the next sample to consume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackCursor {
    position: usize,
}

impl PlaybackCursor {
    /// Returns the index the next tick will read.
    pub fn index(&self) -> usize {
        self.position
    }

    fn advance(&mut self, stride: usize) {
        self.position = self.position.saturating_add(stride);
    }
}

/// Append-only trail of visited positions and their colors.
///
/// `positions` and `colors` always have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrailBuffer {
    positions: Vec<Vector3<f64>>,
    colors: Vec<TrailColor>,
}

impl TrailBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, position: Vector3<f64>, color: TrailColor) {
        self.positions.push(position);
        self.colors.push(color);
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vector3<f64>] {
        &self.positions
    }

    pub fn colors(&self) -> &[TrailColor] {
        &self.colors
    }

    /// Iterates `(position, color)` pairs in visiting order.
    pub fn iter(&self) -> impl Iterator<Item = (&Vector3<f64>, &TrailColor)> {
        self.positions.iter().zip(self.colors.iter())
    }
}

/// Renderable state produced by a tick that consumed a sample.
///
/// `trail` is a shared snapshot. Dropping the frame before the next tick
/// lets the playback append in place.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameState {
    /// Index of the sample this frame was built from
    pub sample_index: usize,

    /// Balloon position
    pub position: Vector3<f64>,

    /// `[ground point, balloon position]`
    pub tether: [Vector3<f64>; 2],

    /// Trail after this frame's append
    pub trail: Arc<TrailBuffer>,

    /// Balloon color derived from the sample's radiation
    pub color: TrailColor,

    /// Horizontal wind (m/s) when the recording carries wind speed
    pub wind: Option<Vector3<f64>>,
}

/// Playback lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackPhase {
    /// No samples yet; ticks are no-ops
    Loading,
    /// Cursor is inside the recording
    Playing,
    /// Cursor ran past the end (terminal)
    Finished,
}

/// Owns a recorded flight and replays it one tick at a time.
#[derive(Debug, Clone)]
pub struct FlightPlayback {
    config: PlaybackConfig,
    samples: Option<Vec<FlightSample>>,
    cursor: PlaybackCursor,
    trail: Arc<TrailBuffer>,
}

impl FlightPlayback {
    /// Creates an unloaded playback.
    pub fn new(config: PlaybackConfig) -> Result<Self, CoreError> {
        config.validate()?;
        Ok(Self {
            config,
            samples: None,
            cursor: PlaybackCursor::default(),
            trail: Arc::new(TrailBuffer::new()),
        })
    }

    /// Creates a playback that is already loaded with `samples`.
    pub fn with_samples(
        config: PlaybackConfig,
        samples: Vec<FlightSample>,
    ) -> Result<Self, CoreError> {
        let mut playback = Self::new(config)?;
        playback.initialize(samples)?;
        Ok(playback)
    }

    /// Stores the recording and resets the cursor to 0.
    ///
    /// An empty recording is accepted and leaves the playback `Finished`.
    pub fn initialize(&mut self, samples: Vec<FlightSample>) -> Result<(), CoreError> {
        if let Some(existing) = &self.samples {
            return Err(CoreError::AlreadyLoaded(existing.len()));
        }
        if self.config.auto_window {
            self.config.window = NormalizationWindow::from_samples(&samples);
        }
        tracing::debug!(
            "Playback loaded: {} samples, stride {}, window [{}, {}]",
            samples.len(),
            self.config.stride,
            self.config.window.low,
            self.config.window.high
        );
        self.samples = Some(samples);
        self.cursor = PlaybackCursor::default();
        Ok(())
    }

    /// Returns whether samples have been loaded.
    pub fn is_ready(&self) -> bool {
        self.samples.is_some()
    }

    pub fn phase(&self) -> PlaybackPhase {
        match &self.samples {
            None => PlaybackPhase::Loading,
            Some(samples) if self.cursor.index() >= samples.len() => PlaybackPhase::Finished,
            Some(_) => PlaybackPhase::Playing,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.phase() == PlaybackPhase::Finished
    }

    pub fn cursor(&self) -> PlaybackCursor {
        self.cursor
    }

    pub fn trail(&self) -> &TrailBuffer {
        &self.trail
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Number of loaded samples (0 while loading).
    pub fn sample_count(&self) -> usize {
        self.samples.as_ref().map_or(0, Vec::len)
    }

    /// Advances playback by one frame.
    ///
    /// Returns `None` while loading and once finished; neither case mutates
    /// any state.
    pub fn tick(&mut self) -> Option<FrameState> {
        let samples = self.samples.as_ref()?;
        let sample_index = self.cursor.index();
        let sample = samples.get(sample_index)?;

        let position = Vector3::new(
            sample.x,
            sample.y,
            sample.z + self.config.altitude_offset,
        );
        let ground = Vector3::new(sample.x, sample.y, self.config.ground_level);
        let color = radiation_color(sample.radiation, &self.config.window);
        let wind = sample
            .wind
            .map(|speed| wind_vector(speed, wind_heading(samples, sample_index)));

        Arc::make_mut(&mut self.trail).push(position, color);
        self.cursor.advance(self.config.stride);

        if self.cursor.index() >= samples.len() {
            tracing::debug!("Playback finished after {} trail points", self.trail.len());
        }

        Some(FrameState {
            sample_index,
            position,
            tether: [ground, position],
            trail: Arc::clone(&self.trail),
            color,
            wind,
        })
    }
}

/// Direction the balloon drifts at `index`, from the neighbouring samples.
///
/// The balloon moves with the wind, so the horizontal track gives the wind
/// heading. Falls back to [`DEFAULT_WIND_HEADING`] when there is no drift.
fn wind_heading(samples: &[FlightSample], index: usize) -> f64 {
    let (from, to) = if index > 0 {
        (&samples[index - 1], &samples[index])
    } else if let Some(next) = samples.get(1) {
        (&samples[0], next)
    } else {
        return DEFAULT_WIND_HEADING;
    };
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    if dx == 0.0 && dy == 0.0 {
        DEFAULT_WIND_HEADING
    } else {
        dy.atan2(dx)
    }
}

fn wind_vector(speed: f64, heading: f64) -> Vector3<f64> {
    Vector3::new(speed * heading.cos(), speed * heading.sin(), 0.0)
}
