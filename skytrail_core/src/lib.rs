//! SkyTrail Core - Deterministic Flight Playback
//!
//! This library turns a recorded high-altitude balloon flight into a
//! replayable sequence of renderable frames:
//! 1. **Playback**: cursor/stride traversal of the recording with an
//!    append-only trail (`playback`)
//! 2. **Color**: radiation readings normalized and mapped onto a
//!    cool-to-hot palette (`colormap`)
//! 3. **Rendering contract**: the `SceneRenderer` trait that back-ends
//!    implement, plus static scene and viewport settings

pub mod colormap;
pub mod error;
pub mod playback;
pub mod renderer;
pub mod sample;
pub mod scene;

#[cfg(feature = "visualization")]
pub mod visualization;

// Re-export key types for convenience
pub use colormap::{color_map, radiation_color, NormalizationWindow, TrailColor};
pub use error::{CoreError, RenderError};
pub use playback::{
    FlightPlayback, FrameState, PlaybackConfig, PlaybackCursor, PlaybackPhase, TrailBuffer,
    DEFAULT_WIND_HEADING,
};
pub use renderer::{present, RecordingRenderer, RenderCall, SceneRenderer};
pub use sample::{parse_samples, FlightSample};
pub use scene::{Projection, SceneSettings, Viewport, EARTH_RADIUS_M};

#[cfg(feature = "visualization")]
pub use visualization::RerunRenderer;
