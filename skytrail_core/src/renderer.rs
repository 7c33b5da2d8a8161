//! Scene renderer contract.
//!
//! The playback engine never draws anything itself. A [`SceneRenderer`]
//! receives the balloon state, tether and trail geometry for the current
//! frame and is asked to draw once per loop iteration via [`present`].

use crate::colormap::TrailColor;
use crate::error::RenderError;
use crate::playback::FrameState;
use crate::scene::{SceneSettings, Viewport};
use nalgebra::Vector3;

/// A rendering back-end driven by the playback loop.
///
/// Geometry setters replace whatever was set before; nothing accumulates
/// inside the renderer.
pub trait SceneRenderer {
    /// Builds the static scene (Earth, axes, lights). Called once at startup.
    fn setup(&mut self, _settings: &SceneSettings) -> Result<(), RenderError> {
        Ok(())
    }

    fn set_balloon_position(&mut self, position: &Vector3<f64>) -> Result<(), RenderError>;

    /// Channels are in `[0, 1]`.
    fn set_balloon_color(&mut self, color: TrailColor) -> Result<(), RenderError>;

    /// Replaces the tether with `[ground, balloon]`.
    fn set_tether_vertices(&mut self, vertices: &[Vector3<f64>; 2]) -> Result<(), RenderError>;

    /// Replaces the whole trail polyline. Both slices have the same length.
    fn set_trail_geometry(
        &mut self,
        positions: &[Vector3<f64>],
        colors: &[TrailColor],
    ) -> Result<(), RenderError>;

    /// Horizontal wind at the balloon (m/s); `None` hides the indicator.
    fn set_wind(&mut self, _wind: Option<&Vector3<f64>>) -> Result<(), RenderError> {
        Ok(())
    }

    /// Draws the current scene state.
    fn render_frame(&mut self) -> Result<(), RenderError>;

    /// Output surface changed size; update projection and surface.
    fn resize(&mut self, viewport: Viewport) -> Result<(), RenderError>;

    /// Shows a diagnostic to the viewer (e.g. flight data unavailable).
    fn show_status(&mut self, message: &str) -> Result<(), RenderError>;
}

/// Pushes a frame's state to `renderer` and draws.
///
/// `render_frame` is called exactly once, whether or not `frame` is present.
pub fn present<R: SceneRenderer + ?Sized>(
    frame: Option<&FrameState>,
    renderer: &mut R,
) -> Result<(), RenderError> {
    if let Some(frame) = frame {
        renderer.set_balloon_position(&frame.position)?;
        renderer.set_balloon_color(frame.color)?;
        renderer.set_tether_vertices(&frame.tether)?;
        renderer.set_trail_geometry(frame.trail.positions(), frame.trail.colors())?;
        renderer.set_wind(frame.wind.as_ref())?;
    }
    renderer.render_frame()
}

/// One call received by a [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    Setup,
    BalloonPosition(Vector3<f64>),
    BalloonColor(TrailColor),
    Tether([Vector3<f64>; 2]),
    Trail { len: usize },
    Wind(Option<Vector3<f64>>),
    RenderFrame,
    Resize(Viewport),
    Status(String),
}

/// In-memory renderer that records every call.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    calls: Vec<RenderCall>,
    trail_positions: Vec<Vector3<f64>>,
    trail_colors: Vec<TrailColor>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[RenderCall] {
        &self.calls
    }

    /// Number of `render_frame` calls.
    pub fn frames_rendered(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, RenderCall::RenderFrame)).count()
    }

    /// Last trail geometry received.
    pub fn trail(&self) -> (&[Vector3<f64>], &[TrailColor]) {
        (&self.trail_positions, &self.trail_colors)
    }

    /// Status messages in the order they were shown.
    pub fn statuses(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                RenderCall::Status(msg) => Some(msg.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Most recent balloon position, if any frame advanced.
    pub fn balloon_position(&self) -> Option<Vector3<f64>> {
        self.calls.iter().rev().find_map(|c| match c {
            RenderCall::BalloonPosition(p) => Some(*p),
            _ => None,
        })
    }
}

impl SceneRenderer for RecordingRenderer {
    fn setup(&mut self, _settings: &SceneSettings) -> Result<(), RenderError> {
        self.calls.push(RenderCall::Setup);
        Ok(())
    }

    fn set_balloon_position(&mut self, position: &Vector3<f64>) -> Result<(), RenderError> {
        self.calls.push(RenderCall::BalloonPosition(*position));
        Ok(())
    }

    fn set_balloon_color(&mut self, color: TrailColor) -> Result<(), RenderError> {
        self.calls.push(RenderCall::BalloonColor(color));
        Ok(())
    }

    fn set_tether_vertices(&mut self, vertices: &[Vector3<f64>; 2]) -> Result<(), RenderError> {
        self.calls.push(RenderCall::Tether(*vertices));
        Ok(())
    }

    fn set_trail_geometry(
        &mut self,
        positions: &[Vector3<f64>],
        colors: &[TrailColor],
    ) -> Result<(), RenderError> {
        if positions.len() != colors.len() {
            return Err(RenderError::TrailMismatch {
                positions: positions.len(),
                colors: colors.len(),
            });
        }
        self.trail_positions = positions.to_vec();
        self.trail_colors = colors.to_vec();
        self.calls.push(RenderCall::Trail { len: positions.len() });
        Ok(())
    }

    fn set_wind(&mut self, wind: Option<&Vector3<f64>>) -> Result<(), RenderError> {
        self.calls.push(RenderCall::Wind(wind.copied()));
        Ok(())
    }

    fn render_frame(&mut self) -> Result<(), RenderError> {
        self.calls.push(RenderCall::RenderFrame);
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport) -> Result<(), RenderError> {
        self.calls.push(RenderCall::Resize(viewport));
        Ok(())
    }

    fn show_status(&mut self, message: &str) -> Result<(), RenderError> {
        self.calls.push(RenderCall::Status(message.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::{FlightPlayback, PlaybackConfig};
    use crate::sample::FlightSample;

    #[test]
    fn test_present_without_frame_only_renders() {
        let mut renderer = RecordingRenderer::new();
        present(None, &mut renderer).unwrap();
        assert_eq!(renderer.calls(), &[RenderCall::RenderFrame]);
    }

    #[test]
    fn test_present_pushes_full_state() {
        let samples = vec![
            FlightSample::new(1.0, 2.0, 300.0, 0.05),
            FlightSample::new(2.0, 3.0, 400.0, 0.10),
            FlightSample::new(3.0, 4.0, 500.0, 0.45),
        ];
        let mut playback = FlightPlayback::with_samples(PlaybackConfig::default(), samples).unwrap();
        let mut renderer = RecordingRenderer::new();

        for _ in 0..4 {
            let frame = playback.tick();
            present(frame.as_ref(), &mut renderer).unwrap();
        }

        assert_eq!(renderer.frames_rendered(), 4);
        assert_eq!(renderer.balloon_position(), Some(Vector3::new(3.0, 4.0, 500.0)));

        let (positions, colors) = renderer.trail();
        assert_eq!(positions.len(), 2);
        assert_eq!(colors.len(), 2);

        let tether = renderer.calls().iter().rev().find_map(|c| match c {
            RenderCall::Tether(t) => Some(*t),
            _ => None,
        });
        assert_eq!(
            tether,
            Some([Vector3::new(3.0, 4.0, 0.0), Vector3::new(3.0, 4.0, 500.0)])
        );
    }

    #[test]
    fn test_present_forwards_wind() {
        let samples = vec![
            FlightSample { wind: Some(12.0), ..FlightSample::new(0.0, 0.0, 10.0, 0.1) },
            FlightSample::new(0.0, 0.0, 20.0, 0.1),
        ];
        let config = PlaybackConfig::default().with_stride(1);
        let mut playback = FlightPlayback::with_samples(config, samples).unwrap();
        let mut renderer = RecordingRenderer::new();
        for _ in 0..2 {
            let frame = playback.tick();
            present(frame.as_ref(), &mut renderer).unwrap();
        }

        let winds: Vec<Option<Vector3<f64>>> = renderer
            .calls()
            .iter()
            .filter_map(|c| match c {
                RenderCall::Wind(w) => Some(*w),
                _ => None,
            })
            .collect();
        assert_eq!(winds.len(), 2);
        assert!(winds[0].is_some_and(|w| (w.norm() - 12.0).abs() < 1e-9));
        assert_eq!(winds[1], None);
    }

    #[test]
    fn test_trail_length_mismatch_rejected() {
        let mut renderer = RecordingRenderer::new();
        let err = renderer
            .set_trail_geometry(&[Vector3::zeros()], &[])
            .unwrap_err();
        assert!(matches!(err, RenderError::TrailMismatch { positions: 1, colors: 0 }));
    }
}
