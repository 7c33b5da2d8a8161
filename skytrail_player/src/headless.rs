//! Renderers for runs without a viewer window.

use nalgebra::Vector3;
use skytrail_core::{Projection, RenderError, SceneRenderer, SceneSettings, TrailColor, Viewport};
use tracing::{debug, info, warn};

/// Renderer that reports scene state through `tracing`.
///
/// Keeps the projection up to date so resize handling can be observed
/// without a window.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    projection: Projection,
    position: Option<Vector3<f64>>,
    color: Option<TrailColor>,
    trail_len: usize,
    wind_speed: Option<f64>,
    frames: u64,
    moved: bool,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl SceneRenderer for HeadlessRenderer {
    fn setup(&mut self, settings: &SceneSettings) -> Result<(), RenderError> {
        self.projection = settings.projection;
        info!(
            "Scene: earth radius {:.0} m, camera at {:?}, fov {}°",
            settings.earth_radius, settings.camera_position, settings.projection.fov_deg
        );
        Ok(())
    }

    fn set_balloon_position(&mut self, position: &Vector3<f64>) -> Result<(), RenderError> {
        self.position = Some(*position);
        self.moved = true;
        Ok(())
    }

    fn set_balloon_color(&mut self, color: TrailColor) -> Result<(), RenderError> {
        self.color = Some(color);
        Ok(())
    }

    fn set_tether_vertices(&mut self, _vertices: &[Vector3<f64>; 2]) -> Result<(), RenderError> {
        Ok(())
    }

    fn set_wind(&mut self, wind: Option<&Vector3<f64>>) -> Result<(), RenderError> {
        self.wind_speed = wind.map(|w| w.norm());
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
        self.trail_len = positions.len();
        Ok(())
    }

    fn render_frame(&mut self) -> Result<(), RenderError> {
        if std::mem::take(&mut self.moved) {
            if let (Some(p), Some(c)) = (self.position, self.color) {
                debug!(
                    "frame {:>5} | pos=({:.1}, {:.1}, {:.1}) | rgb=({:.2}, {:.2}, {:.2}) | trail={} | wind={:?}",
                    self.frames, p.x, p.y, p.z, c.r, c.g, c.b, self.trail_len, self.wind_speed
                );
            }
        }
        self.frames += 1;
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport) -> Result<(), RenderError> {
        self.projection.resize(viewport);
        debug!(
            "Viewport {}x{} (aspect {:.3})",
            viewport.width, viewport.height, self.projection.aspect
        );
        Ok(())
    }

    fn show_status(&mut self, message: &str) -> Result<(), RenderError> {
        warn!("{}", message);
        Ok(())
    }
}

/// Fans every call out to several renderers, in order.
#[derive(Default)]
pub struct MultiRenderer {
    renderers: Vec<Box<dyn SceneRenderer + Send>>,
}

impl MultiRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, renderer: Box<dyn SceneRenderer + Send>) {
        self.renderers.push(renderer);
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }
}

impl SceneRenderer for MultiRenderer {
    fn setup(&mut self, settings: &SceneSettings) -> Result<(), RenderError> {
        self.renderers.iter_mut().try_for_each(|r| r.setup(settings))
    }

    fn set_balloon_position(&mut self, position: &Vector3<f64>) -> Result<(), RenderError> {
        self.renderers
            .iter_mut()
            .try_for_each(|r| r.set_balloon_position(position))
    }

    fn set_balloon_color(&mut self, color: TrailColor) -> Result<(), RenderError> {
        self.renderers
            .iter_mut()
            .try_for_each(|r| r.set_balloon_color(color))
    }

    fn set_tether_vertices(&mut self, vertices: &[Vector3<f64>; 2]) -> Result<(), RenderError> {
        self.renderers
            .iter_mut()
            .try_for_each(|r| r.set_tether_vertices(vertices))
    }

    fn set_trail_geometry(
        &mut self,
        positions: &[Vector3<f64>],
        colors: &[TrailColor],
    ) -> Result<(), RenderError> {
        self.renderers
            .iter_mut()
            .try_for_each(|r| r.set_trail_geometry(positions, colors))
    }

    fn set_wind(&mut self, wind: Option<&Vector3<f64>>) -> Result<(), RenderError> {
        self.renderers.iter_mut().try_for_each(|r| r.set_wind(wind))
    }

    fn render_frame(&mut self) -> Result<(), RenderError> {
        self.renderers.iter_mut().try_for_each(|r| r.render_frame())
    }

    fn resize(&mut self, viewport: Viewport) -> Result<(), RenderError> {
        self.renderers.iter_mut().try_for_each(|r| r.resize(viewport))
    }

    fn show_status(&mut self, message: &str) -> Result<(), RenderError> {
        self.renderers
            .iter_mut()
            .try_for_each(|r| r.show_status(message))
    }
}

/// Drives two renderers of known types, `first` then `second`.
///
/// Unlike [`MultiRenderer`] both halves stay accessible after the run.
#[derive(Debug, Default)]
pub struct Tee<A, B> {
    pub first: A,
    pub second: B,
}

impl<A, B> Tee<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: SceneRenderer, B: SceneRenderer> SceneRenderer for Tee<A, B> {
    fn setup(&mut self, settings: &SceneSettings) -> Result<(), RenderError> {
        self.first.setup(settings)?;
        self.second.setup(settings)
    }

    fn set_balloon_position(&mut self, position: &Vector3<f64>) -> Result<(), RenderError> {
        self.first.set_balloon_position(position)?;
        self.second.set_balloon_position(position)
    }

    fn set_balloon_color(&mut self, color: TrailColor) -> Result<(), RenderError> {
        self.first.set_balloon_color(color)?;
        self.second.set_balloon_color(color)
    }

    fn set_tether_vertices(&mut self, vertices: &[Vector3<f64>; 2]) -> Result<(), RenderError> {
        self.first.set_tether_vertices(vertices)?;
        self.second.set_tether_vertices(vertices)
    }

    fn set_trail_geometry(
        &mut self,
        positions: &[Vector3<f64>],
        colors: &[TrailColor],
    ) -> Result<(), RenderError> {
        self.first.set_trail_geometry(positions, colors)?;
        self.second.set_trail_geometry(positions, colors)
    }

    fn set_wind(&mut self, wind: Option<&Vector3<f64>>) -> Result<(), RenderError> {
        self.first.set_wind(wind)?;
        self.second.set_wind(wind)
    }

    fn render_frame(&mut self) -> Result<(), RenderError> {
        self.first.render_frame()?;
        self.second.render_frame()
    }

    fn resize(&mut self, viewport: Viewport) -> Result<(), RenderError> {
        self.first.resize(viewport)?;
        self.second.resize(viewport)
    }

    fn show_status(&mut self, message: &str) -> Result<(), RenderError> {
        self.first.show_status(message)?;
        self.second.show_status(message)
    }
}
