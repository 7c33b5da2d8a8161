//! Visualization module for SkyTrail using Rerun.io
//!
//! This module renders a flight playback in the Rerun viewer:
//! - Earth as a solid ellipsoid whose surface passes through the ground reference
//! - The balloon as a colored point, with a wind arrow when the recording has wind
//! - The tether as a two-point line strip
//! - The trail as per-vertex colored segments
//!
//! The trail is append-only, so each frame logs only the points added since
//! the previous frame, one entity per point (`world/trail/points/{k}` and
//! `world/trail/segments/{k}`). Latest-at queries keep earlier pieces visible
//! at later frames and the recording grows linearly with the flight.
//!
//! Camera, lighting and window sizing belong to the viewer.
//!
//! Enable with the `visualization` feature flag.

use crate::colormap::TrailColor;
use crate::error::RenderError;
use crate::renderer::SceneRenderer;
use crate::scene::{Projection, SceneSettings, Viewport};
use nalgebra::Vector3;
use rerun::{RecordingStream, RecordingStreamBuilder};

fn to_f32(p: &Vector3<f64>) -> [f32; 3] {
    [p.x as f32, p.y as f32, p.z as f32]
}

/// Rerun-based renderer for flight playback
pub struct RerunRenderer {
    rec: RecordingStream,
    frame: i64,
    balloon_radius: f32,
    tether_color: [u8; 4],
    wind_arrow_scale: f32,
    projection: Projection,

    moved: bool,
    balloon_position: Option<[f32; 3]>,
    balloon_color: [u8; 4],
    tether: Option<[[f32; 3]; 2]>,
    wind: Option<[f32; 3]>,
    wind_shown: bool,

    /// Trail points received so far (logged or pending)
    trail_seen: usize,
    /// Trail points already written to the recording
    trail_logged: usize,
    segments_logged: usize,
    last_trail_point: Option<[f32; 3]>,
    pending_trail: Vec<([f32; 3], [u8; 4])>,
    clear_trail: bool,
}

impl RerunRenderer {
    /// Create a new renderer that spawns the Rerun viewer
    pub fn new(app_id: &str) -> Result<Self, RenderError> {
        let rec = RecordingStreamBuilder::new(app_id)
            .spawn()
            .map_err(RenderError::backend)?;
        Ok(Self::from_stream(rec))
    }

    /// Create a renderer that saves to an `.rrd` file
    pub fn new_to_file(app_id: &str, path: &str) -> Result<Self, RenderError> {
        let rec = RecordingStreamBuilder::new(app_id)
            .save(path)
            .map_err(RenderError::backend)?;
        Ok(Self::from_stream(rec))
    }

    fn from_stream(rec: RecordingStream) -> Self {
        let defaults = SceneSettings::default();
        Self {
            rec,
            frame: 0,
            balloon_radius: defaults.balloon_radius as f32,
            tether_color: defaults.tether_color().to_rgba8(),
            wind_arrow_scale: defaults.wind_arrow_scale as f32,
            projection: defaults.projection,
            moved: false,
            balloon_position: None,
            balloon_color: [255, 0, 0, 255],
            tether: None,
            wind: None,
            wind_shown: false,
            trail_seen: 0,
            trail_logged: 0,
            segments_logged: 0,
            last_trail_point: None,
            pending_trail: Vec::new(),
            clear_trail: false,
        }
    }

    /// Current projection, updated on resize
    pub fn projection(&self) -> Projection {
        self.projection
    }

    /// Trail points written to the recording so far
    pub fn trail_points_logged(&self) -> usize {
        self.trail_logged
    }

    /// Trail segments written to the recording so far
    pub fn trail_segments_logged(&self) -> usize {
        self.segments_logged
    }

    fn log_new_trail(&mut self) -> Result<(), RenderError> {
        if std::mem::take(&mut self.clear_trail) {
            self.rec
                .log("world/trail", &rerun::Clear::recursive())
                .map_err(RenderError::backend)?;
        }

        for (point, color) in std::mem::take(&mut self.pending_trail) {
            let k = self.trail_logged;
            self.rec
                .log(
                    format!("world/trail/points/{}", k),
                    &rerun::Points3D::new([point]).with_colors([color]),
                )
                .map_err(RenderError::backend)?;

            // Segment k ends on point k and takes its color
            if let Some(previous) = self.last_trail_point {
                self.rec
                    .log(
                        format!("world/trail/segments/{}", k),
                        &rerun::LineStrips3D::new([[previous, point]]).with_colors([color]),
                    )
                    .map_err(RenderError::backend)?;
                self.segments_logged += 1;
            }

            self.last_trail_point = Some(point);
            self.trail_logged += 1;
        }
        Ok(())
    }

    fn log_wind(&mut self) -> Result<(), RenderError> {
        match (self.wind, self.balloon_position) {
            (Some(wind), Some(origin)) if self.wind_arrow_scale > 0.0 => {
                let s = self.wind_arrow_scale;
                self.rec
                    .log(
                        "world/balloon/wind",
                        &rerun::Arrows3D::from_vectors([[wind[0] * s, wind[1] * s, wind[2] * s]])
                            .with_origins([origin])
                            .with_colors([[255, 255, 255, 255]]),
                    )
                    .map_err(RenderError::backend)?;
                self.wind_shown = true;
            }
            _ if self.wind_shown => {
                self.rec
                    .log("world/balloon/wind", &rerun::Clear::flat())
                    .map_err(RenderError::backend)?;
                self.wind_shown = false;
            }
            _ => {}
        }
        Ok(())
    }
}

impl SceneRenderer for RerunRenderer {
    fn setup(&mut self, settings: &SceneSettings) -> Result<(), RenderError> {
        self.balloon_radius = settings.balloon_radius as f32;
        self.tether_color = settings.tether_color().to_rgba8();
        self.wind_arrow_scale = settings.wind_arrow_scale as f32;
        self.projection = settings.projection;

        self.rec
            .log_static("world", &rerun::ViewCoordinates::RIGHT_HAND_Z_UP())
            .map_err(RenderError::backend)?;

        let r = settings.earth_radius as f32;
        self.rec
            .log_static(
                "world/earth",
                &rerun::Ellipsoids3D::from_centers_and_half_sizes(
                    [to_f32(&settings.earth_center())],
                    [[r, r, r]],
                )
                .with_colors([settings.earth_color().to_rgba8()])
                .with_fill_mode(rerun::FillMode::Solid),
            )
            .map_err(RenderError::backend)?;

        if settings.axes_length > 0.0 {
            let len = settings.axes_length as f32;
            self.rec
                .log_static(
                    "world/axes",
                    &rerun::Arrows3D::from_vectors([[len, 0.0, 0.0], [0.0, len, 0.0], [0.0, 0.0, len]])
                        .with_colors([[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255]]),
                )
                .map_err(RenderError::backend)?;
        }

        Ok(())
    }

    fn set_balloon_position(&mut self, position: &Vector3<f64>) -> Result<(), RenderError> {
        self.balloon_position = Some(to_f32(position));
        self.moved = true;
        Ok(())
    }

    fn set_balloon_color(&mut self, color: TrailColor) -> Result<(), RenderError> {
        self.balloon_color = color.to_rgba8();
        Ok(())
    }

    fn set_tether_vertices(&mut self, vertices: &[Vector3<f64>; 2]) -> Result<(), RenderError> {
        self.tether = Some([to_f32(&vertices[0]), to_f32(&vertices[1])]);
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

        // A shorter trail belongs to a different playback
        if positions.len() < self.trail_seen {
            self.trail_seen = 0;
            self.trail_logged = 0;
            self.segments_logged = 0;
            self.last_trail_point = None;
            self.pending_trail.clear();
            self.clear_trail = true;
        }

        self.pending_trail.extend(
            positions[self.trail_seen..]
                .iter()
                .zip(&colors[self.trail_seen..])
                .map(|(p, c)| (to_f32(p), c.to_rgba8())),
        );
        self.trail_seen = positions.len();
        Ok(())
    }

    fn set_wind(&mut self, wind: Option<&Vector3<f64>>) -> Result<(), RenderError> {
        self.wind = wind.map(to_f32);
        Ok(())
    }

    fn render_frame(&mut self) -> Result<(), RenderError> {
        self.rec.set_time_sequence("frame", self.frame);
        self.frame += 1;

        if std::mem::take(&mut self.moved) {
            if let Some(position) = self.balloon_position {
                self.rec
                    .log(
                        "world/balloon",
                        &rerun::Points3D::new([position])
                            .with_colors([self.balloon_color])
                            .with_radii([self.balloon_radius]),
                    )
                    .map_err(RenderError::backend)?;
            }

            if let Some(tether) = self.tether {
                self.rec
                    .log(
                        "world/tether",
                        &rerun::LineStrips3D::new([tether]).with_colors([self.tether_color]),
                    )
                    .map_err(RenderError::backend)?;
            }

            self.log_wind()?;
        }

        self.log_new_trail()
    }

    fn resize(&mut self, viewport: Viewport) -> Result<(), RenderError> {
        self.projection.resize(viewport);
        tracing::debug!(
            "Viewport {}x{} (aspect {:.3})",
            viewport.width,
            viewport.height,
            self.projection.aspect
        );
        Ok(())
    }

    fn show_status(&mut self, message: &str) -> Result<(), RenderError> {
        self.rec
            .log("logs/status", &rerun::TextLog::new(message))
            .map_err(RenderError::backend)?;
        Ok(())
    }
}
