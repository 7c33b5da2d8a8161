//! JSON exporter for presented frames.
//!
//! `ExportRenderer` is a [`SceneRenderer`] that records every frame in which
//! the balloon moved, so a playback can be inspected or re-rendered offline.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use skytrail_core::{RenderError, SceneRenderer, TrailColor, Viewport};
use std::fs::File;
use std::io::Write;

fn to_array(p: &Vector3<f64>) -> [f64; 3] {
    [p.x, p.y, p.z]
}

/// A single exported frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportFrame {
    /// Loop iteration the frame was drawn in (0-based)
    pub frame: u64,

    /// Balloon position
    pub position: [f64; 3],

    /// Balloon color (RGB in `[0, 1]`)
    pub color: [f64; 3],

    /// `[ground, balloon]`
    pub tether: [[f64; 3]; 2],

    /// Trail length after this frame
    pub trail_len: usize,

    /// Horizontal wind at the balloon (m/s)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind: Option<[f64; 3]>,
}

/// Complete playback export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlightExport {
    /// Where the flight data came from
    pub source: String,

    /// Total loop iterations drawn
    pub frames_rendered: u64,

    /// Frames in which the balloon moved
    pub frames: Vec<ExportFrame>,

    /// Final trail positions
    pub trail: Vec<[f64; 3]>,

    /// Final trail colors
    pub trail_colors: Vec<[f64; 3]>,

    /// Status messages shown during the run
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub statuses: Vec<String>,
}

impl FlightExport {
    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct PendingFrame {
    position: Option<[f64; 3]>,
    color: [f64; 3],
    tether: [[f64; 3]; 2],
    wind: Option<[f64; 3]>,
}

/// Renderer that builds a [`FlightExport`].
#[derive(Debug, Default)]
pub struct ExportRenderer {
    export: FlightExport,
    pending: PendingFrame,
}

impl ExportRenderer {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            export: FlightExport {
                source: source.into(),
                ..FlightExport::default()
            },
            pending: PendingFrame::default(),
        }
    }

    pub fn export(&self) -> &FlightExport {
        &self.export
    }

    pub fn into_export(self) -> FlightExport {
        self.export
    }
}

impl SceneRenderer for ExportRenderer {
    fn set_balloon_position(&mut self, position: &Vector3<f64>) -> Result<(), RenderError> {
        self.pending.position = Some(to_array(position));
        Ok(())
    }

    fn set_balloon_color(&mut self, color: TrailColor) -> Result<(), RenderError> {
        self.pending.color = color.to_array();
        Ok(())
    }

    fn set_tether_vertices(&mut self, vertices: &[Vector3<f64>; 2]) -> Result<(), RenderError> {
        self.pending.tether = [to_array(&vertices[0]), to_array(&vertices[1])];
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
        self.export.trail = positions.iter().map(to_array).collect();
        self.export.trail_colors = colors.iter().map(|c| c.to_array()).collect();
        Ok(())
    }

    fn set_wind(&mut self, wind: Option<&Vector3<f64>>) -> Result<(), RenderError> {
        self.pending.wind = wind.map(to_array);
        Ok(())
    }

    fn render_frame(&mut self) -> Result<(), RenderError> {
        if let Some(position) = self.pending.position.take() {
            self.export.frames.push(ExportFrame {
                frame: self.export.frames_rendered,
                position,
                color: self.pending.color,
                tether: self.pending.tether,
                trail_len: self.export.trail.len(),
                wind: self.pending.wind.take(),
            });
        }
        self.export.frames_rendered += 1;
        Ok(())
    }

    fn resize(&mut self, _viewport: Viewport) -> Result<(), RenderError> {
        Ok(())
    }

    fn show_status(&mut self, message: &str) -> Result<(), RenderError> {
        self.export.statuses.push(message.to_string());
        Ok(())
    }
}
