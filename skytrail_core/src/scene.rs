//! Static scene description and viewport handling.
//!
//! Everything here is set up once (or on resize) and never touched by the
//! per-frame playback path.

use crate::colormap::TrailColor;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Mean Earth radius (meters)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Static scene parameters handed to renderers at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Background color (`0xRRGGBB`)
    pub background: u32,

    /// Length of the axes helper (meters, 0 disables it)
    pub axes_length: f64,

    /// Earth sphere radius (meters)
    pub earth_radius: f64,

    /// Earth sphere color (`0xRRGGBB`)
    pub earth_color: u32,

    /// Height of the ground reference the Earth's surface passes through
    /// (meters). Follows `PlaybackConfig::ground_level`, see
    /// [`SceneSettings::with_ground_level`].
    #[serde(skip)]
    pub ground_level: f64,

    /// Balloon marker radius (meters)
    pub balloon_radius: f64,

    /// Tether line color (`0xRRGGBB`)
    pub tether_color: u32,

    /// Wind arrow length per m/s of wind speed (0 hides the arrow)
    pub wind_arrow_scale: f64,

    /// Ambient light intensity
    pub ambient_intensity: f64,

    /// Directional (sun) light intensity
    pub sun_intensity: f64,

    /// Direction the sun light comes from
    pub sun_direction: [f64; 3],

    /// Initial camera position (meters)
    pub camera_position: [f64; 3],

    /// Initial projection
    pub projection: Projection,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            background: 0x87ceeb,
            axes_length: 20_000.0,
            earth_radius: EARTH_RADIUS_M,
            earth_color: 0x2266cc,
            ground_level: 0.0,
            balloon_radius: 300.0,
            tether_color: 0x555555,
            wind_arrow_scale: 10.0,
            ambient_intensity: 0.6,
            sun_intensity: 0.6,
            sun_direction: [1.0, 1.0, 1.0],
            camera_position: [20_000.0, 20_000.0, 20_000.0],
            projection: Projection::default(),
        }
    }
}

impl SceneSettings {
    /// Places the ground reference at `ground_level`.
    pub fn with_ground_level(mut self, ground_level: f64) -> Self {
        self.ground_level = ground_level;
        self
    }

    /// Center of the Earth sphere: directly below the origin, with the
    /// surface passing through the ground reference.
    pub fn earth_center(&self) -> Vector3<f64> {
        Vector3::new(0.0, 0.0, self.ground_level - self.earth_radius)
    }

    pub fn background_color(&self) -> TrailColor {
        TrailColor::from_hex(self.background)
    }

    pub fn earth_color(&self) -> TrailColor {
        TrailColor::from_hex(self.earth_color)
    }

    pub fn tether_color(&self) -> TrailColor {
        TrailColor::from_hex(self.tether_color)
    }
}

/// Output surface size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height, or `None` for a zero-height surface.
    pub fn aspect(&self) -> Option<f64> {
        (self.height > 0).then(|| self.width as f64 / self.height as f64)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Projection {
    /// Vertical field of view (degrees)
    pub fov_deg: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_deg: 60.0,
            aspect: 16.0 / 9.0,
            near: 1.0,
            far: 200_000.0,
        }
    }
}

impl Projection {
    /// Recomputes the aspect ratio for a new viewport.
    ///
    /// A zero-height viewport (minimized window) keeps the previous aspect.
    pub fn resize(&mut self, viewport: Viewport) {
        if let Some(aspect) = viewport.aspect() {
            self.aspect = aspect;
        }
    }
}
