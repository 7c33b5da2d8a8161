//! SkyTrail Player
//!
//! This crate runs a flight playback against a renderer:
//! - **Player**: the per-frame loop (poll load, tick, present, sleep)
//! - **VirtualClock**: deterministic frame timing for tests and batch runs
//! - **Renderers**: headless `tracing` output, JSON export and fan-out
//!
//! # Usage
//!
//! ```ignore
//! use skytrail_player::{Player, PlayerConfig, HeadlessRenderer};
//! use skytrail_env::{FileSource, TokioContext};
//!
//! let mut player = Player::new(
//!     TokioContext::shared(),
//!     FileSource::new("balloon_flight.json"),
//!     PlaybackConfig::default(),
//!     &SceneSettings::default(),
//!     HeadlessRenderer::new(),
//!     PlayerConfig::headless(),
//! )?;
//! let report = player.run().await?;
//! ```

mod clock;
mod exporter;
mod headless;
mod player;
pub mod settings;

pub use clock::VirtualClock;
pub use exporter::{ExportFrame, ExportRenderer, FlightExport};
pub use headless::{HeadlessRenderer, MultiRenderer, Tee};
pub use player::{PlaybackOutcome, PlaybackReport, Player, PlayerConfig, PlayerError};
pub use settings::SkytrailConfig;
