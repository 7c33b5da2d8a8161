//! Player - the per-frame playback loop.
//!
//! The loop starts immediately, before any flight data exists. Each
//! iteration polls the one-shot data load, ticks the playback, presents the
//! result and sleeps one frame interval:
//!
//! ```text
//!   ┌──────────────┐   ┌──────────┐   ┌───────────┐   ┌────────────┐
//!   │ poll DataLoad│──►│  tick()  │──►│ present() │──►│ ctx.sleep()│──┐
//!   └──────────────┘   └──────────┘   └───────────┘   └────────────┘  │
//!          ▲                                                          │
//!          └──────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use skytrail_core::{
    present, CoreError, FlightPlayback, FrameState, PlaybackConfig, RenderError, SceneRenderer,
    SceneSettings, Viewport,
};
use skytrail_env::{DataLoad, FlightDataSource, FrameContext, LoadPoll};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

/// Errors that abort the player loop.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Configuration for a player run.
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Loop rate in Hz
    pub frame_rate_hz: u32,

    /// Initial output surface
    pub viewport: Viewport,

    /// Stop after this many frames (None = run for the lifetime of the view)
    pub max_frames: Option<u64>,

    /// Stop once playback has finished (headless runs)
    pub stop_when_finished: bool,

    /// Extra frames to render after playback finishes before stopping
    pub linger_frames: u64,

    /// Stop as soon as the data is known to be unavailable
    pub stop_on_unavailable: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            frame_rate_hz: 60,
            viewport: Viewport::default(),
            max_frames: None,
            stop_when_finished: false,
            linger_frames: 0,
            stop_on_unavailable: false,
        }
    }
}

impl PlayerConfig {
    /// Configuration for a batch run: stop on finish or failure.
    pub fn headless() -> Self {
        Self {
            stop_when_finished: true,
            stop_on_unavailable: true,
            ..Self::default()
        }
    }

    /// Time between frames.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frame_rate_hz.max(1) as f64)
    }
}

/// Why the loop stopped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlaybackOutcome {
    /// Every sample the stride visits has been shown
    Finished,
    /// The flight data never became available
    DataUnavailable { reason: String },
    /// `max_frames` was reached first
    FrameLimit,
}

/// Summary of a player run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackReport {
    pub source: String,
    pub frames_rendered: u64,
    pub samples_loaded: usize,
    pub samples_consumed: usize,
    pub trail_len: usize,
    pub elapsed_secs: f64,
    pub outcome: PlaybackOutcome,
}

/// Owns the playback state and drives a renderer once per frame.
pub struct Player<Ctx: FrameContext, R: SceneRenderer> {
    ctx: Arc<Ctx>,
    config: PlayerConfig,
    playback: FlightPlayback,
    load: DataLoad,
    renderer: R,
    frames_rendered: u64,
    finished_at: Option<u64>,
    unavailable: Option<String>,
}

impl<Ctx: FrameContext, R: SceneRenderer> Player<Ctx, R> {
    /// Sets up the scene and starts loading `source` in the background.
    ///
    /// The scene's ground reference follows `playback_config.ground_level`.
    pub fn new<S: FlightDataSource>(
        ctx: Arc<Ctx>,
        source: S,
        playback_config: PlaybackConfig,
        settings: &SceneSettings,
        mut renderer: R,
        config: PlayerConfig,
    ) -> Result<Self, PlayerError> {
        let settings = settings
            .clone()
            .with_ground_level(playback_config.ground_level);
        let playback = FlightPlayback::new(playback_config)?;

        renderer.setup(&settings)?;
        renderer.resize(config.viewport)?;

        let load = DataLoad::start(ctx.as_ref(), source);

        Ok(Self {
            ctx,
            config,
            playback,
            load,
            renderer,
            frames_rendered: 0,
            finished_at: None,
            unavailable: None,
        })
    }

    pub fn playback(&self) -> &FlightPlayback {
        &self.playback
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Forwards a viewport change. Valid at any time, including before the
    /// data has loaded.
    pub fn resize(&mut self, viewport: Viewport) -> Result<(), PlayerError> {
        self.config.viewport = viewport;
        self.renderer.resize(viewport)?;
        Ok(())
    }

    /// Runs one loop iteration without sleeping.
    ///
    /// Returns the frame state when playback advanced.
    pub fn step(&mut self) -> Result<Option<FrameState>, PlayerError> {
        match self.load.poll() {
            LoadPoll::Ready(samples) => {
                info!(
                    "Flight data ready: {} samples from {}",
                    samples.len(),
                    self.load.source_name()
                );
                self.playback.initialize(samples)?;
            }
            LoadPoll::Failed(e) => {
                let reason = e.to_string();
                error!("Flight data unavailable: {}", reason);
                self.renderer
                    .show_status(&format!("Flight data unavailable: {}", reason))?;
                self.unavailable = Some(reason);
            }
            LoadPoll::Pending | LoadPoll::Settled => {}
        }

        let frame = self.playback.tick();
        present(frame.as_ref(), &mut self.renderer)?;
        self.frames_rendered += 1;

        if self.finished_at.is_none() && self.playback.is_finished() {
            self.finished_at = Some(self.frames_rendered);
            info!(
                "Playback finished at frame {} ({} trail points)",
                self.frames_rendered,
                self.playback.trail().len()
            );
        }

        Ok(frame)
    }

    /// Runs the loop until a stop condition from [`PlayerConfig`] holds.
    ///
    /// With the default configuration this never returns on its own.
    pub async fn run(&mut self) -> Result<PlaybackReport, PlayerError> {
        let interval = self.config.frame_interval();
        loop {
            self.step()?;

            if let Some(outcome) = self.stop_reason() {
                debug!("Player stopping after {} frames", self.frames_rendered);
                return Ok(self.report(outcome));
            }

            self.ctx.sleep(interval).await;
        }
    }

    fn stop_reason(&self) -> Option<PlaybackOutcome> {
        if self.config.stop_on_unavailable {
            if let Some(reason) = &self.unavailable {
                return Some(PlaybackOutcome::DataUnavailable {
                    reason: reason.clone(),
                });
            }
        }
        if self.config.stop_when_finished {
            if let Some(at) = self.finished_at {
                if self.frames_rendered >= at + self.config.linger_frames {
                    return Some(PlaybackOutcome::Finished);
                }
            }
        }
        match self.config.max_frames {
            Some(max) if self.frames_rendered >= max => Some(PlaybackOutcome::FrameLimit),
            _ => None,
        }
    }

    /// Builds a report for the current state.
    pub fn report(&self, outcome: PlaybackOutcome) -> PlaybackReport {
        PlaybackReport {
            source: self.load.source_name().to_string(),
            frames_rendered: self.frames_rendered,
            samples_loaded: self.playback.sample_count(),
            samples_consumed: self.playback.trail().len(),
            trail_len: self.playback.trail().len(),
            elapsed_secs: self.ctx.now().as_secs_f64(),
            outcome,
        }
    }

    /// Outcome as of now, for runs interrupted from outside.
    pub fn current_outcome(&self) -> PlaybackOutcome {
        if let Some(reason) = &self.unavailable {
            PlaybackOutcome::DataUnavailable {
                reason: reason.clone(),
            }
        } else if self.playback.is_finished() {
            PlaybackOutcome::Finished
        } else {
            PlaybackOutcome::FrameLimit
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::VirtualClock;
    use async_trait::async_trait;
    use skytrail_core::{FlightSample, RecordingRenderer, RenderCall};
    use skytrail_env::{EnvError, MemorySource};

    fn samples(n: usize) -> Vec<FlightSample> {
        (0..n)
            .map(|i| FlightSample::new(i as f64, i as f64, 10.0 * i as f64, 0.05 + 0.02 * i as f64))
            .collect()
    }

    fn headless_player(
        source: impl FlightDataSource,
    ) -> Player<VirtualClock, RecordingRenderer> {
        Player::new(
            VirtualClock::shared(),
            source,
            PlaybackConfig::default(),
            &SceneSettings::default(),
            RecordingRenderer::new(),
            PlayerConfig {
                max_frames: Some(1_000),
                ..PlayerConfig::headless()
            },
        )
        .unwrap()
    }

    struct UnreadableSource;

    #[async_trait]
    impl FlightDataSource for UnreadableSource {
        async fn load(&self) -> Result<Vec<FlightSample>, EnvError> {
            Err(EnvError::io(
                "balloon_flight.json",
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            ))
        }

        fn describe(&self) -> String {
            "balloon_flight.json".to_string()
        }
    }

    #[tokio::test]
    async fn test_run_to_completion() {
        let mut player = headless_player(MemorySource::new(samples(7)));
        let report = player.run().await.unwrap();

        assert_eq!(report.outcome, PlaybackOutcome::Finished);
        assert_eq!(report.samples_loaded, 7);
        assert_eq!(report.trail_len, 4);

        let renderer = player.into_renderer();
        assert_eq!(renderer.frames_rendered() as u64, report.frames_rendered);
        let (positions, _) = renderer.trail();
        let zs: Vec<f64> = positions.iter().map(|p| p.z).collect();
        assert_eq!(zs, vec![0.0, 20.0, 40.0, 60.0]);
    }

    #[tokio::test]
    async fn test_frames_render_while_loading() {
        let mut player = headless_player(MemorySource::new(samples(3)));

        // First iteration runs before the load task has had a chance to run
        let frame = player.step().unwrap();
        assert!(frame.is_none());
        assert_eq!(player.renderer().frames_rendered(), 1);
        assert!(!player.playback().is_ready());
    }

    #[tokio::test]
    async fn test_resize_before_load() {
        let mut player = headless_player(MemorySource::new(samples(3)));
        player.resize(Viewport::new(640, 480)).unwrap();

        let report = player.run().await.unwrap();
        assert_eq!(report.outcome, PlaybackOutcome::Finished);

        let resizes: Vec<&RenderCall> = player
            .renderer()
            .calls()
            .iter()
            .filter(|c| matches!(c, RenderCall::Resize(_)))
            .collect();
        assert_eq!(resizes.len(), 2);
        assert_eq!(resizes[1], &RenderCall::Resize(Viewport::new(640, 480)));
    }

    #[tokio::test]
    async fn test_unavailable_data_surfaces_status() {
        let mut player = headless_player(UnreadableSource);
        let report = player.run().await.unwrap();

        match &report.outcome {
            PlaybackOutcome::DataUnavailable { reason } => {
                assert!(reason.contains("balloon_flight.json"))
            }
            other => panic!("expected DataUnavailable, got {:?}", other),
        }
        assert_eq!(report.trail_len, 0);

        let statuses = player.renderer().statuses();
        assert_eq!(statuses.len(), 1);
        assert!(statuses[0].starts_with("Flight data unavailable"));
    }

    #[tokio::test]
    async fn test_empty_recording_finishes_without_geometry() {
        let mut player = headless_player(MemorySource::new(vec![]));
        let report = player.run().await.unwrap();

        assert_eq!(report.outcome, PlaybackOutcome::Finished);
        assert_eq!(report.trail_len, 0);
        assert_eq!(player.renderer().balloon_position(), None);
    }

    #[tokio::test]
    async fn test_linger_frames() {
        let mut player = Player::new(
            VirtualClock::shared(),
            MemorySource::new(samples(2)),
            PlaybackConfig::default(),
            &SceneSettings::default(),
            RecordingRenderer::new(),
            PlayerConfig {
                linger_frames: 5,
                max_frames: Some(1_000),
                ..PlayerConfig::headless()
            },
        )
        .unwrap();

        let report = player.run().await.unwrap();
        assert_eq!(report.outcome, PlaybackOutcome::Finished);

        // Frames after the last sample only re-render
        let calls = player.renderer().calls();
        let tail = &calls[calls.len() - 5..];
        assert!(tail.iter().all(|c| matches!(c, RenderCall::RenderFrame)));
    }

    #[derive(Default)]
    struct GroundCapture {
        inner: RecordingRenderer,
        ground_level: Option<f64>,
    }

    impl SceneRenderer for GroundCapture {
        fn setup(&mut self, settings: &SceneSettings) -> Result<(), RenderError> {
            self.ground_level = Some(settings.ground_level);
            self.inner.setup(settings)
        }
        fn set_balloon_position(&mut self, p: &nalgebra::Vector3<f64>) -> Result<(), RenderError> {
            self.inner.set_balloon_position(p)
        }
        fn set_balloon_color(&mut self, c: skytrail_core::TrailColor) -> Result<(), RenderError> {
            self.inner.set_balloon_color(c)
        }
        fn set_tether_vertices(&mut self, v: &[nalgebra::Vector3<f64>; 2]) -> Result<(), RenderError> {
            self.inner.set_tether_vertices(v)
        }
        fn set_trail_geometry(
            &mut self,
            positions: &[nalgebra::Vector3<f64>],
            colors: &[skytrail_core::TrailColor],
        ) -> Result<(), RenderError> {
            self.inner.set_trail_geometry(positions, colors)
        }
        fn render_frame(&mut self) -> Result<(), RenderError> {
            self.inner.render_frame()
        }
        fn resize(&mut self, viewport: Viewport) -> Result<(), RenderError> {
            self.inner.resize(viewport)
        }
        fn show_status(&mut self, message: &str) -> Result<(), RenderError> {
            self.inner.show_status(message)
        }
    }

    #[tokio::test]
    async fn test_scene_ground_follows_playback() {
        let ground = skytrail_core::EARTH_RADIUS_M;
        let mut player = Player::new(
            VirtualClock::shared(),
            MemorySource::new(samples(3)),
            PlaybackConfig::default().with_ground_level(ground),
            &SceneSettings::default(),
            GroundCapture::default(),
            PlayerConfig {
                max_frames: Some(1_000),
                ..PlayerConfig::headless()
            },
        )
        .unwrap();
        assert_eq!(player.renderer().ground_level, Some(ground));

        let report = player.run().await.unwrap();
        assert_eq!(report.outcome, PlaybackOutcome::Finished);
        let tether = player.renderer().inner.calls().iter().find_map(|c| match c {
            RenderCall::Tether(t) => Some(*t),
            _ => None,
        });
        assert_eq!(tether.map(|t| t[0].z), Some(ground));
    }

    #[tokio::test]
    async fn test_frame_limit() {
        let mut player = Player::new(
            VirtualClock::shared(),
            MemorySource::new(samples(100)),
            PlaybackConfig::default().with_stride(1),
            &SceneSettings::default(),
            RecordingRenderer::new(),
            PlayerConfig {
                max_frames: Some(10),
                ..PlayerConfig::default()
            },
        )
        .unwrap();

        let report = player.run().await.unwrap();
        assert_eq!(report.outcome, PlaybackOutcome::FrameLimit);
        assert_eq!(report.frames_rendered, 10);
        assert!(report.trail_len < 10);
        assert!(report.elapsed_secs > 0.0);
    }
}
