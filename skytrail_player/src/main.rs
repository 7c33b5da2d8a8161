//! SkyTrail CLI
//!
//! Replay a recorded balloon flight headless, to a JSON export, or in the
//! Rerun viewer.

use anyhow::Context;
use clap::Parser;
use skytrail_core::{NormalizationWindow, SceneRenderer, Viewport};
use skytrail_env::{FileSource, TokioContext};
use skytrail_player::{
    ExportRenderer, HeadlessRenderer, MultiRenderer, PlaybackOutcome, PlaybackReport, Player,
    PlayerConfig, SkytrailConfig, Tee,
};
use std::path::PathBuf;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// SkyTrail flight playback
#[derive(Parser, Debug)]
#[command(name = "skytrail")]
#[command(about = "Replay a recorded balloon flight with radiation-colored trail", long_about = None)]
struct Args {
    /// Flight recording (JSON array of {x, y, z, radiation})
    #[arg(default_value = "balloon_flight.json")]
    data: PathBuf,

    /// JSON config file with `playback` and `scene` sections
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Samples advanced per frame
    #[arg(short, long)]
    stride: Option<usize>,

    /// Frames per second
    #[arg(long, default_value = "60")]
    fps: u32,

    /// Height of the tether's ground endpoint (meters)
    #[arg(long)]
    ground_level: Option<f64>,

    /// Offset added to every sample altitude (meters)
    #[arg(long)]
    altitude_offset: Option<f64>,

    /// Radiation reading mapped to the coldest color
    #[arg(long, requires = "window_high")]
    window_low: Option<f64>,

    /// Radiation reading mapped to the hottest color
    #[arg(long, requires = "window_low")]
    window_high: Option<f64>,

    /// Derive the color window from the recording's min/max radiation
    #[arg(long, conflicts_with_all = ["window_low", "window_high"])]
    auto_window: bool,

    /// Initial viewport width
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Initial viewport height
    #[arg(long, default_value = "720")]
    height: u32,

    /// Stop after this many frames
    #[arg(long)]
    max_frames: Option<u64>,

    /// Export presented frames to a JSON file
    #[arg(long)]
    export: Option<String>,

    /// Open the Rerun viewer (needs the `visualization` feature)
    #[arg(long)]
    visualize: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON report on stdout
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let mut config = match &args.config {
        Some(path) => SkytrailConfig::load(path)?,
        None => SkytrailConfig::default(),
    };
    if let Some(stride) = args.stride {
        config.playback.stride = stride;
    }
    if let Some(ground_level) = args.ground_level {
        config.playback.ground_level = ground_level;
    }
    if let Some(offset) = args.altitude_offset {
        config.playback.altitude_offset = offset;
    }
    if let (Some(low), Some(high)) = (args.window_low, args.window_high) {
        config.playback.window = NormalizationWindow::new(low, high)?;
    }
    if args.auto_window {
        config.playback.auto_window = true;
    }

    let mut renderers = MultiRenderer::new();
    renderers.push(Box::new(HeadlessRenderer::new()));
    if args.visualize {
        match viewer_renderer() {
            Some(viewer) => renderers.push(viewer),
            None => warn!("Rerun visualization not available (compile with --features visualization)"),
        }
    }
    let interactive = renderers.len() > 1;

    let player_config = PlayerConfig {
        frame_rate_hz: args.fps,
        viewport: Viewport::new(args.width, args.height),
        max_frames: args.max_frames,
        stop_when_finished: !interactive,
        linger_frames: 0,
        stop_on_unavailable: !interactive,
    };

    info!("SkyTrail v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Stride {} | window [{}, {}]{} | {} fps",
        config.playback.stride,
        config.playback.window.low,
        config.playback.window.high,
        if config.playback.auto_window { " (auto)" } else { "" },
        args.fps
    );

    let source = FileSource::new(&args.data);
    let report = match &args.export {
        Some(export_path) => {
            let exporting = Tee::new(renderers, ExportRenderer::new(args.data.display().to_string()));
            let (report, exporting) = run_player(source, &config, exporting, player_config).await?;
            let export = exporting.second.into_export();
            export
                .write_to_file(export_path)
                .with_context(|| format!("Failed to write export {}", export_path))?;
            info!("Exported {} frames to {}", export.frames.len(), export_path);
            report
        }
        None => run_player(source, &config, renderers, player_config).await?.0,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    match &report.outcome {
        PlaybackOutcome::Finished => {
            info!(
                "✓ Playback finished: {} trail points from {} samples in {} frames",
                report.trail_len, report.samples_loaded, report.frames_rendered
            );
        }
        PlaybackOutcome::FrameLimit => {
            info!(
                "Stopped after {} frames ({} trail points)",
                report.frames_rendered, report.trail_len
            );
        }
        PlaybackOutcome::DataUnavailable { reason } => {
            error!("✗ Flight data unavailable: {}", reason);
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Runs the player until it stops on its own or Ctrl-C is pressed.
async fn run_player<R: SceneRenderer>(
    source: FileSource,
    config: &SkytrailConfig,
    renderer: R,
    player_config: PlayerConfig,
) -> anyhow::Result<(PlaybackReport, R)> {
    let mut player = Player::new(
        TokioContext::shared(),
        source,
        config.playback.clone(),
        &config.scene,
        renderer,
        player_config,
    )?;

    let completed = {
        let run = player.run();
        tokio::pin!(run);
        tokio::select! {
            report = &mut run => Some(report),
            _ = tokio::signal::ctrl_c() => None,
        }
    };

    let report = match completed {
        Some(report) => report?,
        None => {
            info!("Interrupted after {} frames", player.frames_rendered());
            player.report(player.current_outcome())
        }
    };

    Ok((report, player.into_renderer()))
}

#[cfg(feature = "visualization")]
fn viewer_renderer() -> Option<Box<dyn SceneRenderer + Send>> {
    match skytrail_core::RerunRenderer::new("skytrail") {
        Ok(viewer) => {
            info!("Rerun visualization enabled - open Rerun Viewer to see the flight");
            Some(Box::new(viewer))
        }
        Err(e) => {
            warn!("Failed to initialize Rerun: {}", e);
            None
        }
    }
}

#[cfg(not(feature = "visualization"))]
fn viewer_renderer() -> Option<Box<dyn SceneRenderer + Send>> {
    None
}
