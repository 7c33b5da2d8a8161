//! End-to-end player runs against recordings on disk.

use approx::assert_relative_eq;
use skytrail_core::{PlaybackConfig, SceneSettings};
use skytrail_env::FileSource;
use skytrail_player::{
    ExportRenderer, FlightExport, PlaybackOutcome, Player, PlayerConfig, VirtualClock,
};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const SCENARIO: &str = r#"[
    {"x": 0, "y": 0, "z": 0, "radiation": 0.05},
    {"x": 1, "y": 0, "z": 0, "radiation": 0.45},
    {"x": 2, "y": 0, "z": 0, "radiation": 0.25}
]"#;

fn ascent_recording(n: usize) -> String {
    let samples: Vec<serde_json::Value> = (0..n)
        .map(|i| {
            let t = i as f64;
            serde_json::json!({
                "x": 7.07 * t,
                "y": 7.07 * t,
                "z": 8.0 * t,
                "radiation": 0.05 + 0.4 * (t / n as f64),
                "wind": 10.0 + 0.016 * t,
            })
        })
        .collect();
    serde_json::to_string(&samples).unwrap()
}

async fn export_run(path: &Path, config: PlaybackConfig) -> (PlaybackOutcome, FlightExport) {
    let mut player = Player::new(
        VirtualClock::shared(),
        FileSource::new(path),
        config,
        &SceneSettings::default(),
        ExportRenderer::new(path.display().to_string()),
        PlayerConfig {
            max_frames: Some(100_000),
            ..PlayerConfig::headless()
        },
    )
    .unwrap();

    let report = player.run().await.unwrap();
    (report.outcome, player.into_renderer().into_export())
}

#[tokio::test]
async fn test_scenario_recording() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("balloon_flight.json");
    fs::write(&path, SCENARIO).unwrap();

    let (outcome, export) = export_run(&path, PlaybackConfig::default()).await;
    assert_eq!(outcome, PlaybackOutcome::Finished);
    assert_eq!(export.frames.len(), 2);

    let first = &export.frames[0];
    assert_eq!(first.position, [0.0, 0.0, 0.0]);
    assert_relative_eq!(first.color[0], 0.0, epsilon = 1e-9);
    assert_relative_eq!(first.color[1], 0.0, epsilon = 1e-9);
    assert_relative_eq!(first.color[2], 1.0, epsilon = 1e-9);

    let second = &export.frames[1];
    assert_eq!(second.position, [2.0, 0.0, 0.0]);
    assert_relative_eq!(second.color[0], 0.75, epsilon = 1e-9);
    assert_relative_eq!(second.color[1], 0.12, epsilon = 1e-9);
    assert_relative_eq!(second.color[2], 0.35, epsilon = 1e-9);
    assert_eq!(second.tether[0][2], 0.0);

    assert_eq!(export.trail.len(), 2);
    assert_eq!(export.trail_colors.len(), 2);
}

#[tokio::test]
async fn test_replays_are_identical() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ascent.json");
    fs::write(&path, ascent_recording(301)).unwrap();

    let (_, a) = export_run(&path, PlaybackConfig::default()).await;
    let (_, b) = export_run(&path, PlaybackConfig::default()).await;

    // Frame numbers depend on when the load resolved; geometry must not
    let geometry = |e: &FlightExport| {
        e.frames
            .iter()
            .map(|f| (f.position, f.color, f.tether, f.trail_len))
            .collect::<Vec<_>>()
    };
    assert_eq!(geometry(&a), geometry(&b));
    assert_eq!(a.trail, b.trail);
    assert_eq!(a.frames.len(), 151);
}

#[tokio::test]
async fn test_trail_grows_by_one_per_moving_frame() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ascent.json");
    fs::write(&path, ascent_recording(40)).unwrap();

    let (_, export) = export_run(&path, PlaybackConfig::default().with_stride(3)).await;
    for (k, frame) in export.frames.iter().enumerate() {
        assert_eq!(frame.trail_len, k + 1);
        assert_relative_eq!(frame.position[2], 8.0 * (3 * k) as f64, epsilon = 1e-9);
    }
    assert_eq!(export.frames.len(), 14);
}

#[tokio::test]
async fn test_missing_recording_is_unavailable() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("never_recorded.json");

    let (outcome, export) = export_run(&path, PlaybackConfig::default()).await;
    assert!(matches!(outcome, PlaybackOutcome::DataUnavailable { .. }));
    assert!(export.frames.is_empty());
    assert_eq!(export.statuses.len(), 1);
    assert!(export.statuses[0].contains("never_recorded.json"));
}
