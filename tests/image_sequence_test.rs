//! End-to-end runs over frame directories on disk

mod common;

use common::*;
use fitness_assessment::models::{AnalysisOutcome, AnalysisRequest, AnalysisResult, KeypointFrame};
use fitness_assessment::services::frame_io::SEQUENCE_MANIFEST;
use fitness_assessment::services::RecordedPoseDetector;
use fitness_assessment::{AnalysisConfig, Dispatcher};
use image::{Rgb, RgbImage};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;

fn write_sequence(dir: &Path, frames: usize, fps: f64) {
    for i in 0..frames {
        RgbImage::from_pixel(64, 48, Rgb([40, 40, 40]))
            .save(dir.join(format!("{:05}.png", i)))
            .unwrap();
    }
    fs::write(
        dir.join(SEQUENCE_MANIFEST),
        serde_json::json!({ "fps": fps }).to_string(),
    )
    .unwrap();
}

fn write_track(path: &Path, frames: &[KeypointFrame]) {
    let track = serde_json::json!({ "frames": frames });
    fs::write(path, serde_json::to_string_pretty(&track).unwrap()).unwrap();
}

#[test]
fn test_situps_on_disk() {
    init_test_logging();
    let workspace = tempfile::tempdir().unwrap();
    let input = workspace.path().join("input");
    let output = workspace.path().join("annotated");
    fs::create_dir(&input).unwrap();
    write_sequence(&input, 6, 25.0);

    let track_path = workspace.path().join("track.json");
    let frames: Vec<_> = [160.0, 90.0, 95.0, 160.0, 85.0, 165.0]
        .iter()
        .map(|&d| torso_at(d))
        .collect();
    write_track(&track_path, &frames);

    let mut detector = RecordedPoseDetector::from_file(&track_path).unwrap();
    let request = AnalysisRequest {
        test_type: "Sit-Ups".to_string(),
        input_path: input.clone(),
        output_path: output.clone(),
        user_level: Some("Intermediate".to_string()),
    };

    let outcome = Dispatcher::default().analyze(&request, &mut detector);
    let AnalysisOutcome::Completed(AnalysisResult::SitUps(situps)) = outcome else {
        panic!("unexpected outcome {:?}", outcome);
    };
    assert_eq!(situps.total_reps, 2);
    assert_eq!(situps.analysis_video_path, output);

    let written = fs::read_dir(&output)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().map(|x| x == "png").unwrap_or(false))
        .count();
    assert_eq!(written, 6);

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(output.join(SEQUENCE_MANIFEST)).unwrap())
            .unwrap();
    assert_eq!(manifest["fps"], 25.0);
    assert_eq!(manifest["frame_count"], 6);
    assert_eq!(manifest["width"], 64);
}

#[test]
fn test_shuttle_guide_lines_drawn() {
    let workspace = tempfile::tempdir().unwrap();
    let input = workspace.path().join("input");
    let output = workspace.path().join("annotated");
    fs::create_dir(&input).unwrap();
    write_sequence(&input, 2, 30.0);

    let config = AnalysisConfig::from_toml_str(
        r#"
        [overlay]
        draw_skeleton = false
        "#,
    )
    .unwrap();
    let mut detector = RecordedPoseDetector::default();
    let request = AnalysisRequest {
        test_type: "shuttle-run".to_string(),
        input_path: input,
        output_path: output.clone(),
        user_level: None,
    };

    let outcome = Dispatcher::new(config).analyze(&request, &mut detector);
    assert!(!outcome.is_error(), "{:?}", outcome);

    // 64 wide: lines at columns 16 and 48
    let frame = image::open(output.join("frame_000000.png")).unwrap().to_rgb8();
    assert_eq!(*frame.get_pixel(16, 10), Rgb([0, 0, 255]));
    assert_eq!(*frame.get_pixel(48, 40), Rgb([0, 0, 255]));
    assert_eq!(*frame.get_pixel(30, 10), Rgb([40, 40, 40]));
}

#[test]
fn test_missing_input_reports_open_error() {
    let workspace = tempfile::tempdir().unwrap();
    let mut detector = RecordedPoseDetector::default();
    let request = AnalysisRequest {
        test_type: "endurance-run".to_string(),
        input_path: workspace.path().join("missing"),
        output_path: workspace.path().join("out"),
        user_level: None,
    };

    let outcome = Dispatcher::default().analyze(&request, &mut detector);
    let json = serde_json::to_value(&outcome).unwrap();
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Could not open video file"));
}
