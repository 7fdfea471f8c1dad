//! End-to-end tests on synthetic frames
//!
//! Frames are drawn with OpenCV so the expected target positions are known
//! exactly: pure blue (BGR 255,0,0) maps to HSV (120,255,255).

use hue_arm_calib::calibration::read_dataset;
use hue_arm_calib::control::InputEvent;
use hue_arm_calib::{
    detect, ArmDriver, CalibrationSession, DatasetFile, DetectorConfig, PoseDims, SessionState,
    SimulatedArm, TriggerOutcome,
};
use opencv::{
    core::{self, Mat, Point, Scalar, CV_8UC3},
    imgproc::{self, LINE_8},
    prelude::*,
};
use std::path::PathBuf;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn blank_frame() -> Mat {
    Mat::new_rows_cols_with_default(480, 640, CV_8UC3, Scalar::all(0.0)).unwrap()
}

fn draw_blue_disc(frame: &mut Mat, center: Point, radius: i32) {
    imgproc::circle(
        frame,
        center,
        radius,
        Scalar::new(255.0, 0.0, 0.0, 0.0),
        -1,
        LINE_8,
        0,
    )
    .unwrap();
}

fn blue_config() -> DetectorConfig {
    DetectorConfig {
        lower_bound: [110, 200, 200],
        upper_bound: [130, 255, 255],
        blur_kernel: 3,
        ..Default::default()
    }
}

fn temp_path(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("hue_arm_calib_{}_{}", std::process::id(), name));
    let _ = std::fs::remove_file(&path);
    path
}

// ============================================================================
// Detection
// ============================================================================

#[test]
fn test_single_blue_disc_is_found_at_its_center() {
    init_logging();
    let mut frame = blank_frame();
    draw_blue_disc(&mut frame, Point::new(320, 240), 40);

    let detection = detect(&frame, blue_config()).unwrap();

    assert_eq!(detection.candidates.len(), 1);
    let best = detection.best().unwrap();
    assert!((best.point.x - 320).abs() <= 1, "x = {}", best.point.x);
    assert!((best.point.y - 240).abs() <= 1, "y = {}", best.point.y);
    assert!(best.arc_length > 180.0 && best.arc_length < 300.0);
    assert_eq!((detection.mask.cols(), detection.mask.rows()), (640, 480));
}

#[test]
fn test_disc_outside_roi_is_rejected() {
    init_logging();
    let mut frame = blank_frame();
    draw_blue_disc(&mut frame, Point::new(30, 30), 22);

    let detection = detect(&frame, blue_config()).unwrap();

    // The blob is segmented but its center lies outside the 80% ROI
    assert!(core::count_non_zero(&detection.mask).unwrap() > 0);
    assert!(detection.candidates.is_empty());
    assert!(!detection.roi.contains(Point::new(30, 30)));
}

#[test]
fn test_object_limit_keeps_the_longest_contour() {
    init_logging();
    let mut frame = blank_frame();
    draw_blue_disc(&mut frame, Point::new(450, 240), 25);
    draw_blue_disc(&mut frame, Point::new(220, 240), 60);

    let config = DetectorConfig {
        n_objects: 1,
        ..blue_config()
    };
    let detection = detect(&frame, config).unwrap();

    assert_eq!(detection.candidates.len(), 1);
    let best = detection.best().unwrap();
    assert!((best.point.x - 220).abs() <= 1);
    assert!((best.point.y - 240).abs() <= 1);
}

#[test]
fn test_candidates_are_ranked_by_arc_length() {
    init_logging();
    let mut frame = blank_frame();
    draw_blue_disc(&mut frame, Point::new(200, 150), 25);
    draw_blue_disc(&mut frame, Point::new(420, 300), 70);
    draw_blue_disc(&mut frame, Point::new(300, 330), 40);

    let detection = detect(&frame, blue_config()).unwrap();

    assert_eq!(detection.candidates.len(), 3);
    for pair in detection.candidates.windows(2) {
        assert!(pair[0].arc_length >= pair[1].arc_length);
    }
    assert!((detection.candidates[0].point.x - 420).abs() <= 1);
}

#[test]
fn test_arc_length_bounds_filter_candidates() {
    init_logging();
    let mut frame = blank_frame();
    draw_blue_disc(&mut frame, Point::new(220, 240), 60);
    draw_blue_disc(&mut frame, Point::new(450, 240), 25);

    let config = DetectorConfig {
        min_arc_length: 100.0,
        max_arc_length: 200.0,
        ..blue_config()
    };
    let detection = detect(&frame, config).unwrap();

    assert_eq!(detection.candidates.len(), 1);
    let only = &detection.candidates[0];
    assert!(only.arc_length >= 100.0 && only.arc_length <= 200.0);
    assert!((only.point.x - 450).abs() <= 1);
}

#[test]
fn test_only_top_ranked_contours_are_evaluated() {
    init_logging();
    let mut frame = blank_frame();
    // Larger disc centered outside the ROI, smaller one inside it
    draw_blue_disc(&mut frame, Point::new(40, 240), 35);
    draw_blue_disc(&mut frame, Point::new(320, 240), 24);

    let single = DetectorConfig {
        n_objects: 1,
        ..blue_config()
    };
    assert!(detect(&frame, single).unwrap().candidates.is_empty());

    let pair = DetectorConfig {
        n_objects: 2,
        ..blue_config()
    };
    let detection = detect(&frame, pair).unwrap();
    assert_eq!(detection.candidates.len(), 1);
    assert!((detection.candidates[0].point.x - 320).abs() <= 1);
}

#[test]
fn test_detection_is_deterministic() {
    init_logging();
    let mut frame = blank_frame();
    draw_blue_disc(&mut frame, Point::new(300, 260), 45);

    let first = detect(&frame, blue_config()).unwrap();
    let second = detect(&frame, blue_config()).unwrap();
    assert_eq!(first.candidates, second.candidates);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_file_round_trip() {
    let path = temp_path("config.json");
    let config = DetectorConfig {
        inversion: true,
        n_objects: 2,
        roi: [0.5, 0.6],
        ..blue_config()
    };

    config.to_json_file(&path).unwrap();
    let loaded = DetectorConfig::from_json_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded, config);
}

#[test]
fn test_malformed_config_fails_to_load() {
    let path = temp_path("broken.json");
    std::fs::write(&path, "{ \"blur_kernel\": \"wide\" }").unwrap();

    let result = DetectorConfig::from_json_file(&path);
    std::fs::remove_file(&path).unwrap();

    assert!(result.is_err());
}

// ============================================================================
// Calibration session
// ============================================================================

#[test]
fn test_session_collects_records_into_dataset_file() {
    init_logging();
    let path = temp_path("data.csv");
    let mut frame = blank_frame();
    draw_blue_disc(&mut frame, Point::new(320, 240), 40);

    let mut session = CalibrationSession::new(
        SimulatedArm::default(),
        DatasetFile::new(path.clone()),
        PoseDims::Xyzr,
        blue_config(),
    );

    let detection = detect(&frame, session.config()).unwrap();
    let target = detection.best().unwrap().point;
    assert_eq!(
        session.trigger(&detection.candidates).unwrap(),
        TriggerOutcome::TargetSelected(target)
    );

    // Operator guides the arm onto the target
    session.arm_mut().jog(&[15.5, -20.0, 0.0, 0.0]).unwrap();
    let outcome = session.trigger(&detection.candidates).unwrap();
    assert!(matches!(outcome, TriggerOutcome::Captured(_)));
    assert_eq!(session.state(), SessionState::AwaitingTarget);
    assert_eq!(
        session.arm_mut().current_pose().unwrap(),
        vec![220.0, 0.0, 135.0, 9.0]
    );

    // A cancelled selection adds nothing
    session.trigger(&detection.candidates).unwrap();
    assert!(session.cancel());

    let records = read_dataset(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].target, [target.x, target.y]);
    assert_eq!(records[0].pose, vec![235.5, -20.0, 135.0, 9.0]);
    assert_eq!(session.records_written(), 1);
}

#[test]
fn test_jog_keys_move_the_captured_pose() {
    init_logging();
    let path = temp_path("jogged.csv");
    let mut frame = blank_frame();
    draw_blue_disc(&mut frame, Point::new(320, 240), 40);

    let mut session = CalibrationSession::new(
        SimulatedArm::default(),
        DatasetFile::new(path.clone()),
        PoseDims::Xyzr,
        blue_config(),
    );
    let detection = detect(&frame, session.config()).unwrap();
    session.trigger(&detection.candidates).unwrap();

    // Two steps +x, one step -y, one step -z
    for key in [b'i', b'i', b'l', b'o'] {
        let delta = InputEvent::from_key(key as i32).jog_delta().unwrap();
        session.arm_mut().jog(&delta).unwrap();
    }
    session.trigger(&detection.candidates).unwrap();

    let records = read_dataset(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].pose, vec![230.0, -5.0, 130.0, 9.0]);
}

#[test]
fn test_session_appends_to_existing_dataset() {
    let path = temp_path("existing.csv");
    std::fs::write(&path, "1,2,3.0,4.0,5.0\n").unwrap();

    let mut session = CalibrationSession::new(
        SimulatedArm::new(vec![10.0, 20.0, 30.0]),
        DatasetFile::new(path.clone()),
        PoseDims::Xyz,
        DetectorConfig::default(),
    );
    let detection = {
        let mut frame = blank_frame();
        draw_blue_disc(&mut frame, Point::new(320, 240), 40);
        detect(&frame, blue_config()).unwrap()
    };
    session.trigger(&detection.candidates).unwrap();
    session.trigger(&detection.candidates).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "1,2,3.0,4.0,5.0");
    assert!(lines[1].ends_with(",10.0,20.0,30.0"));
}

#[test]
fn test_select_without_detection_keeps_waiting() {
    init_logging();
    let path = temp_path("empty.csv");
    let mut session = CalibrationSession::new(
        SimulatedArm::default(),
        DatasetFile::new(path.clone()),
        PoseDims::Xyzr,
        blue_config(),
    );

    let detection = detect(&blank_frame(), session.config()).unwrap();
    assert_eq!(
        session.trigger(&detection.candidates).unwrap(),
        TriggerOutcome::NoTarget
    );
    assert_eq!(session.state(), SessionState::AwaitingTarget);
    assert!(!path.exists());
}
