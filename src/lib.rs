//! # Hue Arm Calib
//!
//! A Rust crate for locating a colored object in camera frames and collecting
//! camera-to-arm correspondences for calibrating a robot arm.
//!
//! This library provides:
//! - An HSV detector with morphological cleanup, contour ranking and a
//!   centered region of interest
//! - A two-state calibration session pairing detected targets with arm poses
//! - An append-only correspondence dataset
//! - Frame sources, an arm driver interface and trackbar tuning for the
//!   interactive tools
//!
//! ## Example
//!
//! ```rust,no_run
//! use hue_arm_calib::{detect, DetectorConfig};
//! use hue_arm_calib::image_loader::load_image;
//! use std::path::Path;
//!
//! let frame = load_image(Path::new("demo.jpg"))?;
//! let detection = detect(&frame, DetectorConfig::default())?;
//! if let Some(best) = detection.best() {
//!     println!("target at ({}, {}), angle {:.1}", best.point.x, best.point.y, best.angle);
//! }
//! # Ok::<(), hue_arm_calib::CalibrationError>(())
//! ```

pub mod arm;
pub mod calibration;
pub mod config;
pub mod constants;
pub mod control;
pub mod detection;
pub mod error;
pub mod image_loader;
pub mod overlay;
pub mod source;
pub mod tuning;

pub use arm::{ArmDriver, SimulatedArm};
pub use calibration::{
    CalibrationSession, CorrespondenceRecord, DatasetFile, PoseDims, SessionState, TriggerOutcome,
};
pub use config::{to_odd, DetectorConfig};
pub use detection::{detect, Candidate, Detection, ObjectDetector, RegionOfInterest};
pub use error::{CalibrationError, Result};
