//! Configuration for the object detection pipeline.
//!
//! [`DetectorConfig`] holds every tunable parameter of the HSV detector. It is
//! a plain `Copy` value: the interactive surface owns the live instance and
//! hands the detector a snapshot for each frame, so a trackbar change never
//! lands halfway through a detection pass.
//!
//! # Configuration Loading
//!
//! ```no_run
//! use hue_arm_calib::DetectorConfig;
//! use std::path::Path;
//!
//! let config = DetectorConfig::from_json_file(Path::new("output.json"))?;
//! config.to_json_file(Path::new("backup.json"))?;
//! # Ok::<(), hue_arm_calib::CalibrationError>(())
//! ```
//!
//! The JSON document uses the field names below; missing fields take their
//! defaults, unknown or ill-typed fields are rejected.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::detector as defaults;
use crate::{CalibrationError, Result};

/// Detector parameters, persisted as a flat JSON document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectorConfig {
    /// Complement the mask after blurring (target darker than surroundings)
    pub inversion: bool,

    /// Median blur kernel size (normalized with [`to_odd`])
    pub blur_kernel: i32,

    /// Dilation iterations
    pub n_dilations: i32,

    /// Dilation kernel size (normalized with [`to_odd`])
    pub dilation_kernel: i32,

    /// Erosion iterations
    pub n_erosions: i32,

    /// Erosion kernel size (normalized with [`to_odd`])
    pub erosion_kernel: i32,

    /// Number of largest contours evaluated per frame
    pub n_objects: usize,

    /// Minimum accepted contour perimeter in pixels
    pub min_arc_length: f64,

    /// Maximum accepted contour perimeter in pixels
    pub max_arc_length: f64,

    /// Region of interest as (width, height) fractions of the frame
    pub roi: [f64; 2],

    /// Inclusive HSV lower bound
    pub lower_bound: [i32; 3],

    /// Inclusive HSV upper bound
    pub upper_bound: [i32; 3],
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            inversion: defaults::INVERSION,
            blur_kernel: defaults::BLUR_KERNEL,
            n_dilations: defaults::N_DILATIONS,
            dilation_kernel: defaults::DILATION_KERNEL,
            n_erosions: defaults::N_EROSIONS,
            erosion_kernel: defaults::EROSION_KERNEL,
            n_objects: defaults::N_OBJECTS,
            min_arc_length: defaults::MIN_ARC_LENGTH,
            max_arc_length: defaults::MAX_ARC_LENGTH,
            roi: defaults::ROI,
            lower_bound: defaults::LOWER_BOUND,
            upper_bound: defaults::UPPER_BOUND,
        }
    }
}

impl DetectorConfig {
    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CalibrationError::Config {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;
        Self::from_json_str(&content).map_err(|e| CalibrationError::Config {
            path: path.to_path_buf(),
            source: Box::new(e),
        })
    }

    /// Parse configuration from a JSON string
    pub fn from_json_str(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| CalibrationError::io("Config serialization failed", e.into()))?;
        std::fs::write(path, json).map_err(|e| {
            CalibrationError::io(format!("Failed to write config {}", path.display()), e)
        })?;
        Ok(())
    }

    /// Median blur kernel as used by the pipeline
    pub fn blur_kernel_size(&self) -> i32 {
        to_odd(self.blur_kernel)
    }

    /// Dilation kernel as used by the pipeline
    pub fn dilation_kernel_size(&self) -> i32 {
        to_odd(self.dilation_kernel)
    }

    /// Erosion kernel as used by the pipeline
    pub fn erosion_kernel_size(&self) -> i32 {
        to_odd(self.erosion_kernel)
    }
}

/// Coerce a kernel size to an odd integer no smaller than 3.
///
/// Odd values ≥ 3 pass through, even values round up to the next odd
/// number, anything below 3 becomes 3.
pub fn to_odd(value: i32) -> i32 {
    value.max(defaults::MIN_KERNEL_SIZE) | 1
}
