//! Colored object detection
//!
//! This module segments a frame in HSV space and reduces the result to a
//! ranked list of candidate objects inside a centered region of interest.

pub mod object;
pub mod roi;

pub use object::{detect, Candidate, Detection, ObjectDetector};
pub use roi::RegionOfInterest;
