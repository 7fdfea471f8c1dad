//! HSV object detection with contour ranking and ROI filtering
//!
//! Implements a detector that:
//! - Thresholds the frame in HSV space against inclusive bounds
//! - Median-filters the mask, optionally inverts it
//! - Closes gaps with dilation followed by erosion
//! - Ranks external contours by perimeter and keeps the top `n_objects`
//! - Filters them by perimeter bounds and a centered region of interest
//!
//! Nothing found is a normal outcome: the candidate list is simply empty.

use log::debug;
use opencv::{
    core::{self, Mat, Point, Point2f, Scalar, Size, Vector, BORDER_CONSTANT},
    imgproc::{
        self, CHAIN_APPROX_NONE, COLOR_BGR2HSV, FONT_HERSHEY_SIMPLEX, LINE_8, MORPH_CROSS,
        RETR_EXTERNAL,
    },
    prelude::*,
};

use super::roi::RegionOfInterest;
use crate::constants::colors;
use crate::{CalibrationError, DetectorConfig, Result};

/// One accepted contour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Center of the minimum-area rectangle, rounded to pixels
    pub point: Point,
    /// Rotation of the minimum-area rectangle in degrees
    pub angle: f32,
    /// Closed perimeter of the source contour
    pub arc_length: f64,
}

/// Output of one detection pass
#[derive(Debug)]
pub struct Detection {
    /// Cleaned binary mask (after morphology, before contour search)
    pub mask: Mat,
    /// Copy of the input frame with ROI, boxes and labels drawn
    pub annotated: Mat,
    /// Accepted candidates, largest perimeter first
    pub candidates: Vec<Candidate>,
    /// Region of interest used for this frame
    pub roi: RegionOfInterest,
}

impl Detection {
    /// Highest-ranked candidate, if any
    pub fn best(&self) -> Option<&Candidate> {
        self.candidates.first()
    }
}

/// External contour paired with its perimeter
struct RankedContour {
    contour: Vector<Point>,
    arc_length: f64,
}

/// Detector bound to a configuration snapshot
#[derive(Debug, Clone, Default)]
pub struct ObjectDetector {
    config: DetectorConfig,
}

/// Run one detection pass over `frame` with a snapshot of `config`
pub fn detect(frame: &Mat, config: DetectorConfig) -> Result<Detection> {
    ObjectDetector::new(config).detect(frame)
}

impl ObjectDetector {
    /// Create a detector from a configuration snapshot
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Configuration this detector runs with
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detect colored objects in a BGR frame
    ///
    /// # Arguments
    ///
    /// * `frame` - 8-bit, 3-channel BGR frame; not modified
    ///
    /// # Returns
    ///
    /// `Detection` with the cleaned mask, an annotated copy of the frame and
    /// the accepted candidates in ranked order
    ///
    /// # Errors
    ///
    /// Returns `CalibrationError::OpenCv` if an OpenCV call fails. An empty
    /// candidate list is not an error.
    pub fn detect(&self, frame: &Mat) -> Result<Detection> {
        // Step 1: HSV segmentation
        let binary = self.segment_by_hsv(frame)?;

        // Step 2: Denoise and optional inversion
        let denoised = self.denoise(&binary)?;

        // Step 3: Closing-style cleanup
        let mask = self.morphological_cleanup(denoised)?;

        // Step 4: Contours ranked by perimeter
        let ranked = self.find_ranked_contours(&mask)?;

        // Step 5: ROI
        let mut annotated = frame
            .try_clone()
            .map_err(|e| CalibrationError::opencv("Frame copy", e))?;
        let roi = RegionOfInterest::centered(frame.cols(), frame.rows(), self.config.roi);
        imgproc::rectangle(
            &mut annotated,
            roi.as_rect(),
            bgr(colors::ROI),
            2,
            LINE_8,
            0,
        )
        .map_err(|e| CalibrationError::opencv("ROI drawing", e))?;

        // Step 6: Filter the top contours
        let candidates = self.evaluate_contours(&ranked, &roi, &mut annotated)?;

        debug!(
            "detect: {} contours, {} evaluated, {} accepted",
            ranked.len(),
            ranked.len().min(self.config.n_objects),
            candidates.len()
        );

        Ok(Detection {
            mask,
            annotated,
            candidates,
            roi,
        })
    }

    /// Threshold the frame against the configured HSV bounds
    fn segment_by_hsv(&self, frame: &Mat) -> Result<Mat> {
        let mut hsv = Mat::default();
        imgproc::cvt_color_def(frame, &mut hsv, COLOR_BGR2HSV)
            .map_err(|e| CalibrationError::opencv("HSV conversion", e))?;

        let lower = Vector::<i32>::from_slice(&self.config.lower_bound);
        let upper = Vector::<i32>::from_slice(&self.config.upper_bound);

        let mut binary = Mat::default();
        core::in_range(&hsv, &lower, &upper, &mut binary)
            .map_err(|e| CalibrationError::opencv("HSV range threshold", e))?;

        Ok(binary)
    }

    /// Median filter, then complement the mask when inversion is enabled
    fn denoise(&self, binary: &Mat) -> Result<Mat> {
        let mut blurred = Mat::default();
        imgproc::median_blur(binary, &mut blurred, self.config.blur_kernel_size())
            .map_err(|e| CalibrationError::opencv("Median blur", e))?;

        if !self.config.inversion {
            return Ok(blurred);
        }

        let mut inverted = Mat::default();
        core::bitwise_not_def(&blurred, &mut inverted)
            .map_err(|e| CalibrationError::opencv("Mask inversion", e))?;
        Ok(inverted)
    }

    /// Dilate then erode with cross-shaped kernels
    fn morphological_cleanup(&self, mask: Mat) -> Result<Mat> {
        let border_value = imgproc::morphology_default_border_value()
            .map_err(|e| CalibrationError::opencv("Border value", e))?;

        let mut current = mask;

        if self.config.n_dilations > 0 {
            let kernel = cross_kernel(self.config.dilation_kernel_size())?;
            let mut dilated = Mat::default();
            imgproc::dilate(
                &current,
                &mut dilated,
                &kernel,
                Point::new(-1, -1),
                self.config.n_dilations,
                BORDER_CONSTANT,
                border_value,
            )
            .map_err(|e| CalibrationError::opencv("Dilation", e))?;
            current = dilated;
        }

        if self.config.n_erosions > 0 {
            let kernel = cross_kernel(self.config.erosion_kernel_size())?;
            let mut eroded = Mat::default();
            imgproc::erode(
                &current,
                &mut eroded,
                &kernel,
                Point::new(-1, -1),
                self.config.n_erosions,
                BORDER_CONSTANT,
                border_value,
            )
            .map_err(|e| CalibrationError::opencv("Erosion", e))?;
            current = eroded;
        }

        Ok(current)
    }

    /// Find external contours and sort them by perimeter, largest first
    fn find_ranked_contours(&self, mask: &Mat) -> Result<Vec<RankedContour>> {
        let mut contours = Vector::<Vector<Point>>::new();
        imgproc::find_contours(
            mask,
            &mut contours,
            RETR_EXTERNAL,
            CHAIN_APPROX_NONE,
            Point::new(0, 0),
        )
        .map_err(|e| CalibrationError::opencv("Contour detection", e))?;

        let mut ranked = Vec::with_capacity(contours.len());
        for contour in contours {
            let arc_length = imgproc::arc_length(&contour, true)
                .map_err(|e| CalibrationError::opencv("Perimeter calculation", e))?;
            ranked.push(RankedContour {
                contour,
                arc_length,
            });
        }

        rank_by_arc_length(&mut ranked, |c| c.arc_length);
        Ok(ranked)
    }

    /// Turn the top `n_objects` contours into candidates, drawing accepted ones
    fn evaluate_contours(
        &self,
        ranked: &[RankedContour],
        roi: &RegionOfInterest,
        annotated: &mut Mat,
    ) -> Result<Vec<Candidate>> {
        let mut candidates = Vec::new();

        for ranked_contour in ranked.iter().take(self.config.n_objects) {
            let rect = imgproc::min_area_rect(&ranked_contour.contour)
                .map_err(|e| CalibrationError::opencv("Minimum area rectangle", e))?;
            let arc_length = ranked_contour.arc_length;

            if arc_length < self.config.min_arc_length || arc_length > self.config.max_arc_length {
                continue;
            }

            let point = round_point(rect.center);
            if !roi.contains(point) {
                continue;
            }

            let mut corners = [Point2f::default(); 4];
            rect.points(&mut corners)
                .map_err(|e| CalibrationError::opencv("Rectangle corners", e))?;

            let candidate = Candidate {
                point,
                angle: rect.angle,
                arc_length,
            };
            annotate_candidate(annotated, &candidate, &corners)?;
            candidates.push(candidate);
        }

        Ok(candidates)
    }
}

/// Stable sort by descending perimeter; equal perimeters keep discovery order
fn rank_by_arc_length<T>(items: &mut [T], arc_length: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| arc_length(b).total_cmp(&arc_length(a)));
}

fn cross_kernel(size: i32) -> Result<Mat> {
    imgproc::get_structuring_element(MORPH_CROSS, Size::new(size, size), Point::new(-1, -1))
        .map_err(|e| CalibrationError::opencv("Kernel creation", e))
}

fn round_point(p: Point2f) -> Point {
    Point::new(p.x.round() as i32, p.y.round() as i32)
}

pub(crate) fn bgr(color: [f64; 3]) -> Scalar {
    Scalar::new(color[0], color[1], color[2], 0.0)
}

/// Draw point and angle labels plus the rotated bounding box
fn annotate_candidate(image: &mut Mat, candidate: &Candidate, corners: &[Point2f; 4]) -> Result<()> {
    let Point { x, y } = candidate.point;
    let labels = [
        (format!("({}, {})", x, y), Point::new(x + 50, y - 10)),
        (format!("{:.2}", candidate.angle), Point::new(x + 50, y + 15)),
    ];
    for (text, origin) in labels.iter() {
        imgproc::put_text(
            image,
            text,
            *origin,
            FONT_HERSHEY_SIMPLEX,
            0.5,
            bgr(colors::LABEL),
            2,
            LINE_8,
            false,
        )
        .map_err(|e| CalibrationError::opencv("Label drawing", e))?;
    }

    let outline: Vector<Point> = corners.iter().map(|c| round_point(*c)).collect();
    imgproc::polylines(image, &outline, true, bgr(colors::BOX), 2, LINE_8, 0)
        .map_err(|e| CalibrationError::opencv("Box drawing", e))?;

    Ok(())
}
