//! Operator status text drawn over the annotated frame

use opencv::{
    core::{Mat, Point},
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8},
    prelude::*,
};

use crate::calibration::{CorrespondenceRecord, SessionState};
use crate::constants::colors;
use crate::detection::object::bgr;
use crate::detection::Candidate;
use crate::{CalibrationError, Result};

/// Text lines shown to the operator for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct StatusOverlay {
    pub instruction: String,
    pub end_effector: String,
    pub target: String,
    pub record: Option<String>,
}

impl StatusOverlay {
    /// Build the overlay from the session state and the latest readings
    pub fn new(
        state: SessionState,
        pose: Option<&[f64]>,
        best: Option<&Candidate>,
        last_record: Option<&CorrespondenceRecord>,
    ) -> Self {
        let instruction = match state {
            SessionState::AwaitingTarget => "Press <space> to record the target position.",
            SessionState::AwaitingArmCapture { .. } => {
                "Jog the arm onto the target (i/k j/l u/o n/m), then <space> to record (c to cancel)."
            }
        }
        .to_string();

        let end_effector = match pose {
            Some(pose) => format!(
                "End effector: ({})",
                pose.iter()
                    .take(2)
                    .map(|v| format!("{}", v.round() as i64))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            None => "End effector: unknown".to_string(),
        };

        let target = match best {
            Some(candidate) => format!("Target: ({}, {})", candidate.point.x, candidate.point.y),
            None => "Target: none".to_string(),
        };

        let record = match (state, last_record) {
            (SessionState::AwaitingArmCapture { target }, _) => {
                Some(format!("Pending: ({}, {})", target.x, target.y))
            }
            (SessionState::AwaitingTarget, Some(record)) => Some(format!("Data: {} saved", record)),
            (SessionState::AwaitingTarget, None) => None,
        };

        Self {
            instruction,
            end_effector,
            target,
            record,
        }
    }

    /// Draw the lines onto `image`
    pub fn draw(&self, image: &mut Mat) -> Result<()> {
        let width = image.cols();
        let height = image.rows();
        let bottom = (height as f64 * 0.9) as i32;
        let last = (height as f64 * 0.95) as i32;

        let mut lines = vec![
            (self.instruction.as_str(), Point::new(5, 40)),
            (self.end_effector.as_str(), Point::new(5, bottom)),
            (self.target.as_str(), Point::new(5, last)),
        ];
        if let Some(record) = &self.record {
            lines.push((record.as_str(), Point::new((width as f64 * 0.6) as i32, bottom)));
        }

        for (text, origin) in lines {
            imgproc::put_text(
                image,
                text,
                origin,
                FONT_HERSHEY_SIMPLEX,
                0.6,
                bgr(colors::STATUS),
                2,
                LINE_8,
                false,
            )
            .map_err(|e| CalibrationError::opencv("Status drawing", e))?;
        }
        Ok(())
    }
}
