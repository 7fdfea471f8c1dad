//! Two-state calibration session
//!
//! The operator alternates between picking the detected target and guiding
//! the arm onto it:
//!
//! ```text
//!            select (candidates non-empty)
//!   AwaitingTarget ───────────────────────────▶ AwaitingArmCapture
//!         ▲                                              │
//!         └──────── capture (record saved) / cancel ─────┘
//! ```
//!
//! A record reaches the sink only when a select is followed by a capture
//! with no cancel in between.

use log::{error, info, warn};
use opencv::core::Point;

use super::record::{CorrespondenceRecord, RecordSink};
use crate::arm::ArmDriver;
use crate::detection::Candidate;
use crate::{CalibrationError, DetectorConfig, Result};

/// Number of pose values stored per record, fixed per deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseDims {
    /// x, y, z
    Xyz,
    /// x, y, z, r (wrist rotation)
    Xyzr,
}

impl PoseDims {
    pub fn count(self) -> usize {
        match self {
            PoseDims::Xyz => 3,
            PoseDims::Xyzr => 4,
        }
    }

    pub fn from_count(count: usize) -> Option<Self> {
        match count {
            3 => Some(PoseDims::Xyz),
            4 => Some(PoseDims::Xyzr),
            _ => None,
        }
    }
}

/// Session mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the operator to select a detected target
    AwaitingTarget,
    /// Target chosen; waiting for the arm to be placed on it
    AwaitingArmCapture { target: Point },
}

/// What a trigger did
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerOutcome {
    /// Target stored, now waiting for the arm
    TargetSelected(Point),
    /// Select with nothing detected; state unchanged
    NoTarget,
    /// Record completed and written
    Captured(CorrespondenceRecord),
    /// Trigger not accepted in the current state
    Ignored,
}

/// Calibration session over an arm driver and a record sink
#[derive(Debug)]
pub struct CalibrationSession<A: ArmDriver, S: RecordSink> {
    state: SessionState,
    arm: A,
    sink: S,
    pose_dims: PoseDims,
    config: DetectorConfig,
    last_record: Option<CorrespondenceRecord>,
    records_written: usize,
}

impl<A: ArmDriver, S: RecordSink> CalibrationSession<A, S> {
    pub fn new(arm: A, sink: S, pose_dims: PoseDims, config: DetectorConfig) -> Self {
        Self {
            state: SessionState::AwaitingTarget,
            arm,
            sink,
            pose_dims,
            config,
            last_record: None,
            records_written: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn pose_dims(&self) -> PoseDims {
        self.pose_dims
    }

    /// Snapshot of the live detector configuration
    pub fn config(&self) -> DetectorConfig {
        self.config
    }

    /// Replace the detector configuration; session state is untouched
    pub fn reconfigure(&mut self, config: DetectorConfig) {
        self.config = config;
    }

    pub fn arm(&self) -> &A {
        &self.arm
    }

    pub fn arm_mut(&mut self) -> &mut A {
        &mut self.arm
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Most recently written record
    pub fn last_record(&self) -> Option<&CorrespondenceRecord> {
        self.last_record.as_ref()
    }

    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Shared operator trigger: select in `AwaitingTarget`, capture otherwise
    pub fn trigger(&mut self, candidates: &[Candidate]) -> Result<TriggerOutcome> {
        match self.state {
            SessionState::AwaitingTarget => Ok(self.select(candidates)),
            SessionState::AwaitingArmCapture { .. } => self.capture(),
        }
    }

    /// Take the highest-ranked candidate as the pending target
    pub fn select(&mut self, candidates: &[Candidate]) -> TriggerOutcome {
        if self.state != SessionState::AwaitingTarget {
            return TriggerOutcome::Ignored;
        }

        match candidates.first() {
            Some(candidate) => {
                info!("target selected at ({}, {})", candidate.point.x, candidate.point.y);
                self.state = SessionState::AwaitingArmCapture {
                    target: candidate.point,
                };
                TriggerOutcome::TargetSelected(candidate.point)
            }
            None => {
                warn!("no objects detected, select ignored");
                TriggerOutcome::NoTarget
            }
        }
    }

    /// Complete the pending record with the arm's current pose
    ///
    /// # Errors
    ///
    /// - Pose query failure or a short pose: nothing written, state unchanged
    /// - Sink failure: `CalibrationError::Persistence`, fatal; state unchanged
    /// - `go_home` failure: the record is already written and the session is
    ///   back in `AwaitingTarget`; the arm error is still returned
    pub fn capture(&mut self) -> Result<TriggerOutcome> {
        let target = match self.state {
            SessionState::AwaitingArmCapture { target } => target,
            SessionState::AwaitingTarget => return Ok(TriggerOutcome::Ignored),
        };

        let pose = self.arm.current_pose().map_err(|e| {
            warn!(
                "pose query failed for target ({}, {}): {}",
                target.x, target.y, e
            );
            e
        })?;

        let expected = self.pose_dims.count();
        if pose.len() < expected {
            warn!(
                "arm pose {:?} too short for target ({}, {})",
                pose, target.x, target.y
            );
            return Err(CalibrationError::InvalidPose {
                expected,
                actual: pose.len(),
            });
        }

        let record = CorrespondenceRecord::new([target.x, target.y], pose[..expected].to_vec());
        if let Err(source) = self.sink.append(&record) {
            error!("failed to persist record {}: {}", record, source);
            return Err(CalibrationError::Persistence { record, source });
        }

        info!("record saved: {}", record);
        self.records_written += 1;
        self.last_record = Some(record.clone());
        self.state = SessionState::AwaitingTarget;

        self.arm.go_home().map_err(|e| {
            warn!("record {} saved but arm failed to go home: {}", record, e);
            e
        })?;

        Ok(TriggerOutcome::Captured(record))
    }

    /// Drop the pending target; returns whether anything was cancelled
    pub fn cancel(&mut self) -> bool {
        match self.state {
            SessionState::AwaitingArmCapture { target } => {
                info!("capture cancelled for target ({}, {})", target.x, target.y);
                self.state = SessionState::AwaitingTarget;
                true
            }
            SessionState::AwaitingTarget => false,
        }
    }
}
