//! Robot arm driver interface and a simulated arm
//!
//! Every call blocks until the arm acknowledges completion. The session only
//! relies on the pose having at least two spatial coordinates; the exact
//! layout (x, y, z or x, y, z, r) belongs to the driver.

use log::info;

use crate::constants::arm::HOME_POSE;
use crate::{CalibrationError, Result};

/// Synchronous arm driver used by the calibration session
pub trait ArmDriver {
    /// Current end-effector pose
    fn current_pose(&mut self) -> Result<Vec<f64>>;

    /// Move the end effector to `target` and wait for completion
    fn move_to(&mut self, target: &[f64]) -> Result<()>;

    /// Close (`true`) or open (`false`) the gripper and wait for completion
    fn set_gripper(&mut self, closed: bool) -> Result<()>;

    /// Move to the home pose and wait for completion
    fn go_home(&mut self) -> Result<()>;

    /// Re-zero the arm's position reference, then go home
    fn reset_home(&mut self) -> Result<()> {
        self.go_home()
    }

    /// Move relative to the current pose; `delta` is applied component-wise
    /// and may be shorter or longer than the pose
    fn jog(&mut self, delta: &[f64]) -> Result<()> {
        let mut target = self.current_pose()?;
        for (value, step) in target.iter_mut().zip(delta) {
            *value += step;
        }
        self.move_to(&target)
    }
}

impl<A: ArmDriver + ?Sized> ArmDriver for Box<A> {
    fn current_pose(&mut self) -> Result<Vec<f64>> {
        (**self).current_pose()
    }

    fn move_to(&mut self, target: &[f64]) -> Result<()> {
        (**self).move_to(target)
    }

    fn set_gripper(&mut self, closed: bool) -> Result<()> {
        (**self).set_gripper(closed)
    }

    fn go_home(&mut self) -> Result<()> {
        (**self).go_home()
    }

    fn reset_home(&mut self) -> Result<()> {
        (**self).reset_home()
    }

    fn jog(&mut self, delta: &[f64]) -> Result<()> {
        (**self).jog(delta)
    }
}

/// In-memory arm for running the tools without hardware
///
/// Motions complete instantly. The pose is nudged with [`ArmDriver::jog`],
/// driven by the jog keys in the calibration tool.
#[derive(Debug, Clone)]
pub struct SimulatedArm {
    home: Vec<f64>,
    pose: Vec<f64>,
    gripper_closed: bool,
}

impl Default for SimulatedArm {
    fn default() -> Self {
        Self::new(HOME_POSE.to_vec())
    }
}

impl SimulatedArm {
    /// Create an arm resting at `home`
    pub fn new(home: Vec<f64>) -> Self {
        Self {
            pose: home.clone(),
            home,
            gripper_closed: false,
        }
    }

    pub fn is_gripper_closed(&self) -> bool {
        self.gripper_closed
    }
}

impl ArmDriver for SimulatedArm {
    fn current_pose(&mut self) -> Result<Vec<f64>> {
        Ok(self.pose.clone())
    }

    fn move_to(&mut self, target: &[f64]) -> Result<()> {
        if target.len() != self.home.len() {
            return Err(CalibrationError::arm(
                "move_to",
                format!(
                    "target has {} values, arm expects {}",
                    target.len(),
                    self.home.len()
                ),
            ));
        }
        info!("simulated arm: move to {:?}", target);
        self.pose = target.to_vec();
        Ok(())
    }

    fn set_gripper(&mut self, closed: bool) -> Result<()> {
        info!("simulated arm: gripper {}", if closed { "closed" } else { "open" });
        self.gripper_closed = closed;
        Ok(())
    }

    fn go_home(&mut self) -> Result<()> {
        info!("simulated arm: go home");
        self.pose = self.home.clone();
        Ok(())
    }

    fn reset_home(&mut self) -> Result<()> {
        info!("simulated arm: reset home");
        self.gripper_closed = false;
        self.go_home()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_arm_starts_home() {
        let mut arm = SimulatedArm::default();
        assert_eq!(arm.current_pose().unwrap(), HOME_POSE.to_vec());
    }

    #[test]
    fn test_move_jog_and_home() {
        let mut arm = SimulatedArm::new(vec![0.0, 0.0, 50.0]);
        arm.move_to(&[10.0, 20.0, 5.0]).unwrap();
        arm.jog(&[1.0, -1.0]).unwrap();
        assert_eq!(arm.current_pose().unwrap(), vec![11.0, 19.0, 5.0]);

        arm.go_home().unwrap();
        assert_eq!(arm.current_pose().unwrap(), vec![0.0, 0.0, 50.0]);
    }

    #[test]
    fn test_jog_ignores_extra_components() {
        let mut arm = SimulatedArm::new(vec![0.0, 0.0, 50.0]);
        arm.jog(&[5.0, 0.0, -5.0, 3.0]).unwrap();
        assert_eq!(arm.current_pose().unwrap(), vec![5.0, 0.0, 45.0]);
    }

    #[test]
    fn test_boxed_arm_jogs() {
        let mut arm: Box<dyn ArmDriver> = Box::new(SimulatedArm::default());
        arm.jog(&[0.0, 10.0]).unwrap();
        assert_eq!(arm.current_pose().unwrap(), vec![220.0, 10.0, 135.0, 9.0]);
    }

    #[test]
    fn test_move_rejects_wrong_dimensionality() {
        let mut arm = SimulatedArm::default();
        let err = arm.move_to(&[1.0, 2.0]).unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(arm.current_pose().unwrap(), HOME_POSE.to_vec());
    }

    #[test]
    fn test_gripper_and_reset() {
        let mut arm: Box<dyn ArmDriver> = Box::new(SimulatedArm::default());
        arm.set_gripper(true).unwrap();
        arm.move_to(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        arm.reset_home().unwrap();
        assert_eq!(arm.current_pose().unwrap(), HOME_POSE.to_vec());
    }
}
