//! Operator key events

use crate::constants::{arm::JOG_STEP, keys};

/// Discrete operator input, decoded from `highgui::wait_key`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Select a target or capture the arm pose, depending on session state
    Trigger,
    /// Drop the pending target
    Cancel,
    /// Write the detector configuration to disk
    SaveConfig,
    /// Send the arm home
    GoHome,
    /// Re-zero the arm and send it home
    ResetHome,
    /// Nudge the arm one step along `axis` (x, y, z, r) in `direction` (+1 or -1)
    Jog { axis: usize, direction: i8 },
    /// Leave the loop
    Quit,
    /// No command; poll the tuning panel
    Reconfigure,
}

impl InputEvent {
    /// Map a key code; `-1` (no key) and unbound keys become `Reconfigure`
    pub fn from_key(key: i32) -> Self {
        if key < 0 {
            return InputEvent::Reconfigure;
        }
        // Some backends set modifier bits above the low byte
        let key = key & 0xFF;
        if let Some(&(_, axis, direction)) = keys::JOG.iter().find(|(k, _, _)| *k == key) {
            return InputEvent::Jog { axis, direction };
        }
        match key {
            keys::SPACE => InputEvent::Trigger,
            keys::CANCEL | keys::ESCAPE => InputEvent::Cancel,
            keys::SAVE_CONFIG => InputEvent::SaveConfig,
            keys::GO_HOME => InputEvent::GoHome,
            keys::RESET_HOME => InputEvent::ResetHome,
            keys::QUIT => InputEvent::Quit,
            _ => InputEvent::Reconfigure,
        }
    }

    /// Pose delta for a jog event, `None` for every other event
    pub fn jog_delta(&self) -> Option<[f64; 4]> {
        match *self {
            InputEvent::Jog { axis, direction } if axis < JOG_STEP.len() => {
                let mut delta = [0.0; 4];
                delta[axis] = JOG_STEP[axis] * f64::from(direction);
                Some(delta)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(InputEvent::from_key(32), InputEvent::Trigger);
        assert_eq!(InputEvent::from_key(b'c' as i32), InputEvent::Cancel);
        assert_eq!(InputEvent::from_key(27), InputEvent::Cancel);
        assert_eq!(InputEvent::from_key(b's' as i32), InputEvent::SaveConfig);
        assert_eq!(InputEvent::from_key(b'h' as i32), InputEvent::GoHome);
        assert_eq!(InputEvent::from_key(b'r' as i32), InputEvent::ResetHome);
        assert_eq!(InputEvent::from_key(113), InputEvent::Quit);
    }

    #[test]
    fn test_unbound_keys_reconfigure() {
        assert_eq!(InputEvent::from_key(-1), InputEvent::Reconfigure);
        assert_eq!(InputEvent::from_key(b'x' as i32), InputEvent::Reconfigure);
        assert_eq!(InputEvent::from_key(13), InputEvent::Reconfigure);
    }

    #[test]
    fn test_jog_keys() {
        assert_eq!(
            InputEvent::from_key(b'i' as i32),
            InputEvent::Jog { axis: 0, direction: 1 }
        );
        assert_eq!(
            InputEvent::from_key(b'l' as i32),
            InputEvent::Jog { axis: 1, direction: -1 }
        );
        assert_eq!(
            InputEvent::from_key(b'm' as i32).jog_delta(),
            Some([0.0, 0.0, 0.0, -3.0])
        );
        assert_eq!(
            InputEvent::from_key(b'u' as i32).jog_delta(),
            Some([0.0, 0.0, 5.0, 0.0])
        );
        assert_eq!(InputEvent::Trigger.jog_delta(), None);
    }

    #[test]
    fn test_jog_keys_do_not_shadow_commands() {
        for (key, _, _) in keys::JOG {
            assert!(![
                keys::SPACE,
                keys::ESCAPE,
                keys::CANCEL,
                keys::SAVE_CONFIG,
                keys::GO_HOME,
                keys::RESET_HOME,
                keys::QUIT
            ]
            .contains(&key));
        }
    }

    #[test]
    fn test_modifier_bits_are_ignored() {
        assert_eq!(InputEvent::from_key(0x10_0000 | 113), InputEvent::Quit);
    }
}
