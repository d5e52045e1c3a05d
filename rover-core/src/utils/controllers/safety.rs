//! Obstacle arbitration.
//!
//! Evaluated once per control-loop tick against a fresh distance sample and
//! the actuator's last asserted direction. It can only ever demand a stop,
//! and only while driving forward.

use crate::utils::{controllers::motors::MotorDirection, sensors::ultrasonic::Distance};

/// Outcome of one arbitration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Leave the motors alone.
    Clear,
    /// An obstacle is inside the stop distance while moving forward.
    ForceStop,
}

pub struct SafetyArbiter {
    stop_distance_cm: f32,
}

impl SafetyArbiter {
    pub fn new(stop_distance_cm: f32) -> Self {
        Self { stop_distance_cm }
    }

    /// Whether `distance` is close enough to refuse forward motion.
    pub fn is_blocked(
        &self,
        distance: Distance,
    ) -> bool {
        distance.is_within(self.stop_distance_cm)
    }

    pub fn evaluate(
        &self,
        distance: Distance,
        direction: MotorDirection,
    ) -> Verdict {
        if direction == MotorDirection::Forward && self.is_blocked(distance) {
            Verdict::ForceStop
        } else {
            Verdict::Clear
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_forward_is_stopped() {
        let arbiter = SafetyArbiter::new(10.0);
        let near = Distance::from_cm(5.0);
        assert_eq!(arbiter.evaluate(near, MotorDirection::Forward), Verdict::ForceStop);
        for dir in [
            MotorDirection::Backward,
            MotorDirection::Left,
            MotorDirection::Right,
            MotorDirection::Stopped,
        ] {
            assert_eq!(arbiter.evaluate(near, dir), Verdict::Clear);
        }
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let arbiter = SafetyArbiter::new(10.0);
        assert!(arbiter.is_blocked(Distance::from_cm(10.0)));
        assert!(!arbiter.is_blocked(Distance::from_cm(10.01)));
    }

    #[test]
    fn test_sentinel_never_blocks() {
        let arbiter = SafetyArbiter::new(10.0);
        assert_eq!(
            arbiter.evaluate(Distance::NO_READING, MotorDirection::Forward),
            Verdict::Clear
        );
    }
}
