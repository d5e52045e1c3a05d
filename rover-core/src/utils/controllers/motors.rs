//! Four-wire H-bridge motor actuation.
//!
//! The rover's two drive motors hang off an L298N-style bridge with four
//! input lines (IN1..IN4). Each [`MotorDirection`] maps to one fixed line
//! pattern. The driver remembers the direction it last asserted so the safety
//! arbiter can ask "are we driving forward?" without reading pins back.

use embedded_hal::{delay::DelayNs, digital::OutputPin};

use crate::utils::error::DeviceError;

/// Drive state asserted on the H-bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotorDirection {
    Forward,
    Backward,
    Left,
    Right,
    #[default]
    Stopped,
}

impl MotorDirection {
    /// Line levels for IN1..IN4.
    pub const fn pattern(self) -> [bool; 4] {
        match self {
            MotorDirection::Forward => [false, true, true, false],
            MotorDirection::Backward => [true, false, false, true],
            MotorDirection::Left => [true, false, true, false],
            MotorDirection::Right => [false, true, false, true],
            MotorDirection::Stopped => [false, false, false, false],
        }
    }

    pub const fn is_turn(self) -> bool {
        matches!(self, MotorDirection::Left | MotorDirection::Right)
    }
}

/// Something that can put the rover into a [`MotorDirection`].
pub trait Actuator {
    fn apply(
        &mut self,
        direction: MotorDirection,
    ) -> Result<(), DeviceError>;

    /// Direction asserted by the last successful `apply`.
    fn direction(&self) -> MotorDirection;

    fn stop(&mut self) -> Result<(), DeviceError> {
        self.apply(MotorDirection::Stopped)
    }
}

/// GPIO driver for the four bridge inputs.
pub struct MotorDriver<P, D> {
    pins: [P; 4],
    delay: D,
    turn_dwell_ms: u32,
    direction: MotorDirection,
}

impl<P, D> MotorDriver<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    /// Create a driver over IN1..IN4. The lines are not touched until the
    /// first `apply`.
    pub fn new(
        pins: [P; 4],
        delay: D,
        turn_dwell_ms: u32,
    ) -> Self {
        Self {
            pins,
            delay,
            turn_dwell_ms,
            direction: MotorDirection::Stopped,
        }
    }

    fn write_pattern(
        &mut self,
        pattern: [bool; 4],
    ) -> Result<(), DeviceError> {
        for (pin, level) in self.pins.iter_mut().zip(pattern) {
            if level {
                pin.set_high().map_err(DeviceError::motor)?;
            } else {
                pin.set_low().map_err(DeviceError::motor)?;
            }
        }
        Ok(())
    }
}

impl<P, D> Actuator for MotorDriver<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    /// Assert the pattern for `direction`. Turns hold the pattern for the
    /// configured dwell before returning, blocking the caller.
    fn apply(
        &mut self,
        direction: MotorDirection,
    ) -> Result<(), DeviceError> {
        self.write_pattern(direction.pattern())?;
        self.direction = direction;

        if direction.is_turn() {
            self.delay.delay_ms(self.turn_dwell_ms);
        }
        Ok(())
    }

    fn direction(&self) -> MotorDirection {
        self.direction
    }
}
