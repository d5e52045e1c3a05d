//! Test doubles shared by the integration tests.
#![allow(dead_code)]

use std::{
    cell::Cell,
    convert::Infallible,
    rc::Rc,
};

use embedded_hal::{
    delay::DelayNs,
    digital::{ErrorKind, ErrorType, OutputPin},
};
use rover_core::utils::{
    controllers::{MotorDirection, MotorDriver, SystemController},
    error::DeviceError,
    sensors::{
        pulse::PulseCounter,
        ultrasonic::{Distance, EchoTimer, RangeFinder},
    },
    RobotConfig,
};

/// Output line whose level the test can observe after handing it away.
#[derive(Clone, Default)]
pub struct SharedPin(pub Rc<Cell<bool>>);

impl ErrorType for SharedPin {
    type Error = Infallible;
}

impl OutputPin for SharedPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set(true);
        Ok(())
    }
}

/// Four observable H-bridge lines.
#[derive(Clone, Default)]
pub struct Bridge {
    pub pins: [SharedPin; 4],
}

impl Bridge {
    pub fn levels(&self) -> [bool; 4] {
        [0, 1, 2, 3].map(|i| self.pins[i].0.get())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PinFault;

impl embedded_hal::digital::Error for PinFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Output line that rejects every level change.
pub struct FailingPin;

impl ErrorType for FailingPin {
    type Error = PinFault;
}

impl OutputPin for FailingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Err(PinFault)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Err(PinFault)
    }
}

/// Delay that only adds up how long it was asked to wait.
#[derive(Clone, Default)]
pub struct RecordingDelay(pub Rc<Cell<u64>>);

impl RecordingDelay {
    pub fn total_ms(&self) -> u64 {
        self.0.get() / 1_000_000
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(
        &mut self,
        ns: u32,
    ) {
        self.0.set(self.0.get() + ns as u64);
    }
}

/// Echo timer that always reports the same pulse width.
pub struct FixedEcho(pub u32);

impl EchoTimer for FixedEcho {
    fn pulse_width_us(
        &mut self,
        _timeout_us: u32,
    ) -> Result<u32, DeviceError> {
        Ok(self.0)
    }
}

/// Range finder whose reading the test moves around, counting measurements.
#[derive(Clone)]
pub struct Obstacle {
    pub distance: Rc<Cell<Distance>>,
    pub measurements: Rc<Cell<u32>>,
}

impl Obstacle {
    pub fn at(cm: f32) -> Self {
        Self {
            distance: Rc::new(Cell::new(Distance::from_cm(cm))),
            measurements: Rc::new(Cell::new(0)),
        }
    }

    pub fn move_to(
        &self,
        cm: f32,
    ) {
        self.distance.set(Distance::from_cm(cm));
    }
}

impl RangeFinder for Obstacle {
    fn measure(&mut self) -> Distance {
        self.measurements.set(self.measurements.get() + 1);
        self.distance.get()
    }
}

pub type TestController<'a> = SystemController<'a, MotorDriver<SharedPin, RecordingDelay>, Obstacle>;

/// Controller over observable pins and a movable obstacle.
pub fn rover(
    counter: &PulseCounter,
    obstacle_cm: f32,
) -> (TestController<'_>, Bridge, Obstacle, RecordingDelay) {
    let config = RobotConfig::default();
    let bridge = Bridge::default();
    let delay = RecordingDelay::default();
    let obstacle = Obstacle::at(obstacle_cm);
    let motors = MotorDriver::new(bridge.pins.clone(), delay.clone(), config.turn_dwell_ms);
    let ctrl = SystemController::new(motors, obstacle.clone(), counter, &config);
    (ctrl, bridge, obstacle, delay)
}

pub fn pattern(direction: MotorDirection) -> [bool; 4] {
    direction.pattern()
}
