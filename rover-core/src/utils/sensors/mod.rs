//! Sensor drivers for the rover.
//!
//! - `pulse`: interrupt-fed wheel encoder counter and the speed estimator
//!   that drains it.
//! - `ultrasonic`: trigger/echo ranging with timeout and band filtering.

pub mod pulse;
pub mod ultrasonic;

pub use pulse::{PulseCounter, SpeedEstimator, PULSE_COUNTER};
pub use ultrasonic::{Distance, EchoTimer, PollingEcho, RangeFinder, RangeSensor};
