//! Wheel geometry for converting encoder edge counts into linear speed.
//!
//! # Example
//! ```rust
//! use rover_core::utils::math::geometry::WheelGeometry;
//! let wheel = WheelGeometry::new(0.68, 20);
//! let speed = wheel.speed_from_pulses(40);
//! assert!((speed - 4.2726).abs() < 1e-3);
//! ```
use core::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// Physical description of the encoder wheel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelGeometry {
    /// Wheel diameter (cm)
    pub diameter_cm: f32,
    /// Encoder slots per wheel revolution
    pub pulses_per_revolution: u32,
}

impl WheelGeometry {
    pub const fn new(
        diameter_cm: f32,
        pulses_per_revolution: u32,
    ) -> Self {
        Self {
            diameter_cm,
            pulses_per_revolution,
        }
    }

    /// Distance covered by one full revolution (cm).
    pub fn circumference(&self) -> f32 {
        PI * self.diameter_cm
    }

    /// Convert the edges counted over one sampling interval into cm/s.
    ///
    /// A geometry with zero pulses per revolution yields zero rather than
    /// dividing by zero.
    pub fn speed_from_pulses(
        &self,
        pulses: u32,
    ) -> f32 {
        if self.pulses_per_revolution == 0 {
            return 0.0;
        }
        let revolutions = pulses as f32 / self.pulses_per_revolution as f32;
        revolutions * self.circumference()
    }
}

impl Default for WheelGeometry {
    fn default() -> Self {
        Self::new(0.68, 20)
    }
}
