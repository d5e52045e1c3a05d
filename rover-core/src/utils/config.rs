//! Runtime tunables for the rover.
//!
//! Every field has a default matching the stock firmware, so a JSON document
//! only needs to name the values it overrides.

use serde::{Deserialize, Serialize};

use crate::utils::math::geometry::WheelGeometry;

/// Tunables for the control loop, sensors and command server.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    /// TCP port the command server listens on.
    pub port: u16,
    /// Obstacles at or below this distance (cm) block forward motion.
    pub stop_distance_cm: f32,
    /// How long a left/right pattern is held before the handler returns (ms).
    pub turn_dwell_ms: u32,
    /// Minimum time between two speed samples (ms).
    pub sample_interval_ms: u64,
    /// Pause between control-loop ticks (ms).
    pub tick_interval_ms: u64,
    /// Upper bound on waiting for an ultrasonic echo (µs).
    pub echo_timeout_us: u32,
    pub wheel: WheelGeometry,
}

impl RobotConfig {
    /// Parse a (possibly partial) JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            stop_distance_cm: 10.0,
            turn_dwell_ms: 500,
            sample_interval_ms: 1000,
            tick_interval_ms: 20,
            echo_timeout_us: 300_000,
            wheel: WheelGeometry::default(),
        }
    }
}
