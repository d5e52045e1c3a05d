//! Ultrasonic range sensor (HC-SR04 style trigger/echo pair).
//!
//! A measurement pulls the trigger low, raises it for 10 µs, drops it again and
//! then times the echo pulse. The round trip is converted to centimetres using
//! 0.034 cm/µs for the speed of sound. Timeouts and readings outside the
//! sensor's usable band are replaced by [`Distance::NO_READING`], which reads
//! as "no obstacle" to every threshold check.

use embassy_time::{Duration, Instant};
use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};

use crate::utils::error::DeviceError;

/// Speed of sound, cm per µs.
const SOUND_CM_PER_US: f32 = 0.034;
/// Closest reading the sensor resolves (cm).
pub const MIN_RANGE_CM: f32 = 2.0;
/// Farthest reading the sensor resolves (cm).
pub const MAX_RANGE_CM: f32 = 400.0;
/// Default echo timeout (µs).
pub const ECHO_TIMEOUT_US: u32 = 300_000;

/// A filtered distance sample in centimetres.
///
/// Always either inside `[MIN_RANGE_CM, MAX_RANGE_CM]` or the sentinel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distance(f32);

impl Distance {
    /// Sentinel for "no reliable reading", treated as far away.
    pub const NO_READING: Distance = Distance(1000.0);

    /// Convert a raw echo width into a filtered distance.
    pub fn from_echo_us(echo_us: u32) -> Self {
        if echo_us == 0 {
            return Self::NO_READING;
        }
        let cm = echo_us as f32 * SOUND_CM_PER_US / 2.0;
        Self::from_cm(cm)
    }

    /// Wrap a centimetre value, substituting the sentinel when out of band.
    pub fn from_cm(cm: f32) -> Self {
        if (MIN_RANGE_CM..=MAX_RANGE_CM).contains(&cm) {
            Distance(cm)
        } else {
            Self::NO_READING
        }
    }

    pub fn cm(self) -> f32 {
        self.0
    }

    pub fn is_reading(self) -> bool {
        self != Self::NO_READING
    }

    /// Whether a real reading places an obstacle at or inside `threshold_cm`.
    ///
    /// The sentinel never counts as an obstacle.
    pub fn is_within(
        self,
        threshold_cm: f32,
    ) -> bool {
        self.is_reading() && self.0 <= threshold_cm
    }
}

/// Measures the width of the echo pulse.
pub trait EchoTimer {
    /// Width of the next high pulse in µs, or 0 if none completed within
    /// `timeout_us`.
    fn pulse_width_us(
        &mut self,
        timeout_us: u32,
    ) -> Result<u32, DeviceError>;
}

/// Anything that can produce a fresh [`Distance`].
pub trait RangeFinder {
    fn measure(&mut self) -> Distance;
}

/// Busy-polls an echo input, timing both edges against the monotonic clock.
///
/// The timeout covers the whole wait: a pulse still in progress, the wait
/// for the rising edge and the high phase itself.
pub struct PollingEcho<P> {
    pin: P,
}

impl<P> PollingEcho<P>
where
    P: InputPin,
{
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Spin until the line reads `high`, returning false once `deadline` passes.
    fn wait_for(
        &mut self,
        high: bool,
        deadline: Instant,
    ) -> Result<bool, DeviceError> {
        loop {
            if self.pin.is_high().map_err(DeviceError::echo)? == high {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
        }
    }
}

impl<P> EchoTimer for PollingEcho<P>
where
    P: InputPin,
{
    fn pulse_width_us(
        &mut self,
        timeout_us: u32,
    ) -> Result<u32, DeviceError> {
        let deadline = Instant::now() + Duration::from_micros(timeout_us as u64);

        if !self.wait_for(false, deadline)? || !self.wait_for(true, deadline)? {
            return Ok(0);
        }

        let rise = Instant::now();
        if !self.wait_for(false, deadline)? {
            return Ok(0);
        }
        let width = Instant::now().saturating_duration_since(rise);
        Ok(width.as_micros().min(u32::MAX as u64) as u32)
    }
}

/// Trigger/echo ultrasonic ranger.
pub struct RangeSensor<T, E, D> {
    trigger: T,
    echo: E,
    delay: D,
    timeout_us: u32,
}

impl<T, E, D> RangeSensor<T, E, D>
where
    T: OutputPin,
    E: EchoTimer,
    D: DelayNs,
{
    pub fn new(
        trigger: T,
        echo: E,
        delay: D,
        timeout_us: u32,
    ) -> Self {
        Self {
            trigger,
            echo,
            delay,
            timeout_us,
        }
    }

    /// Fire one ranging cycle and report hardware failures.
    pub fn try_measure(&mut self) -> Result<Distance, DeviceError> {
        self.trigger.set_low().map_err(DeviceError::trigger)?;
        self.delay.delay_us(2);
        self.trigger.set_high().map_err(DeviceError::trigger)?;
        self.delay.delay_us(10);
        self.trigger.set_low().map_err(DeviceError::trigger)?;

        let echo_us = self.echo.pulse_width_us(self.timeout_us)?;
        Ok(Distance::from_echo_us(echo_us))
    }
}

impl<T, E, D> RangeFinder for RangeSensor<T, E, D>
where
    T: OutputPin,
    E: EchoTimer,
    D: DelayNs,
{
    /// Measure, degrading any hardware failure to the sentinel.
    fn measure(&mut self) -> Distance {
        self.try_measure().unwrap_or_else(|error| {
            tracing::error!(%error, "ranging failed");
            Distance::NO_READING
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_echo_is_sentinel() {
        assert_eq!(Distance::from_echo_us(0), Distance::NO_READING);
    }

    #[test]
    fn test_band_edges() {
        // 2 cm is 117.6 µs, 400 cm is 23529.4 µs round trip
        assert_eq!(Distance::from_echo_us(100), Distance::NO_READING);
        assert!(Distance::from_echo_us(118).is_reading());
        assert!(Distance::from_echo_us(23_529).is_reading());
        assert_eq!(Distance::from_echo_us(23_600), Distance::NO_READING);
    }

    #[test]
    fn test_sentinel_is_never_an_obstacle() {
        assert!(!Distance::NO_READING.is_within(10.0));
        assert!(!Distance::NO_READING.is_within(5000.0));
    }
}
