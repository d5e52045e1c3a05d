//! Wheel encoder pulse counting and speed estimation.
//!
//! The encoder's edge interrupt is the only context besides the control loop
//! that touches shared state. `PulseCounter` keeps the count behind a
//! critical-section mutex: the interrupt handler calls [`PulseCounter::on_edge`]
//! and the [`SpeedEstimator`] calls [`PulseCounter::drain`], which reads and
//! zeroes the count inside one critical section so no edge is lost or counted
//! twice across a drain.

use core::cell::Cell;

use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

use crate::utils::math::geometry::WheelGeometry;

/// Counter fed by the firmware's GPIO edge interrupt.
pub static PULSE_COUNTER: PulseCounter = PulseCounter::new();

/// Edge accumulator shared between the encoder interrupt and the control loop.
pub struct PulseCounter {
    count: Mutex<CriticalSectionRawMutex, Cell<u32>>,
}

impl PulseCounter {
    pub const fn new() -> Self {
        Self {
            count: Mutex::new(Cell::new(0)),
        }
    }

    /// Record one rising edge. Safe to call from interrupt context.
    #[inline]
    pub fn on_edge(&self) {
        self.count.lock(|c| c.set(c.get().wrapping_add(1)));
    }

    /// Atomically take the accumulated count and reset it to zero.
    #[inline]
    pub fn drain(&self) -> u32 {
        self.count.lock(|c| c.replace(0))
    }

    /// Current count without resetting it.
    pub fn peek(&self) -> u32 {
        self.count.lock(|c| c.get())
    }
}

impl Default for PulseCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts drained edge counts into linear speed once per sampling interval.
pub struct SpeedEstimator {
    wheel: WheelGeometry,
    interval_ms: u64,
    last_sample_ms: u64,
    speed: f32,
}

impl SpeedEstimator {
    pub fn new(
        wheel: WheelGeometry,
        interval_ms: u64,
    ) -> Self {
        Self {
            wheel,
            interval_ms,
            last_sample_ms: 0,
            speed: 0.0,
        }
    }

    /// Sample the counter if at least one interval elapsed since the last sample.
    ///
    /// Returns the new speed (cm/s) when a sample was taken. Never waits for
    /// edges; whatever accumulated, including zero, is used.
    pub fn sample_if_due(
        &mut self,
        now_ms: u64,
        counter: &PulseCounter,
    ) -> Option<f32> {
        if now_ms.saturating_sub(self.last_sample_ms) < self.interval_ms {
            return None;
        }

        let pulses = counter.drain();
        self.speed = self.wheel.speed_from_pulses(pulses);
        self.last_sample_ms = now_ms;
        tracing::debug!(pulses, speed = self.speed, "speed sampled");
        Some(self.speed)
    }

    /// Most recent speed estimate (cm/s); zero until the first sample.
    pub fn speed(&self) -> f32 {
        self.speed
    }
}
