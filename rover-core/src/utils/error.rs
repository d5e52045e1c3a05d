//! Hardware error taxonomy.
//!
//! Pin drivers report their own error types; the rover only cares about the
//! `ErrorKind` and which line failed. None of these are fatal to the control
//! loop, they are logged and degraded to a safe default by the caller.

use embedded_hal::digital::{Error, ErrorKind};

/// Errors that can occur when driving the rover's GPIO lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    /// One of the four H-bridge input lines rejected a level change.
    Motor(ErrorKind),
    /// The ultrasonic trigger line rejected a level change.
    Trigger(ErrorKind),
    /// The ultrasonic echo line could not be read.
    Echo(ErrorKind),
}

impl DeviceError {
    pub fn motor<E: Error>(e: E) -> Self {
        DeviceError::Motor(e.kind())
    }

    pub fn trigger<E: Error>(e: E) -> Self {
        DeviceError::Trigger(e.kind())
    }

    pub fn echo<E: Error>(e: E) -> Self {
        DeviceError::Echo(e.kind())
    }
}

impl core::fmt::Display for DeviceError {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        match self {
            DeviceError::Motor(kind) => write!(f, "motor line error: {kind}"),
            DeviceError::Trigger(kind) => write!(f, "trigger line error: {kind}"),
            DeviceError::Echo(kind) => write!(f, "echo line error: {kind}"),
        }
    }
}

impl core::error::Error for DeviceError {}
