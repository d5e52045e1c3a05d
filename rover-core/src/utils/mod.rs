//! Utility re-exports and helper macros for the rover.
//!
//! - `config`: tunables with the firmware defaults
//! - `connection`: line protocol and the TCP command server
//! - `controllers`: motor actuation, safety arbitration and the control loop
//! - `error`: hardware error taxonomy
//! - `math`: wheel geometry for speed conversion
//! - `sensors`: pulse counting and ultrasonic ranging
//!
//! The `mk_static!` macro simplifies static initialization in no-std contexts.

pub mod config;
pub mod connection;
pub mod controllers;
pub mod error;
pub mod math;
pub mod sensors;

pub use config::RobotConfig;
pub use connection::server::run as command_server;
pub use controllers::SystemController;
pub use embassy_time::*;
pub use sensors::pulse::PULSE_COUNTER;

#[macro_export]
/// Initialize a no-std static cell and write the given value into it.
///
/// This macro creates a `static_cell::StaticCell` for type `$t` and initializes
/// it with `$val`, returning a mutable reference to the stored value.
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: $crate::static_cell::StaticCell<$t> =
            $crate::static_cell::StaticCell::new();
        STATIC_CELL.uninit().write($val)
    }};
}
