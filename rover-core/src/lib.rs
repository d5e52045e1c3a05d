//! Control loop, sensor drivers and command server for a Wi-Fi driven rover
//! on no-std embedded platforms.
//!
//! For a runnable host simulation, see `rover-app/mock-mcu`.
#![no_std]

pub mod utils;

#[doc(hidden)]
pub use static_cell;
