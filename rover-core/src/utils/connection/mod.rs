//! Module Exports
//!
//! - `protocol`: line framing, command vocabulary and reply formatting.
//! - `server`: the TCP listener that feeds commands to the control loop.

pub mod protocol;
/// Module for the TCP command server.
pub mod server;

pub use protocol::{Command, CommandParser, Reply};
