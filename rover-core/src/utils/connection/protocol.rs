//! Plain-text command protocol.
//!
//! One command per `\n`-terminated line. Lines are trimmed of surrounding
//! whitespace (including `\r`) and matched exactly and case-sensitively
//! against a closed vocabulary. Anything else, including empty or
//! over-long lines, is [`Command::Unrecognized`].

use core::fmt;

use heapless::Vec;

use crate::utils::sensors::ultrasonic::Distance;

/// Longest line kept before the rest of it is discarded.
pub const MAX_LINE_LEN: usize = 64;

/// Inbound command vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Forward,
    Backward,
    Left,
    Right,
    Stop,
    GetSpeed,
    GetDistance,
    Unrecognized,
}

impl Command {
    /// Match one line against the vocabulary.
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "forward" => Command::Forward,
            "backward" => Command::Backward,
            "left" => Command::Left,
            "right" => Command::Right,
            "stop" => Command::Stop,
            "get_speed" => Command::GetSpeed,
            "get_distance" => Command::GetDistance,
            _ => Command::Unrecognized,
        }
    }
}

/// Reply line written back to the client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reply {
    /// Current speed (cm/s).
    Speed(f32),
    Distance(Distance),
    UnknownCommand,
}

impl fmt::Display for Reply {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Reply::Speed(speed) => write!(f, "{speed:.2}"),
            Reply::Distance(distance) => write!(f, "{:.2}", distance.cm()),
            Reply::UnknownCommand => f.write_str("Unknown command."),
        }
    }
}

/// Frames a byte stream into [`Command`]s.
pub struct CommandParser {
    line: Vec<u8, MAX_LINE_LEN>,
    overflowed: bool,
}

impl CommandParser {
    pub fn new() -> Self {
        Self {
            line: Vec::new(),
            overflowed: false,
        }
    }

    /// Process a single incoming byte. Returns `Some(Command)` once a full
    /// line has been received.
    pub fn push(
        &mut self,
        byte: u8,
    ) -> Option<Command> {
        if byte != b'\n' {
            if self.line.push(byte).is_err() {
                self.overflowed = true;
            }
            return None;
        }

        let command = if self.overflowed {
            Command::Unrecognized
        } else {
            match core::str::from_utf8(&self.line) {
                Ok(line) => Command::parse(line),
                Err(_) => Command::Unrecognized,
            }
        };

        self.line.clear();
        self.overflowed = false;
        Some(command)
    }

    /// Drop any partially received line.
    pub fn reset(&mut self) {
        self.line.clear();
        self.overflowed = false;
    }
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new()
    }
}
