//! Frame header and command tags.
//!
//! Every TSmart frame, request or response, starts with the same 3-byte header:
//!
//! | Byte | Field | Description |
//! |------|-------|-------------|
//! | 0 | CMD | Command tag (0 in a device error response) |
//! | 1 | SUB | Sub command (always 0x00 in requests) |
//! | 2 | SUB2 | Second sub command (always 0x00 in requests) |
//!
//! The header is followed by a command-specific payload and the checksum byte.
//!
//! # Example
//!
//! ```
//! use tsmart::{Command, FrameHeader};
//!
//! let header = FrameHeader::request(Command::ControlRead);
//! assert_eq!(header.to_bytes(), [0xF1, 0x00, 0x00]);
//! ```

use std::fmt;

use crate::error::ResponseFault;

/// Frame header size in bytes.
pub const HEADER_SIZE: usize = 3;

/// Command tag carried in the first header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Broadcast device discovery.
    Discovery,
    /// Read device identity and firmware information.
    Configuration,
    /// Read live control state.
    ControlRead,
    /// Set power, mode and setpoint.
    ControlWrite,
}

impl Command {
    /// Returns the wire value of this command.
    pub fn code(self) -> u8 {
        match self {
            Command::Discovery => 0x01,
            Command::Configuration => 0x21,
            Command::ControlRead => 0xF1,
            Command::ControlWrite => 0xF2,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::Discovery => "discovery",
            Command::Configuration => "configuration",
            Command::ControlRead => "control-read",
            Command::ControlWrite => "control-write",
        };
        write!(f, "{} (0x{:02X})", name, self.code())
    }
}

/// 3-byte frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Command tag.
    pub command: u8,
    /// Sub command.
    pub sub: u8,
    /// Second sub command.
    pub sub2: u8,
}

impl FrameHeader {
    /// Creates the header of a request frame.
    pub fn request(command: Command) -> Self {
        Self {
            command: command.code(),
            sub: 0x00,
            sub2: 0x00,
        }
    }

    /// Serializes the header to bytes.
    pub fn to_bytes(self) -> [u8; HEADER_SIZE] {
        [self.command, self.sub, self.sub2]
    }

    /// Parses a header from the start of a frame.
    ///
    /// # Errors
    ///
    /// Returns a `Length` fault if the frame is shorter than the header.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ResponseFault> {
        match data {
            [command, sub, sub2, ..] => Ok(Self {
                command: *command,
                sub: *sub,
                sub2: *sub2,
            }),
            _ => Err(ResponseFault::Length {
                expected: HEADER_SIZE,
                actual: data.len(),
            }),
        }
    }

    /// Returns whether this header carries the device error code.
    pub fn is_error(self) -> bool {
        self.command == 0
    }
}

impl fmt::Display for FrameHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X} {:02X} {:02X}", self.command, self.sub, self.sub2)
    }
}
