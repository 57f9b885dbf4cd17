//! Request frames.
//!
//! Three requests carry no payload and are a bare header plus checksum:
//!
//! | Request | Bytes |
//! |---------|-------|
//! | Discovery | `01 00 00 54` |
//! | Configuration | `21 00 00 74` |
//! | Control read | `F1 00 00 A4` |
//!
//! The control-write request carries power, setpoint and mode:
//!
//! | Byte | Field |
//! |------|-------|
//! | 0-2 | `F2 00 00` |
//! | 3 | power (0/1) |
//! | 4-5 | setpoint in tenths of a degree, little-endian |
//! | 6 | mode |
//! | 7 | checksum |
//!
//! # Example
//!
//! ```
//! use tsmart::{ControlWriteCommand, Mode, QueryCommand};
//!
//! assert_eq!(QueryCommand::control_read().to_bytes(), [0xF1, 0x00, 0x00, 0xA4]);
//!
//! let cmd = ControlWriteCommand::new(true, Mode::Eco, 50.0).unwrap();
//! assert_eq!(cmd.to_bytes(), [0xF2, 0x00, 0x00, 0x01, 0xF4, 0x01, 0x01, 0x52]);
//! ```

use crate::checksum;
use crate::error::{Result, TSmartError};
use crate::header::{Command, FrameHeader};
use crate::mode::Mode;
use crate::schema::{control, RecordBuf, CONTROL_WRITE_REQUEST};

/// Request without payload: discovery, configuration or control read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryCommand {
    header: FrameHeader,
}

impl QueryCommand {
    fn new(command: Command) -> Self {
        Self {
            header: FrameHeader::request(command),
        }
    }

    /// Discovery broadcast.
    pub fn discovery() -> Self {
        Self::new(Command::Discovery)
    }

    /// Configuration read.
    pub fn configuration() -> Self {
        Self::new(Command::Configuration)
    }

    /// Control-state read.
    pub fn control_read() -> Self {
        Self::new(Command::ControlRead)
    }

    /// Serializes the request with its checksum.
    pub fn to_bytes(&self) -> Vec<u8> {
        checksum::append_checksum(&self.header.to_bytes())
    }
}

/// Request setting power, mode and setpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlWriteCommand {
    power: bool,
    mode: Mode,
    setpoint_tenths: u16,
}

impl ControlWriteCommand {
    /// Creates a control-write request.
    ///
    /// The setpoint is rounded to the nearest tenth of a degree.
    ///
    /// # Errors
    ///
    /// Returns `TSmartError::Validation` if the setpoint is not finite or does
    /// not fit the 16-bit wire field (0.0 to 6553.5).
    pub fn new(power: bool, mode: Mode, setpoint: f32) -> Result<Self> {
        let scaled = (setpoint * 10.0).round();
        if !scaled.is_finite() {
            return Err(TSmartError::validation("setpoint", "must be a finite number"));
        }
        if !(0.0..=f32::from(u16::MAX)).contains(&scaled) {
            return Err(TSmartError::validation(
                "setpoint",
                format!("{} is outside 0.0-6553.5", setpoint),
            ));
        }

        Ok(Self {
            power,
            mode,
            setpoint_tenths: scaled as u16,
        })
    }

    /// Requested power state.
    pub fn power(&self) -> bool {
        self.power
    }

    /// Requested mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Requested setpoint in tenths of a degree.
    pub fn setpoint_tenths(&self) -> u16 {
        self.setpoint_tenths
    }

    /// Serializes the request with its checksum.
    pub fn to_bytes(&self) -> Vec<u8> {
        RecordBuf::new(&CONTROL_WRITE_REQUEST)
            .put_u8(control::POWER, u8::from(self.power))
            .put_u16(control::SETPOINT, self.setpoint_tenths)
            .put_u8(control::MODE, self.mode.code())
            .finish()
    }
}

/// Encodes the discovery request.
pub fn encode_discovery_request() -> Vec<u8> {
    QueryCommand::discovery().to_bytes()
}

/// Encodes the configuration request.
pub fn encode_configuration_request() -> Vec<u8> {
    QueryCommand::configuration().to_bytes()
}

/// Encodes the control-read request.
pub fn encode_control_read_request() -> Vec<u8> {
    QueryCommand::control_read().to_bytes()
}

/// Encodes a control-write request.
///
/// # Errors
///
/// Returns `TSmartError::Validation` for an unrepresentable setpoint.
pub fn encode_control_write_request(power: bool, mode: Mode, setpoint: f32) -> Result<Vec<u8>> {
    Ok(ControlWriteCommand::new(power, mode, setpoint)?.to_bytes())
}
