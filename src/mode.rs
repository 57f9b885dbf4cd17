//! Heater operating modes.
//!
//! | Mode | Code | Description |
//! |------|:----:|-------------|
//! | MANUAL | 0x00 | Hold the setpoint |
//! | ECO | 0x01 | Economy heating |
//! | SMART | 0x02 | Learned schedule |
//! | TIMER | 0x03 | Time programme |
//! | TRAVEL | 0x04 | Frost protection while away |
//! | BOOST | 0x05 | One-shot boost |
//! | LIMITED | 0x21 | Device-imposed limited operation |
//! | CRITICAL | 0x22 | Device-imposed critical state |
//!
//! # Example
//!
//! ```
//! use tsmart::Mode;
//!
//! assert_eq!(Mode::Eco.code(), 0x01);
//! assert_eq!(Mode::from_code(0x21), Some(Mode::Limited));
//! assert_eq!(Mode::from_code(0x06), None);
//! assert_eq!(Mode::Boost.to_string(), "BOOST");
//! ```

use crate::error::TSmartError;

/// Operating mode reported and accepted by the heater.
///
/// The set is closed: wire values outside it are rejected, never cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Mode {
    /// Manual mode.
    Manual,
    /// Eco mode.
    Eco,
    /// Smart mode.
    Smart,
    /// Timer mode.
    Timer,
    /// Travel mode.
    Travel,
    /// Boost mode.
    Boost,
    /// Limited mode.
    Limited,
    /// Critical mode.
    Critical,
}

impl Mode {
    /// All modes in wire-code order.
    pub const ALL: [Mode; 8] = [
        Mode::Manual,
        Mode::Eco,
        Mode::Smart,
        Mode::Timer,
        Mode::Travel,
        Mode::Boost,
        Mode::Limited,
        Mode::Critical,
    ];

    /// Returns the wire value of this mode.
    pub fn code(self) -> u8 {
        match self {
            Mode::Manual => 0x00,
            Mode::Eco => 0x01,
            Mode::Smart => 0x02,
            Mode::Timer => 0x03,
            Mode::Travel => 0x04,
            Mode::Boost => 0x05,
            Mode::Limited => 0x21,
            Mode::Critical => 0x22,
        }
    }

    /// Looks up a mode by its wire value.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.code() == code)
    }
}

impl TryFrom<u8> for Mode {
    type Error = TSmartError;

    /// Converts a caller-supplied mode value.
    ///
    /// # Errors
    ///
    /// Returns `TSmartError::Validation` for undefined values.
    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| {
            TSmartError::validation("mode", format!("0x{:02X} is not a defined mode", code))
        })
    }
}

impl From<Mode> for u8 {
    fn from(mode: Mode) -> Self {
        mode.code()
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Manual => write!(f, "MANUAL"),
            Mode::Eco => write!(f, "ECO"),
            Mode::Smart => write!(f, "SMART"),
            Mode::Timer => write!(f, "TIMER"),
            Mode::Travel => write!(f, "TRAVEL"),
            Mode::Boost => write!(f, "BOOST"),
            Mode::Limited => write!(f, "LIMITED"),
            Mode::Critical => write!(f, "CRITICAL"),
        }
    }
}
