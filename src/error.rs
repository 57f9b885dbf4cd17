//! Error types for the TSmart protocol.

use std::io;
use thiserror::Error;

/// Result type alias for TSmart operations.
pub type Result<T> = std::result::Result<T, TSmartError>;

/// Reason a received frame was rejected.
///
/// The first four variants correspond to the ordered frame checks (length,
/// device error code, type, checksum); only the first failing check is
/// reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseFault {
    /// Frame length differs from the fixed size of the expected message.
    #[error("unexpected packet length (got: {actual}, expected: {expected})")]
    Length {
        /// Fixed size of the expected message.
        expected: usize,
        /// Size of the received frame.
        actual: usize,
    },

    /// The device answered with its error code (first byte zero).
    #[error("device returned an error response")]
    DeviceError,

    /// First byte of the response does not match the request.
    #[error("unexpected response type (expected 0x{expected:02X}, received 0x{actual:02X})")]
    TypeMismatch {
        /// Command byte of the request.
        expected: u8,
        /// Command byte of the response.
        actual: u8,
    },

    /// Trailing checksum byte is wrong.
    #[error("checksum failed (expected 0x{expected:02X}, received 0x{actual:02X})")]
    Checksum {
        /// Checksum computed over the frame.
        expected: u8,
        /// Checksum carried by the frame.
        actual: u8,
    },

    /// Mode byte outside the known mode set.
    #[error("unknown mode 0x{0:02X}")]
    UnknownMode(u8),

    /// Control-write acknowledgement does not match `F2 00 00 A7`.
    #[error("unexpected acknowledgement {received}")]
    Acknowledgement {
        /// Hex dump of the received frame.
        received: String,
    },
}

/// Errors that can occur during TSmart communication.
#[derive(Debug, Error)]
pub enum TSmartError {
    /// A frame was received but rejected.
    #[error("Bad response: {0}")]
    BadResponse(#[from] ResponseFault),

    /// No valid frame arrived within the allotted attempts or duration.
    #[error("Timeout occurred while communicating with immersion heater")]
    Timeout,

    /// The operation was cancelled while waiting on the network.
    #[error("Operation cancelled")]
    Cancelled,

    /// Socket creation, bind or connect failed.
    #[error("Connection error: {source}")]
    Connection {
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },

    /// Target host or route does not exist.
    #[error("Device not found: {source}")]
    NotFound {
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },

    /// Caller supplied an out-of-range value.
    #[error("Invalid parameter '{parameter}': {reason}")]
    Validation {
        /// Name of the invalid parameter.
        parameter: String,
        /// Description of why the parameter is invalid.
        reason: String,
    },
}

impl TSmartError {
    /// Creates a new `Validation` error.
    ///
    /// # Example
    ///
    /// ```
    /// use tsmart::TSmartError;
    ///
    /// let err = TSmartError::validation("setpoint", "must be finite");
    /// assert_eq!(err.to_string(), "Invalid parameter 'setpoint': must be finite");
    /// ```
    pub fn validation(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Classifies a socket setup failure.
    ///
    /// Missing host or route maps to `NotFound`; everything else
    /// (address in use, permission denied, ...) maps to `Connection`.
    pub fn from_socket_error(source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound
            | io::ErrorKind::HostUnreachable
            | io::ErrorKind::NetworkUnreachable => Self::NotFound { source },
            _ => Self::Connection { source },
        }
    }

    /// Returns the rejection reason if this is a `BadResponse`.
    pub fn fault(&self) -> Option<&ResponseFault> {
        match self {
            Self::BadResponse(fault) => Some(fault),
            _ => None,
        }
    }
}
