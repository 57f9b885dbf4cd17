//! Values produced by the decoders.

use crate::mode::Mode;

/// A heater that answered a discovery broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiscoveredDevice {
    /// Source address of the reply.
    pub ip_address: String,
    /// Device id, at least four uppercase hex digits.
    pub device_id: String,
    /// User-assigned device name.
    pub device_name: String,
}

/// Device identity and firmware information.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Configuration {
    /// Device id, at least four uppercase hex digits.
    pub device_id: String,
    /// User-assigned device name.
    pub device_name: String,
    /// Firmware version as `major.minor.deployment`.
    pub firmware_version: String,
    /// Firmware name.
    pub firmware_name: String,
    /// Frame the values were decoded from.
    pub raw_response: Vec<u8>,
}

/// Live control state.
///
/// Temperatures are in degrees Celsius; the wire carries tenths of a degree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Status {
    /// Heater enabled.
    pub power: bool,
    /// Target temperature.
    pub setpoint: f32,
    /// Operating mode.
    pub mode: Mode,
    /// Upper tank temperature.
    pub temperature_high: f32,
    /// Lower tank temperature.
    pub temperature_low: f32,
    /// Mean of the upper and lower temperatures.
    pub temperature_average: f32,
    /// Heating element relay closed.
    pub relay: bool,
    /// Error E01.
    pub error_e01: bool,
    /// Error E02.
    pub error_e02: bool,
    /// Error E03.
    pub error_e03: bool,
    /// Error E04.
    pub error_e04: bool,
    /// Error E05.
    pub error_e05: bool,
    /// Warning W01.
    pub error_w01: bool,
    /// Warning W02.
    pub error_w02: bool,
    /// Warning W03.
    pub error_w03: bool,
    /// Frame the values were decoded from.
    pub raw_response: Vec<u8>,
}

impl Status {
    /// Returns whether any error or warning flag is set.
    pub fn has_error(&self) -> bool {
        self.error_e01
            || self.error_e02
            || self.error_e03
            || self.error_e04
            || self.error_e05
            || self.error_w01
            || self.error_w02
            || self.error_w03
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status() -> Status {
        Status {
            power: true,
            setpoint: 22.0,
            mode: Mode::Eco,
            temperature_high: 25.0,
            temperature_low: 20.0,
            temperature_average: 22.5,
            relay: false,
            error_e01: false,
            error_e02: false,
            error_e03: false,
            error_e04: false,
            error_e05: false,
            error_w01: false,
            error_w02: false,
            error_w03: false,
            raw_response: b"status_data".to_vec(),
        }
    }

    #[test]
    fn test_status_no_errors() {
        assert!(!status().has_error());
    }

    #[test]
    fn test_status_single_flag() {
        let flags: [fn(&mut Status); 8] = [
            |s| s.error_e01 = true,
            |s| s.error_e02 = true,
            |s| s.error_e03 = true,
            |s| s.error_e04 = true,
            |s| s.error_e05 = true,
            |s| s.error_w01 = true,
            |s| s.error_w02 = true,
            |s| s.error_w03 = true,
        ];
        for set in flags {
            let mut s = status();
            set(&mut s);
            assert!(s.has_error());
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialize_discovered_device() {
        let device = DiscoveredDevice {
            ip_address: "192.168.1.35".to_string(),
            device_id: "9B2A0D".to_string(),
            device_name: "TESLA".to_string(),
        };
        let json = serde_json::to_string(&device).unwrap();
        assert!(json.contains("\"device_id\":\"9B2A0D\""));
        let back: DiscoveredDevice = serde_json::from_str(&json).unwrap();
        assert_eq!(back, device);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialize_mode() {
        assert_eq!(serde_json::to_string(&Mode::Eco).unwrap(), "\"ECO\"");
    }
}
