//! Response decoding.
//!
//! Each decoder first runs the ordered frame checks of its schema
//! (see [`crate::schema`]) against the command byte of the request it
//! answers, then unpacks the fields:
//!
//! | Decoder | Size | Result |
//! |---------|------|--------|
//! | [`decode_discovery_response`] | 43 | [`DiscoveredDevice`] |
//! | [`decode_configuration_response`] | 326 | [`Configuration`] |
//! | [`decode_control_read_response`] | 30 | [`Status`] |
//! | [`decode_control_write_response`] | 4 | `()` |
//!
//! # Example
//!
//! ```
//! use tsmart::response::decode_control_read_response;
//! use tsmart::Mode;
//!
//! let frame = [
//!     0xF1, 0x00, 0x00, // header
//!     0x00, // power off
//!     0x64, 0x00, // setpoint 10.0
//!     0x00, // MANUAL
//!     0xE0, 0x01, // high 48.0
//!     0x00, // relay open
//!     0x01, // smart state
//!     0x1B, 0x02, // low 53.9
//!     0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // no errors
//!     0x39, // checksum
//! ];
//! let status = decode_control_read_response(0xF1, &frame).unwrap();
//! assert_eq!(status.mode, Mode::Manual);
//! assert_eq!(status.setpoint, 10.0);
//! assert!(!status.has_error());
//! ```

use crate::error::{ResponseFault, Result};
use crate::header::Command;
use crate::mode::Mode;
use crate::models::{Configuration, DiscoveredDevice, Status};
use crate::schema::{
    configuration, control, discovery, Record, CONFIGURATION_RESPONSE, CONTROL_READ_RESPONSE,
    DISCOVERY_RESPONSE, EMPTY_FRAME,
};
use crate::utils::{format_frame, msb_set};

/// Offsets within the error region whose bit 7 flags E01..E05.
const ERROR_OFFSETS: [usize; 5] = [0, 2, 4, 6, 14];
/// Offsets within the error region whose bit 7 flags W01..W03.
const WARNING_OFFSETS: [usize; 3] = [8, 10, 12];

/// The only accepted control-write acknowledgement.
const ACKNOWLEDGEMENT: [u8; 4] = [0xF2, 0x00, 0x00, 0xA7];

fn device_id(value: u32) -> String {
    format!("{:04X}", value)
}

/// Decodes a discovery reply.
///
/// `ip_address` is the source address of the datagram.
///
/// # Errors
///
/// Returns `BadResponse` if the frame fails length, device error, type or
/// checksum validation.
pub fn decode_discovery_response(
    request_command: u8,
    data: &[u8],
    ip_address: impl Into<String>,
) -> Result<DiscoveredDevice> {
    let record = DISCOVERY_RESPONSE.check(request_command, data)?;

    Ok(DiscoveredDevice {
        ip_address: ip_address.into(),
        device_id: device_id(record.u32(discovery::DEVICE_ID)),
        device_name: record.text(discovery::DEVICE_NAME),
    })
}

/// Decodes a configuration response.
///
/// # Errors
///
/// Returns `BadResponse` if the frame fails length, device error, type or
/// checksum validation.
pub fn decode_configuration_response(request_command: u8, data: &[u8]) -> Result<Configuration> {
    let record = CONFIGURATION_RESPONSE.check(request_command, data)?;

    Ok(Configuration {
        device_id: device_id(record.u32(configuration::DEVICE_ID)),
        device_name: record.text(configuration::DEVICE_NAME),
        firmware_version: format!(
            "{}.{}.{}",
            record.u8(configuration::FIRMWARE_MAJOR),
            record.u8(configuration::FIRMWARE_MINOR),
            record.u8(configuration::FIRMWARE_DEPLOYMENT)
        ),
        firmware_name: record.text(configuration::FIRMWARE_NAME),
        raw_response: data.to_vec(),
    })
}

/// Decodes a control-read response.
///
/// # Errors
///
/// Returns `BadResponse` if the frame fails length, device error, type or
/// checksum validation, or carries an unknown mode.
pub fn decode_control_read_response(request_command: u8, data: &[u8]) -> Result<Status> {
    let record = CONTROL_READ_RESPONSE.check(request_command, data)?;

    let raw_mode = record.u8(control::MODE);
    let mode = Mode::from_code(raw_mode).ok_or(ResponseFault::UnknownMode(raw_mode))?;

    let setpoint = record.u16(control::SETPOINT);
    let high = record.u16(control::TEMPERATURE_HIGH);
    let low = record.u16(control::TEMPERATURE_LOW);
    let [e01, e02, e03, e04, e05] = error_flags(&record, ERROR_OFFSETS);
    let [w01, w02, w03] = error_flags(&record, WARNING_OFFSETS);

    Ok(Status {
        power: record.flag(control::POWER),
        setpoint: f32::from(setpoint) / 10.0,
        mode,
        temperature_high: f32::from(high) / 10.0,
        temperature_low: f32::from(low) / 10.0,
        temperature_average: (f32::from(high) + f32::from(low)) / 20.0,
        relay: record.flag(control::RELAY),
        error_e01: e01,
        error_e02: e02,
        error_e03: e03,
        error_e04: e04,
        error_e05: e05,
        error_w01: w01,
        error_w02: w02,
        error_w03: w03,
        raw_response: data.to_vec(),
    })
}

fn error_flags<const N: usize>(record: &Record<'_>, offsets: [usize; N]) -> [bool; N] {
    let region = record.bytes(control::ERROR);
    offsets.map(|offset| msb_set(region[offset]))
}

/// Validates the control-write acknowledgement.
///
/// The device acknowledges with exactly `F2 00 00 A7`.
///
/// # Errors
///
/// Returns `BadResponse` if the frame fails the frame checks or differs from
/// the acknowledgement.
pub fn decode_control_write_response(data: &[u8]) -> Result<()> {
    let record = EMPTY_FRAME.check(Command::ControlWrite.code(), data)?;

    if record.as_bytes() != ACKNOWLEDGEMENT {
        return Err(ResponseFault::Acknowledgement {
            received: format_frame(data),
        }
        .into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TSmartError;
    use crate::schema::RecordBuf;

    const DISCOVERY_HEX: &str =
        "01000020000d2a9b005445534c4100000000000000000000000000000000000000000000000000000064e3";
    const CONTROL_READ_HEX: &str =
        "f1000000640000e00100011b020000000000000000000000000000000039";

    fn fault(err: TSmartError) -> ResponseFault {
        match err {
            TSmartError::BadResponse(fault) => fault,
            other => panic!("Expected BadResponse, got {:?}", other),
        }
    }

    fn control_read_frame(mode: u8, error_region: [u8; 16]) -> Vec<u8> {
        RecordBuf::new(&CONTROL_READ_RESPONSE)
            .put_u8(control::POWER, 1)
            .put_u16(control::SETPOINT, 500)
            .put_u8(control::MODE, mode)
            .put_u16(control::TEMPERATURE_HIGH, 512)
            .put_u8(control::RELAY, 1)
            .put_u16(control::TEMPERATURE_LOW, 489)
            .put_bytes(control::ERROR, &error_region)
            .finish()
    }

    #[test]
    fn test_discovery_unpack() {
        let data = hex::decode(DISCOVERY_HEX).unwrap();
        let device = decode_discovery_response(0x01, &data, "192.168.1.35").unwrap();
        assert_eq!(device.ip_address, "192.168.1.35");
        assert_eq!(device.device_id, "9B2A0D");
        assert_eq!(device.device_name, "TESLA");
    }

    #[test]
    fn test_discovery_type_mismatch() {
        let mut data = hex::decode(DISCOVERY_HEX).unwrap();
        data[0] = 0x05;
        let err = decode_discovery_response(0x01, &data, "192.168.1.35").unwrap_err();
        assert_eq!(
            fault(err),
            ResponseFault::TypeMismatch {
                expected: 0x01,
                actual: 0x05
            }
        );
    }

    #[test]
    fn test_discovery_short_device_id_is_padded() {
        let data = RecordBuf::new(&DISCOVERY_RESPONSE)
            .put_u32(discovery::DEVICE_ID, 0x2A)
            .finish();
        let device = decode_discovery_response(0x01, &data, "10.0.0.2").unwrap();
        assert_eq!(device.device_id, "002A");
        assert_eq!(device.device_name, "");
    }

    #[test]
    fn test_length_mismatch_regardless_of_content() {
        let data = hex::decode(DISCOVERY_HEX).unwrap();
        for len in [0, 1, 4, 42] {
            let err = decode_discovery_response(0x01, &data[..len], "ip").unwrap_err();
            assert_eq!(
                fault(err),
                ResponseFault::Length {
                    expected: 43,
                    actual: len
                }
            );
        }
        let mut longer = data.clone();
        longer.push(0x00);
        let err = decode_discovery_response(0x01, &longer, "ip").unwrap_err();
        assert!(matches!(fault(err), ResponseFault::Length { actual: 44, .. }));

        let err = decode_control_read_response(0xF1, &data).unwrap_err();
        assert!(matches!(
            fault(err),
            ResponseFault::Length {
                expected: 30,
                actual: 43
            }
        ));
    }

    #[test]
    fn test_device_error_code() {
        let mut data = hex::decode(CONTROL_READ_HEX).unwrap();
        data[0] = 0x00;
        let err = decode_control_read_response(0xF1, &data).unwrap_err();
        assert_eq!(fault(err), ResponseFault::DeviceError);
    }

    #[test]
    fn test_checksum_bit_flips() {
        let data = hex::decode(CONTROL_READ_HEX).unwrap();
        for bit in 0..8 {
            let mut corrupted = data.clone();
            corrupted[29] ^= 1 << bit;
            let err = decode_control_read_response(0xF1, &corrupted).unwrap_err();
            assert!(matches!(fault(err), ResponseFault::Checksum { .. }));
        }
    }

    #[test]
    fn test_control_read_captured_frame() {
        let data = hex::decode(CONTROL_READ_HEX).unwrap();
        let status = decode_control_read_response(0xF1, &data).unwrap();
        assert!(!status.power);
        assert_eq!(status.setpoint, 10.0);
        assert_eq!(status.mode, Mode::Manual);
        assert_eq!(status.temperature_high, 48.0);
        assert_eq!(status.temperature_low, 53.9);
        assert_eq!(status.temperature_average, 50.95);
        assert!(!status.relay);
        assert!(!status.has_error());
        assert_eq!(status.raw_response, data);
    }

    #[test]
    fn test_control_read_fields() {
        let data = control_read_frame(Mode::Eco.code(), [0; 16]);
        let status = decode_control_read_response(0xF1, &data).unwrap();
        assert!(status.power);
        assert_eq!(status.setpoint, 50.0);
        assert_eq!(status.mode, Mode::Eco);
        assert_eq!(status.temperature_high, 51.2);
        assert_eq!(status.temperature_low, 48.9);
        assert_eq!(status.temperature_average, 50.05);
        assert!(status.relay);
    }

    #[test]
    fn test_control_read_unknown_mode() {
        let data = control_read_frame(0x07, [0; 16]);
        let err = decode_control_read_response(0xF1, &data).unwrap_err();
        assert_eq!(fault(err), ResponseFault::UnknownMode(0x07));
    }

    #[test]
    fn test_control_read_each_flag() {
        let cases: [(usize, fn(&Status) -> bool); 8] = [
            (0, |s| s.error_e01),
            (2, |s| s.error_e02),
            (4, |s| s.error_e03),
            (6, |s| s.error_e04),
            (14, |s| s.error_e05),
            (8, |s| s.error_w01),
            (10, |s| s.error_w02),
            (12, |s| s.error_w03),
        ];

        for (offset, flag) in cases {
            let mut region = [0u8; 16];
            region[offset] = 0x80;
            let data = control_read_frame(Mode::Manual.code(), region);
            let status = decode_control_read_response(0xF1, &data).unwrap();
            assert!(flag(&status), "offset {} not mapped", offset);
            assert!(status.has_error());
        }
    }

    #[test]
    fn test_control_read_ignores_low_bits() {
        let data = control_read_frame(Mode::Manual.code(), [0x7F; 16]);
        let status = decode_control_read_response(0xF1, &data).unwrap();
        assert!(!status.has_error());
    }

    #[test]
    fn test_configuration_unpack() {
        let data = RecordBuf::new(&CONFIGURATION_RESPONSE)
            .put_u16(configuration::DEVICE_TYPE, 0x0020)
            .put_u32(configuration::DEVICE_ID, 0x009B_2A0D)
            .put_bytes(configuration::DEVICE_NAME, b"TESLA\0junk")
            .put_u8(configuration::FIRMWARE_MAJOR, 1)
            .put_u8(configuration::FIRMWARE_MINOR, 9)
            .put_u8(configuration::FIRMWARE_DEPLOYMENT, 96)
            .put_bytes(configuration::FIRMWARE_NAME, b"Boiler")
            .put_bytes(configuration::WIFI_SSID, b"home")
            .finish();
        assert_eq!(data.len(), 326);

        let config = decode_configuration_response(0x21, &data).unwrap();
        assert_eq!(config.device_id, "9B2A0D");
        assert_eq!(config.device_name, "TESLA");
        assert_eq!(config.firmware_version, "1.9.96");
        assert_eq!(config.firmware_name, "Boiler");
        assert_eq!(config.raw_response, data);
    }

    #[test]
    fn test_configuration_wrong_request() {
        let data = RecordBuf::new(&CONFIGURATION_RESPONSE).finish();
        let err = decode_configuration_response(0xF1, &data).unwrap_err();
        assert_eq!(
            fault(err),
            ResponseFault::TypeMismatch {
                expected: 0xF1,
                actual: 0x21
            }
        );
    }

    #[test]
    fn test_control_write_ack() {
        assert!(decode_control_write_response(&[0xF2, 0x00, 0x00, 0xA7]).is_ok());
    }

    #[test]
    fn test_control_write_ack_type_mismatch() {
        let err = decode_control_write_response(&[0xF1, 0x00, 0x00, 0xA7]).unwrap_err();
        assert_eq!(
            fault(err),
            ResponseFault::TypeMismatch {
                expected: 0xF2,
                actual: 0xF1
            }
        );
    }

    #[test]
    fn test_control_write_ack_content_mismatch() {
        // Valid checksum, but not the acknowledgement triple.
        let data = crate::checksum::append_checksum(&[0xF2, 0x01, 0x00]);
        let err = decode_control_write_response(&data).unwrap_err();
        assert_eq!(
            fault(err),
            ResponseFault::Acknowledgement {
                received: "F2 01 00 A6".to_string()
            }
        );
    }
}
