//! Fixed-layout record schemas.
//!
//! Each TSmart message kind has a fixed size and a fixed field layout. The
//! layouts are described here as tables of [`Field`]s, one [`Schema`] per
//! message kind, instead of ad hoc byte slicing in the decoders. All
//! multi-byte integers are little-endian.
//!
//! | Schema | Size | Fields after the header |
//! |--------|------|-------------------------|
//! | [`DISCOVERY_RESPONSE`] | 43 | device type, device id, name, timezone |
//! | [`CONFIGURATION_RESPONSE`] | 326 | identity, firmware, legacy block, wifi, padding |
//! | [`CONTROL_READ_RESPONSE`] | 30 | power, setpoint, mode, temperatures, relay, error bitfield |
//! | [`CONTROL_WRITE_REQUEST`] | 8 | power, setpoint, mode |
//! | [`EMPTY_FRAME`] | 4 | none (plain requests and the write acknowledgement) |
//!
//! [`Schema::check`] runs the validation shared by the codec and the exchange
//! engine. The checks run in a fixed order and the first failure wins:
//!
//! 1. length equals the schema size
//! 2. first byte is not the device error code (0)
//! 3. first byte equals the request's command byte
//! 4. checksum is valid

use crate::checksum;
use crate::error::{ResponseFault, Result};
use crate::header::{Command, FrameHeader, HEADER_SIZE};

/// A named byte range within a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Field name, used in diagnostics.
    pub name: &'static str,
    /// Offset of the first byte.
    pub offset: usize,
    /// Width in bytes.
    pub width: usize,
}

impl Field {
    /// Creates a field descriptor.
    pub const fn new(name: &'static str, offset: usize, width: usize) -> Self {
        Self {
            name,
            offset,
            width,
        }
    }

    /// Offset one past the last byte of the field.
    pub const fn end(&self) -> usize {
        self.offset + self.width
    }
}

/// Command byte.
pub const COMMAND: Field = Field::new("command", 0, 1);
/// Sub command byte.
pub const SUB: Field = Field::new("sub", 1, 1);
/// Second sub command byte.
pub const SUB2: Field = Field::new("sub2", 2, 1);

/// Layout of one message kind.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    /// Command tag of the message.
    pub command: Command,
    /// Fields in wire order, header first and checksum last.
    pub fields: &'static [Field],
}

impl Schema {
    /// Creates a schema from its field table.
    pub const fn new(command: Command, fields: &'static [Field]) -> Self {
        Self { command, fields }
    }

    /// Fixed size of the record in bytes.
    pub const fn size(&self) -> usize {
        self.fields[self.fields.len() - 1].end()
    }

    /// Runs the ordered frame checks and returns a view over the frame.
    ///
    /// `request_command` is the first byte of the request this frame answers.
    ///
    /// # Errors
    ///
    /// Returns `BadResponse` with the fault of the first failing check.
    pub fn check<'a>(&self, request_command: u8, data: &'a [u8]) -> Result<Record<'a>> {
        check_frame(self.size(), request_command, data)?;
        Ok(Record {
            data,
            fields: self.fields,
        })
    }
}

fn debug_assert_member(fields: &[Field], field: Field) {
    debug_assert!(
        fields.contains(&field),
        "field '{}' is not part of this schema",
        field.name
    );
}

/// Runs the ordered frame checks against an expected length.
///
/// # Errors
///
/// Returns the fault of the first failing check: length, device error code,
/// type mismatch, checksum. A frame shorter than the header fails with a
/// `Length` fault against [`HEADER_SIZE`].
pub fn check_frame(
    expected_len: usize,
    request_command: u8,
    data: &[u8],
) -> std::result::Result<(), ResponseFault> {
    if data.len() != expected_len {
        return Err(ResponseFault::Length {
            expected: expected_len,
            actual: data.len(),
        });
    }

    let header = FrameHeader::from_bytes(data)?;
    if header.is_error() {
        return Err(ResponseFault::DeviceError);
    }

    if header.command != request_command {
        return Err(ResponseFault::TypeMismatch {
            expected: request_command,
            actual: header.command,
        });
    }

    if let Some((&actual, body)) = data.split_last() {
        let expected = checksum::checksum(body);
        if expected != actual {
            return Err(ResponseFault::Checksum { expected, actual });
        }
    }

    Ok(())
}

/// Read-only view over a frame that passed [`Schema::check`].
///
/// # Panics
///
/// The accessors take fields of the schema that checked the frame. A field
/// from another schema panics in debug builds, and in release builds when it
/// reaches past the end of the frame.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    data: &'a [u8],
    fields: &'static [Field],
}

impl<'a> Record<'a> {
    /// Raw bytes of a field.
    pub fn bytes(&self, field: Field) -> &'a [u8] {
        debug_assert_member(self.fields, field);
        &self.data[field.offset..field.end()]
    }

    /// Single-byte field.
    pub fn u8(&self, field: Field) -> u8 {
        self.bytes(field)[0]
    }

    /// Little-endian 16-bit field.
    pub fn u16(&self, field: Field) -> u16 {
        let b = self.bytes(field);
        u16::from_le_bytes([b[0], b[1]])
    }

    /// Little-endian 32-bit field.
    pub fn u32(&self, field: Field) -> u32 {
        let b = self.bytes(field);
        u32::from_le_bytes([b[0], b[1], b[2], b[3]])
    }

    /// Single-byte field interpreted as a boolean flag.
    pub fn flag(&self, field: Field) -> bool {
        self.u8(field) != 0
    }

    /// NUL-terminated text field. Invalid UTF-8 is replaced.
    pub fn text(&self, field: Field) -> String {
        let raw = self.bytes(field);
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        String::from_utf8_lossy(&raw[..end]).into_owned()
    }

    /// The whole frame.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }
}

/// Builder for an outgoing frame laid out by a [`Schema`].
///
/// The header is pre-filled with the schema's command; [`RecordBuf::finish`]
/// writes the checksum.
///
/// # Panics
///
/// Same field precondition as [`Record`].
#[derive(Debug, Clone)]
pub struct RecordBuf {
    data: Vec<u8>,
    fields: &'static [Field],
}

impl RecordBuf {
    /// Creates a zeroed frame with the request header in place.
    pub fn new(schema: &Schema) -> Self {
        let mut data = vec![0u8; schema.size()];
        data[COMMAND.offset] = schema.command.code();
        Self {
            data,
            fields: schema.fields,
        }
    }

    fn slot(&mut self, field: Field) -> &mut [u8] {
        debug_assert_member(self.fields, field);
        &mut self.data[field.offset..field.end()]
    }

    /// Sets a single-byte field.
    pub fn put_u8(mut self, field: Field, value: u8) -> Self {
        self.slot(field)[0] = value;
        self
    }

    /// Sets a little-endian 16-bit field.
    pub fn put_u16(mut self, field: Field, value: u16) -> Self {
        self.slot(field).copy_from_slice(&value.to_le_bytes());
        self
    }

    /// Sets a little-endian 32-bit field.
    pub fn put_u32(mut self, field: Field, value: u32) -> Self {
        self.slot(field).copy_from_slice(&value.to_le_bytes());
        self
    }

    /// Copies bytes into a field, truncating to the field width.
    /// Unused trailing bytes stay zero.
    pub fn put_bytes(mut self, field: Field, value: &[u8]) -> Self {
        let n = value.len().min(field.width);
        self.slot(field)[..n].copy_from_slice(&value[..n]);
        self
    }

    /// Writes the checksum and returns the frame.
    pub fn finish(mut self) -> Vec<u8> {
        checksum::fill_checksum(&mut self.data);
        self.data
    }
}

/// Checksum field of a frame of the given size.
const fn checksum_at(size: usize) -> Field {
    Field::new("checksum", size - 1, 1)
}

/// Discovery response fields.
pub mod discovery {
    use super::*;

    /// Device type.
    pub const DEVICE_TYPE: Field = Field::new("device_type", 3, 2);
    /// Device id.
    pub const DEVICE_ID: Field = Field::new("device_id", 5, 4);
    /// Device name, NUL padded.
    pub const DEVICE_NAME: Field = Field::new("device_name", 9, 32);
    /// Timezone.
    pub const TIMEZONE: Field = Field::new("timezone", 41, 1);
    /// Checksum.
    pub const CHECKSUM: Field = checksum_at(43);
}

/// Discovery response layout (`=BBBHL32sBB`).
pub const DISCOVERY_RESPONSE: Schema = Schema::new(
    Command::Discovery,
    &[
        COMMAND,
        SUB,
        SUB2,
        discovery::DEVICE_TYPE,
        discovery::DEVICE_ID,
        discovery::DEVICE_NAME,
        discovery::TIMEZONE,
        discovery::CHECKSUM,
    ],
);

/// Configuration response fields.
pub mod configuration {
    use super::*;

    /// Device type.
    pub const DEVICE_TYPE: Field = Field::new("device_type", 3, 2);
    /// Device id.
    pub const DEVICE_ID: Field = Field::new("device_id", 5, 4);
    /// Device name, NUL padded.
    pub const DEVICE_NAME: Field = Field::new("device_name", 9, 32);
    /// Timezone.
    pub const TIMEZONE: Field = Field::new("timezone", 41, 1);
    /// Active firmware bin.
    pub const USER_BIN: Field = Field::new("user_bin", 42, 1);
    /// Firmware major version.
    pub const FIRMWARE_MAJOR: Field = Field::new("firmware_major", 43, 1);
    /// Firmware minor version.
    pub const FIRMWARE_MINOR: Field = Field::new("firmware_minor", 44, 1);
    /// Firmware deployment number.
    pub const FIRMWARE_DEPLOYMENT: Field = Field::new("firmware_deployment", 45, 1);
    /// Firmware name, NUL padded.
    pub const FIRMWARE_NAME: Field = Field::new("firmware_name", 46, 32);
    /// Legacy block.
    pub const LEGACY: Field = Field::new("legacy", 78, 28);
    /// Wifi SSID.
    pub const WIFI_SSID: Field = Field::new("wifi_ssid", 106, 32);
    /// Wifi password.
    pub const WIFI_PASSWORD: Field = Field::new("wifi_password", 138, 64);
    /// Padding; its last byte is the checksum.
    pub const PADDING: Field = Field::new("padding", 202, 123);
    /// Checksum.
    pub const CHECKSUM: Field = checksum_at(326);
}

/// Configuration response layout (`=BBBHL32sBBBBB32s28s32s64s124s`).
pub const CONFIGURATION_RESPONSE: Schema = Schema::new(
    Command::Configuration,
    &[
        COMMAND,
        SUB,
        SUB2,
        configuration::DEVICE_TYPE,
        configuration::DEVICE_ID,
        configuration::DEVICE_NAME,
        configuration::TIMEZONE,
        configuration::USER_BIN,
        configuration::FIRMWARE_MAJOR,
        configuration::FIRMWARE_MINOR,
        configuration::FIRMWARE_DEPLOYMENT,
        configuration::FIRMWARE_NAME,
        configuration::LEGACY,
        configuration::WIFI_SSID,
        configuration::WIFI_PASSWORD,
        configuration::PADDING,
        configuration::CHECKSUM,
    ],
);

/// Control-read response and control-write request fields.
pub mod control {
    use super::*;

    /// Power flag.
    pub const POWER: Field = Field::new("power", 3, 1);
    /// Setpoint in tenths of a degree.
    pub const SETPOINT: Field = Field::new("setpoint", 4, 2);
    /// Mode byte.
    pub const MODE: Field = Field::new("mode", 6, 1);
    /// Upper tank temperature in tenths of a degree.
    pub const TEMPERATURE_HIGH: Field = Field::new("temperature_high", 7, 2);
    /// Relay flag.
    pub const RELAY: Field = Field::new("relay", 9, 1);
    /// Smart mode state.
    pub const SMART_STATE: Field = Field::new("smart_state", 10, 1);
    /// Lower tank temperature in tenths of a degree.
    pub const TEMPERATURE_LOW: Field = Field::new("temperature_low", 11, 2);
    /// Error and warning bitfield region.
    pub const ERROR: Field = Field::new("error", 13, 16);
    /// Checksum of a control-read response.
    pub const READ_CHECKSUM: Field = checksum_at(30);
    /// Checksum of a control-write request.
    pub const WRITE_CHECKSUM: Field = checksum_at(8);
}

/// Control-read response layout (`=BBBBHBHBBH16sB`).
pub const CONTROL_READ_RESPONSE: Schema = Schema::new(
    Command::ControlRead,
    &[
        COMMAND,
        SUB,
        SUB2,
        control::POWER,
        control::SETPOINT,
        control::MODE,
        control::TEMPERATURE_HIGH,
        control::RELAY,
        control::SMART_STATE,
        control::TEMPERATURE_LOW,
        control::ERROR,
        control::READ_CHECKSUM,
    ],
);

/// Control-write request layout (`=BBBBHBB`, last byte is the checksum).
pub const CONTROL_WRITE_REQUEST: Schema = Schema::new(
    Command::ControlWrite,
    &[
        COMMAND,
        SUB,
        SUB2,
        control::POWER,
        control::SETPOINT,
        control::MODE,
        control::WRITE_CHECKSUM,
    ],
);

/// Header-only frame: discovery, configuration and control-read requests, and
/// the control-write acknowledgement.
pub const EMPTY_FRAME_SIZE: usize = HEADER_SIZE + 1;

/// Header-only layout of the control-write acknowledgement.
pub const EMPTY_FRAME: Schema = Schema::new(
    Command::ControlWrite,
    &[COMMAND, SUB, SUB2, checksum_at(EMPTY_FRAME_SIZE)],
);
