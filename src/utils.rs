//! Bit and formatting helpers.
//!
//! # Example
//!
//! ```
//! use tsmart::utils::{format_frame, get_bit, msb_set};
//!
//! assert!(get_bit(0b0000_0101, 2));
//! assert!(msb_set(0x80));
//! assert_eq!(format_frame(&[0xF1, 0x00, 0x00, 0xA4]), "F1 00 00 A4");
//! ```

/// Gets a single bit from a byte.
///
/// # Arguments
///
/// * `value` - The byte to extract from
/// * `bit` - Bit position (0-7, where 0 is LSB)
#[inline]
pub fn get_bit(value: u8, bit: u8) -> bool {
    (value & (1 << bit)) != 0
}

/// Returns whether bit 7 of a byte is set.
///
/// The control-read error region flags each error or warning in the most
/// significant bit of its byte.
#[inline]
pub fn msb_set(value: u8) -> bool {
    get_bit(value, 7)
}

/// Formats a frame as space separated uppercase hex bytes, for log output.
pub fn format_frame(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
