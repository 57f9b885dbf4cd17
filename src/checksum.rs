//! Frame checksum.
//!
//! Every TSmart frame ends with a single checksum byte: the XOR of all
//! preceding bytes, XORed with [`CHECKSUM_SEED`].
//!
//! ```
//! use tsmart::checksum::{append_checksum, fill_checksum, validate};
//!
//! let frame = append_checksum(&[0xF1, 0x00, 0x00]);
//! assert_eq!(frame, [0xF1, 0x00, 0x00, 0xA4]);
//! assert!(validate(&frame));
//!
//! let mut request = [0x21, 0x00, 0x00, 0x00];
//! fill_checksum(&mut request);
//! assert_eq!(request, [0x21, 0x00, 0x00, 0x74]);
//! ```

/// Constant folded into every checksum.
pub const CHECKSUM_SEED: u8 = 0x55;

/// Computes the checksum of a frame body (all bytes except the checksum).
#[inline]
pub fn checksum(body: &[u8]) -> u8 {
    body.iter().fold(0u8, |acc, b| acc ^ b) ^ CHECKSUM_SEED
}

/// Returns whether the last byte of `frame` is the checksum of the rest.
///
/// An empty frame is never valid.
pub fn validate(frame: &[u8]) -> bool {
    match frame.split_last() {
        Some((last, body)) => checksum(body) == *last,
        None => false,
    }
}

/// Returns `body` followed by its checksum byte.
pub fn append_checksum(body: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(body.len() + 1);
    frame.extend_from_slice(body);
    frame.push(checksum(body));
    frame
}

/// Overwrites the last byte of `frame` with the checksum of the bytes before it.
///
/// Does nothing on an empty slice. Applying it to a frame that already
/// carries the correct checksum leaves the frame unchanged.
pub fn fill_checksum(frame: &mut [u8]) {
    if let Some((last, body)) = frame.split_last_mut() {
        *last = checksum(body);
    }
}
