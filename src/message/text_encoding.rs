//! Radix packing of text fields
//!
//! - free text: 13 characters of base-42, right-aligned, 71 bits
//! - non-standard callsign: 11 characters of base-38, right-aligned, 58 bits
//! - telemetry: up to 18 hex digits, 71 bits

use crate::message::constants::{CHARSET_BASE38, CHARSET_BASE42, MAX_CALLSIGN_LEN, MAX_FREE_TEXT_LEN, MAX_TELEMETRY_DIGITS};

/// Largest value of a 71-bit field
const MAX71: u128 = (1 << 71) - 1;

fn pack_radix(text: &str, width: usize, charset: &[u8]) -> Option<u128> {
    if text.len() > width {
        return None;
    }
    let base = charset.len() as u128;
    let pad = width - text.len();
    let mut value = 0u128;
    for c in std::iter::repeat(b' ').take(pad).chain(text.bytes()) {
        let idx = charset.iter().position(|&x| x == c)? as u128;
        value = value * base + idx;
    }
    Some(value)
}

fn unpack_radix(mut value: u128, width: usize, charset: &[u8]) -> Option<String> {
    let base = charset.len() as u128;
    let mut chars = vec![b' '; width];
    for slot in chars.iter_mut().rev() {
        *slot = charset[(value % base) as usize];
        value /= base;
    }
    if value != 0 {
        return None;
    }
    Some(String::from_utf8_lossy(&chars).trim().to_string())
}

/// Pack up to 13 characters of free text into 71 bits
///
/// # Example
/// ```
/// use rustyftx::message::text_encoding::{pack_free_text, unpack_free_text};
///
/// let packed = pack_free_text("TNX BOB 73 GL").unwrap();
/// assert_eq!(unpack_free_text(packed).as_deref(), Some("TNX BOB 73 GL"));
/// assert_eq!(pack_free_text("lower"), None);
/// ```
pub fn pack_free_text(text: &str) -> Option<u128> {
    pack_radix(text, MAX_FREE_TEXT_LEN, CHARSET_BASE42)
}

/// Reverse of [`pack_free_text`]; surrounding spaces are removed
pub fn unpack_free_text(value: u128) -> Option<String> {
    unpack_radix(value, MAX_FREE_TEXT_LEN, CHARSET_BASE42)
}

/// Pack a non-standard callsign into the 58-bit field of i3=4 messages
pub fn pack_n58(callsign: &str) -> Option<u64> {
    if callsign.len() > MAX_CALLSIGN_LEN {
        return None;
    }
    pack_radix(callsign, MAX_CALLSIGN_LEN, CHARSET_BASE38).map(|v| v as u64)
}

/// Reverse of [`pack_n58`]
pub fn unpack_n58(value: u64) -> Option<String> {
    let call = unpack_radix(value as u128, MAX_CALLSIGN_LEN, CHARSET_BASE38)?;
    if call.is_empty() || call.contains(' ') {
        return None;
    }
    Some(call)
}

/// Pack up to 18 hex digits of telemetry into 71 bits
///
/// The value must fit in 71 bits, so an 18-digit string has to start with 0..7.
pub fn pack_telemetry(hex: &str) -> Option<u128> {
    if hex.is_empty() || hex.len() > MAX_TELEMETRY_DIGITS || !hex.bytes().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let value = u128::from_str_radix(hex, 16).ok()?;
    (value <= MAX71).then_some(value)
}

/// Render telemetry as upper-case hex without leading zeros (`0` for zero)
pub fn unpack_telemetry(value: u128) -> String {
    format!("{:X}", value & MAX71)
}
