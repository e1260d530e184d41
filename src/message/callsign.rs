//! Callsign packing (28-bit `n28` field) and callsign hashing
//!
//! n28 layout (WSJT-X 77-bit protocol, QEX table 7):
//!
//! | range                       | meaning                       |
//! |-----------------------------|-------------------------------|
//! | 0, 1, 2                     | `DE`, `QRZ`, `CQ`             |
//! | 3 ..= 1002                  | `CQ 000` ..= `CQ 999`         |
//! | 1003 ..= 532443             | `CQ A` ..= `CQ ZZZZ`          |
//! | NTOKENS ..+ MAX22           | 22-bit hash of a callsign     |
//! | NTOKENS + MAX22 ..          | standard callsign             |

use crate::message::constants::*;
use crate::message::hash_cache::CallsignHashTable;

/// Portable / rover suffix on a standard callsign
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suffix {
    None,
    Rover,
    Portable,
}

/// Split a trailing `/R` or `/P` from a callsign
pub fn split_suffix(call: &str) -> (&str, Suffix) {
    if let Some(base) = call.strip_suffix("/R") {
        (base, Suffix::Rover)
    } else if let Some(base) = call.strip_suffix("/P") {
        (base, Suffix::Portable)
    } else {
        (call, Suffix::None)
    }
}

/// Strip angle brackets from a hashed callsign reference like `<PJ4/K1ABC>`
pub fn strip_brackets(token: &str) -> Option<&str> {
    token.strip_prefix('<')?.strip_suffix('>')
}

fn index_in(charset: &[u8], c: u8) -> Option<u32> {
    charset.iter().position(|&x| x == c).map(|i| i as u32)
}

/// Base-38 value of a callsign left-aligned in 11 characters
fn hash_value(callsign: &str) -> Option<u64> {
    if callsign.len() > MAX_CALLSIGN_LEN {
        return None;
    }
    let mut value = 0u64;
    for i in 0..MAX_CALLSIGN_LEN {
        let c = callsign.as_bytes().get(i).copied().unwrap_or(b' ');
        value = value * 38 + index_in(CHARSET_BASE38, c)? as u64;
    }
    Some(value)
}

/// Hash a callsign to `bits` bits (10, 12 or 22)
///
/// # Example
/// ```
/// use rustyftx::message::callsign::ihashcall;
///
/// assert_eq!(ihashcall("KH1/KH7Z", 22), Some(825805));
/// assert_eq!(ihashcall("KH1/KH7Z", 12), Some(806));
/// assert_eq!(ihashcall("KH1/KH7Z", 10), Some(201));
/// ```
pub fn ihashcall(callsign: &str, bits: u32) -> Option<u32> {
    let value = hash_value(callsign)?;
    Some((value.wrapping_mul(HASH_MULTIPLIER) >> (64 - bits)) as u32)
}

/// 22-bit hash, the one stored in hash tables
pub fn hash22(callsign: &str) -> Option<u32> {
    ihashcall(callsign, 22)
}

/// Place a callsign in the 6-character field with the call area digit third
///
/// Applies the Swaziland (`3DA0` -> `3D0`) and Guinea (`3Xx` -> `Qx`) workarounds.
fn align_basecall(call: &str) -> Option<[u8; 6]> {
    let bytes = call.as_bytes();
    let len = bytes.len();
    let mut c6 = [b' '; 6];

    let shifted: &[u8] = if len > 4 && len <= 7 && call.starts_with("3DA0") {
        c6[..3].copy_from_slice(b"3D0");
        &bytes[4..]
    } else if len > 2 && len <= 7 && call.starts_with("3X") && bytes[2].is_ascii_uppercase() {
        c6[0] = b'Q';
        &bytes[2..]
    } else {
        &[]
    };

    if !shifted.is_empty() {
        let start = if c6[1] == b' ' { 1 } else { 3 };
        if start + shifted.len() > 6 {
            return None;
        }
        c6[start..start + shifted.len()].copy_from_slice(shifted);
        return Some(c6);
    }

    if len >= 3 && len <= 6 && bytes[2].is_ascii_digit() {
        c6[..len].copy_from_slice(bytes);
        Some(c6)
    } else if len >= 2 && len <= 5 && bytes[1].is_ascii_digit() {
        c6[1..=len].copy_from_slice(bytes);
        Some(c6)
    } else {
        None
    }
}

/// Pack a standard callsign (no suffix) into its value relative to the standard range
pub fn pack_basecall(call: &str) -> Option<u32> {
    let c6 = align_basecall(call)?;
    let mut n = index_in(CHARSET_A1, c6[0])?;
    n = n * 36 + index_in(CHARSET_A2, c6[1])?;
    n = n * 10 + index_in(CHARSET_A3, c6[2])?;
    n = n * 27 + index_in(CHARSET_A4, c6[3])?;
    n = n * 27 + index_in(CHARSET_A4, c6[4])?;
    n = n * 27 + index_in(CHARSET_A4, c6[5])?;
    Some(n)
}

/// Reverse of [`pack_basecall`]
pub fn unpack_basecall(mut n: u32) -> Option<String> {
    let mut c6 = [b' '; 6];
    for i in (3..6).rev() {
        c6[i] = CHARSET_A4[(n % 27) as usize];
        n /= 27;
    }
    c6[2] = CHARSET_A3[(n % 10) as usize];
    n /= 10;
    c6[1] = CHARSET_A2[(n % 36) as usize];
    n /= 36;
    if n >= CHARSET_A1.len() as u32 {
        return None;
    }
    c6[0] = CHARSET_A1[n as usize];

    let text = String::from_utf8_lossy(&c6).trim().to_string();
    let call = if text.starts_with("3D0") && text.len() > 3 {
        format!("3DA0{}", &text[3..])
    } else if text.starts_with('Q') && text.as_bytes().get(1).is_some_and(|c| c.is_ascii_uppercase()) {
        format!("3X{}", &text[1..])
    } else {
        text
    };

    if call.len() < 3 || call.contains(' ') {
        return None;
    }
    Some(call)
}

/// True for callsigns that fit the 28-bit standard format
pub fn is_standard_call(call: &str) -> bool {
    pack_basecall(call).is_some()
}

/// True for callsigns that can be sent in full as a non-standard call
pub fn is_valid_nonstandard(call: &str) -> bool {
    (3..=MAX_CALLSIGN_LEN).contains(&call.len())
        && call.bytes().all(|c| c != b' ' && CHARSET_BASE38.contains(&c))
        && call.bytes().any(|c| c.is_ascii_digit())
}

/// Pack a callsign field into n28
///
/// Accepts `DE`, `QRZ`, `CQ`, `CQ nnn`, `CQ a..aaaa`, a standard callsign without
/// suffix, or a hashed reference `<CALL>`.
pub fn pack28(token: &str) -> Option<u32> {
    match token {
        "DE" => return Some(0),
        "QRZ" => return Some(1),
        "CQ" => return Some(2),
        _ => {}
    }

    if let Some(modifier) = token.strip_prefix("CQ ") {
        let bytes = modifier.as_bytes();
        if bytes.len() == 3 && bytes.iter().all(u8::is_ascii_digit) {
            let n: u32 = modifier.parse().ok()?;
            return Some(CQ_NUMBER_BASE + n);
        }
        if (1..=4).contains(&bytes.len()) && bytes.iter().all(u8::is_ascii_uppercase) {
            let mut n = 0u32;
            for i in 0..4 {
                let c = if i + bytes.len() >= 4 { bytes[i + bytes.len() - 4] } else { b' ' };
                n = n * 27 + index_in(CHARSET_A4, c)?;
            }
            return Some(CQ_LETTERS_BASE + n);
        }
        return None;
    }

    if let Some(inner) = strip_brackets(token) {
        if !is_valid_nonstandard(inner) && !is_standard_call(inner) {
            return None;
        }
        return Some(NTOKENS + hash22(inner)?);
    }

    pack_basecall(token).map(|n| STANDARD_CALL_BASE + n)
}

/// Unpack an n28 field
///
/// Hashed callsigns come back in angle brackets, as `<...>` when the table does
/// not know them. Decoded standard callsigns are saved into the table.
pub fn unpack28(n28: u32, table: &mut dyn CallsignHashTable) -> Option<String> {
    if n28 < NTOKENS {
        return match n28 {
            0 => Some("DE".to_string()),
            1 => Some("QRZ".to_string()),
            2 => Some("CQ".to_string()),
            n if n < CQ_LETTERS_BASE => Some(format!("CQ {:03}", n - CQ_NUMBER_BASE)),
            n if n <= CQ_LETTERS_MAX => {
                let mut n = n - CQ_LETTERS_BASE;
                let mut letters = [b' '; 4];
                for i in (0..4).rev() {
                    letters[i] = CHARSET_A4[(n % 27) as usize];
                    n /= 27;
                }
                let modifier = String::from_utf8_lossy(&letters).trim().to_string();
                if modifier.is_empty() || modifier.contains(' ') {
                    return None;
                }
                Some(format!("CQ {}", modifier))
            }
            _ => None,
        };
    }

    if n28 < STANDARD_CALL_BASE {
        let n22 = n28 - NTOKENS;
        let call = table
            .lookup_hash(crate::message::hash_cache::HashKind::Bits22, n22)
            .unwrap_or_else(|| "...".to_string());
        return Some(format!("<{}>", call));
    }

    let call = unpack_basecall(n28 - STANDARD_CALL_BASE)?;
    save_callsign(table, &call);
    Some(call)
}

/// Record a callsign in the hash table under its 22-bit hash
pub fn save_callsign(table: &mut dyn CallsignHashTable, call: &str) {
    if let Some(n22) = hash22(call) {
        table.save_hash(call, n22);
    }
}
