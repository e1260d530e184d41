//! Channel coding: payload to tones and back
//!
//! ```text
//! payload(77) --[FT4: xor]--> +CRC14 (91) --LDPC--> codeword(174) --Gray/Costas--> tones
//! ```

use bitvec::prelude::*;

use crate::crc;
use crate::ldpc;
use crate::message::Payload;
use crate::protocol::{Protocol, FT4_XOR_SEQUENCE};
use crate::symbol::{self, Codeword};

/// Payload plus CRC
pub type Message91 = BitArr!(for crc::MESSAGE_BITS, in u8, Msb0);

/// Apply (or undo) the FT4 payload scrambling; FT8 payloads pass through
pub fn scramble(payload: &Payload, protocol: Protocol) -> Payload {
    match protocol {
        Protocol::Ft8 => *payload,
        Protocol::Ft4 => payload.xor(&FT4_XOR_SEQUENCE),
    }
}

/// The 91 bits handed to the LDPC encoder
pub fn message91(payload: &Payload, protocol: Protocol) -> Message91 {
    let scrambled = scramble(payload, protocol);
    let mut message = Message91::ZERO;
    crc::append_crc(scrambled.bits(), &mut message[..crc::MESSAGE_BITS]);
    message
}

pub fn encode_codeword(payload: &Payload, protocol: Protocol) -> Codeword {
    let message = message91(payload, protocol);
    let mut codeword = Codeword::ZERO;
    ldpc::encode(&message[..ldpc::K], &mut codeword[..ldpc::N]);
    codeword
}

/// Full tone sequence for a payload: 79 tones for FT8, 105 for FT4
///
/// # Example
/// ```
/// use rustyftx::channel::encode_tones;
/// use rustyftx::message;
/// use rustyftx::protocol::Protocol;
///
/// let payload = message::encode("CQ K1ABC FN42", &mut ())?;
/// let tones = encode_tones(&payload, Protocol::Ft8);
/// assert_eq!(tones.len(), 79);
/// assert_eq!(&tones[..7], &[3, 1, 4, 0, 6, 5, 2]);
/// # Ok::<(), rustyftx::message::MessageError>(())
/// ```
pub fn encode_tones(payload: &Payload, protocol: Protocol) -> Vec<u8> {
    symbol::map(&encode_codeword(payload, protocol), protocol)
}

/// Why the systematic part of a decoded codeword was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckFailure {
    /// All 91 bits are zero, which passes every parity check trivially
    AllZero,
    CrcMismatch,
}

/// Check the CRC of a decoded 91-bit message and recover the payload
pub fn recover_payload(message: &BitSlice<u8, Msb0>, protocol: Protocol) -> Result<Payload, CheckFailure> {
    if message[..crc::MESSAGE_BITS].not_any() {
        return Err(CheckFailure::AllZero);
    }
    if !crc::verify(message) {
        return Err(CheckFailure::CrcMismatch);
    }
    Ok(scramble(&Payload::from_bits(message), protocol))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message;

    const SOTA_TONES: &str = "3140652000671215006116571652175530543140652375421655752603157715414212433140652";

    #[test]
    fn test_ft8_tones_match_reference() {
        let payload = message::encode("CQ SOTA N0YPR/R DM42", &mut ()).unwrap();
        let tones = encode_tones(&payload, Protocol::Ft8);
        let expected: Vec<u8> = SOTA_TONES.bytes().map(|c| c - b'0').collect();
        assert_eq!(tones, expected);
    }

    #[test]
    fn test_ft4_frame_layout() {
        let payload = message::encode("CQ K1ABC FN42", &mut ()).unwrap();
        let tones = encode_tones(&payload, Protocol::Ft4);
        assert_eq!(tones.len(), 105);
        assert_eq!(tones[0], 0);
        assert_eq!(tones[104], 0);
        assert_eq!(&tones[1..5], &[0, 1, 3, 2]);
        assert_eq!(&tones[34..38], &[1, 0, 2, 3]);
        assert_eq!(&tones[67..71], &[2, 3, 1, 0]);
        assert_eq!(&tones[100..104], &[3, 2, 0, 1]);
        assert!(tones.iter().all(|&t| t < 4));
    }

    #[test]
    fn test_ft4_scrambling_changes_codeword() {
        let payload = message::encode("CQ K1ABC FN42", &mut ()).unwrap();
        assert_ne!(encode_codeword(&payload, Protocol::Ft8), encode_codeword(&payload, Protocol::Ft4));
        assert_eq!(scramble(&scramble(&payload, Protocol::Ft4), Protocol::Ft4), payload);
    }

    #[test]
    fn test_tones_back_to_payload() {
        for protocol in [Protocol::Ft8, Protocol::Ft4] {
            let payload = message::encode("K1ABC W9XYZ RR73", &mut ()).unwrap();
            let tones = encode_tones(&payload, protocol);
            let codeword = symbol::demap(&tones, protocol).unwrap();
            assert_eq!(ldpc::parity_check(&codeword[..ldpc::N]), 0);
            assert_eq!(recover_payload(&codeword[..ldpc::K], protocol), Ok(payload));
        }
    }

    #[test]
    fn test_all_zero_message_is_rejected() {
        let zero = Message91::ZERO;
        assert_eq!(recover_payload(&zero[..91], Protocol::Ft8), Err(CheckFailure::AllZero));
    }

    #[test]
    fn test_crc_mismatch() {
        let payload = message::encode("K1ABC W9XYZ RR73", &mut ()).unwrap();
        let mut message = message91(&payload, Protocol::Ft8);
        let bit = message[3];
        message.set(3, !bit);
        assert_eq!(recover_payload(&message[..91], Protocol::Ft8), Err(CheckFailure::CrcMismatch));
    }
}
