//! The 77-bit payload carried by every FT8/FT4 transmission

use core::fmt;

use bitvec::prelude::*;

use crate::message::types::MessageType;
use crate::protocol::{PAYLOAD_BITS, PAYLOAD_BYTES};

/// 77 payload bits, MSB-first in 10 bytes
///
/// The three low bits of the last byte are always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Payload([u8; PAYLOAD_BYTES]);

impl Payload {
    /// Wrap raw bytes, clearing the padding bits after bit 77
    pub fn from_bytes(mut bytes: [u8; PAYLOAD_BYTES]) -> Self {
        bytes[PAYLOAD_BYTES - 1] &= 0xF8;
        Self(bytes)
    }

    /// Copy the first 77 bits of `bits`
    pub fn from_bits(bits: &BitSlice<u8, Msb0>) -> Self {
        let mut payload = Self::default();
        let len = bits.len().min(PAYLOAD_BITS);
        payload.bits_mut()[..len].copy_from_bitslice(&bits[..len]);
        payload
    }

    pub fn as_bytes(&self) -> &[u8; PAYLOAD_BYTES] {
        &self.0
    }

    pub fn bits(&self) -> &BitSlice<u8, Msb0> {
        &self.0.view_bits::<Msb0>()[..PAYLOAD_BITS]
    }

    pub fn bits_mut(&mut self) -> &mut BitSlice<u8, Msb0> {
        &mut self.0.view_bits_mut::<Msb0>()[..PAYLOAD_BITS]
    }

    /// Message type field (bits 74..77)
    pub fn i3(&self) -> u8 {
        self.bits()[74..77].load_be()
    }

    /// Subtype field of i3=0 messages (bits 71..74)
    pub fn n3(&self) -> u8 {
        self.bits()[71..74].load_be()
    }

    /// n3 when the type has a subtype field (i3=0), otherwise `None`
    pub fn subtype(&self) -> Option<u8> {
        (self.i3() == 0).then(|| self.n3())
    }

    pub fn message_type(&self) -> MessageType {
        MessageType::from_i3_n3(self.i3(), self.n3())
    }

    /// XOR every payload bit with `mask` (used for FT4 scrambling)
    pub fn xor(&self, mask: &[u8; PAYLOAD_BYTES]) -> Self {
        let mut bytes = self.0;
        for (b, m) in bytes.iter_mut().zip(mask.iter()) {
            *b ^= m;
        }
        Self::from_bytes(bytes)
    }
}

impl From<[u8; PAYLOAD_BYTES]> for Payload {
    fn from(bytes: [u8; PAYLOAD_BYTES]) -> Self {
        Self::from_bytes(bytes)
    }
}

/// Hex dump of the 10 payload bytes
impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0.iter() {
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_bits_are_cleared() {
        let payload = Payload::from_bytes([0xFF; 10]);
        assert_eq!(payload.as_bytes()[9], 0xF8);
        assert_eq!(payload.bits().count_ones(), 77);
    }

    #[test]
    fn test_type_fields() {
        let mut payload = Payload::default();
        payload.bits_mut()[74..77].store_be(3u8);
        payload.bits_mut()[71..74].store_be(5u8);
        assert_eq!(payload.i3(), 3);
        assert_eq!(payload.n3(), 5);
        assert_eq!(payload.message_type(), MessageType::ArrlRtty);
    }

    #[test]
    fn test_xor_is_an_involution() {
        let payload = Payload::from_bytes([0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0, 0x11, 0x28]);
        let mask = [0x4A, 0x5E, 0x89, 0xB4, 0xB0, 0x8A, 0x79, 0x55, 0xBE, 0x28];
        assert_ne!(payload.xor(&mask), payload);
        assert_eq!(payload.xor(&mask).xor(&mask), payload);
    }

    #[test]
    fn test_from_bits_round_trip() {
        let payload = Payload::from_bytes([0xA5; 10]);
        assert_eq!(Payload::from_bits(payload.bits()), payload);
        assert_eq!(payload.to_string(), "A5A5A5A5A5A5A5A5A5A0");
    }
}
