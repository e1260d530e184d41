//! CRC-14 for FT8 / FT4 payloads
//!
//! Polynomial 0x2757, MSB-first, zero initial value, no reflection, no final XOR.
//!
//! Reference: https://wsjt.sourceforge.io/FT4_FT8_QEX.pdf page 8
//! "The CRC is calculated on the source-encoded message, zero-extended from 77 to 82 bits."

use bitvec::prelude::*;
use crc::{Algorithm, Crc};

use crate::protocol::PAYLOAD_BITS;

/// CRC-14 polynomial
const CRC_POLYNOMIAL: u16 = 0x2757;

/// Width of the CRC in bits
pub const CRC_BITS: usize = 14;

/// Payload plus CRC length
pub const MESSAGE_BITS: usize = PAYLOAD_BITS + CRC_BITS;

/// Number of zero bits appended to the payload before the CRC is taken (77 -> 82)
const ZERO_EXTENSION: usize = 5;

const CRC_FTX: Algorithm<u16> = Algorithm {
    width: 14,
    poly: CRC_POLYNOMIAL,
    init: 0x0,
    refin: false,
    refout: false,
    xorout: 0x0,
    check: 0x0,
    residue: 0x0,
};

const FTX_CRC: Crc<u16> = Crc::<u16>::new(&CRC_FTX);

/// CRC-14 over an arbitrary run of bits
///
/// The bits are left-padded with zeros to a whole number of bytes, which leaves
/// the remainder unchanged because the register starts at zero.
pub fn compute(bits: &BitSlice<u8, Msb0>) -> u16 {
    let pad = (8 - bits.len() % 8) % 8;
    let mut padded: BitVec<u8, Msb0> = BitVec::repeat(false, pad);
    padded.extend_from_bitslice(bits);
    FTX_CRC.checksum(padded.as_raw_slice())
}

/// CRC-14 of a 77-bit payload, zero-extended to 82 bits
///
/// # Example
/// ```
/// use bitvec::prelude::*;
/// use rustyftx::crc::crc14;
///
/// let bits = bitarr![u8, Msb0; 0; 77];
/// assert_eq!(crc14(&bits[..77]), 0);
/// ```
pub fn crc14(payload: &BitSlice<u8, Msb0>) -> u16 {
    let mut extended: BitVec<u8, Msb0> = payload[..PAYLOAD_BITS].to_bitvec();
    extended.resize(PAYLOAD_BITS + ZERO_EXTENSION, false);
    compute(&extended)
}

/// Read the 14 CRC bits stored after the payload in a 91-bit message
pub fn extract_crc(bits: &BitSlice<u8, Msb0>) -> u16 {
    bits[PAYLOAD_BITS..MESSAGE_BITS].load_be::<u16>()
}

/// Copy a 77-bit payload into `out` and append its CRC, producing 91 bits
pub fn append_crc(payload: &BitSlice<u8, Msb0>, out: &mut BitSlice<u8, Msb0>) {
    out[..PAYLOAD_BITS].copy_from_bitslice(&payload[..PAYLOAD_BITS]);
    out[PAYLOAD_BITS..MESSAGE_BITS].store_be(crc14(payload));
}

/// Check that the CRC stored in a 91-bit message matches its payload
pub fn verify(bits: &BitSlice<u8, Msb0>) -> bool {
    if bits.len() < MESSAGE_BITS {
        return false;
    }
    crc14(&bits[..PAYLOAD_BITS]) == extract_crc(bits)
}

/// CRC-14 over the first `num_bits` bits (MSB-first) of a byte buffer
///
/// Byte-oriented entry point for hosts that keep payloads as raw bytes.
/// `num_bits` is clamped to the buffer length.
pub fn compute_bytes(data: &[u8], num_bits: usize) -> u16 {
    let bits = data.view_bits::<Msb0>();
    compute(&bits[..num_bits.min(bits.len())])
}

/// Compare the CRC of the first `num_bits` bits of `data` with `expected`
pub fn verify_bytes(data: &[u8], num_bits: usize, expected: u16) -> bool {
    compute_bytes(data, num_bits) == expected & 0x3FFF
}
