//! LDPC(174,91) systematic encoder

use bitvec::prelude::*;

use super::constants::{GENERATOR_ROWS, K, M, N};

/// Encode a 91-bit message (payload + CRC) into a 174-bit codeword
///
/// The codeword is systematic: the first 91 bits are the message itself, followed
/// by 83 parity bits. Parity bit `i` is the GF(2) dot product of generator row `i`
/// with the message.
///
/// # Arguments
/// * `message` - at least 91 bits; only the first 91 are used
/// * `codeword` - output buffer of at least 174 bits
///
/// # Example
/// ```
/// use bitvec::prelude::*;
/// use rustyftx::ldpc;
///
/// let message = bitarr![u8, Msb0; 0; 96];
/// let mut codeword = bitarr![u8, Msb0; 1; 176];
/// ldpc::encode(&message[..91], &mut codeword[..174]);
/// assert!(codeword[..174].not_any());
/// ```
pub fn encode(message: &BitSlice<u8, Msb0>, codeword: &mut BitSlice<u8, Msb0>) {
    let message_value: u128 = message[..K].load_be();

    codeword[..K].copy_from_bitslice(&message[..K]);
    for (i, row) in GENERATOR_ROWS.iter().enumerate() {
        let parity = (row & message_value).count_ones() & 1 == 1;
        codeword.set(K + i, parity);
    }
    debug_assert_eq!(K + M, N);
}
