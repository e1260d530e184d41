//! Symbol Mapping and Demapping
//!
//! Converts between 174-bit LDPC codewords and the tone sequences sent on air.
//!
//! **FT8** (79 symbols): `S7 D29 S7 D29 S7`, 3 bits per data symbol, 8 tones.
//!
//! **FT4** (105 symbols): `R S4 D29 S4 D29 S4 D29 S4 R`, 2 bits per data symbol,
//! 4 tones, with ramp symbols `R` of tone 0 at both ends.
//!
//! Bits are taken MSB first and passed through the protocol's Gray map, so
//! neighbouring tones differ in exactly one bit.

use bitvec::prelude::*;
use snafu::prelude::*;

use crate::ldpc;
use crate::protocol::Protocol;

/// A 174-bit LDPC codeword
pub type Codeword = BitArr!(for ldpc::N, in u8, Msb0);

#[derive(Debug, Snafu, PartialEq)]
pub enum SymbolError {
    #[snafu(display("{protocol} frames have {expected} symbols, got {len}"))]
    FrameLength {
        protocol: Protocol,
        expected: usize,
        len: usize,
    },

    #[snafu(display("tone {tone} at symbol {position} is out of range for {protocol}"))]
    ToneOutOfRange {
        protocol: Protocol,
        tone: u8,
        position: usize,
    },
}

/// Map a 174-bit codeword to the full tone sequence of a frame
///
/// # Example
/// ```
/// use rustyftx::protocol::Protocol;
/// use rustyftx::symbol::{self, Codeword};
///
/// let codeword = Codeword::ZERO;
/// let tones = symbol::map(&codeword, Protocol::Ft8);
/// assert_eq!(tones.len(), 79);
/// assert_eq!(&tones[..7], &[3, 1, 4, 0, 6, 5, 2]);
/// ```
pub fn map(codeword: &Codeword, protocol: Protocol) -> Vec<u8> {
    // ramp symbols stay at tone 0
    let mut tones = vec![0u8; protocol.num_symbols()];

    for (block, &offset) in protocol.sync_offsets().iter().enumerate() {
        for k in 0..protocol.sync_length() {
            tones[offset + k] = protocol.costas_tone(block, k);
        }
    }

    let bits = protocol.bits_per_symbol();
    let gray = protocol.gray_map();
    for k in 0..protocol.num_data_symbols() {
        let value: usize = codeword[k * bits..(k + 1) * bits].load_be();
        tones[protocol.data_symbol_position(k)] = gray[value];
    }

    tones
}

/// Recover the codeword carried by a received tone sequence
///
/// Sync and ramp symbols are ignored; only the data symbols are read back.
pub fn demap(tones: &[u8], protocol: Protocol) -> Result<Codeword, SymbolError> {
    ensure!(
        tones.len() == protocol.num_symbols(),
        FrameLengthSnafu {
            protocol,
            expected: protocol.num_symbols(),
            len: tones.len(),
        }
    );

    let bits = protocol.bits_per_symbol();
    let inv = protocol.gray_map_inv();
    let mut codeword = Codeword::ZERO;

    for k in 0..protocol.num_data_symbols() {
        let position = protocol.data_symbol_position(k);
        let tone = tones[position];
        ensure!(
            (tone as usize) < protocol.num_tones(),
            ToneOutOfRangeSnafu { protocol, tone, position }
        );
        codeword[k * bits..(k + 1) * bits].store_be(inv[tone as usize]);
    }

    Ok(codeword)
}
