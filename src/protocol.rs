//! FT8 / FT4 Protocol Parameters
//!
//! Both protocols share the 77-bit payload, the CRC-14 and the LDPC(174,91) code.
//! They differ in modulation order, symbol timing and synchronisation layout:
//!
//! | Parameter          | FT8                 | FT4                          |
//! |--------------------|---------------------|------------------------------|
//! | Tones              | 8 (3 bits/symbol)   | 4 (2 bits/symbol)            |
//! | Symbol period      | 0.160 s             | 0.048 s                      |
//! | Slot length        | 15 s                | 7.5 s                        |
//! | Frame              | S7 D29 S7 D29 S7    | R S4 D29 S4 D29 S4 D29 S4 R  |
//!
//! `R` is a ramp symbol (tone 0), `S` a Costas sync block, `D` data symbols.

use core::fmt;

/// Number of payload bits carried by every transmission
pub const PAYLOAD_BITS: usize = 77;

/// Number of bytes used to hold a 77-bit payload (MSB-first)
pub const PAYLOAD_BYTES: usize = 10;

/// FT8 Costas 7×7 sync pattern, sent at symbols 0, 36 and 72
pub const FT8_COSTAS: [u8; 7] = [3, 1, 4, 0, 6, 5, 2];

/// FT8 sync block start positions
pub const FT8_SYNC_OFFSETS: [usize; 3] = [0, 36, 72];

/// FT4 Costas 4×4 sync patterns, one per sync block
pub const FT4_COSTAS: [[u8; 4]; 4] = [
    [0, 1, 3, 2],
    [1, 0, 2, 3],
    [2, 3, 1, 0],
    [3, 2, 0, 1],
];

/// FT4 sync block start positions (the leading ramp symbol occupies position 0)
pub const FT4_SYNC_OFFSETS: [usize; 4] = [1, 34, 67, 100];

/// Gray code mapping for 3-bit values to FT8 tones
pub const FT8_GRAY_MAP: [u8; 8] = [0, 1, 3, 2, 5, 6, 4, 7];

/// Inverse FT8 Gray mapping (tone to 3-bit value)
pub const FT8_GRAY_MAP_INV: [u8; 8] = [0, 1, 3, 2, 6, 4, 5, 7];

/// Gray code mapping for 2-bit values to FT4 tones (self-inverse)
pub const FT4_GRAY_MAP: [u8; 4] = [0, 1, 3, 2];

/// Scrambling vector XORed onto FT4 payloads before the CRC is appended
///
/// 77 bits MSB-first; the three low bits of the last byte are padding.
pub const FT4_XOR_SEQUENCE: [u8; PAYLOAD_BYTES] =
    [0x4A, 0x5E, 0x89, 0xB4, 0xB0, 0x8A, 0x79, 0x55, 0xBE, 0x28];

/// The two supported transmission modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Protocol {
    #[default]
    Ft8,
    Ft4,
}

impl Protocol {
    /// Symbol duration in seconds
    pub fn symbol_period(self) -> f32 {
        match self {
            Protocol::Ft8 => 0.160,
            Protocol::Ft4 => 0.048,
        }
    }

    /// Length of a transmit/receive slot in seconds
    pub fn slot_time(self) -> f32 {
        match self {
            Protocol::Ft8 => 15.0,
            Protocol::Ft4 => 7.5,
        }
    }

    /// Number of FSK tones (8 or 4)
    pub fn num_tones(self) -> usize {
        match self {
            Protocol::Ft8 => 8,
            Protocol::Ft4 => 4,
        }
    }

    /// Codeword bits carried by one data symbol
    pub fn bits_per_symbol(self) -> usize {
        match self {
            Protocol::Ft8 => 3,
            Protocol::Ft4 => 2,
        }
    }

    /// Number of data symbols per frame
    pub fn num_data_symbols(self) -> usize {
        match self {
            Protocol::Ft8 => 58,
            Protocol::Ft4 => 87,
        }
    }

    /// Number of Costas sync symbols per frame
    pub fn num_sync_symbols(self) -> usize {
        match self {
            Protocol::Ft8 => 21,
            Protocol::Ft4 => 16,
        }
    }

    /// Total symbols per frame, including FT4's two ramp symbols
    pub fn num_symbols(self) -> usize {
        match self {
            Protocol::Ft8 => 79,
            Protocol::Ft4 => 105,
        }
    }

    /// Length of each Costas block
    pub fn sync_length(self) -> usize {
        match self {
            Protocol::Ft8 => 7,
            Protocol::Ft4 => 4,
        }
    }

    /// Start positions of the Costas blocks within the frame
    pub fn sync_offsets(self) -> &'static [usize] {
        match self {
            Protocol::Ft8 => &FT8_SYNC_OFFSETS,
            Protocol::Ft4 => &FT4_SYNC_OFFSETS,
        }
    }

    /// Expected tone of sync symbol `k` within Costas block `block`
    pub fn costas_tone(self, block: usize, k: usize) -> u8 {
        match self {
            Protocol::Ft8 => FT8_COSTAS[k],
            Protocol::Ft4 => FT4_COSTAS[block][k],
        }
    }

    /// Frame position of data symbol `k` (0-based over the data symbols only)
    pub fn data_symbol_position(self, k: usize) -> usize {
        match self {
            Protocol::Ft8 => k + if k < 29 { 7 } else { 14 },
            Protocol::Ft4 => {
                k + if k < 29 {
                    5
                } else if k < 58 {
                    9
                } else {
                    13
                }
            }
        }
    }

    /// Gray map from bit group value to tone
    pub fn gray_map(self) -> &'static [u8] {
        match self {
            Protocol::Ft8 => &FT8_GRAY_MAP,
            Protocol::Ft4 => &FT4_GRAY_MAP,
        }
    }

    /// Inverse Gray map from tone to bit group value
    pub fn gray_map_inv(self) -> &'static [u8] {
        match self {
            Protocol::Ft8 => &FT8_GRAY_MAP_INV,
            Protocol::Ft4 => &FT4_GRAY_MAP,
        }
    }

    /// Default Gaussian filter bandwidth-time product
    pub fn default_bt(self) -> f32 {
        match self {
            Protocol::Ft8 => 2.0,
            Protocol::Ft4 => 1.0,
        }
    }

    /// Tone spacing in Hz (equal to the symbol rate)
    pub fn tone_spacing(self) -> f32 {
        1.0 / self.symbol_period()
    }

    /// Samples per symbol at the given sample rate
    pub fn samples_per_symbol(self, sample_rate: u32) -> usize {
        (sample_rate as f32 * self.symbol_period()).round() as usize
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Ft8 => write!(f, "FT8"),
            Protocol::Ft4 => write!(f, "FT4"),
        }
    }
}

/// Snapshot of the numeric parameters of a protocol, for hosts that display or log them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProtocolConstants {
    pub protocol: Protocol,
    pub symbol_period: f32,
    pub slot_time: f32,
    pub num_tones: usize,
    pub num_symbols: usize,
    pub num_data_symbols: usize,
    pub num_sync_symbols: usize,
    pub tone_spacing: f32,
    pub default_bt: f32,
}

impl ProtocolConstants {
    pub fn for_protocol(protocol: Protocol) -> Self {
        Self {
            protocol,
            symbol_period: protocol.symbol_period(),
            slot_time: protocol.slot_time(),
            num_tones: protocol.num_tones(),
            num_symbols: protocol.num_symbols(),
            num_data_symbols: protocol.num_data_symbols(),
            num_sync_symbols: protocol.num_sync_symbols(),
            tone_spacing: protocol.tone_spacing(),
            default_bt: protocol.default_bt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_layout_adds_up() {
        for protocol in [Protocol::Ft8, Protocol::Ft4] {
            let ramps = if protocol == Protocol::Ft4 { 2 } else { 0 };
            assert_eq!(
                protocol.num_symbols(),
                protocol.num_data_symbols() + protocol.num_sync_symbols() + ramps,
                "{} frame size mismatch",
                protocol
            );
            assert_eq!(protocol.num_data_symbols() * protocol.bits_per_symbol(), 174);
            assert_eq!(protocol.sync_offsets().len() * protocol.sync_length(), protocol.num_sync_symbols());
        }
    }

    #[test]
    fn test_data_positions_skip_sync_blocks() {
        for protocol in [Protocol::Ft8, Protocol::Ft4] {
            let mut used = vec![false; protocol.num_symbols()];
            for &offset in protocol.sync_offsets() {
                for k in 0..protocol.sync_length() {
                    used[offset + k] = true;
                }
            }
            for k in 0..protocol.num_data_symbols() {
                let pos = protocol.data_symbol_position(k);
                assert!(!used[pos], "{} data symbol {} collides at {}", protocol, k, pos);
                used[pos] = true;
            }
            let unused: Vec<usize> = used.iter().enumerate().filter(|(_, u)| !**u).map(|(i, _)| i).collect();
            match protocol {
                Protocol::Ft8 => assert!(unused.is_empty()),
                Protocol::Ft4 => assert_eq!(unused, vec![0, 104]),
            }
        }
    }

    #[test]
    fn test_gray_maps_are_inverse() {
        for protocol in [Protocol::Ft8, Protocol::Ft4] {
            let map = protocol.gray_map();
            let inv = protocol.gray_map_inv();
            for n in 0..protocol.num_tones() {
                assert_eq!(inv[map[n] as usize] as usize, n);
                assert_eq!(map[inv[n] as usize] as usize, n);
            }
        }
    }

    #[test]
    fn test_adjacent_tones_differ_in_one_bit() {
        for protocol in [Protocol::Ft8, Protocol::Ft4] {
            let inv = protocol.gray_map_inv();
            for tone in 1..protocol.num_tones() {
                let diff = inv[tone] ^ inv[tone - 1];
                assert_eq!(diff.count_ones(), 1, "{} tones {} and {}", protocol, tone - 1, tone);
            }
        }
    }

    #[test]
    fn test_ft4_costas_blocks_are_permutations() {
        for block in FT4_COSTAS.iter() {
            let mut seen = [false; 4];
            for &tone in block {
                seen[tone as usize] = true;
            }
            assert!(seen.iter().all(|s| *s));
        }
    }

    #[test]
    fn test_samples_per_symbol() {
        assert_eq!(Protocol::Ft8.samples_per_symbol(12000), 1920);
        assert_eq!(Protocol::Ft4.samples_per_symbol(12000), 576);
        assert_eq!(Protocol::Ft8.samples_per_symbol(48000), 7680);
    }

    #[test]
    fn test_protocol_constants_snapshot() {
        let c = ProtocolConstants::for_protocol(Protocol::Ft4);
        assert_eq!(c.num_symbols, 105);
        assert_eq!(c.num_tones, 4);
        assert!((c.tone_spacing - 20.833334).abs() < 1e-3);
        assert_eq!(c.default_bt, 1.0);
    }
}
