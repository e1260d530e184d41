//! Character sets and numeric ranges of the 77-bit message formats
//!
//! Values follow the WSJT-X `packjt77` reference.

/// Free text alphabet (13 characters packed into 71 bits)
pub const CHARSET_BASE42: &[u8] = b" 0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ+-./?";

/// Non-standard callsign and hashing alphabet (11 characters)
pub const CHARSET_BASE38: &[u8] = b" 0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ/";

/// First position of a standard callsign
pub const CHARSET_A1: &[u8] = b" 0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Second position of a standard callsign
pub const CHARSET_A2: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Third position (the call area digit)
pub const CHARSET_A3: &[u8] = b"0123456789";

/// Suffix positions of a standard callsign, also used for `CQ xxxx`
pub const CHARSET_A4: &[u8] = b" ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Special tokens (DE, QRZ, CQ variants) occupy n28 values below this
pub const NTOKENS: u32 = 2_063_592;

/// Number of 22-bit hash values
pub const MAX22: u32 = 4_194_304;

/// First n28 value of a standard callsign
pub const STANDARD_CALL_BASE: u32 = NTOKENS + MAX22;

/// Largest n28 value (28 bits)
pub const MAX28: u32 = (1 << 28) - 1;

/// `CQ nnn` tokens start here (`CQ 000` = 3)
pub const CQ_NUMBER_BASE: u32 = 3;

/// `CQ a..aaaa` tokens start here
pub const CQ_LETTERS_BASE: u32 = 1003;

/// Last valid `CQ ZZZZ` token
pub const CQ_LETTERS_MAX: u32 = CQ_LETTERS_BASE + 27 * 27 * 27 * 27 - 1;

/// Number of 4-character grid squares (18 * 18 * 10 * 10)
pub const MAXGRID4: u16 = 32400;

/// g15 codes above MAXGRID4
pub const GRID_BLANK: u16 = MAXGRID4 + 1;
pub const GRID_RRR: u16 = MAXGRID4 + 2;
pub const GRID_RR73: u16 = MAXGRID4 + 3;
pub const GRID_73: u16 = MAXGRID4 + 4;

/// Multiplier used by the callsign hash (`ihashcall`)
pub const HASH_MULTIPLIER: u64 = 47_055_833_459;

/// Longest non-standard callsign
pub const MAX_CALLSIGN_LEN: usize = 11;

/// Longest free text message
pub const MAX_FREE_TEXT_LEN: usize = 13;

/// Longest telemetry message in hex digits
pub const MAX_TELEMETRY_DIGITS: usize = 18;
