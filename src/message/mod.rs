//! 77-bit message codec
//!
//! Converts between human-readable message text and the 77-bit payload shared
//! by FT8 and FT4, following the WSJT-X 77-bit protocol (QEX, 2020).
//!
//! ```
//! use rustyftx::message::{self, CallsignHashCache};
//!
//! let mut table = CallsignHashCache::new();
//! let payload = message::encode("CQ SOTA N0YPR/R DM42", &mut table)?;
//! assert_eq!(message::decode(&payload, &mut table)?, "CQ SOTA N0YPR/R DM42");
//! # Ok::<(), rustyftx::message::MessageError>(())
//! ```

pub mod callsign;
pub mod constants;
mod decode;
mod encode;
mod error;
pub mod grid;
pub mod hash_cache;
pub mod lookup_tables;
pub mod parser;
mod payload;
pub mod text_encoding;
mod types;

pub use decode::decode_variant;
pub use encode::encode_variant;
pub use error::MessageError;
pub use hash_cache::{CallsignHashCache, CallsignHashTable, HashKind};
pub use payload::Payload;
pub use types::{Acknowledge, MessageType, MessageVariant, RttyExchange};

use error::UnpackSnafu;

/// Pack message text into a 77-bit payload
///
/// Callsigns named in the message are saved into `table`.
pub fn encode(text: &str, table: &mut dyn CallsignHashTable) -> Result<Payload, MessageError> {
    let variant = parser::parse(text)?;
    encode_variant(&variant, table)
}

/// Unpack a payload into its canonical text
pub fn decode(payload: &Payload, table: &mut dyn CallsignHashTable) -> Result<String, MessageError> {
    decode_variant(payload, table).map(|variant| variant.to_string())
}

/// Message type the encoder would choose for `text`, or `Unknown`
pub fn message_type_of(text: &str) -> MessageType {
    parser::parse(text)
        .map(|variant| variant.message_type())
        .unwrap_or(MessageType::Unknown)
}

/// True if `text` can be packed
pub fn is_valid(text: &str) -> bool {
    parser::parse(text).is_ok()
}

/// The three fields of a standard message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardFields {
    pub call_to: String,
    pub call_de: String,
    pub extra: String,
}

impl StandardFields {
    fn from_variant(variant: MessageVariant) -> Option<Self> {
        match variant {
            MessageVariant::Standard { call_to, call_de, extra } => Some(Self { call_to, call_de, extra }),
            _ => None,
        }
    }
}

/// Split a standard message text into its fields
///
/// Returns `None` when the text is not a standard message.
pub fn parse_standard(text: &str) -> Option<StandardFields> {
    let normalized = parser::normalize(text);
    let tokens: Vec<&str> = normalized.split(' ').filter(|t| !t.is_empty()).collect();
    parser::standard_fields(&tokens).ok().and_then(StandardFields::from_variant)
}

/// Fields of a standard (i3=1 or 2) payload
pub fn decode_standard(payload: &Payload, table: &mut dyn CallsignHashTable) -> Result<StandardFields, MessageError> {
    let variant = decode_variant(payload, table)?;
    let message_type = variant.message_type();
    StandardFields::from_variant(variant).ok_or_else(|| {
        UnpackSnafu {
            i3: payload.i3(),
            n3: payload.n3(),
            reason: format!("{} is not a standard message", message_type),
        }
        .build()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitvec::prelude::*;

    const SOTA_BYTES: [u8; 10] = [0x00, 0x5E, 0x59, 0x80, 0x52, 0x6C, 0xE6, 0xC6, 0x7C, 0x88];

    macro_rules! test_round_trip {
        ($($name:ident: $text:expr => $kind:expr;)*) => {
            $(
                paste::item! {
                    #[test]
                    fn [< round_trip_ $name >]() {
                        let mut table = CallsignHashCache::new();
                        let payload = encode($text, &mut table).unwrap();
                        assert_eq!(payload.message_type(), $kind);
                        assert_eq!(decode(&payload, &mut table).unwrap(), $text);
                    }
                }
            )*
        };
    }

    test_round_trip! {
        cq: "CQ K1ABC FN42" => MessageType::Standard;
        cq_sota: "CQ SOTA N0YPR/R DM42" => MessageType::Standard;
        cq_number: "CQ 290 K1ABC FN42" => MessageType::Standard;
        qrz: "QRZ W9XYZ" => MessageType::Standard;
        report: "K1ABC W9XYZ -14" => MessageType::Standard;
        roger_report: "W9XYZ K1ABC R+05" => MessageType::Standard;
        roger_grid: "K1ABC W9XYZ R EN37" => MessageType::Standard;
        rrr: "K1ABC W9XYZ RRR" => MessageType::Standard;
        rr73: "K1ABC W9XYZ RR73" => MessageType::Standard;
        seventy_three: "K1ABC W9XYZ 73" => MessageType::Standard;
        low_report: "K1ABC W9XYZ -50" => MessageType::Standard;
        portable: "G4ABC/P PA9XYZ JO22" => MessageType::Standard;
        guinea: "CQ 3XB9AAA IJ39" => MessageType::Standard;
        swaziland: "3DA0XYZ K1ABC -09" => MessageType::Standard;
        nonstd: "PJ4/K1ABC <W9XYZ>" => MessageType::NonstdCall;
        nonstd_flipped: "<W9XYZ> PJ4/K1ABC RRR" => MessageType::NonstdCall;
        nonstd_cq: "CQ PJ4/K1ABC" => MessageType::NonstdCall;
        hashed_standard: "<PJ4/K1ABC> W9XYZ -10" => MessageType::Standard;
        rtty: "K1ABC W9XYZ 579 WI" => MessageType::ArrlRtty;
        rtty_tu: "TU; KA0DEF K1ABC R 569 MA" => MessageType::ArrlRtty;
        rtty_serial: "W9XYZ K1ABC R 589 0013" => MessageType::ArrlRtty;
        dxpedition: "K1ABC RR73; W9XYZ <KH1/KH7Z> -08" => MessageType::Dxpedition;
        field_day: "K1ABC W9XYZ 6A WI" => MessageType::ArrlFd;
        field_day_large: "W9XYZ K1ABC R 17B EMA" => MessageType::ArrlFd;
        wwrof: "<PA3XYZ> <G4ABC/P> R 590003 IO91NP" => MessageType::Wwrof;
        telemetry: "123456789ABCDEF012" => MessageType::Telemetry;
        free_text: "TNX BOB 73 GL" => MessageType::FreeText;
        hello_world: "HELLO WORLD" => MessageType::FreeText;
    }

    #[test]
    fn test_sota_payload_bits() {
        let payload = encode("CQ SOTA N0YPR/R DM42", &mut ()).unwrap();
        assert_eq!(payload.as_bytes(), &SOTA_BYTES);
    }

    #[test]
    fn test_decode_sota_payload() {
        let payload = Payload::from_bytes(SOTA_BYTES);
        let fields = decode_standard(&payload, &mut ()).unwrap();
        assert_eq!(fields.call_to, "CQ SOTA");
        assert_eq!(fields.call_de, "N0YPR/R");
        assert_eq!(fields.extra, "DM42");
    }

    #[test]
    fn test_text_is_normalized() {
        let mut table = CallsignHashCache::new();
        let payload = encode("  cq  cq   k1abc fn42 ", &mut table).unwrap();
        assert_eq!(decode(&payload, &mut table).unwrap(), "CQ K1ABC FN42");
    }

    #[test]
    fn test_unknown_hash_renders_placeholder() {
        let mut sender = CallsignHashCache::new();
        let payload = encode("PJ4/K1ABC <W9XYZ> RR73", &mut sender).unwrap();

        let mut receiver = CallsignHashCache::new();
        assert_eq!(decode(&payload, &mut receiver).unwrap(), "PJ4/K1ABC <...> RR73");
        assert_eq!(decode(&payload, &mut ()).unwrap(), "PJ4/K1ABC <...> RR73");
    }

    #[test]
    fn test_receiver_learns_calls_from_full_messages() {
        let mut receiver = CallsignHashCache::new();

        let full = encode("CQ PJ4/K1ABC", &mut ()).unwrap();
        assert_eq!(decode(&full, &mut receiver).unwrap(), "CQ PJ4/K1ABC");

        let hashed = encode("<PJ4/K1ABC> W9XYZ -10", &mut ()).unwrap();
        assert_eq!(decode(&hashed, &mut receiver).unwrap(), "<PJ4/K1ABC> W9XYZ -10");
    }

    #[test]
    fn test_dxpedition_without_table() {
        let payload = encode("K1ABC RR73; W9XYZ <KH1/KH7Z> -08", &mut ()).unwrap();
        assert_eq!(decode(&payload, &mut ()).unwrap(), "K1ABC RR73; W9XYZ <...> -08");
    }

    #[test]
    fn test_encoding_errors() {
        let mut table = CallsignHashCache::new();
        assert!(matches!(encode("K1ABC/R W9XYZ/P", &mut table), Err(MessageError::Suffix)));
        assert!(matches!(encode("K1ABC W9XYZ +77", &mut table), Err(MessageError::Grid { .. })));
        assert!(matches!(encode("THIS MESSAGE IS FAR TOO LONG", &mut table), Err(MessageError::Type { .. })));
    }

    macro_rules! test_reserved {
        ($($name:ident: $i3:expr, $n3:expr;)*) => {
            $(
                paste::item! {
                    #[test]
                    fn [< reserved_type_ $name >]() {
                        let mut payload = Payload::default();
                        payload.bits_mut()[0..8].store_be(0x5Au8);
                        payload.bits_mut()[71..74].store_be($n3 as u8);
                        payload.bits_mut()[74..77].store_be($i3 as u8);
                        let err = decode(&payload, &mut ()).unwrap_err();
                        let subtype = if $i3 == 0 { Some($n3 as u8) } else { None };
                        assert!(matches!(err, MessageError::Unpack { n3, .. } if n3 == subtype), "{:?}", err);
                    }
                }
            )*
        };
    }

    test_reserved! {
        eu_vhf: 0, 2;
        contesting: 0, 6;
        n3_7: 0, 7;
        i3_6: 6, 0;
        i3_7: 7, 0;
    }

    #[test]
    fn test_out_of_range_fields() {
        // g15 = MAXGRID4 is unused
        let mut payload = encode("K1ABC W9XYZ FN42", &mut ()).unwrap();
        payload.bits_mut()[59..74].store_be(constants::MAXGRID4);
        assert!(matches!(
            decode(&payload, &mut ()),
            Err(MessageError::Unpack { i3: 1, n3: None, .. })
        ));

        // RTTY exchange 0 is neither a serial nor a state
        let mut payload = encode("K1ABC W9XYZ 579 WI", &mut ()).unwrap();
        payload.bits_mut()[61..74].store_be(0u16);
        assert!(matches!(decode(&payload, &mut ()), Err(MessageError::Unpack { .. })));
    }

    #[test]
    fn test_utilities() {
        assert_eq!(message_type_of("CQ K1ABC FN42"), MessageType::Standard);
        assert_eq!(message_type_of("TNX BOB 73 GL"), MessageType::FreeText);
        assert_eq!(message_type_of("THIS MESSAGE IS FAR TOO LONG"), MessageType::Unknown);
        assert!(is_valid("K1ABC W9XYZ RR73"));
        assert!(!is_valid("K1ABC/R W9XYZ/P"));

        let fields = parse_standard("k1abc w9xyz r-08").unwrap();
        assert_eq!(fields.extra, "R-08");
        assert_eq!(parse_standard("TNX BOB 73 GL"), None);

        let payload = encode("TNX BOB 73 GL", &mut ()).unwrap();
        assert!(matches!(decode_standard(&payload, &mut ()), Err(MessageError::Unpack { .. })));
    }
}
