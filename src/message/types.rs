//! Message types and their parsed fields

use core::fmt;

/// Message type tag, selected by the i3 (and for i3=0 the n3) field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    FreeText,
    Dxpedition,
    EuVhf,
    ArrlFd,
    Telemetry,
    Contesting,
    Standard,
    ArrlRtty,
    NonstdCall,
    Wwrof,
    Unknown,
}

impl MessageType {
    /// Classify by the raw type fields
    ///
    /// | i3 | n3  | type        |
    /// |----|-----|-------------|
    /// | 0  | 0   | FREE_TEXT   |
    /// | 0  | 1   | DXPEDITION  |
    /// | 0  | 2   | EU_VHF      |
    /// | 0  | 3,4 | ARRL_FD     |
    /// | 0  | 5   | TELEMETRY   |
    /// | 0  | 6   | CONTESTING  |
    /// | 1,2| -   | STANDARD    |
    /// | 3  | -   | ARRL_RTTY   |
    /// | 4  | -   | NONSTD_CALL |
    /// | 5  | -   | WWROF       |
    pub fn from_i3_n3(i3: u8, n3: u8) -> Self {
        match (i3, n3) {
            (0, 0) => MessageType::FreeText,
            (0, 1) => MessageType::Dxpedition,
            (0, 2) => MessageType::EuVhf,
            (0, 3) | (0, 4) => MessageType::ArrlFd,
            (0, 5) => MessageType::Telemetry,
            (0, 6) => MessageType::Contesting,
            (1, _) | (2, _) => MessageType::Standard,
            (3, _) => MessageType::ArrlRtty,
            (4, _) => MessageType::NonstdCall,
            (5, _) => MessageType::Wwrof,
            _ => MessageType::Unknown,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageType::FreeText => "FREE_TEXT",
            MessageType::Dxpedition => "DXPEDITION",
            MessageType::EuVhf => "EU_VHF",
            MessageType::ArrlFd => "ARRL_FD",
            MessageType::Telemetry => "TELEMETRY",
            MessageType::Contesting => "CONTESTING",
            MessageType::Standard => "STANDARD",
            MessageType::ArrlRtty => "ARRL_RTTY",
            MessageType::NonstdCall => "NONSTD_CALL",
            MessageType::Wwrof => "WWROF",
            MessageType::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// Acknowledgement carried by a non-standard call message (2 bits)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Acknowledge {
    #[default]
    None,
    Rrr,
    Rr73,
    SeventyThree,
}

impl Acknowledge {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "RRR" => Some(Acknowledge::Rrr),
            "RR73" => Some(Acknowledge::Rr73),
            "73" => Some(Acknowledge::SeventyThree),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Self {
        match code & 0b11 {
            1 => Acknowledge::Rrr,
            2 => Acknowledge::Rr73,
            3 => Acknowledge::SeventyThree,
            _ => Acknowledge::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Acknowledge::None => "",
            Acknowledge::Rrr => "RRR",
            Acknowledge::Rr73 => "RR73",
            Acknowledge::SeventyThree => "73",
        }
    }
}

/// RTTY Roundup exchange: a serial number or a state/province
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RttyExchange {
    /// 1..=7999
    Serial(u16),
    /// Abbreviation from the state/province table
    State(&'static str),
}

impl fmt::Display for RttyExchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RttyExchange::Serial(n) => write!(f, "{:04}", n),
            RttyExchange::State(s) => f.write_str(s),
        }
    }
}

/// Parsed message fields, validated and ready to pack
///
/// `Display` renders the canonical text, which is also what `decode` returns.
/// Hashed callsigns are stored without angle brackets; `...` marks a hash that
/// could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageVariant {
    /// i3=1 (or i3=2 with /P): `CALL_TO CALL_DE [EXTRA]`
    ///
    /// `call_to` may be `CQ`, `CQ nnn`, `CQ xxxx`, `DE`, `QRZ`, a standard call with
    /// optional `/R` or `/P`, or a hashed call in angle brackets. `extra` is a grid,
    /// `R grid`, a report (`-14`, `R+05`), `RRR`, `RR73`, `73` or empty.
    Standard {
        call_to: String,
        call_de: String,
        extra: String,
    },

    /// i3=4: one plain non-standard call (up to 11 characters) and one hashed call
    NonStandardCall {
        plain: String,
        hashed: Option<String>,
        plain_first: bool,
        ack: Acknowledge,
        cq: bool,
    },

    /// i3=3: `[TU;] CALL1 CALL2 [R] 5x9 EXCHANGE`
    RttyRoundup {
        tu: bool,
        call1: String,
        call2: String,
        r_flag: bool,
        rst: u16,
        exchange: RttyExchange,
    },

    /// i3=0 n3=1: `CALL1 RR73; CALL2 <HASHED> ±dd`
    Dxpedition {
        call1: String,
        call2: String,
        hashed: String,
        report: i8,
    },

    /// i3=0 n3=3/4: `CALL1 CALL2 [R] nC SECTION`
    FieldDay {
        call1: String,
        call2: String,
        r_flag: bool,
        transmitters: u8,
        class: char,
        section: &'static str,
    },

    /// i3=5: `<CALL1> <CALL2> [R] RRSSSS GRID6`
    Wwrof {
        call1: String,
        call2: String,
        r_flag: bool,
        report: u8,
        serial: u16,
        grid6: String,
    },

    /// i3=0 n3=5: up to 18 hex digits, leading zeros removed
    Telemetry { hex: String },

    /// i3=0 n3=0: up to 13 characters
    FreeText { text: String },
}

impl MessageVariant {
    pub fn message_type(&self) -> MessageType {
        match self {
            MessageVariant::Standard { .. } => MessageType::Standard,
            MessageVariant::NonStandardCall { .. } => MessageType::NonstdCall,
            MessageVariant::RttyRoundup { .. } => MessageType::ArrlRtty,
            MessageVariant::Dxpedition { .. } => MessageType::Dxpedition,
            MessageVariant::FieldDay { .. } => MessageType::ArrlFd,
            MessageVariant::Wwrof { .. } => MessageType::Wwrof,
            MessageVariant::Telemetry { .. } => MessageType::Telemetry,
            MessageVariant::FreeText { .. } => MessageType::FreeText,
        }
    }
}

impl fmt::Display for MessageVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageVariant::Standard { call_to, call_de, extra } => {
                write!(f, "{} {}", call_to, call_de)?;
                if !extra.is_empty() {
                    write!(f, " {}", extra)?;
                }
                Ok(())
            }
            MessageVariant::NonStandardCall { plain, hashed, plain_first, ack, cq } => {
                if *cq {
                    return write!(f, "CQ {}", plain);
                }
                let hashed = format!("<{}>", hashed.as_deref().unwrap_or("..."));
                if *plain_first {
                    write!(f, "{} {}", plain, hashed)?;
                } else {
                    write!(f, "{} {}", hashed, plain)?;
                }
                if *ack != Acknowledge::None {
                    write!(f, " {}", ack.as_str())?;
                }
                Ok(())
            }
            MessageVariant::RttyRoundup { tu, call1, call2, r_flag, rst, exchange } => {
                if *tu {
                    f.write_str("TU; ")?;
                }
                write!(f, "{} {} ", call1, call2)?;
                if *r_flag {
                    f.write_str("R ")?;
                }
                write!(f, "{} {}", rst, exchange)
            }
            MessageVariant::Dxpedition { call1, call2, hashed, report } => {
                write!(f, "{} RR73; {} <{}> {:+03}", call1, call2, hashed, report)
            }
            MessageVariant::FieldDay { call1, call2, r_flag, transmitters, class, section } => {
                write!(f, "{} {} ", call1, call2)?;
                if *r_flag {
                    f.write_str("R ")?;
                }
                write!(f, "{}{} {}", transmitters, class, section)
            }
            MessageVariant::Wwrof { call1, call2, r_flag, report, serial, grid6 } => {
                write!(f, "<{}> <{}> ", call1, call2)?;
                if *r_flag {
                    f.write_str("R ")?;
                }
                write!(f, "{}{:04} {}", report, serial, grid6)
            }
            MessageVariant::Telemetry { hex } => f.write_str(hex),
            MessageVariant::FreeText { text } => f.write_str(text),
        }
    }
}
