use snafu::prelude::*;

/// Reasons a text cannot be packed, or a payload cannot be unpacked
#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
pub enum MessageError {
    /// First callsign (or CQ/DE/QRZ token) cannot be packed
    #[snafu(display("invalid first callsign '{callsign}'"))]
    Callsign1 { callsign: String },

    /// Second callsign cannot be packed
    #[snafu(display("invalid second callsign '{callsign}'"))]
    Callsign2 { callsign: String },

    /// A message may not mix /R and /P
    #[snafu(display("callsign suffixes /R and /P cannot be combined"))]
    Suffix,

    /// Grid, report or acknowledgement not recognised
    #[snafu(display("invalid grid or report '{extra}'"))]
    Grid { extra: String },

    /// Text does not match any supported message type
    #[snafu(display("'{text}' does not match any message type"))]
    Type { text: String },

    /// Payload uses a reserved type or carries out-of-range fields
    ///
    /// `n3` is only present for i3=0, the one type with a subtype field.
    #[snafu(display("cannot unpack {}: {}", type_code(*i3, *n3), reason))]
    Unpack { i3: u8, n3: Option<u8>, reason: String },
}

fn type_code(i3: u8, n3: Option<u8>) -> String {
    match n3 {
        Some(n3) => format!("i3={} n3={}", i3, n3),
        None => format!("i3={}", i3),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpack_display_omits_missing_subtype() {
        let err = MessageError::Unpack { i3: 1, n3: None, reason: "bad grid".to_string() };
        assert_eq!(err.to_string(), "cannot unpack i3=1: bad grid");
        let err = MessageError::Unpack { i3: 0, n3: Some(2), reason: "reserved".to_string() };
        assert_eq!(err.to_string(), "cannot unpack i3=0 n3=2: reserved");
    }
}
