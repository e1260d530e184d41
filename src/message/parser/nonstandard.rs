//! Messages with one non-standard callsign (i3=4)
//!
//! ```text
//! CQ PJ4/K1ABC
//! PJ4/K1ABC <W9XYZ>
//! <W9XYZ> PJ4/K1ABC RR73
//! ```

use crate::message::callsign::{is_standard_call, is_valid_nonstandard, strip_brackets};
use crate::message::types::{Acknowledge, MessageVariant};

/// The hashed side: a bracketed call or a bare standard call
fn hashed_side(token: &str) -> Option<String> {
    match strip_brackets(token) {
        Some(inner) if is_valid_nonstandard(inner) || is_standard_call(inner) => Some(inner.to_string()),
        Some(_) => None,
        None if is_standard_call(token) => Some(token.to_string()),
        None => None,
    }
}

fn plain_side(token: &str) -> Option<String> {
    (strip_brackets(token).is_none() && is_valid_nonstandard(token)).then(|| token.to_string())
}

pub(super) fn parse(tokens: &[&str]) -> Option<MessageVariant> {
    if let ["CQ", call] = tokens {
        let plain = plain_side(call)?;
        return Some(MessageVariant::NonStandardCall {
            plain,
            hashed: None,
            plain_first: true,
            ack: Acknowledge::None,
            cq: true,
        });
    }

    let (first, second, ack) = match tokens {
        [a, b] => (*a, *b, Acknowledge::None),
        [a, b, ack] => (*a, *b, Acknowledge::from_token(ack)?),
        _ => return None,
    };

    // prefer the reading where the plain call is the one that does not fit 28 bits
    let candidates = [
        (plain_side(first), hashed_side(second), true),
        (plain_side(second), hashed_side(first), false),
    ];
    let (plain, hashed, plain_first) = candidates
        .into_iter()
        .filter_map(|(p, h, first)| Some((p?, h?, first)))
        .min_by_key(|(p, _, _)| is_standard_call(p))?;

    Some(MessageVariant::NonStandardCall {
        plain,
        hashed: Some(hashed),
        plain_first,
        ack,
        cq: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_then_hashed() {
        let variant = parse(&["PJ4/K1ABC", "<W9XYZ>"]).unwrap();
        assert_eq!(
            variant,
            MessageVariant::NonStandardCall {
                plain: "PJ4/K1ABC".into(),
                hashed: Some("W9XYZ".into()),
                plain_first: true,
                ack: Acknowledge::None,
                cq: false,
            }
        );
    }

    #[test]
    fn test_hashed_then_plain_with_ack() {
        let variant = parse(&["<W9XYZ>", "PJ4/K1ABC", "RR73"]).unwrap();
        assert_eq!(variant.to_string(), "<W9XYZ> PJ4/K1ABC RR73");
    }

    #[test]
    fn test_bare_standard_call_is_hashed() {
        let variant = parse(&["W9XYZ", "PJ4/K1ABC"]).unwrap();
        assert_eq!(variant.to_string(), "<W9XYZ> PJ4/K1ABC");
    }

    #[test]
    fn test_cq_nonstandard() {
        let variant = parse(&["CQ", "KH1/KH7Z"]).unwrap();
        assert_eq!(variant.to_string(), "CQ KH1/KH7Z");
    }

    #[test]
    fn test_rejects() {
        assert_eq!(parse(&["PJ4/K1ABC", "<W9XYZ>", "-10"]), None);
        assert_eq!(parse(&["HELLO", "WORLD"]), None);
        assert_eq!(parse(&["PJ4/K1ABC", "KH1/KH7Z"]), None);
        assert_eq!(parse(&["CQ", "<PJ4/K1ABC>"]), None);
    }
}
