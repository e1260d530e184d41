//! `CALL_TO CALL_DE [EXTRA]` messages (i3=1 and i3=2)

use crate::message::callsign::{pack28, split_suffix, strip_brackets, Suffix};
use crate::message::error::{Callsign1Snafu, Callsign2Snafu, GridSnafu, MessageError, SuffixSnafu};
use crate::message::grid::pack_extra;
use crate::message::types::MessageVariant;

/// True for the second word of `CQ nnn` or `CQ abcd`
fn is_cq_modifier(token: &str) -> bool {
    let b = token.as_bytes();
    (b.len() == 3 && b.iter().all(u8::is_ascii_digit))
        || ((1..=4).contains(&b.len()) && b.iter().all(u8::is_ascii_uppercase))
}

fn valid_call_to(token: &str) -> bool {
    if matches!(token, "DE" | "QRZ" | "CQ") || token.starts_with("CQ ") {
        return pack28(token).is_some();
    }
    valid_call_de(token)
}

fn valid_call_de(token: &str) -> bool {
    if strip_brackets(token).is_some() {
        return pack28(token).is_some();
    }
    let (base, _) = split_suffix(token);
    !matches!(base, "DE" | "QRZ" | "CQ") && pack28(base).is_some()
}

/// Parse the tokens of a standard message
///
/// Returns the error of the first field that failed, which the message
/// cascade reports if no other type accepts the text.
pub(crate) fn standard_fields(tokens: &[&str]) -> Result<MessageVariant, MessageError> {
    let text = tokens.join(" ");
    if tokens.len() < 2 {
        return Callsign1Snafu { callsign: text }.fail();
    }

    let (call_to, rest) = if tokens[0] == "CQ" && tokens.len() >= 3 && is_cq_modifier(tokens[1]) {
        (format!("CQ {}", tokens[1]), &tokens[2..])
    } else {
        (tokens[0].to_string(), &tokens[1..])
    };

    if !valid_call_to(&call_to) {
        return Callsign1Snafu { callsign: call_to }.fail();
    }
    let call_de = rest[0];
    if !valid_call_de(call_de) {
        return Callsign2Snafu { callsign: call_de }.fail();
    }

    let suffixes = [split_suffix(&call_to).1, split_suffix(call_de).1];
    if suffixes.contains(&Suffix::Rover) && suffixes.contains(&Suffix::Portable) {
        return SuffixSnafu.fail();
    }

    let extra = rest[1..].join(" ");
    let extra_ok = rest.len() <= 3 && pack_extra(&extra).is_some();
    if !extra_ok {
        return GridSnafu { extra }.fail();
    }

    Ok(MessageVariant::Standard {
        call_to,
        call_de: call_de.to_string(),
        extra,
    })
}
