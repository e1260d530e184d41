//! WWROF contest exchanges (i3=5): `<CALL1> <CALL2> [R] 5dNNNN GRID6`

use crate::message::callsign::{is_standard_call, is_valid_nonstandard};
use crate::message::grid::is_grid6;
use crate::message::types::MessageVariant;

use super::unbracket;

/// Largest serial number that fits the 11-bit field
pub(crate) const WWROF_MAX_SERIAL: u16 = 2047;

/// Parse `5dNNNN`: report 52..=59 and a serial number
fn parse_exchange(token: &str) -> Option<(u8, u16)> {
    let b = token.as_bytes();
    if b.len() != 6 || b[0] != b'5' || !(b'2'..=b'9').contains(&b[1]) {
        return None;
    }
    if !b[2..].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let serial: u16 = token[2..].parse().ok()?;
    (serial <= WWROF_MAX_SERIAL).then_some((50 + b[1] - b'0', serial))
}

fn call(token: &str) -> Option<String> {
    let inner = unbracket(token);
    (is_valid_nonstandard(inner) || is_standard_call(inner)).then(|| inner.to_string())
}

pub(super) fn parse(tokens: &[&str]) -> Option<MessageVariant> {
    let (call1, call2, r_flag, exchange, grid6) = match tokens {
        [c1, c2, "R", ex, grid] => (*c1, *c2, true, *ex, *grid),
        [c1, c2, ex, grid] => (*c1, *c2, false, *ex, *grid),
        _ => return None,
    };
    let (report, serial) = parse_exchange(exchange)?;
    if !is_grid6(grid6) {
        return None;
    }

    Some(MessageVariant::Wwrof {
        call1: call(call1)?,
        call2: call(call2)?,
        r_flag,
        report,
        serial,
        grid6: grid6.to_string(),
    })
}
