//! ARRL RTTY Roundup exchanges (i3=3): `[TU;] CALL1 CALL2 [R] 5x9 EXCHANGE`

use crate::message::lookup_tables::rtty_state_code;
use crate::message::lookup_tables::rtty_state_name;
use crate::message::types::{MessageVariant, RttyExchange};

use super::is_call_token;

/// Parse an RST of the form `5d9` with d in 2..=9
pub(super) fn parse_rst(token: &str) -> Option<u16> {
    match token.as_bytes() {
        [b'5', d @ b'2'..=b'9', b'9'] => Some(500 + (d - b'0') as u16 * 10 + 9),
        _ => None,
    }
}

fn parse_exchange(token: &str) -> Option<RttyExchange> {
    if !token.is_empty() && token.len() <= 4 && token.bytes().all(|c| c.is_ascii_digit()) {
        let serial: u16 = token.parse().ok()?;
        return (1..=7999).contains(&serial).then_some(RttyExchange::Serial(serial));
    }
    let code = rtty_state_code(token)?;
    rtty_state_name(code).map(RttyExchange::State)
}

pub(super) fn parse(tokens: &[&str]) -> Option<MessageVariant> {
    let (tu, rest) = match tokens.split_first() {
        Some((&"TU;", rest)) => (true, rest),
        _ => (false, tokens),
    };
    let (call1, call2, r_flag, rst, exchange) = match rest {
        [c1, c2, "R", rst, ex] => (*c1, *c2, true, *rst, *ex),
        [c1, c2, rst, ex] => (*c1, *c2, false, *rst, *ex),
        _ => return None,
    };
    if !is_call_token(call1) || !is_call_token(call2) {
        return None;
    }

    Some(MessageVariant::RttyRoundup {
        tu,
        call1: call1.to_string(),
        call2: call2.to_string(),
        r_flag,
        rst: parse_rst(rst)?,
        exchange: parse_exchange(exchange)?,
    })
}
