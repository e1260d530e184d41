//! ARRL Field Day exchanges (0.3 and 0.4): `CALL1 CALL2 [R] nC SECTION`

use crate::message::lookup_tables::{section_index, section_name};
use crate::message::types::MessageVariant;

use super::is_call_token;

/// Parse `nC` with n in 1..=32 transmitters and class A..=F
pub(super) fn parse_class(token: &str) -> Option<(u8, char)> {
    if !token.is_ascii() {
        return None;
    }
    let (count, class) = token.split_at(token.len().checked_sub(1)?);
    let class = class.chars().next()?;
    if !('A'..='F').contains(&class) || count.is_empty() || count.len() > 2 {
        return None;
    }
    if !count.bytes().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let n: u8 = count.parse().ok()?;
    (1..=32).contains(&n).then_some((n, class))
}

pub(super) fn parse(tokens: &[&str]) -> Option<MessageVariant> {
    let (call1, call2, r_flag, class, section) = match tokens {
        [c1, c2, "R", class, section] => (*c1, *c2, true, *class, *section),
        [c1, c2, class, section] => (*c1, *c2, false, *class, *section),
        _ => return None,
    };
    if !is_call_token(call1) || !is_call_token(call2) {
        return None;
    }
    let (transmitters, class) = parse_class(class)?;
    let section = section_name(section_index(section)?)?;

    Some(MessageVariant::FieldDay {
        call1: call1.to_string(),
        call2: call2.to_string(),
        r_flag,
        transmitters,
        class,
        section,
    })
}
