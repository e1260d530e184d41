//! DXpedition (Fox/Hound) messages (0.1): `CALL1 RR73; CALL2 <CALL3> ±dd`

use crate::message::callsign::{is_standard_call, is_valid_nonstandard, strip_brackets};
use crate::message::grid::parse_report;
use crate::message::types::MessageVariant;

/// Reports are sent as `(dB + 30) / 2` in 5 bits
pub(crate) const DXPEDITION_REPORT_MIN: i32 = -30;
pub(crate) const DXPEDITION_REPORT_MAX: i32 = 32;

pub(super) fn parse(tokens: &[&str]) -> Option<MessageVariant> {
    let [call1, "RR73;", call2, hashed, report] = tokens else {
        return None;
    };
    if !is_standard_call(call1) || !is_standard_call(call2) {
        return None;
    }
    let hashed = strip_brackets(hashed)?;
    if !is_valid_nonstandard(hashed) && !is_standard_call(hashed) {
        return None;
    }
    let report = parse_report(report)?;
    if !(DXPEDITION_REPORT_MIN..=DXPEDITION_REPORT_MAX).contains(&report) {
        return None;
    }

    Some(MessageVariant::Dxpedition {
        call1: call1.to_string(),
        call2: call2.to_string(),
        hashed: hashed.to_string(),
        report: report as i8,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let variant = parse(&["K1ABC", "RR73;", "W9XYZ", "<KH1/KH7Z>", "-08"]).unwrap();
        assert_eq!(variant.to_string(), "K1ABC RR73; W9XYZ <KH1/KH7Z> -08");
    }

    #[test]
    fn test_rejects() {
        assert_eq!(parse(&["K1ABC", "RR73", "W9XYZ", "<KH1/KH7Z>", "-08"]), None);
        assert_eq!(parse(&["K1ABC", "RR73;", "W9XYZ", "KH1/KH7Z", "-08"]), None);
        assert_eq!(parse(&["K1ABC", "RR73;", "W9XYZ", "<KH1/KH7Z>", "-40"]), None);
    }
}
