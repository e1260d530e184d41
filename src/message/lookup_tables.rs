//! Contest exchange tables: ARRL/RAC sections and RTTY Roundup multipliers

/// ARRL Field Day sections, sent as a 1-based 7-bit index
pub const ARRL_SECTIONS: [&str; 86] = [
    "AB", "AK", "AL", "AR", "AZ", "BC", "CO", "CT", "DE", "EB",      // 1-10
    "EMA", "ENY", "EPA", "EWA", "GA", "GH", "IA", "ID", "IL", "IN",  // 11-20
    "KS", "KY", "LA", "LAX", "NS", "MB", "MDC", "ME", "MI", "MN",    // 21-30
    "MO", "MS", "MT", "NC", "ND", "NE", "NFL", "NH", "NL", "NLI",    // 31-40
    "NM", "NNJ", "NNY", "TER", "NTX", "NV", "OH", "OK", "ONE", "ONN", // 41-50
    "ONS", "OR", "ORG", "PAC", "PR", "QC", "RI", "SB", "SC", "SCV",  // 51-60
    "SD", "SDG", "SF", "SFL", "SJV", "SK", "SNJ", "STX", "SV", "TN",  // 61-70
    "UT", "VA", "VI", "VT", "WCF", "WI", "WMA", "WNY", "WPA", "WTX", // 71-80
    "WV", "WWA", "WY", "DX", "PE", "NB",                              // 81-86
];

/// RTTY Roundup states, provinces and DX multipliers, sent as 8000 + 1-based index
pub const RTTY_STATES: [&str; 171] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA",      // 1-10
    "HI", "ID", "IL", "IN", "IA", "KS", "KY", "LA", "ME", "MD",      // 11-20
    "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",      // 21-30
    "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC",      // 31-40
    "SD", "TN", "TX", "UT", "VT", "VA", "WA", "WV", "WI", "WY",      // 41-50
    "NB", "NS", "QC", "ON", "MB", "SK", "AB", "BC", "NWT", "NF",     // 51-60
    "LB", "NU", "YT", "PEI", "DC", "DR", "FR", "GD", "GR", "OV",     // 61-70
    "ZH", "ZL",                                                        // 71-72
    "X01", "X02", "X03", "X04", "X05", "X06", "X07", "X08", "X09", "X10", // 73-82
    "X11", "X12", "X13", "X14", "X15", "X16", "X17", "X18", "X19", "X20", // 83-92
    "X21", "X22", "X23", "X24", "X25", "X26", "X27", "X28", "X29", "X30", // 93-102
    "X31", "X32", "X33", "X34", "X35", "X36", "X37", "X38", "X39", "X40", // 103-112
    "X41", "X42", "X43", "X44", "X45", "X46", "X47", "X48", "X49", "X50", // 113-122
    "X51", "X52", "X53", "X54", "X55", "X56", "X57", "X58", "X59", "X60", // 123-132
    "X61", "X62", "X63", "X64", "X65", "X66", "X67", "X68", "X69", "X70", // 133-142
    "X71", "X72", "X73", "X74", "X75", "X76", "X77", "X78", "X79", "X80", // 143-152
    "X81", "X82", "X83", "X84", "X85", "X86", "X87", "X88", "X89", "X90", // 153-162
    "X91", "X92", "X93", "X94", "X95", "X96", "X97", "X98", "X99",       // 163-171
];

/// Offset added to a RTTY state index in the 13-bit exchange field
pub const RTTY_STATE_BASE: u16 = 8000;

/// 1-based index of a Field Day section
pub fn section_index(section: &str) -> Option<u8> {
    ARRL_SECTIONS.iter().position(|&s| s == section).map(|i| i as u8 + 1)
}

pub fn section_name(index: u8) -> Option<&'static str> {
    ARRL_SECTIONS.get((index as usize).checked_sub(1)?).copied()
}

/// Exchange field value (8001..=8171) of a RTTY Roundup state or province
pub fn rtty_state_code(state: &str) -> Option<u16> {
    RTTY_STATES
        .iter()
        .position(|&s| s == state)
        .map(|i| RTTY_STATE_BASE + i as u16 + 1)
}

/// Table entry for an exchange field value in 8001..=8171
pub fn rtty_state_name(code: u16) -> Option<&'static str> {
    let index = code.checked_sub(RTTY_STATE_BASE + 1)?;
    RTTY_STATES.get(index as usize).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections() {
        assert_eq!(ARRL_SECTIONS.len(), 86);
        assert_eq!(section_index("AB"), Some(1));
        assert_eq!(section_index("EMA"), Some(11));
        assert_eq!(section_index("NB"), Some(86));
        assert_eq!(section_index("XX"), None);
        assert_eq!(section_name(11), Some("EMA"));
        assert_eq!(section_name(0), None);
        assert_eq!(section_name(87), None);
    }

    #[test]
    fn test_rtty_states() {
        assert_eq!(RTTY_STATES.len(), 171);
        assert_eq!(rtty_state_code("AL"), Some(8001));
        assert_eq!(rtty_state_code("MA"), Some(8021));
        assert_eq!(rtty_state_code("X99"), Some(8171));
        assert_eq!(rtty_state_name(8021), Some("MA"));
        assert_eq!(rtty_state_name(8000), None);
        assert_eq!(rtty_state_name(8172), None);
    }
}
