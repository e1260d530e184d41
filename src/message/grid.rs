//! Grid locator and signal report fields
//!
//! The 15-bit `g15` field of standard messages carries either a 4-character
//! Maidenhead locator (0..32400) or one of the codes above `MAXGRID4`:
//!
//! ```text
//! MAXGRID4 + 1  blank        MAXGRID4 + 3  RR73
//! MAXGRID4 + 2  RRR          MAXGRID4 + 4  73
//! MAXGRID4 + 35 + dB         signal report, -50..=+49 (with -50..-31 folded up by 101)
//! ```
//!
//! A separate `R` bit next to the field marks a roger.

use crate::message::constants::{GRID_73, GRID_BLANK, GRID_RR73, GRID_RRR, MAXGRID4};

fn is_grid4(grid: &[u8]) -> bool {
    grid.len() == 4
        && (b'A'..=b'R').contains(&grid[0])
        && (b'A'..=b'R').contains(&grid[1])
        && grid[2].is_ascii_digit()
        && grid[3].is_ascii_digit()
}

/// True for a 4-character locator `AA00`..`RR99`
pub fn is_grid(token: &str) -> bool {
    is_grid4(token.as_bytes())
}

/// True for a 6-character locator `AA00AA`..`RR99XX`
pub fn is_grid6(token: &str) -> bool {
    let b = token.as_bytes();
    b.len() == 6 && is_grid4(&b[..4]) && (b'A'..=b'X').contains(&b[4]) && (b'A'..=b'X').contains(&b[5])
}

/// Pack a 4-character locator into 0..32400
///
/// # Example
/// ```
/// use rustyftx::message::grid::pack_grid4;
///
/// assert_eq!(pack_grid4("AA00"), Some(0));
/// assert_eq!(pack_grid4("RR99"), Some(32399));
/// assert_eq!(pack_grid4("SS00"), None);
/// ```
pub fn pack_grid4(grid: &str) -> Option<u16> {
    let b = grid.as_bytes();
    if !is_grid4(b) {
        return None;
    }
    let v = (b[0] - b'A') as u16 * 18 * 10 * 10
        + (b[1] - b'A') as u16 * 10 * 10
        + (b[2] - b'0') as u16 * 10
        + (b[3] - b'0') as u16;
    Some(v)
}

/// Reverse of [`pack_grid4`]; `value` must be below `MAXGRID4`
pub fn unpack_grid4(value: u16) -> String {
    let mut n = value;
    let d4 = (n % 10) as u8;
    n /= 10;
    let d3 = (n % 10) as u8;
    n /= 10;
    let c2 = (n % 18) as u8;
    n /= 18;
    let c1 = n as u8;
    let chars = [b'A' + c1, b'A' + c2, b'0' + d3, b'0' + d4];
    String::from_utf8_lossy(&chars).into_owned()
}

/// Parse a signal report like `-14`, `+05`, `-5`
pub fn parse_report(token: &str) -> Option<i32> {
    let digits = token.strip_prefix('+').or_else(|| token.strip_prefix('-'))?;
    if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let value: i32 = token.parse().ok()?;
    (-50..=49).contains(&value).then_some(value)
}

/// Render a report the way WSJT-X prints it (`+05`, `-14`)
pub fn format_report(db: i32) -> String {
    format!("{:+03}", db)
}

/// Encode a signal report into g15
pub fn pack_report(db: i32) -> Option<u16> {
    if !(-50..=49).contains(&db) {
        return None;
    }
    let folded = if db <= -31 { db + 101 } else { db };
    Some(MAXGRID4 + (folded + 35) as u16)
}

/// Encode the text after the two callsigns of a standard message
///
/// Returns the R bit and the 15-bit field. Accepts an empty string, `RRR`,
/// `RR73`, `73`, a locator, `R` followed by a locator, or a report with an
/// optional `R` prefix.
pub fn pack_extra(extra: &str) -> Option<(bool, u16)> {
    match extra {
        "" => return Some((false, GRID_BLANK)),
        "RRR" => return Some((false, GRID_RRR)),
        // RR73 is also a valid locator in the Arctic Ocean; it is never sent as one
        "RR73" => return Some((false, GRID_RR73)),
        "73" => return Some((false, GRID_73)),
        _ => {}
    }

    if let Some(grid) = extra.strip_prefix("R ") {
        return pack_grid4(grid).map(|g| (true, g));
    }
    if let Some(g) = pack_grid4(extra) {
        return Some((false, g));
    }

    let (r_flag, report) = match extra.strip_prefix('R') {
        Some(rest) => (true, rest),
        None => (false, extra),
    };
    let db = parse_report(report)?;
    Some((r_flag, pack_report(db)?))
}

/// Decode a g15 field and its R bit back to text
///
/// Returns `None` for the unused value 32400.
pub fn unpack_extra(r_flag: bool, g15: u16) -> Option<String> {
    if g15 < MAXGRID4 {
        let grid = unpack_grid4(g15);
        return Some(if r_flag { format!("R {}", grid) } else { grid });
    }
    let text = match g15 {
        GRID_BLANK => String::new(),
        GRID_RRR => "RRR".to_string(),
        GRID_RR73 => "RR73".to_string(),
        GRID_73 => "73".to_string(),
        MAXGRID4 => return None,
        _ => {
            let mut db = g15 as i32 - MAXGRID4 as i32 - 35;
            if (51..=70).contains(&db) {
                db -= 101;
            }
            let report = format_report(db);
            return Some(if r_flag { format!("R{}", report) } else { report });
        }
    };
    Some(text)
}

/// Pack a 6-character locator into 25 bits
pub fn pack_grid6(grid: &str) -> Option<u32> {
    if !is_grid6(grid) {
        return None;
    }
    let b = grid.as_bytes();
    let mut n = (b[0] - b'A') as u32;
    n = n * 18 + (b[1] - b'A') as u32;
    n = n * 10 + (b[2] - b'0') as u32;
    n = n * 10 + (b[3] - b'0') as u32;
    n = n * 24 + (b[4] - b'A') as u32;
    n = n * 24 + (b[5] - b'A') as u32;
    Some(n)
}

/// Reverse of [`pack_grid6`]
pub fn unpack_grid6(mut n: u32) -> Option<String> {
    let c6 = (n % 24) as u8;
    n /= 24;
    let c5 = (n % 24) as u8;
    n /= 24;
    let d4 = (n % 10) as u8;
    n /= 10;
    let d3 = (n % 10) as u8;
    n /= 10;
    let c2 = (n % 18) as u8;
    n /= 18;
    if n >= 18 {
        return None;
    }
    let chars = [b'A' + n as u8, b'A' + c2, b'0' + d3, b'0' + d4, b'A' + c5, b'A' + c6];
    Some(String::from_utf8_lossy(&chars).into_owned())
}
