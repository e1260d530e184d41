//! Text to [`MessageVariant`] classification
//!
//! Parsing is a syntactic cascade over the normalised text. The first message
//! type whose grammar accepts the tokens wins:
//!
//! 1. standard (i3=1/2)
//! 2. non-standard callsign (i3=4)
//! 3. RTTY Roundup (i3=3)
//! 4. DXpedition (0.1)
//! 5. Field Day (0.3/0.4)
//! 6. WWROF contest (i3=5)
//! 7. telemetry (0.5)
//! 8. free text (0.0)

mod dxpedition;
mod field_day;
mod nonstandard;
mod rtty;
mod standard;
mod wwrof;

use tracing::trace;

use crate::message::callsign::{pack28, strip_brackets};
use crate::message::constants::MAX_TELEMETRY_DIGITS;
use crate::message::error::{MessageError, TypeSnafu};
use crate::message::text_encoding::{pack_free_text, pack_telemetry};
use crate::message::types::MessageVariant;

pub(crate) use standard::standard_fields;

/// Upper-case, collapse runs of whitespace and fold a leading `CQ CQ` into `CQ`
///
/// # Example
/// ```
/// use rustyftx::message::parser::normalize;
///
/// assert_eq!(normalize("  cq   cq k1abc  fn42 "), "CQ K1ABC FN42");
/// ```
pub fn normalize(text: &str) -> String {
    let mut tokens: Vec<String> = text.split_whitespace().map(|t| t.to_ascii_uppercase()).collect();
    while tokens.len() > 2 && tokens[0] == "CQ" && tokens[1] == "CQ" {
        tokens.remove(0);
    }
    tokens.join(" ")
}

/// Classify and validate a message text
pub fn parse(text: &str) -> Result<MessageVariant, MessageError> {
    let normalized = normalize(text);
    let tokens: Vec<&str> = normalized.split(' ').filter(|t| !t.is_empty()).collect();

    let standard = standard_fields(&tokens);
    if let Ok(variant) = standard {
        return Ok(variant);
    }

    let structured = nonstandard::parse(&tokens)
        .or_else(|| rtty::parse(&tokens))
        .or_else(|| dxpedition::parse(&tokens))
        .or_else(|| field_day::parse(&tokens))
        .or_else(|| wwrof::parse(&tokens))
        .or_else(|| parse_telemetry(&tokens))
        .or_else(|| parse_free_text(&normalized));
    if let Some(variant) = structured {
        trace!(text = %normalized, kind = %variant.message_type(), "classified message");
        return Ok(variant);
    }

    match (standard, tokens.len()) {
        (Err(err), 2..=4) => Err(err),
        _ => TypeSnafu { text: normalized }.fail(),
    }
}

fn parse_telemetry(tokens: &[&str]) -> Option<MessageVariant> {
    match tokens {
        [hex] if hex.len() <= MAX_TELEMETRY_DIGITS => {
            let value = pack_telemetry(hex)?;
            Some(MessageVariant::Telemetry {
                hex: crate::message::text_encoding::unpack_telemetry(value),
            })
        }
        _ => None,
    }
}

fn parse_free_text(text: &str) -> Option<MessageVariant> {
    if text.is_empty() {
        return None;
    }
    pack_free_text(text)?;
    Some(MessageVariant::FreeText { text: text.to_string() })
}

/// A single-word callsign field that packs into n28: a standard call or `<CALL>`
pub(super) fn is_call_token(token: &str) -> bool {
    !matches!(token, "DE" | "QRZ" | "CQ") && pack28(token).is_some()
}

/// Inner text of a bracketed callsign, or the token itself
pub(super) fn unbracket(token: &str) -> &str {
    strip_brackets(token).unwrap_or(token)
}
