//! [`MessageVariant`] to 77-bit [`Payload`]
//!
//! Every callsign packed in full or by hash is saved into the hash table so
//! that later hashed references to it can be resolved.

mod nonstandard;
mod rtty;
mod standard;
mod type0;
mod wwrof;

use crate::message::callsign::{pack28, save_callsign, split_suffix, strip_brackets, Suffix};
use crate::message::error::{Callsign1Snafu, MessageError};
use crate::message::hash_cache::CallsignHashTable;
use crate::message::payload::Payload;
use crate::message::types::MessageVariant;

/// Pack a parsed message
pub fn encode_variant(variant: &MessageVariant, table: &mut dyn CallsignHashTable) -> Result<Payload, MessageError> {
    let mut payload = Payload::default();
    let bits = payload.bits_mut();
    match variant {
        MessageVariant::Standard { .. } => standard::encode(variant, bits, table)?,
        MessageVariant::NonStandardCall { .. } => nonstandard::encode(variant, bits, table)?,
        MessageVariant::RttyRoundup { .. } => rtty::encode(variant, bits, table)?,
        MessageVariant::Dxpedition { .. } => type0::encode_dxpedition(variant, bits, table)?,
        MessageVariant::FieldDay { .. } => type0::encode_field_day(variant, bits, table)?,
        MessageVariant::Wwrof { .. } => wwrof::encode(variant, bits, table)?,
        MessageVariant::Telemetry { .. } => type0::encode_telemetry(variant, bits)?,
        MessageVariant::FreeText { .. } => type0::encode_free_text(variant, bits)?,
    }
    Ok(payload)
}

/// Pack a single-word callsign field to n28, saving the call it names
///
/// Returns the n28 value and the suffix that was stripped.
fn pack_call(token: &str, table: &mut dyn CallsignHashTable) -> Option<(u32, Suffix)> {
    if let Some(inner) = strip_brackets(token) {
        let n28 = pack28(token)?;
        save_callsign(table, inner);
        return Some((n28, Suffix::None));
    }
    if matches!(token, "DE" | "QRZ" | "CQ") || token.starts_with("CQ ") {
        return pack28(token).map(|n| (n, Suffix::None));
    }
    let (base, suffix) = split_suffix(token);
    let n28 = pack28(base)?;
    save_callsign(table, base);
    Some((n28, suffix))
}

/// Like [`pack_call`] for fields that cannot carry a suffix
fn pack_plain_call(token: &str, table: &mut dyn CallsignHashTable) -> Result<u32, MessageError> {
    match pack_call(token, table) {
        Some((n28, Suffix::None)) => Ok(n28),
        _ => Callsign1Snafu { callsign: token }.fail(),
    }
}
