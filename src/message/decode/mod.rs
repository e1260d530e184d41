//! 77-bit [`Payload`] to [`MessageVariant`]
//!
//! Dispatches on i3 (and n3 for i3=0). Decoded standard callsigns are saved in
//! the hash table; hashed references that the table cannot resolve come back
//! as `...` and render as `<...>`.

mod nonstandard;
mod rtty;
mod standard;
mod type0;
mod wwrof;

use tracing::debug;

use crate::message::callsign::unpack28;
use crate::message::error::{MessageError, UnpackSnafu};
use crate::message::hash_cache::{CallsignHashTable, HashKind};
use crate::message::payload::Payload;
use crate::message::types::MessageVariant;

/// Unpack a payload into its typed fields
pub fn decode_variant(payload: &Payload, table: &mut dyn CallsignHashTable) -> Result<MessageVariant, MessageError> {
    let (i3, n3) = (payload.i3(), payload.n3());
    let bits = payload.bits();
    let result = match (i3, n3) {
        (0, 0) => type0::decode_free_text(bits),
        (0, 1) => type0::decode_dxpedition(bits, table),
        (0, 3) | (0, 4) => type0::decode_field_day(bits, n3, table),
        (0, 5) => Ok(type0::decode_telemetry(bits)),
        (1, _) | (2, _) => standard::decode(bits, i3, table),
        (3, _) => rtty::decode(bits, table),
        (4, _) => nonstandard::decode(bits, table),
        (5, _) => wwrof::decode(bits, table),
        _ => UnpackSnafu { i3, n3: payload.subtype(), reason: "reserved message type" }.fail(),
    };
    if let Err(err) = &result {
        debug!(%payload, %err, "payload did not unpack");
    }
    result
}

/// Unpack an n28 field or fail with the payload's type codes
fn call28(n28: u32, i3: u8, n3: Option<u8>, table: &mut dyn CallsignHashTable) -> Result<String, MessageError> {
    unpack28(n28, table).ok_or_else(|| {
        UnpackSnafu {
            i3,
            n3,
            reason: format!("invalid callsign field {}", n28),
        }
        .build()
    })
}

/// Resolve a hash, falling back to `...`
fn hashed_call(table: &dyn CallsignHashTable, kind: HashKind, hash: u32) -> String {
    table.lookup_hash(kind, hash).unwrap_or_else(|| "...".to_string())
}
