use bitvec::prelude::*;

use crate::message::callsign::save_callsign;
use crate::message::error::{MessageError, UnpackSnafu};
use crate::message::hash_cache::{CallsignHashTable, HashKind};
use crate::message::text_encoding::unpack_n58;
use crate::message::types::{Acknowledge, MessageVariant};

pub(super) fn decode(bits: &BitSlice<u8, Msb0>, table: &mut dyn CallsignHashTable) -> Result<MessageVariant, MessageError> {
    let n12: u32 = bits[0..12].load_be();
    let n58: u64 = bits[12..70].load_be();
    let plain_first = bits[70];
    let nrpt: u8 = bits[71..73].load_be();
    let cq = bits[73];

    let plain = unpack_n58(n58).ok_or_else(|| {
        UnpackSnafu {
            i3: 4u8,
            n3: None::<u8>,
            reason: "invalid non-standard callsign",
        }
        .build()
    })?;
    save_callsign(table, &plain);

    if cq {
        return Ok(MessageVariant::NonStandardCall {
            plain,
            hashed: None,
            plain_first: true,
            ack: Acknowledge::None,
            cq: true,
        });
    }

    Ok(MessageVariant::NonStandardCall {
        plain,
        hashed: table.lookup_hash(HashKind::Bits12, n12),
        plain_first,
        ack: Acknowledge::from_code(nrpt),
        cq: false,
    })
}
