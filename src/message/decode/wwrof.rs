use bitvec::prelude::*;

use crate::message::error::{MessageError, UnpackSnafu};
use crate::message::grid::unpack_grid6;
use crate::message::hash_cache::{CallsignHashTable, HashKind};
use crate::message::types::MessageVariant;

use super::hashed_call;

pub(super) fn decode(bits: &BitSlice<u8, Msb0>, table: &mut dyn CallsignHashTable) -> Result<MessageVariant, MessageError> {
    let h12: u32 = bits[0..12].load_be();
    let h22: u32 = bits[12..34].load_be();
    let r_flag = bits[34];
    let r3: u8 = bits[35..38].load_be();
    let serial: u16 = bits[38..49].load_be();
    let g25: u32 = bits[49..74].load_be();

    let grid6 = unpack_grid6(g25).ok_or_else(|| {
        UnpackSnafu {
            i3: 5u8,
            n3: None::<u8>,
            reason: format!("invalid locator field {}", g25),
        }
        .build()
    })?;

    Ok(MessageVariant::Wwrof {
        call1: hashed_call(table, HashKind::Bits12, h12),
        call2: hashed_call(table, HashKind::Bits22, h22),
        r_flag,
        report: 52 + r3,
        serial,
        grid6,
    })
}
