use bitvec::prelude::*;

use crate::message::error::{MessageError, UnpackSnafu};
use crate::message::grid::unpack_extra;
use crate::message::hash_cache::CallsignHashTable;
use crate::message::types::MessageVariant;

use super::call28;

fn with_suffix(call: String, flag: bool, i3: u8) -> String {
    if !flag || call.starts_with('<') || call == "CQ" || call.starts_with("CQ ") || call == "DE" || call == "QRZ" {
        return call;
    }
    let suffix = if i3 == 2 { "/P" } else { "/R" };
    call + suffix
}

pub(super) fn decode(bits: &BitSlice<u8, Msb0>, i3: u8, table: &mut dyn CallsignHashTable) -> Result<MessageVariant, MessageError> {
    let n28a: u32 = bits[0..28].load_be();
    let ipa = bits[28];
    let n28b: u32 = bits[29..57].load_be();
    let ipb = bits[57];
    let r_flag = bits[58];
    let g15: u16 = bits[59..74].load_be();

    let call_to = with_suffix(call28(n28a, i3, None, table)?, ipa, i3);
    let call_de = with_suffix(call28(n28b, i3, None, table)?, ipb, i3);
    let extra = unpack_extra(r_flag, g15).ok_or_else(|| {
        UnpackSnafu {
            i3,
            n3: None::<u8>,
            reason: format!("invalid grid field {}", g15),
        }
        .build()
    })?;

    Ok(MessageVariant::Standard { call_to, call_de, extra })
}
