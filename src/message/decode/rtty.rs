use bitvec::prelude::*;

use crate::message::error::{MessageError, UnpackSnafu};
use crate::message::hash_cache::CallsignHashTable;
use crate::message::lookup_tables::rtty_state_name;
use crate::message::types::{MessageVariant, RttyExchange};

use super::call28;

pub(super) fn decode(bits: &BitSlice<u8, Msb0>, table: &mut dyn CallsignHashTable) -> Result<MessageVariant, MessageError> {
    let tu = bits[0];
    let n28a: u32 = bits[1..29].load_be();
    let n28b: u32 = bits[29..57].load_be();
    let r_flag = bits[57];
    let r3: u16 = bits[58..61].load_be();
    let s13: u16 = bits[61..74].load_be();

    let exchange = match s13 {
        1..=7999 => RttyExchange::Serial(s13),
        _ => rtty_state_name(s13).map(RttyExchange::State).ok_or_else(|| {
            UnpackSnafu {
                i3: 3u8,
                n3: None::<u8>,
                reason: format!("invalid exchange {}", s13),
            }
            .build()
        })?,
    };

    Ok(MessageVariant::RttyRoundup {
        tu,
        call1: call28(n28a, 3, None, table)?,
        call2: call28(n28b, 3, None, table)?,
        r_flag,
        rst: 529 + 10 * r3,
        exchange,
    })
}
