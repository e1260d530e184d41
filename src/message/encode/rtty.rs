//! i3=3: ARRL RTTY Roundup
//!
//! ```text
//! tu1 c28 c28 R1 r3 s13 i3
//! ```

use bitvec::prelude::*;

use crate::message::error::{MessageError, TypeSnafu};
use crate::message::hash_cache::CallsignHashTable;
use crate::message::lookup_tables::rtty_state_code;
use crate::message::types::{MessageVariant, RttyExchange};

use super::pack_plain_call;

pub(super) fn encode(
    variant: &MessageVariant,
    output: &mut BitSlice<u8, Msb0>,
    table: &mut dyn CallsignHashTable,
) -> Result<(), MessageError> {
    let MessageVariant::RttyRoundup { tu, call1, call2, r_flag, rst, exchange } = variant else {
        return TypeSnafu { text: variant.to_string() }.fail();
    };

    let n28a = pack_plain_call(call1, table)?;
    let n28b = pack_plain_call(call2, table)?;
    let r3 = (rst.saturating_sub(529) / 10) as u8;
    let s13 = match exchange {
        RttyExchange::Serial(n) => *n,
        RttyExchange::State(state) => {
            rtty_state_code(state).ok_or_else(|| TypeSnafu { text: variant.to_string() }.build())?
        }
    };

    output.set(0, *tu);
    output[1..29].store_be(n28a);
    output[29..57].store_be(n28b);
    output.set(57, *r_flag);
    output[58..61].store_be(r3 & 0b111);
    output[61..74].store_be(s13);
    output[74..77].store_be(3u8);
    Ok(())
}
