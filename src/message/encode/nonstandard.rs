//! i3=4: one callsign of up to 11 characters sent in full
//!
//! ```text
//! h12 c58 iflip1 nrpt2 icq1 i3
//! ```
//!
//! `iflip` set means the full callsign comes first.

use bitvec::prelude::*;

use crate::message::callsign::{ihashcall, save_callsign};
use crate::message::error::{Callsign1Snafu, Callsign2Snafu, MessageError, TypeSnafu};
use crate::message::hash_cache::CallsignHashTable;
use crate::message::text_encoding::pack_n58;
use crate::message::types::MessageVariant;

pub(super) fn encode(
    variant: &MessageVariant,
    output: &mut BitSlice<u8, Msb0>,
    table: &mut dyn CallsignHashTable,
) -> Result<(), MessageError> {
    let MessageVariant::NonStandardCall { plain, hashed, plain_first, ack, cq } = variant else {
        return TypeSnafu { text: variant.to_string() }.fail();
    };

    let n58 = pack_n58(plain).ok_or_else(|| Callsign1Snafu { callsign: plain.as_str() }.build())?;
    save_callsign(table, plain);

    let n12 = match (cq, hashed) {
        (true, _) => 0,
        (false, Some(call)) => {
            let n12 = ihashcall(call, 12).ok_or_else(|| Callsign2Snafu { callsign: call.as_str() }.build())?;
            save_callsign(table, call);
            n12
        }
        (false, None) => return Callsign2Snafu { callsign: "<...>" }.fail(),
    };

    output[0..12].store_be(n12);
    output[12..70].store_be(n58);
    output.set(70, *plain_first);
    output[71..73].store_be(if *cq { 0 } else { ack.code() });
    output.set(73, *cq);
    output[74..77].store_be(4u8);
    Ok(())
}
