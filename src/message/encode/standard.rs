//! i3=1 (standard, /R) and i3=2 (EU VHF, /P)
//!
//! ```text
//! c28 r1 c28 r1 R1 g15 i3
//! ```

use bitvec::prelude::*;

use crate::message::callsign::Suffix;
use crate::message::error::{Callsign1Snafu, Callsign2Snafu, GridSnafu, MessageError, SuffixSnafu, TypeSnafu};
use crate::message::grid::pack_extra;
use crate::message::hash_cache::CallsignHashTable;
use crate::message::types::MessageVariant;

use super::pack_call;

pub(super) fn encode(
    variant: &MessageVariant,
    output: &mut BitSlice<u8, Msb0>,
    table: &mut dyn CallsignHashTable,
) -> Result<(), MessageError> {
    let MessageVariant::Standard { call_to, call_de, extra } = variant else {
        return TypeSnafu { text: variant.to_string() }.fail();
    };

    let (n28a, suffix_a) = pack_call(call_to, table).ok_or_else(|| Callsign1Snafu { callsign: call_to.as_str() }.build())?;
    let (n28b, suffix_b) = pack_call(call_de, table).ok_or_else(|| Callsign2Snafu { callsign: call_de.as_str() }.build())?;
    let (r_flag, g15) = pack_extra(extra).ok_or_else(|| GridSnafu { extra: extra.as_str() }.build())?;

    let i3: u8 = match (suffix_a, suffix_b) {
        (Suffix::Rover, Suffix::Portable) | (Suffix::Portable, Suffix::Rover) => return SuffixSnafu.fail(),
        (Suffix::Portable, _) | (_, Suffix::Portable) => 2,
        _ => 1,
    };

    output[0..28].store_be(n28a);
    output.set(28, suffix_a != Suffix::None);
    output[29..57].store_be(n28b);
    output.set(57, suffix_b != Suffix::None);
    output.set(58, r_flag);
    output[59..74].store_be(g15);
    output[74..77].store_be(i3);
    Ok(())
}
