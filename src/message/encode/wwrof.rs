//! i3=5: WWROF contest exchange with hashed calls and a 6-character locator
//!
//! ```text
//! h12 h22 R1 r3 s11 g25 i3
//! ```

use bitvec::prelude::*;

use crate::message::callsign::{ihashcall, save_callsign};
use crate::message::error::{Callsign1Snafu, Callsign2Snafu, GridSnafu, MessageError, TypeSnafu};
use crate::message::grid::pack_grid6;
use crate::message::hash_cache::CallsignHashTable;
use crate::message::types::MessageVariant;

pub(super) fn encode(
    variant: &MessageVariant,
    output: &mut BitSlice<u8, Msb0>,
    table: &mut dyn CallsignHashTable,
) -> Result<(), MessageError> {
    let MessageVariant::Wwrof { call1, call2, r_flag, report, serial, grid6 } = variant else {
        return TypeSnafu { text: variant.to_string() }.fail();
    };

    let h12 = ihashcall(call1, 12).ok_or_else(|| Callsign1Snafu { callsign: call1.as_str() }.build())?;
    let h22 = ihashcall(call2, 22).ok_or_else(|| Callsign2Snafu { callsign: call2.as_str() }.build())?;
    let g25 = pack_grid6(grid6).ok_or_else(|| GridSnafu { extra: grid6.as_str() }.build())?;
    save_callsign(table, call1);
    save_callsign(table, call2);

    output[0..12].store_be(h12);
    output[12..34].store_be(h22);
    output.set(34, *r_flag);
    output[35..38].store_be(report.saturating_sub(52) & 0b111);
    output[38..49].store_be(*serial & 0x7FF);
    output[49..74].store_be(g25);
    output[74..77].store_be(5u8);
    Ok(())
}
