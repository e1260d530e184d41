//! i3=0 subtypes
//!
//! ```text
//! 0.0  f71                          free text
//! 0.1  c28 c28 h10 r5               DXpedition
//! 0.3  c28 c28 R1 n4 k3 s7          Field Day, 1..16 transmitters
//! 0.4  c28 c28 R1 n4 k3 s7          Field Day, 17..32 transmitters
//! 0.5  t71                          telemetry
//! ```
//!
//! The n3 subtype sits in bits 71..74, followed by i3=0.

use bitvec::prelude::*;

use crate::message::callsign::{ihashcall, save_callsign};
use crate::message::error::{Callsign2Snafu, GridSnafu, MessageError, TypeSnafu};
use crate::message::hash_cache::CallsignHashTable;
use crate::message::lookup_tables::section_index;
use crate::message::text_encoding::{pack_free_text, pack_telemetry};
use crate::message::types::MessageVariant;

use super::pack_plain_call;

fn store_subtype(output: &mut BitSlice<u8, Msb0>, n3: u8) {
    output[71..74].store_be(n3);
    output[74..77].store_be(0u8);
}

pub(super) fn encode_free_text(variant: &MessageVariant, output: &mut BitSlice<u8, Msb0>) -> Result<(), MessageError> {
    let MessageVariant::FreeText { text } = variant else {
        return TypeSnafu { text: variant.to_string() }.fail();
    };
    let f71 = pack_free_text(text).ok_or_else(|| TypeSnafu { text: text.as_str() }.build())?;
    output[0..71].store_be(f71);
    store_subtype(output, 0);
    Ok(())
}

pub(super) fn encode_telemetry(variant: &MessageVariant, output: &mut BitSlice<u8, Msb0>) -> Result<(), MessageError> {
    let MessageVariant::Telemetry { hex } = variant else {
        return TypeSnafu { text: variant.to_string() }.fail();
    };
    let t71 = pack_telemetry(hex).ok_or_else(|| TypeSnafu { text: hex.as_str() }.build())?;
    output[0..71].store_be(t71);
    store_subtype(output, 5);
    Ok(())
}

pub(super) fn encode_dxpedition(
    variant: &MessageVariant,
    output: &mut BitSlice<u8, Msb0>,
    table: &mut dyn CallsignHashTable,
) -> Result<(), MessageError> {
    let MessageVariant::Dxpedition { call1, call2, hashed, report } = variant else {
        return TypeSnafu { text: variant.to_string() }.fail();
    };

    let n28a = pack_plain_call(call1, table)?;
    let n28b = pack_plain_call(call2, table)?;
    let h10 = ihashcall(hashed, 10).ok_or_else(|| Callsign2Snafu { callsign: hashed.as_str() }.build())?;
    save_callsign(table, hashed);
    let r5 = ((*report as i32 + 30) / 2).clamp(0, 31) as u8;

    output[0..28].store_be(n28a);
    output[28..56].store_be(n28b);
    output[56..66].store_be(h10);
    output[66..71].store_be(r5);
    store_subtype(output, 1);
    Ok(())
}

pub(super) fn encode_field_day(
    variant: &MessageVariant,
    output: &mut BitSlice<u8, Msb0>,
    table: &mut dyn CallsignHashTable,
) -> Result<(), MessageError> {
    let MessageVariant::FieldDay { call1, call2, r_flag, transmitters, class, section } = variant else {
        return TypeSnafu { text: variant.to_string() }.fail();
    };

    let n28a = pack_plain_call(call1, table)?;
    let n28b = pack_plain_call(call2, table)?;
    let s7 = section_index(section).ok_or_else(|| GridSnafu { extra: *section }.build())?;
    let (n3, intx) = match *transmitters {
        1..=16 => (3, transmitters - 1),
        17..=32 => (4, transmitters - 17),
        _ => return TypeSnafu { text: variant.to_string() }.fail(),
    };
    let k3 = (*class as u8).wrapping_sub(b'A');

    output[0..28].store_be(n28a);
    output[28..56].store_be(n28b);
    output.set(56, *r_flag);
    output[57..61].store_be(intx);
    output[61..64].store_be(k3 & 0b111);
    output[64..71].store_be(s7);
    store_subtype(output, n3);
    Ok(())
}
