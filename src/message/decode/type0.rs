use bitvec::prelude::*;

use crate::message::error::{MessageError, UnpackSnafu};
use crate::message::hash_cache::{CallsignHashTable, HashKind};
use crate::message::lookup_tables::section_name;
use crate::message::text_encoding::{unpack_free_text, unpack_telemetry};
use crate::message::types::MessageVariant;

use super::{call28, hashed_call};

pub(super) fn decode_free_text(bits: &BitSlice<u8, Msb0>) -> Result<MessageVariant, MessageError> {
    let f71: u128 = bits[0..71].load_be();
    let text = unpack_free_text(f71).ok_or_else(|| {
        UnpackSnafu {
            i3: 0u8,
            n3: Some(0u8),
            reason: "free text out of range",
        }
        .build()
    })?;
    Ok(MessageVariant::FreeText { text })
}

pub(super) fn decode_telemetry(bits: &BitSlice<u8, Msb0>) -> MessageVariant {
    let t71: u128 = bits[0..71].load_be();
    MessageVariant::Telemetry { hex: unpack_telemetry(t71) }
}

pub(super) fn decode_dxpedition(bits: &BitSlice<u8, Msb0>, table: &mut dyn CallsignHashTable) -> Result<MessageVariant, MessageError> {
    let n28a: u32 = bits[0..28].load_be();
    let n28b: u32 = bits[28..56].load_be();
    let h10: u32 = bits[56..66].load_be();
    let r5: i8 = bits[66..71].load_be::<u8>() as i8;

    Ok(MessageVariant::Dxpedition {
        call1: call28(n28a, 0, Some(1u8), table)?,
        call2: call28(n28b, 0, Some(1u8), table)?,
        hashed: hashed_call(table, HashKind::Bits10, h10),
        report: 2 * r5 - 30,
    })
}

pub(super) fn decode_field_day(bits: &BitSlice<u8, Msb0>, n3: u8, table: &mut dyn CallsignHashTable) -> Result<MessageVariant, MessageError> {
    let n28a: u32 = bits[0..28].load_be();
    let n28b: u32 = bits[28..56].load_be();
    let r_flag = bits[56];
    let intx: u8 = bits[57..61].load_be();
    let k3: u8 = bits[61..64].load_be();
    let s7: u8 = bits[64..71].load_be();

    let unpack_error = |reason: String| UnpackSnafu { i3: 0u8, n3: Some(n3), reason }.build();
    if k3 > 5 {
        return Err(unpack_error(format!("invalid class {}", k3)));
    }
    let section = section_name(s7).ok_or_else(|| unpack_error(format!("invalid section {}", s7)))?;

    Ok(MessageVariant::FieldDay {
        call1: call28(n28a, 0, Some(n3), table)?,
        call2: call28(n28b, 0, Some(n3), table)?,
        r_flag,
        transmitters: intx + if n3 == 3 { 1 } else { 17 },
        class: (b'A' + k3) as char,
        section,
    })
}
