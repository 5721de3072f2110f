//! Vendor structures passed through as raw bytes
//!
//! The payload is a complete structure in wire format. Producers do not
//! always terminate the string area properly, so the trailing terminator
//! is completed before the structure replaces the node's buffer. Payloads
//! may only carry vendor schemas (0x80 and up).

use smbconv_core::format::constants::{schema, TERMINATOR_LEN};
use smbconv_core::{structure_size, ConvError, RecordHeader, StructureHeader};

use super::{FillContext, Filler};
use crate::error::Result;

/// Whole record carrying a raw structure
pub const PASSTHROUGH: Filler = Filler::new("oem_passthrough", passthrough);

/// Complete the string area terminator of a raw structure
///
/// Looks at up to two bytes after the declared fixed part: when they are
/// both zero the payload is kept, when only the last is zero one zero byte
/// is appended, otherwise two are appended.
pub fn normalize_terminators(payload: &[u8]) -> Result<Vec<u8>> {
    let header = StructureHeader::from_bytes(payload)?;
    let fixed = header.length as usize;
    if payload.len() < fixed {
        return Err(ConvError::SizeMismatch.into());
    }

    let trailing = payload[fixed..]
        .iter()
        .rev()
        .take(TERMINATOR_LEN)
        .take_while(|&&b| b == 0)
        .count();

    let mut structure = Vec::with_capacity(payload.len() + TERMINATOR_LEN - trailing);
    structure.extend_from_slice(payload);
    structure.resize(payload.len() + TERMINATOR_LEN - trailing, 0);

    // Anything after the first terminator is not part of the structure
    if structure_size(&structure)? != structure.len() {
        return Err(ConvError::InvalidHeader.into());
    }
    Ok(structure)
}

fn passthrough(ctx: &mut FillContext<'_>, _offset: usize, input: &[u8]) -> Result<()> {
    RecordHeader::from_bytes(input)?;
    let structure = normalize_terminators(&input[RecordHeader::SIZE..])?;
    if structure[0] < schema::OEM_PASSTHROUGH {
        return Err(ConvError::InvalidHeader.into());
    }
    ctx.load_structure(&structure)
}
