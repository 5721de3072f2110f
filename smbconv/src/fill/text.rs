//! String field fillers

use smbconv_core::validation::{expect_input_size, read_u16, validate_field_bounds};
use smbconv_core::{string_count, ConvError};

use super::{FillContext, Filler};
use crate::error::Result;

/// Token naming the text for a string field
pub const STRING: Filler = Filler::new("string", string);

/// Append a string and store the new string count at the offset
pub const COUNTED_STRING: Filler = Filler::new("counted_string", counted_string);

/// 1-based index of an existing string
pub const STRING_INDEX: Filler = Filler::new("string_index", string_index);

fn string(ctx: &mut FillContext<'_>, offset: usize, input: &[u8]) -> Result<()> {
    expect_input_size(input, 2)?;
    ctx.set_string_token(offset, read_u16(input, 0)?)?;
    Ok(())
}

fn counted_string(ctx: &mut FillContext<'_>, offset: usize, input: &[u8]) -> Result<()> {
    expect_input_size(input, 2)?;
    let Some(text) = ctx.resolve_text(read_u16(input, 0)?) else {
        return Ok(());
    };
    if text.is_empty() {
        return Ok(());
    }
    validate_field_bounds(offset, 1, ctx.declared_len()?)?;
    let count = ctx.append_string(&text)?;
    ctx.write_u8(offset, count)
}

fn string_index(ctx: &mut FillContext<'_>, offset: usize, input: &[u8]) -> Result<()> {
    expect_input_size(input, 2)?;
    let index = read_u16(input, 0)?;
    let count = string_count(ctx.structure()?)?;
    if index == 0 || index as usize > count {
        return Err(ConvError::InvalidIndex.into());
    }
    ctx.write_u8(offset, index as u8)
}
