//! Sub-field reordering and bit packing

use crate::validation::expect_input_size;
use crate::{ConvError, Result};

/// Top bit of a composed byte
pub const FLAG_BIT: u8 = 1 << 7;

/// Exchange two adjacent sub-fields
///
/// The input is `N` bytes whose first `first_width` bytes belong to the
/// first sub-field. The output holds the second sub-field first.
pub fn swap_fields<const N: usize>(input: &[u8], first_width: usize) -> Result<[u8; N]> {
    expect_input_size(input, N)?;
    if first_width == 0 || first_width >= N {
        return Err(ConvError::SizeMismatch);
    }

    let second_width = N - first_width;
    let mut out = [0u8; N];
    out[..second_width].copy_from_slice(&input[first_width..]);
    out[second_width..].copy_from_slice(&input[..first_width]);
    Ok(out)
}

/// Pack a 7-bit enumerated value with a flag in bit 7
pub const fn compose_flag_byte(value: u8, flag: bool) -> Result<u8> {
    if value & FLAG_BIT != 0 {
        return Err(ConvError::ValueOutOfRange);
    }
    Ok(if flag { value | FLAG_BIT } else { value })
}

/// Position and width of a bit field inside one byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    pub shift: u8,
    pub width: u8,
}

impl BitField {
    pub const fn new(shift: u8, width: u8) -> Self {
        Self { shift, width }
    }

    const fn mask(&self) -> u8 {
        (((1u16 << self.width) - 1) as u8) << self.shift
    }
}

/// Pack several values into one byte, rejecting values wider than their field
pub fn pack_bits(fields: &[(BitField, u8)]) -> Result<u8> {
    let mut out = 0u8;
    for &(field, value) in fields {
        if field.width == 0 || field.shift + field.width > 8 {
            return Err(ConvError::ValueOutOfRange);
        }
        let placed = (value as u16) << field.shift;
        if placed > 0xFF || (placed as u8) & !field.mask() != 0 {
            return Err(ConvError::ValueOutOfRange);
        }
        out |= placed as u8;
    }
    Ok(out)
}
