//! Numeric field fillers
//!
//! Thin wrappers that run a codec primitive on the payload and store the
//! result at the rule's offset.

use bytemuck::{Pod, Zeroable};
use smbconv_core::codec::exponent::target;
use smbconv_core::codec::{
    base10_to_u16, base10_to_u8, base2_to_granular_u16, base2_to_u16, base2_to_u32, base2_to_u8,
    compose_flag_byte, swap_fields, truncate_to_byte, truncate_to_word,
};
use smbconv_core::validation::expect_input_size;
use smbconv_core::ConvError;

use super::{FillContext, Filler};
use crate::error::Result;

/// 32-bit enumeration stored in a byte
pub const TRUNCATE_BYTE: Filler = Filler::new("truncate_byte", truncate_byte);

/// 32-bit value stored in a word
pub const TRUNCATE_WORD: Filler = Filler::new("truncate_word", truncate_word);

/// Decimal frequency stored in MHz
pub const BASE10_MEGA_WORD: Filler = Filler::new("base10_mega_word", base10_mega_word);

/// Decimal time stored in nanoseconds
pub const BASE10_NANO_BYTE: Filler = Filler::new("base10_nano_byte", base10_nano_byte);

/// Binary size stored in KiB with 64 KiB granularity fallback
pub const BASE2_KILO_GRANULAR: Filler = Filler::new("base2_kilo_granular", base2_kilo_granular);

/// Binary size stored as a KiB double word
pub const BASE2_KILO_DWORD: Filler = Filler::new("base2_kilo_dword", base2_kilo_dword);

/// Binary size stored in MiB
pub const BASE2_MEGA_WORD: Filler = Filler::new("base2_mega_word", base2_mega_word);

/// Binary size stored in 64 KiB units
pub const BASE2_64K_BYTE: Filler = Filler::new("base2_64k_byte", base2_64k_byte);

/// Two 32-bit halves stored in swapped order
pub const SWAP_HALVES: Filler = Filler::new("swap_halves", swap_halves);

/// Enumeration with a flag in bit 7
pub const FLAG_BYTE: Filler = Filler::new("flag_byte", flag_byte);

/// A value and a boolean flag, both reported as 32-bit integers
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct FlagValue {
    pub value: u32,
    pub flag: u32,
}

impl FlagValue {
    pub const SIZE: usize = 8;

    pub fn from_bytes(input: &[u8]) -> Result<Self> {
        expect_input_size(input, Self::SIZE)?;
        Ok(bytemuck::pod_read_unaligned(input))
    }

    /// Byte with the value in bits 0..7 and the flag in bit 7
    pub fn compose(&self) -> Result<u8> {
        let value = u8::try_from(self.value).map_err(|_| ConvError::ValueOutOfRange)?;
        Ok(compose_flag_byte(value, self.flag != 0)?)
    }
}

fn truncate_byte(ctx: &mut FillContext<'_>, offset: usize, input: &[u8]) -> Result<()> {
    ctx.write_u8(offset, truncate_to_byte(input, 4)?)
}

fn truncate_word(ctx: &mut FillContext<'_>, offset: usize, input: &[u8]) -> Result<()> {
    ctx.write_u16(offset, truncate_to_word(input, 4)?)
}

fn base10_mega_word(ctx: &mut FillContext<'_>, offset: usize, input: &[u8]) -> Result<()> {
    ctx.write_u16(offset, base10_to_u16(input, target::MEGA)?)
}

fn base10_nano_byte(ctx: &mut FillContext<'_>, offset: usize, input: &[u8]) -> Result<()> {
    ctx.write_u8(offset, base10_to_u8(input, target::NANO)?)
}

fn base2_kilo_granular(ctx: &mut FillContext<'_>, offset: usize, input: &[u8]) -> Result<()> {
    ctx.write_u16(offset, base2_to_granular_u16(input, target::KILO)?)
}

fn base2_kilo_dword(ctx: &mut FillContext<'_>, offset: usize, input: &[u8]) -> Result<()> {
    ctx.write_u32(offset, base2_to_u32(input, target::KILO)?)
}

fn base2_mega_word(ctx: &mut FillContext<'_>, offset: usize, input: &[u8]) -> Result<()> {
    ctx.write_u16(offset, base2_to_u16(input, target::MEGA_BINARY)?)
}

fn base2_64k_byte(ctx: &mut FillContext<'_>, offset: usize, input: &[u8]) -> Result<()> {
    ctx.write_u8(offset, base2_to_u8(input, target::UNITS_64K)?)
}

fn swap_halves(ctx: &mut FillContext<'_>, offset: usize, input: &[u8]) -> Result<()> {
    ctx.write(offset, &swap_fields::<8>(input, 4)?)
}

fn flag_byte(ctx: &mut FillContext<'_>, offset: usize, input: &[u8]) -> Result<()> {
    ctx.write_u8(offset, FlagValue::from_bytes(input)?.compose()?)
}
