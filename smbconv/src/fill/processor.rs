//! Processor structure fillers

use bytemuck::{Pod, Zeroable};
use smbconv_core::codec::exponent::target;
use smbconv_core::codec::{compose_flag_byte, pack_bits, BitField, ExpBase10, InterLink};
use smbconv_core::format::constants::schema;
use smbconv_core::{taxonomy, ConvError};

use super::misc::decode;
use super::{FillContext, Filler};
use crate::error::Result;

/// Voltage stored in tenths of a volt with the "current voltage" flag
pub const VOLTAGE: Filler = Filler::new("processor_voltage", voltage);

/// Socket population and CPU status packed into one byte
pub const STATUS: Filler = Filler::new("processor_status", status);

/// Processor to cache link, slot chosen by cache level
pub const CACHE_LINK: Filler = Filler::new("cache_link", cache_link);

/// Offset of the level 1 cache handle
pub const CACHE_HANDLE_BASE: usize = 0x1A;

/// Number of cache handle slots
pub const CACHE_LEVELS: u16 = 3;

const POPULATED: BitField = BitField::new(6, 1);
const CPU_STATUS: BitField = BitField::new(0, 3);

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct ProcessorStatusData {
    pub populated: u8,
    pub status: u8,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct CacheLinkData {
    /// Cache level, 1 to 3
    pub level: u16,
    pub _reserved: u16,
    pub cache: InterLink,
}

fn voltage(ctx: &mut FillContext<'_>, offset: usize, input: &[u8]) -> Result<()> {
    let decivolts = ExpBase10::from_bytes(input)?.rescale(target::DECI)?;
    let decivolts = u8::try_from(decivolts).map_err(|_| ConvError::ValueOutOfRange)?;
    ctx.write_u8(offset, compose_flag_byte(decivolts, true)?)
}

fn status(ctx: &mut FillContext<'_>, offset: usize, input: &[u8]) -> Result<()> {
    let data: ProcessorStatusData = decode(input)?;
    let packed = pack_bits(&[(POPULATED, data.populated), (CPU_STATUS, data.status)])?;
    ctx.write_u8(offset, packed)
}

/// Caches are reported under their own taxonomy
fn cache_link(ctx: &mut FillContext<'_>, _offset: usize, input: &[u8]) -> Result<()> {
    let data: CacheLinkData = decode(input)?;
    if data.level == 0 || data.level > CACHE_LEVELS {
        return Err(ConvError::InvalidIndex.into());
    }
    let offset = CACHE_HANDLE_BASE + 2 * (data.level as usize - 1);
    ctx.link_to(offset, schema::CACHE, taxonomy::CACHE, &data.cache)?;
    Ok(())
}
