//! Memory topology fillers
//!
//! Arrays, devices and their mapped address ranges reference each other
//! by handle. Producers report them in any order, so most of these links
//! start out deferred.

use bytemuck::{Pod, Zeroable};
use smbconv_core::codec::exponent::target;
use smbconv_core::codec::{ExpBase2, InterLink};
use smbconv_core::format::constants::schema;
use smbconv_core::ConvError;

use super::misc::decode;
use super::{FillContext, Filler};
use crate::error::Result;

/// Device or range to owning array link
pub const ARRAY_LINK: Filler = Filler::new("memory_array_link", array_link);

pub const MEMORY_ARRAY: Filler = Filler::new("memory_array", memory_array);

pub const ARRAY_MAPPED_ADDRESS: Filler = Filler::new("array_mapped_address", array_mapped_address);

pub const DEVICE_MAPPED_ADDRESS: Filler =
    Filler::new("device_mapped_address", device_mapped_address);

/// Error information handle meaning "not provided"
pub const NO_ERROR_INFORMATION: u16 = 0xFFFE;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct MemoryArrayData {
    pub location: u8,
    pub usage: u8,
    pub error_correction: u8,
    pub _reserved: u8,
    pub max_capacity: ExpBase2,
    pub device_count: u16,
    pub _pad: u16,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct ArrayMappedData {
    /// First byte address of the range
    pub start: u64,
    /// Last byte address of the range
    pub end: u64,
    pub array: InterLink,
    pub partition_width: u16,
    pub _pad: u16,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct DeviceMappedData {
    pub start: u64,
    pub end: u64,
    pub device: InterLink,
    pub array_mapped: InterLink,
    pub row_position: u8,
    pub interleave_position: u8,
    pub interleaved_depth: u8,
    pub _pad: [u8; 5],
}

/// Byte addresses to the KiB start and end fields of a mapped range
fn kib_range(start: u64, end: u64) -> Result<(u32, u32)> {
    if end < start {
        return Err(ConvError::ValueOutOfRange.into());
    }
    let start = u32::try_from(start >> 10).map_err(|_| ConvError::ValueOutOfRange)?;
    let end = u32::try_from(end >> 10).map_err(|_| ConvError::ValueOutOfRange)?;
    Ok((start, end))
}

fn array_link(ctx: &mut FillContext<'_>, offset: usize, input: &[u8]) -> Result<()> {
    let link = InterLink::from_bytes(input)?;
    let taxonomy = ctx.record().taxonomy;
    ctx.link_to(offset, schema::MEMORY_ARRAY, taxonomy, &link)?;
    Ok(())
}

fn memory_array(ctx: &mut FillContext<'_>, offset: usize, input: &[u8]) -> Result<()> {
    let data: MemoryArrayData = decode(input)?;
    let capacity = data.max_capacity.rescale(target::KILO)?;
    let capacity = u32::try_from(capacity).map_err(|_| ConvError::ValueOutOfRange)?;

    ctx.write_u8(offset, data.location)?;
    ctx.write_u8(offset + 1, data.usage)?;
    ctx.write_u8(offset + 2, data.error_correction)?;
    ctx.write_u32(offset + 3, capacity)?;
    ctx.write_u16(offset + 7, NO_ERROR_INFORMATION)?;
    ctx.write_u16(offset + 9, data.device_count)
}

fn array_mapped_address(ctx: &mut FillContext<'_>, offset: usize, input: &[u8]) -> Result<()> {
    let data: ArrayMappedData = decode(input)?;
    let (start, end) = kib_range(data.start, data.end)?;
    let width = u8::try_from(data.partition_width).map_err(|_| ConvError::ValueOutOfRange)?;
    let taxonomy = ctx.record().taxonomy;

    ctx.write_u32(offset, start)?;
    ctx.write_u32(offset + 4, end)?;
    ctx.write_u8(offset + 10, width)?;
    ctx.link_to(offset + 8, schema::MEMORY_ARRAY, taxonomy, &data.array)?;
    Ok(())
}

fn device_mapped_address(ctx: &mut FillContext<'_>, offset: usize, input: &[u8]) -> Result<()> {
    let data: DeviceMappedData = decode(input)?;
    let (start, end) = kib_range(data.start, data.end)?;
    let taxonomy = ctx.record().taxonomy;

    ctx.write_u32(offset, start)?;
    ctx.write_u32(offset + 4, end)?;
    ctx.write_u8(offset + 12, data.row_position)?;
    ctx.write_u8(offset + 13, data.interleave_position)?;
    ctx.write_u8(offset + 14, data.interleaved_depth)?;
    ctx.link_to(offset + 8, schema::MEMORY_DEVICE, taxonomy, &data.device)?;
    ctx.link_to(offset + 10, schema::MEMORY_ARRAY_MAPPED, taxonomy, &data.array_mapped)?;
    Ok(())
}
