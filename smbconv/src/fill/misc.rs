//! Fillers for platform, board, chassis, slot and device structures

use bytemuck::{Pod, Zeroable};
use smbconv_core::codec::exponent::target;
use smbconv_core::codec::{compose_flag_byte, ExpBase2, InterLink};
use smbconv_core::format::constants::schema;
use smbconv_core::validation::{expect_input_size, read_u64};
use smbconv_core::{ConvError, RecordHeader};

use super::{FillContext, Filler};
use crate::error::Result;

/// Physical address of the firmware image stored as a real-mode segment
pub const SEGMENT_FROM_ADDRESS: Filler = Filler::new("segment_from_address", segment_from_address);

/// Firmware ROM size stored as 64 KiB units minus one
pub const ROM_SIZE: Filler = Filler::new("rom_size", rom_size);

/// Board to chassis link
pub const CHASSIS_LINK: Filler = Filler::new("chassis_link", chassis_link);

pub const PORT_CONNECTOR: Filler = Filler::new("port_connector", port_connector);

/// Whole system slot record
pub const SYSTEM_SLOT: Filler = Filler::new("system_slot", system_slot);

/// One more onboard device appended to the device list
pub const ONBOARD_DEVICE: Filler = Filler::new("onboard_device", onboard_device);

pub const ONBOARD_DEVICE_EXTENDED: Filler =
    Filler::new("onboard_device_extended", onboard_device_extended);

/// Highest address a real-mode segment can start at
const SEGMENT_LIMIT: u64 = 0x10_0000;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct PortConnectorData {
    pub internal_designator: u16,
    pub external_designator: u16,
    pub internal_type: u8,
    pub external_type: u8,
    pub port_type: u8,
    pub _reserved: u8,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct SystemSlotData {
    pub designation: u16,
    pub slot_type: u8,
    pub data_bus_width: u8,
    pub current_usage: u8,
    pub slot_length: u8,
    pub characteristics1: u8,
    pub characteristics2: u8,
    pub segment: u16,
    pub bus: u8,
    pub dev_fn: u8,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct OnboardDeviceData {
    pub device_type: u8,
    pub enabled: u8,
    pub description: u16,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct OnboardDeviceExtendedData {
    pub designation: u16,
    pub device_type: u8,
    pub enabled: u8,
    pub type_instance: u8,
    pub bus: u8,
    pub segment: u16,
    pub dev_fn: u8,
    pub _reserved: u8,
}

/// Decode a fixed payload shape
pub(crate) fn decode<T: Pod>(input: &[u8]) -> Result<T> {
    expect_input_size(input, std::mem::size_of::<T>())?;
    Ok(bytemuck::pod_read_unaligned(input))
}

fn segment_from_address(ctx: &mut FillContext<'_>, offset: usize, input: &[u8]) -> Result<()> {
    expect_input_size(input, 8)?;
    let address = read_u64(input, 0)?;
    if address >= SEGMENT_LIMIT || address % 16 != 0 {
        return Err(ConvError::ValueOutOfRange.into());
    }
    ctx.write_u16(offset, (address >> 4) as u16)
}

fn rom_size(ctx: &mut FillContext<'_>, offset: usize, input: &[u8]) -> Result<()> {
    let units = ExpBase2::from_bytes(input)?.rescale(target::UNITS_64K)?;
    if units == 0 || units > 0x100 {
        return Err(ConvError::ValueOutOfRange.into());
    }
    ctx.write_u8(offset, (units - 1) as u8)
}

fn chassis_link(ctx: &mut FillContext<'_>, offset: usize, input: &[u8]) -> Result<()> {
    let link = InterLink::from_bytes(input)?;
    let taxonomy = ctx.record().taxonomy;
    ctx.link_to(offset, schema::CHASSIS, taxonomy, &link)?;
    Ok(())
}

fn port_connector(ctx: &mut FillContext<'_>, offset: usize, input: &[u8]) -> Result<()> {
    let data: PortConnectorData = decode(input)?;
    ctx.write_u8(offset + 1, data.internal_type)?;
    ctx.write_u8(offset + 3, data.external_type)?;
    ctx.write_u8(offset + 4, data.port_type)?;
    ctx.set_string_token(offset, data.internal_designator)?;
    ctx.set_string_token(offset + 2, data.external_designator)?;
    Ok(())
}

/// The slot id is the record's instance number
fn system_slot(ctx: &mut FillContext<'_>, _offset: usize, input: &[u8]) -> Result<()> {
    let header = RecordHeader::from_bytes(input)?;
    let data: SystemSlotData = decode(&input[RecordHeader::SIZE..])?;

    ctx.write_u8(0x05, data.slot_type)?;
    ctx.write_u8(0x06, data.data_bus_width)?;
    ctx.write_u8(0x07, data.current_usage)?;
    ctx.write_u8(0x08, data.slot_length)?;
    ctx.write_u16(0x09, header.instance)?;
    ctx.write_u8(0x0B, data.characteristics1)?;
    ctx.write_u8(0x0C, data.characteristics2)?;
    ctx.write_u16(0x0D, data.segment)?;
    ctx.write_u8(0x0F, data.bus)?;
    ctx.write_u8(0x10, data.dev_fn)?;
    ctx.set_string_token(0x04, data.designation)?;
    Ok(())
}

/// Each record adds a two-byte device entry to the fixed part
fn onboard_device(ctx: &mut FillContext<'_>, _offset: usize, input: &[u8]) -> Result<()> {
    let data: OnboardDeviceData = decode(input)?;
    let kind = compose_flag_byte(data.device_type, data.enabled != 0)?;

    let at = ctx.extend_body(2)?;
    ctx.write_u8(at, kind)?;
    ctx.set_string_token(at + 1, data.description)?;
    Ok(())
}

fn onboard_device_extended(ctx: &mut FillContext<'_>, offset: usize, input: &[u8]) -> Result<()> {
    let data: OnboardDeviceExtendedData = decode(input)?;
    let kind = compose_flag_byte(data.device_type, data.enabled != 0)?;

    ctx.write_u8(offset + 1, kind)?;
    ctx.write_u8(offset + 2, data.type_instance)?;
    ctx.write_u16(offset + 3, data.segment)?;
    ctx.write_u8(offset + 5, data.bus)?;
    ctx.write_u8(offset + 6, data.dev_fn)?;
    ctx.set_string_token(offset, data.designation)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fill::testing::Harness;
    use smbconv_core::{string_at, Guid};

    #[test]
    fn test_segment_from_address() {
        let mut h = Harness::new(schema::BIOS_INFORMATION, 0x1A);
        h.fill(SEGMENT_FROM_ADDRESS, 0x06, &0xE_0000u64.to_le_bytes()).unwrap();
        assert_eq!(h.word(0x06), 0xE000);

        assert!(h.fill(SEGMENT_FROM_ADDRESS, 0x06, &0xE_0001u64.to_le_bytes()).is_err());
        assert!(h.fill(SEGMENT_FROM_ADDRESS, 0x06, &0x10_0000u64.to_le_bytes()).is_err());
    }

    #[test]
    fn test_rom_size() {
        let mut h = Harness::new(schema::BIOS_INFORMATION, 0x1A);
        // 1 MiB is sixteen 64 KiB units
        h.fill(ROM_SIZE, 0x09, &ExpBase2::new(1, 20).to_bytes()).unwrap();
        assert_eq!(h.structure()[0x09], 15);

        assert!(h.fill(ROM_SIZE, 0x09, &ExpBase2::new(1, 10).to_bytes()).is_err());
        assert!(h.fill(ROM_SIZE, 0x09, &ExpBase2::new(1, 25).to_bytes()).is_err());
    }

    #[test]
    fn test_port_connector() {
        let mut h = Harness::new(schema::PORT_CONNECTOR, 0x0B);
        h.strings.insert(Guid::NIL, 1, "J9A1");
        let data = PortConnectorData {
            internal_designator: 1,
            external_designator: 0,
            internal_type: 0x0B,
            external_type: 0,
            port_type: 0x10,
            _reserved: 0,
        };
        h.fill(PORT_CONNECTOR, 0x04, bytemuck::bytes_of(&data)).unwrap();

        let s = h.structure();
        assert_eq!(s[4], 1);
        assert_eq!(s[5], 0x0B);
        assert_eq!(s[6], 0);
        assert_eq!(s[8], 0x10);
        assert_eq!(string_at(&s, 1).unwrap(), b"J9A1");
    }

    #[test]
    fn test_system_slot_uses_instance() {
        let mut h = Harness::new(schema::SYSTEM_SLOT, 0x13);
        let data = SystemSlotData {
            designation: 0,
            slot_type: 0xA5,
            data_bus_width: 0x0D,
            current_usage: 4,
            slot_length: 4,
            characteristics1: 0x04,
            characteristics2: 0x01,
            segment: 0,
            bus: 2,
            dev_fn: 0x08,
        };
        let mut record = RecordHeader::new(22, 3, 0xFFFF).to_bytes().to_vec();
        record.extend_from_slice(bytemuck::bytes_of(&data));
        h.fill(SYSTEM_SLOT, 0, &record).unwrap();

        assert_eq!(h.structure()[0x05], 0xA5);
        assert_eq!(h.word(0x09), 3);
        assert_eq!(h.structure()[0x0F], 2);
    }

    #[test]
    fn test_onboard_devices_accumulate() {
        let mut h = Harness::new(schema::ONBOARD_DEVICES, 0x06);
        h.strings.insert(Guid::NIL, 1, "Video");
        h.strings.insert(Guid::NIL, 2, "NIC");

        let video = OnboardDeviceData {
            device_type: 3,
            enabled: 1,
            description: 1,
        };
        let nic = OnboardDeviceData {
            device_type: 5,
            enabled: 0,
            description: 2,
        };
        h.fill(ONBOARD_DEVICE, 0, bytemuck::bytes_of(&video)).unwrap();
        h.fill(ONBOARD_DEVICE, 0, bytemuck::bytes_of(&nic)).unwrap();

        let s = h.structure();
        assert_eq!(s[1], 8);
        assert_eq!(&s[4..8], &[0x83, 1, 0x05, 2]);
        assert_eq!(string_at(&s, 1).unwrap(), b"Video");
        assert_eq!(string_at(&s, 2).unwrap(), b"NIC");
    }

    #[test]
    fn test_onboard_device_extended() {
        let mut h = Harness::new(schema::ONBOARD_DEVICE_EXTENDED, 0x0D);
        let data = OnboardDeviceExtendedData {
            designation: 0,
            device_type: 0x85,
            enabled: 1,
            type_instance: 1,
            bus: 3,
            segment: 0,
            dev_fn: 0,
            _reserved: 0,
        };
        let err = h.fill(ONBOARD_DEVICE_EXTENDED, 0x04, bytemuck::bytes_of(&data)).unwrap_err();
        assert_eq!(err.conversion(), Some(ConvError::ValueOutOfRange));

        let data = OnboardDeviceExtendedData { device_type: 0x05, ..data };
        h.fill(ONBOARD_DEVICE_EXTENDED, 0x04, bytemuck::bytes_of(&data)).unwrap();
        assert_eq!(h.structure()[0x05], 0x85);
        assert_eq!(h.structure()[0x09], 3);
    }
}
