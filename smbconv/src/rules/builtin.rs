//! Built-in rule and schema tables

use smbconv_core::format::constants::schema;
use smbconv_core::taxonomy;

use super::FillingMethod::{CopyAtOffset, FunctionAtOffset, FunctionComputesOffset, FunctionWholeRecord};
use super::LocatingMethod::{ByFullIdentity, ByInstanceOnly};
use super::{ConversionRule, SchemaMetadata};
use crate::fill::{memory, misc, numeric, oem, processor, text};

/// Record types understood by the built-in rules, per taxonomy
pub mod record_type {
    pub mod misc {
        pub const BIOS_VENDOR: u32 = 1;
        pub const BIOS_VERSION: u32 = 2;
        pub const BIOS_RELEASE_DATE: u32 = 3;
        pub const BIOS_START_ADDRESS: u32 = 4;
        pub const BIOS_ROM_SIZE: u32 = 5;
        pub const BIOS_CHARACTERISTICS: u32 = 6;
        pub const BIOS_RELEASE: u32 = 7;
        pub const SYSTEM_MANUFACTURER: u32 = 8;
        pub const SYSTEM_PRODUCT: u32 = 9;
        pub const SYSTEM_VERSION: u32 = 10;
        pub const SYSTEM_SERIAL: u32 = 11;
        pub const SYSTEM_UUID: u32 = 12;
        pub const SYSTEM_WAKE_UP: u32 = 13;
        pub const BASEBOARD_MANUFACTURER: u32 = 14;
        pub const BASEBOARD_PRODUCT: u32 = 15;
        pub const BASEBOARD_CHASSIS: u32 = 16;
        pub const BASEBOARD_TYPE: u32 = 17;
        pub const CHASSIS_MANUFACTURER: u32 = 18;
        pub const CHASSIS_TYPE: u32 = 19;
        pub const CHASSIS_STATES: u32 = 20;
        pub const PORT_CONNECTOR: u32 = 21;
        pub const SYSTEM_SLOT: u32 = 22;
        pub const ONBOARD_DEVICE: u32 = 23;
        pub const OEM_STRING: u32 = 24;
        pub const SYSTEM_OPTION: u32 = 25;
        pub const BIOS_LANGUAGE: u32 = 26;
        pub const BIOS_CURRENT_LANGUAGE: u32 = 27;
        pub const BOOT_STATUS: u32 = 28;
        pub const ONBOARD_DEVICE_EXTENDED: u32 = 29;
        pub const OEM_STRUCTURE: u32 = 0x80;
    }

    pub mod processor {
        pub const SOCKET_DESIGNATION: u32 = 1;
        pub const PROCESSOR_TYPE: u32 = 2;
        pub const FAMILY: u32 = 3;
        pub const MANUFACTURER: u32 = 4;
        pub const ID: u32 = 5;
        pub const VERSION: u32 = 6;
        pub const VOLTAGE: u32 = 7;
        pub const EXTERNAL_CLOCK: u32 = 8;
        pub const MAX_SPEED: u32 = 9;
        pub const CURRENT_SPEED: u32 = 10;
        pub const STATUS: u32 = 11;
        pub const UPGRADE: u32 = 12;
        pub const CACHE_ASSOCIATION: u32 = 13;
        pub const SERIAL_NUMBER: u32 = 14;
        pub const ASSET_TAG: u32 = 15;
        pub const PART_NUMBER: u32 = 16;
        pub const CORE_COUNT: u32 = 17;
    }

    pub mod cache {
        pub const SOCKET_DESIGNATION: u32 = 1;
        pub const CONFIGURATION: u32 = 2;
        pub const MAX_SIZE: u32 = 3;
        pub const INSTALLED_SIZE: u32 = 4;
        pub const SUPPORTED_SRAM: u32 = 5;
        pub const CURRENT_SRAM: u32 = 6;
        pub const SPEED: u32 = 7;
        pub const ERROR_CORRECTION: u32 = 8;
        pub const SYSTEM_TYPE: u32 = 9;
        pub const ASSOCIATIVITY: u32 = 10;
    }

    pub mod memory {
        pub const ARRAY: u32 = 1;
        pub const DEVICE_LOCATOR: u32 = 2;
        pub const BANK_LOCATOR: u32 = 3;
        pub const DEVICE_SIZE: u32 = 4;
        pub const DEVICE_SPEED: u32 = 5;
        pub const FORM_FACTOR: u32 = 6;
        pub const DEVICE_TYPE: u32 = 7;
        pub const DEVICE_MANUFACTURER: u32 = 8;
        pub const DEVICE_SERIAL: u32 = 9;
        pub const DEVICE_PART: u32 = 10;
        pub const DEVICE_ARRAY_LINK: u32 = 11;
        pub const DEVICE_WIDTHS: u32 = 12;
        pub const ARRAY_MAPPED_ADDRESS: u32 = 13;
        pub const DEVICE_MAPPED_ADDRESS: u32 = 14;
        pub const MODULE_SIZE: u32 = 15;
    }
}

/// Schema sizes and requirements
pub fn schemas() -> Vec<SchemaMetadata> {
    vec![
        SchemaMetadata::new(schema::BIOS_INFORMATION, 0x1A, true),
        SchemaMetadata::new(schema::SYSTEM_INFORMATION, 0x1D, true),
        SchemaMetadata::new(schema::BASEBOARD, 0x11, false),
        SchemaMetadata::new(schema::CHASSIS, 0x17, true),
        SchemaMetadata::new(schema::PROCESSOR, 0x2C, true),
        SchemaMetadata::new(schema::MEMORY_MODULE, 0x0E, false),
        SchemaMetadata::new(schema::CACHE, 0x15, true),
        SchemaMetadata::new(schema::PORT_CONNECTOR, 0x0B, false),
        SchemaMetadata::new(schema::SYSTEM_SLOT, 0x13, true),
        SchemaMetadata::new(schema::ONBOARD_DEVICES, 0x06, false),
        SchemaMetadata::new(schema::OEM_STRINGS, 0x07, false),
        SchemaMetadata::new(schema::SYSTEM_OPTIONS, 0x07, false),
        SchemaMetadata::new(schema::BIOS_LANGUAGE, 0x18, false),
        SchemaMetadata::new(schema::MEMORY_ARRAY, 0x11, true),
        SchemaMetadata::new(schema::MEMORY_DEVICE, 0x1D, true),
        SchemaMetadata::new(schema::MEMORY_ARRAY_MAPPED, 0x11, true),
        SchemaMetadata::new(schema::MEMORY_DEVICE_MAPPED, 0x15, false),
        SchemaMetadata::new(schema::BOOT_INFORMATION, 0x0D, true),
        SchemaMetadata::new(schema::ONBOARD_DEVICE_EXTENDED, 0x0D, false),
        SchemaMetadata::new(schema::OEM_PASSTHROUGH, 0x06, false),
        SchemaMetadata::new(schema::END_OF_TABLE, 0x06, true),
    ]
}

/// Built-in conversion rules
#[rustfmt::skip]
pub fn rules() -> Vec<ConversionRule> {
    use record_type as rt;

    let platform = taxonomy::MISC;
    let cpu = taxonomy::PROCESSOR;
    let cache = taxonomy::CACHE;
    let mem = taxonomy::MEMORY;

    vec![
        // Firmware information
        ConversionRule::new(platform, rt::misc::BIOS_VENDOR, schema::BIOS_INFORMATION, ByInstanceOnly, FunctionAtOffset(text::STRING), 0x04),
        ConversionRule::new(platform, rt::misc::BIOS_VERSION, schema::BIOS_INFORMATION, ByInstanceOnly, FunctionAtOffset(text::STRING), 0x05),
        ConversionRule::new(platform, rt::misc::BIOS_RELEASE_DATE, schema::BIOS_INFORMATION, ByInstanceOnly, FunctionAtOffset(text::STRING), 0x08),
        ConversionRule::new(platform, rt::misc::BIOS_START_ADDRESS, schema::BIOS_INFORMATION, ByInstanceOnly, FunctionAtOffset(misc::SEGMENT_FROM_ADDRESS), 0x06),
        ConversionRule::new(platform, rt::misc::BIOS_ROM_SIZE, schema::BIOS_INFORMATION, ByInstanceOnly, FunctionAtOffset(misc::ROM_SIZE), 0x09),
        ConversionRule::new(platform, rt::misc::BIOS_CHARACTERISTICS, schema::BIOS_INFORMATION, ByInstanceOnly, CopyAtOffset, 0x0A),
        ConversionRule::new(platform, rt::misc::BIOS_RELEASE, schema::BIOS_INFORMATION, ByInstanceOnly, CopyAtOffset, 0x14),
        // System information
        ConversionRule::new(platform, rt::misc::SYSTEM_MANUFACTURER, schema::SYSTEM_INFORMATION, ByInstanceOnly, FunctionAtOffset(text::STRING), 0x04),
        ConversionRule::new(platform, rt::misc::SYSTEM_PRODUCT, schema::SYSTEM_INFORMATION, ByInstanceOnly, FunctionAtOffset(text::STRING), 0x05),
        ConversionRule::new(platform, rt::misc::SYSTEM_VERSION, schema::SYSTEM_INFORMATION, ByInstanceOnly, FunctionAtOffset(text::STRING), 0x06),
        ConversionRule::new(platform, rt::misc::SYSTEM_SERIAL, schema::SYSTEM_INFORMATION, ByInstanceOnly, FunctionAtOffset(text::STRING), 0x07),
        ConversionRule::new(platform, rt::misc::SYSTEM_UUID, schema::SYSTEM_INFORMATION, ByInstanceOnly, CopyAtOffset, 0x08),
        ConversionRule::new(platform, rt::misc::SYSTEM_WAKE_UP, schema::SYSTEM_INFORMATION, ByInstanceOnly, FunctionAtOffset(numeric::TRUNCATE_BYTE), 0x18),
        // Baseboard and chassis
        ConversionRule::new(platform, rt::misc::BASEBOARD_MANUFACTURER, schema::BASEBOARD, ByFullIdentity, FunctionAtOffset(text::STRING), 0x04),
        ConversionRule::new(platform, rt::misc::BASEBOARD_PRODUCT, schema::BASEBOARD, ByFullIdentity, FunctionAtOffset(text::STRING), 0x05),
        ConversionRule::new(platform, rt::misc::BASEBOARD_CHASSIS, schema::BASEBOARD, ByFullIdentity, FunctionAtOffset(misc::CHASSIS_LINK), 0x0B),
        ConversionRule::new(platform, rt::misc::BASEBOARD_TYPE, schema::BASEBOARD, ByFullIdentity, FunctionAtOffset(numeric::TRUNCATE_BYTE), 0x0D),
        ConversionRule::new(platform, rt::misc::CHASSIS_MANUFACTURER, schema::CHASSIS, ByFullIdentity, FunctionAtOffset(text::STRING), 0x04),
        ConversionRule::new(platform, rt::misc::CHASSIS_TYPE, schema::CHASSIS, ByFullIdentity, FunctionAtOffset(numeric::FLAG_BYTE), 0x05),
        ConversionRule::new(platform, rt::misc::CHASSIS_STATES, schema::CHASSIS, ByFullIdentity, CopyAtOffset, 0x09),
        // Connectors, slots and devices
        ConversionRule::new(platform, rt::misc::PORT_CONNECTOR, schema::PORT_CONNECTOR, ByFullIdentity, FunctionAtOffset(misc::PORT_CONNECTOR), 0x04),
        ConversionRule::new(platform, rt::misc::SYSTEM_SLOT, schema::SYSTEM_SLOT, ByFullIdentity, FunctionWholeRecord(misc::SYSTEM_SLOT), 0),
        ConversionRule::new(platform, rt::misc::ONBOARD_DEVICE, schema::ONBOARD_DEVICES, ByInstanceOnly, FunctionComputesOffset(misc::ONBOARD_DEVICE), 0),
        ConversionRule::new(platform, rt::misc::ONBOARD_DEVICE_EXTENDED, schema::ONBOARD_DEVICE_EXTENDED, ByFullIdentity, FunctionAtOffset(misc::ONBOARD_DEVICE_EXTENDED), 0x04),
        // Counted string lists
        ConversionRule::new(platform, rt::misc::OEM_STRING, schema::OEM_STRINGS, ByInstanceOnly, FunctionAtOffset(text::COUNTED_STRING), 0x04),
        ConversionRule::new(platform, rt::misc::SYSTEM_OPTION, schema::SYSTEM_OPTIONS, ByInstanceOnly, FunctionAtOffset(text::COUNTED_STRING), 0x04),
        ConversionRule::new(platform, rt::misc::BIOS_LANGUAGE, schema::BIOS_LANGUAGE, ByInstanceOnly, FunctionAtOffset(text::COUNTED_STRING), 0x04),
        ConversionRule::new(platform, rt::misc::BIOS_CURRENT_LANGUAGE, schema::BIOS_LANGUAGE, ByInstanceOnly, FunctionAtOffset(text::STRING_INDEX), 0x15),
        ConversionRule::new(platform, rt::misc::BOOT_STATUS, schema::BOOT_INFORMATION, ByInstanceOnly, CopyAtOffset, 0x0A),
        ConversionRule::new(platform, rt::misc::OEM_STRUCTURE, schema::OEM_PASSTHROUGH, ByFullIdentity, FunctionWholeRecord(oem::PASSTHROUGH), 0),
        // Processor
        ConversionRule::new(cpu, rt::processor::SOCKET_DESIGNATION, schema::PROCESSOR, ByInstanceOnly, FunctionAtOffset(text::STRING), 0x04),
        ConversionRule::new(cpu, rt::processor::PROCESSOR_TYPE, schema::PROCESSOR, ByInstanceOnly, FunctionAtOffset(numeric::TRUNCATE_BYTE), 0x05),
        ConversionRule::new(cpu, rt::processor::FAMILY, schema::PROCESSOR, ByInstanceOnly, FunctionAtOffset(numeric::TRUNCATE_BYTE), 0x06),
        ConversionRule::new(cpu, rt::processor::MANUFACTURER, schema::PROCESSOR, ByInstanceOnly, FunctionAtOffset(text::STRING), 0x07),
        ConversionRule::new(cpu, rt::processor::ID, schema::PROCESSOR, ByInstanceOnly, FunctionAtOffset(numeric::SWAP_HALVES), 0x08),
        ConversionRule::new(cpu, rt::processor::VERSION, schema::PROCESSOR, ByInstanceOnly, FunctionAtOffset(text::STRING), 0x10),
        ConversionRule::new(cpu, rt::processor::VOLTAGE, schema::PROCESSOR, ByInstanceOnly, FunctionAtOffset(processor::VOLTAGE), 0x11),
        ConversionRule::new(cpu, rt::processor::EXTERNAL_CLOCK, schema::PROCESSOR, ByInstanceOnly, FunctionAtOffset(numeric::BASE10_MEGA_WORD), 0x12),
        ConversionRule::new(cpu, rt::processor::MAX_SPEED, schema::PROCESSOR, ByInstanceOnly, FunctionAtOffset(numeric::BASE10_MEGA_WORD), 0x14),
        ConversionRule::new(cpu, rt::processor::CURRENT_SPEED, schema::PROCESSOR, ByInstanceOnly, FunctionAtOffset(numeric::BASE10_MEGA_WORD), 0x16),
        ConversionRule::new(cpu, rt::processor::STATUS, schema::PROCESSOR, ByInstanceOnly, FunctionAtOffset(processor::STATUS), 0x18),
        ConversionRule::new(cpu, rt::processor::UPGRADE, schema::PROCESSOR, ByInstanceOnly, FunctionAtOffset(numeric::TRUNCATE_BYTE), 0x19),
        ConversionRule::new(cpu, rt::processor::CACHE_ASSOCIATION, schema::PROCESSOR, ByInstanceOnly, FunctionComputesOffset(processor::CACHE_LINK), 0),
        ConversionRule::new(cpu, rt::processor::SERIAL_NUMBER, schema::PROCESSOR, ByInstanceOnly, FunctionAtOffset(text::STRING), 0x20),
        ConversionRule::new(cpu, rt::processor::ASSET_TAG, schema::PROCESSOR, ByInstanceOnly, FunctionAtOffset(text::STRING), 0x21),
        ConversionRule::new(cpu, rt::processor::PART_NUMBER, schema::PROCESSOR, ByInstanceOnly, FunctionAtOffset(text::STRING), 0x22),
        ConversionRule::new(cpu, rt::processor::CORE_COUNT, schema::PROCESSOR, ByInstanceOnly, FunctionAtOffset(numeric::TRUNCATE_BYTE), 0x23),
        // Cache: instance is the processor, sub-instance the level
        ConversionRule::new(cache, rt::cache::SOCKET_DESIGNATION, schema::CACHE, ByFullIdentity, FunctionAtOffset(text::STRING), 0x04),
        ConversionRule::new(cache, rt::cache::CONFIGURATION, schema::CACHE, ByFullIdentity, FunctionAtOffset(numeric::TRUNCATE_WORD), 0x05),
        ConversionRule::new(cache, rt::cache::MAX_SIZE, schema::CACHE, ByFullIdentity, FunctionAtOffset(numeric::BASE2_KILO_GRANULAR), 0x07),
        ConversionRule::new(cache, rt::cache::INSTALLED_SIZE, schema::CACHE, ByFullIdentity, FunctionAtOffset(numeric::BASE2_KILO_GRANULAR), 0x09),
        ConversionRule::new(cache, rt::cache::SUPPORTED_SRAM, schema::CACHE, ByFullIdentity, FunctionAtOffset(numeric::TRUNCATE_WORD), 0x0B),
        ConversionRule::new(cache, rt::cache::CURRENT_SRAM, schema::CACHE, ByFullIdentity, FunctionAtOffset(numeric::TRUNCATE_WORD), 0x0D),
        ConversionRule::new(cache, rt::cache::SPEED, schema::CACHE, ByFullIdentity, FunctionAtOffset(numeric::BASE10_NANO_BYTE), 0x0F),
        ConversionRule::new(cache, rt::cache::ERROR_CORRECTION, schema::CACHE, ByFullIdentity, FunctionAtOffset(numeric::TRUNCATE_BYTE), 0x10),
        ConversionRule::new(cache, rt::cache::SYSTEM_TYPE, schema::CACHE, ByFullIdentity, FunctionAtOffset(numeric::TRUNCATE_BYTE), 0x11),
        ConversionRule::new(cache, rt::cache::ASSOCIATIVITY, schema::CACHE, ByFullIdentity, FunctionAtOffset(numeric::TRUNCATE_BYTE), 0x12),
        // Memory topology
        ConversionRule::new(mem, rt::memory::ARRAY, schema::MEMORY_ARRAY, ByInstanceOnly, FunctionAtOffset(memory::MEMORY_ARRAY), 0x04),
        ConversionRule::new(mem, rt::memory::DEVICE_LOCATOR, schema::MEMORY_DEVICE, ByFullIdentity, FunctionAtOffset(text::STRING), 0x10),
        ConversionRule::new(mem, rt::memory::BANK_LOCATOR, schema::MEMORY_DEVICE, ByFullIdentity, FunctionAtOffset(text::STRING), 0x11),
        ConversionRule::new(mem, rt::memory::DEVICE_SIZE, schema::MEMORY_DEVICE, ByFullIdentity, FunctionAtOffset(numeric::BASE2_MEGA_WORD), 0x0C),
        ConversionRule::new(mem, rt::memory::DEVICE_SPEED, schema::MEMORY_DEVICE, ByFullIdentity, FunctionAtOffset(numeric::BASE10_MEGA_WORD), 0x15),
        ConversionRule::new(mem, rt::memory::FORM_FACTOR, schema::MEMORY_DEVICE, ByFullIdentity, FunctionAtOffset(numeric::TRUNCATE_BYTE), 0x0E),
        ConversionRule::new(mem, rt::memory::DEVICE_TYPE, schema::MEMORY_DEVICE, ByFullIdentity, FunctionAtOffset(numeric::TRUNCATE_BYTE), 0x12),
        ConversionRule::new(mem, rt::memory::DEVICE_MANUFACTURER, schema::MEMORY_DEVICE, ByFullIdentity, FunctionAtOffset(text::STRING), 0x17),
        ConversionRule::new(mem, rt::memory::DEVICE_SERIAL, schema::MEMORY_DEVICE, ByFullIdentity, FunctionAtOffset(text::STRING), 0x18),
        ConversionRule::new(mem, rt::memory::DEVICE_PART, schema::MEMORY_DEVICE, ByFullIdentity, FunctionAtOffset(text::STRING), 0x1A),
        ConversionRule::new(mem, rt::memory::DEVICE_ARRAY_LINK, schema::MEMORY_DEVICE, ByFullIdentity, FunctionAtOffset(memory::ARRAY_LINK), 0x04),
        ConversionRule::new(mem, rt::memory::DEVICE_WIDTHS, schema::MEMORY_DEVICE, ByFullIdentity, CopyAtOffset, 0x08),
        ConversionRule::new(mem, rt::memory::ARRAY_MAPPED_ADDRESS, schema::MEMORY_ARRAY_MAPPED, ByFullIdentity, FunctionAtOffset(memory::ARRAY_MAPPED_ADDRESS), 0x04),
        ConversionRule::new(mem, rt::memory::DEVICE_MAPPED_ADDRESS, schema::MEMORY_DEVICE_MAPPED, ByFullIdentity, FunctionAtOffset(memory::DEVICE_MAPPED_ADDRESS), 0x04),
        ConversionRule::new(mem, rt::memory::MODULE_SIZE, schema::MEMORY_MODULE, ByFullIdentity, FunctionAtOffset(numeric::BASE2_64K_BYTE), 0x09),
    ]
}
