//! Format constants for exported structures and input records

/// Size of the common structure header (schema, length, handle)
pub const STRUCTURE_HEADER_SIZE: usize = 4;

/// Two zero bytes end every structure
pub const TERMINATOR_LEN: usize = 2;

/// Longest string, in bytes, accepted into a string area
pub const MAX_STRING_LEN: usize = 64;

/// Largest 1-based string number a reference byte can hold
pub const MAX_STRING_COUNT: usize = u8::MAX as usize;

/// Fixed size of the input record header
pub const RECORD_HEADER_SIZE: usize = 16;

/// Instance numbers
pub mod instance {
    /// Reserved value; records carrying it are dropped
    pub const RESERVED: u16 = 0;

    /// Sub-instance value used when a structure is located by instance only
    pub const NOT_APPLICABLE: u16 = 0xFFFF;
}

/// Handle values
pub mod handle {
    /// Value of a link field that has not been resolved
    pub const UNLINKED: u16 = 0;

    /// First handle the in-memory export table assigns
    pub const FIRST: u16 = 1;

    /// Largest assignable handle; 0xFF00.. are reserved
    pub const LAST: u16 = 0xFEFF;
}

/// Schema ids of the built-in catalog
pub mod schema {
    pub const BIOS_INFORMATION: u8 = 0;
    pub const SYSTEM_INFORMATION: u8 = 1;
    pub const BASEBOARD: u8 = 2;
    pub const CHASSIS: u8 = 3;
    pub const PROCESSOR: u8 = 4;
    pub const MEMORY_MODULE: u8 = 6;
    pub const CACHE: u8 = 7;
    pub const PORT_CONNECTOR: u8 = 8;
    pub const SYSTEM_SLOT: u8 = 9;
    pub const ONBOARD_DEVICES: u8 = 10;
    pub const OEM_STRINGS: u8 = 11;
    pub const SYSTEM_OPTIONS: u8 = 12;
    pub const BIOS_LANGUAGE: u8 = 13;
    pub const MEMORY_ARRAY: u8 = 16;
    pub const MEMORY_DEVICE: u8 = 17;
    pub const MEMORY_ARRAY_MAPPED: u8 = 19;
    pub const MEMORY_DEVICE_MAPPED: u8 = 20;
    pub const BOOT_INFORMATION: u8 = 32;
    pub const ONBOARD_DEVICE_EXTENDED: u8 = 41;
    pub const OEM_PASSTHROUGH: u8 = 0x80;
    pub const END_OF_TABLE: u8 = 127;
}
