//! Structure and input record headers
//!
//! Both headers are little-endian and byte packed. They are read with
//! `bytemuck::pod_read_unaligned` so callers may hand in any slice.

use bytemuck::{Pod, Zeroable};

use super::constants::{instance, RECORD_HEADER_SIZE, STRUCTURE_HEADER_SIZE, TERMINATOR_LEN};
use crate::{ConvError, Result};

/// Common 4-byte header at the start of every exported structure
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StructureHeader {
    /// Output schema id
    pub schema: u8,
    /// Declared fixed-part length (excludes strings and terminator)
    pub length: u8,
    /// Little-endian handle
    pub handle: [u8; 2],
}

impl StructureHeader {
    /// Size of the header in bytes
    pub const SIZE: usize = STRUCTURE_HEADER_SIZE;

    /// Create a header with an unassigned handle
    pub const fn new(schema: u8, length: u8) -> Self {
        Self {
            schema,
            length,
            handle: [0; 2],
        }
    }

    /// Handle as a number
    pub const fn handle(&self) -> u16 {
        u16::from_le_bytes(self.handle)
    }

    /// Set the handle
    pub fn set_handle(&mut self, handle: u16) {
        self.handle = handle.to_le_bytes();
    }

    /// Parse header from the start of a structure
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(ConvError::InsufficientBuffer);
        }

        let header: Self = bytemuck::pod_read_unaligned(&bytes[..Self::SIZE]);
        if (header.length as usize) < Self::SIZE {
            return Err(ConvError::InvalidHeader);
        }

        Ok(header)
    }

    /// Header bytes in wire order
    pub fn to_bytes(&self) -> [u8; STRUCTURE_HEADER_SIZE] {
        let mut bytes = [0u8; STRUCTURE_HEADER_SIZE];
        bytes.copy_from_slice(bytemuck::bytes_of(self));
        bytes
    }

    /// Write this header over the start of a structure
    pub fn write_to(&self, structure: &mut [u8]) -> Result<()> {
        if structure.len() < Self::SIZE {
            return Err(ConvError::InsufficientBuffer);
        }
        structure[..Self::SIZE].copy_from_slice(bytemuck::bytes_of(self));
        Ok(())
    }

    /// Total size of a structure with this header and no strings
    pub const fn empty_size(&self) -> usize {
        self.length as usize + TERMINATOR_LEN
    }
}

/// Read the handle stored in a structure's header
pub fn read_handle(structure: &[u8]) -> Result<u16> {
    StructureHeader::from_bytes(structure).map(|h| h.handle())
}

/// Store a handle into a structure's header
pub fn write_handle(structure: &mut [u8], handle: u16) -> Result<()> {
    if structure.len() < StructureHeader::SIZE {
        return Err(ConvError::InsufficientBuffer);
    }
    structure[2..4].copy_from_slice(&handle.to_le_bytes());
    Ok(())
}

/// Fixed 16-byte header preceding every input record payload
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecordHeader {
    /// Producer-defined version
    pub version: u32,
    /// Size of this header, must be 16
    pub header_size: u32,
    /// Instance number (0 is reserved)
    pub instance: u16,
    /// Sub-instance number (0 is reserved, 0xFFFF is not applicable)
    pub sub_instance: u16,
    /// Record type within the producer taxonomy
    pub record_type: u32,
}

impl RecordHeader {
    /// Size of the header in bytes
    pub const SIZE: usize = RECORD_HEADER_SIZE;

    /// Create a header for a record type and instance pair
    pub const fn new(record_type: u32, instance: u16, sub_instance: u16) -> Self {
        Self {
            version: 1,
            header_size: RECORD_HEADER_SIZE as u32,
            instance,
            sub_instance,
            record_type,
        }
    }

    /// Read the header from the start of a record
    ///
    /// Only the length is checked here; field validation is done by
    /// [`RecordHeader::validate`] once a rule has been matched.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(ConvError::InvalidHeader);
        }
        Ok(bytemuck::pod_read_unaligned(&bytes[..Self::SIZE]))
    }

    /// Header bytes in wire order
    pub fn to_bytes(&self) -> [u8; RECORD_HEADER_SIZE] {
        let mut bytes = [0u8; RECORD_HEADER_SIZE];
        bytes.copy_from_slice(bytemuck::bytes_of(self));
        bytes
    }

    /// Check header size and reserved instance values
    pub const fn validate(&self) -> Result<()> {
        if self.header_size as usize != Self::SIZE {
            return Err(ConvError::InvalidHeader);
        }
        if self.instance == instance::RESERVED || self.sub_instance == instance::RESERVED {
            return Err(ConvError::ReservedInstance);
        }
        Ok(())
    }
}

impl Default for RecordHeader {
    fn default() -> Self {
        Self::new(0, 1, instance::NOT_APPLICABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure_header_layout() {
        let mut header = StructureHeader::new(7, 0x13);
        header.set_handle(0x1234);
        assert_eq!(header.to_bytes(), [7, 0x13, 0x34, 0x12]);

        let parsed = StructureHeader::from_bytes(&[7, 0x13, 0x34, 0x12, 0, 0]).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(parsed.handle(), 0x1234);
        assert_eq!(parsed.empty_size(), 0x15);
    }

    #[test]
    fn test_structure_header_rejects_short_length() {
        assert_eq!(
            StructureHeader::from_bytes(&[1, 3, 0, 0]),
            Err(ConvError::InvalidHeader)
        );
        assert_eq!(
            StructureHeader::from_bytes(&[1, 4]),
            Err(ConvError::InsufficientBuffer)
        );
    }

    #[test]
    fn test_record_header_validation() {
        let header = RecordHeader::new(3, 2, instance::NOT_APPLICABLE);
        let bytes = header.to_bytes();
        assert_eq!(bytes[4], 16);
        assert_eq!(&bytes[12..16], &3u32.to_le_bytes());

        let parsed = RecordHeader::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(parsed.validate(), Ok(()));

        let reserved = RecordHeader::new(3, instance::RESERVED, 1);
        assert_eq!(reserved.validate(), Err(ConvError::ReservedInstance));

        let mut odd = header;
        odd.header_size = 20;
        assert_eq!(odd.validate(), Err(ConvError::InvalidHeader));

        assert_eq!(
            RecordHeader::from_bytes(&bytes[..10]),
            Err(ConvError::InvalidHeader)
        );
    }
}
