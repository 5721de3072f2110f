//! Inter-structure link payloads
//!
//! A record that refers to another structure names the target by producer,
//! instance and sub-instance. Unless a filler says otherwise, the target's
//! taxonomy is the taxonomy of the record carrying the link.

use bytemuck::{Pod, Zeroable};

use crate::format::Guid;
use crate::validation::expect_input_size;
use crate::Result;

/// Link payload: producer identity plus instance pair (20 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct InterLink {
    pub producer: Guid,
    pub instance: u16,
    pub sub_instance: u16,
}

impl InterLink {
    /// Size of the payload in bytes
    pub const SIZE: usize = 20;

    pub const fn new(producer: Guid, instance: u16, sub_instance: u16) -> Self {
        Self {
            producer,
            instance,
            sub_instance,
        }
    }

    /// Decode from filler input, which must be exactly 20 bytes
    pub fn from_bytes(input: &[u8]) -> Result<Self> {
        expect_input_size(input, Self::SIZE)?;
        Ok(bytemuck::pod_read_unaligned(input))
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes.copy_from_slice(bytemuck::bytes_of(self));
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::guid::taxonomy;
    use crate::ConvError;

    #[test]
    fn test_inter_link_layout() {
        let link = InterLink::new(taxonomy::MEMORY, 3, 0xFFFF);
        let bytes = link.to_bytes();
        assert_eq!(&bytes[16..18], &[3, 0]);
        assert_eq!(&bytes[18..20], &[0xFF, 0xFF]);
        assert_eq!(InterLink::from_bytes(&bytes), Ok(link));
        assert_eq!(InterLink::from_bytes(&bytes[..19]), Err(ConvError::SizeMismatch));
    }
}
