//! 128-bit identifiers for producer taxonomies and producers

use bytemuck::{Pod, Zeroable};

use crate::validation::parsing::parse_guid;
use crate::Result;

/// 128-bit identifier in the mixed-endian layout used on the wire
///
/// The first three groups are little-endian, the last eight bytes are
/// stored as written.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable)]
pub struct Guid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

impl Guid {
    /// Size of the identifier in bytes
    pub const SIZE: usize = 16;

    /// All-zero identifier
    pub const NIL: Guid = Guid::from_fields(0, 0, 0, [0; 8]);

    /// Build from the four canonical groups
    pub const fn from_fields(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
        Self {
            data1,
            data2,
            data3,
            data4,
        }
    }

    /// Read from 16 wire bytes
    pub fn from_bytes(bytes: &[u8; 16]) -> Self {
        bytemuck::pod_read_unaligned(bytes)
    }

    /// Wire bytes
    pub fn to_bytes(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(bytemuck::bytes_of(self));
        bytes
    }

    /// Parse the canonical `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx` form
    pub fn parse_str(text: &str) -> Result<Self> {
        parse_guid(text)
    }

    pub const fn is_nil(&self) -> bool {
        self.data1 == 0
            && self.data2 == 0
            && self.data3 == 0
            && u64::from_le_bytes(self.data4) == 0
    }
}

impl Default for Guid {
    fn default() -> Self {
        Self::NIL
    }
}

impl core::fmt::Display for Guid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let d = &self.data4;
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            self.data1, self.data2, self.data3, d[0], d[1], d[2], d[3], d[4], d[5], d[6], d[7]
        )
    }
}

impl core::str::FromStr for Guid {
    type Err = crate::ConvError;

    fn from_str(s: &str) -> Result<Self> {
        parse_guid(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Guid {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> core::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Guid {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> core::result::Result<Self, D::Error> {
        struct GuidVisitor;

        impl serde::de::Visitor<'_> for GuidVisitor {
            type Value = Guid;

            fn expecting(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str("a GUID string")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> core::result::Result<Guid, E> {
                parse_guid(v).map_err(|_| E::custom("invalid GUID"))
            }
        }

        deserializer.deserialize_str(GuidVisitor)
    }
}

/// Producer taxonomies understood by the built-in rule table
pub mod taxonomy {
    use super::Guid;

    /// Miscellaneous platform records
    pub const MISC: Guid = Guid::from_fields(
        0x772484B2,
        0x7482,
        0x4b91,
        [0x9F, 0x9A, 0xAD, 0x43, 0xF8, 0x1C, 0x58, 0x81],
    );

    /// Processor records
    pub const PROCESSOR: Guid = Guid::from_fields(
        0x26fdeb7e,
        0xb8af,
        0x4ccf,
        [0xaa, 0x97, 0x02, 0x63, 0x3c, 0xe4, 0x8c, 0xa7],
    );

    /// Cache records
    pub const CACHE: Guid = Guid::from_fields(
        0x7f0013a7,
        0xdc79,
        0x4b22,
        [0x80, 0x99, 0x11, 0xf7, 0x5f, 0xdc, 0x82, 0x9d],
    );

    /// Memory records
    pub const MEMORY: Guid = Guid::from_fields(
        0x4E8F4EBB,
        0x64B9,
        0x4e05,
        [0x9B, 0x18, 0x4C, 0xFE, 0x49, 0x23, 0x50, 0x97],
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guid_wire_layout() {
        let bytes = taxonomy::MEMORY.to_bytes();
        assert_eq!(&bytes[0..4], &[0xBB, 0x4E, 0x8F, 0x4E]);
        assert_eq!(&bytes[4..6], &[0xB9, 0x64]);
        assert_eq!(&bytes[8..16], &[0x9B, 0x18, 0x4C, 0xFE, 0x49, 0x23, 0x50, 0x97]);
        assert_eq!(Guid::from_bytes(&bytes), taxonomy::MEMORY);
    }

    #[test]
    fn test_guid_parse_round_trip() {
        let parsed: Guid = "26fdeb7e-b8af-4ccf-aa97-02633ce48ca7".parse().unwrap();
        assert_eq!(parsed, taxonomy::PROCESSOR);
        assert!(!parsed.is_nil());
        assert!(Guid::NIL.is_nil());
    }
}
