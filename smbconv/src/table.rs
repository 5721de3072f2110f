//! Finished structure table image
//!
//! The image is every published structure concatenated in handle order,
//! with the end-of-table structure last. Along with the bytes it records
//! the numbers an entry point needs: structure count and the largest
//! structure size.

use std::fmt;

use smbconv_core::format::constants::schema;
use smbconv_core::{read_handle, structure_size, ExportTable, StructureHeader};

use crate::error::Result;

/// Concatenated structure table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableImage {
    bytes: Vec<u8>,
    structure_count: usize,
    max_structure_size: usize,
}

impl TableImage {
    /// Collect every structure published in `export`
    pub fn collect<E: ExportTable + ?Sized>(export: &E) -> Result<Self> {
        let mut structures: Vec<&[u8]> = export
            .handles()
            .into_iter()
            .filter_map(|handle| export.structure(handle))
            .collect();
        // Stable, so handle order is kept for everything else
        structures.sort_by_key(|s| s.first() == Some(&schema::END_OF_TABLE));

        let mut bytes = Vec::with_capacity(structures.iter().map(|s| s.len()).sum());
        let mut max_structure_size = 0;
        for structure in &structures {
            let size = structure_size(structure)?;
            bytes.extend_from_slice(&structure[..size]);
            max_structure_size = max_structure_size.max(size);
        }

        Ok(Self {
            bytes,
            structure_count: structures.len(),
            max_structure_size,
        })
    }

    /// Parse a previously written image
    pub fn parse(bytes: Vec<u8>) -> Result<Self> {
        let mut structure_count = 0;
        let mut max_structure_size = 0;
        let mut pos = 0;
        while pos < bytes.len() {
            let size = structure_size(&bytes[pos..])?;
            structure_count += 1;
            max_structure_size = max_structure_size.max(size);
            pos += size;
        }
        Ok(Self {
            bytes,
            structure_count,
            max_structure_size,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn structure_count(&self) -> usize {
        self.structure_count
    }

    pub fn max_structure_size(&self) -> usize {
        self.max_structure_size
    }

    /// Structures in table order
    pub fn structures(&self) -> Structures<'_> {
        Structures {
            bytes: &self.bytes,
            pos: 0,
        }
    }
}

/// Iterator over the structures of a [`TableImage`]
pub struct Structures<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for Structures<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.bytes.get(self.pos..).filter(|rest| !rest.is_empty())?;
        let size = structure_size(rest).ok()?;
        self.pos += size;
        Some(&rest[..size])
    }
}

impl fmt::Display for TableImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} structures, {} bytes, largest {} bytes",
            self.structure_count,
            self.bytes.len(),
            self.max_structure_size
        )?;
        for structure in self.structures() {
            let (Ok(header), Ok(handle)) =
                (StructureHeader::from_bytes(structure), read_handle(structure))
            else {
                continue;
            };
            writeln!(
                f,
                "  handle {handle:#06x}  schema {:>3}  length {:#04x}  size {}",
                header.schema,
                header.length,
                structure.len()
            )?;
        }
        Ok(())
    }
}
