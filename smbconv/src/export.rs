//! In-memory export table

use std::collections::BTreeMap;

use smbconv_core::format::constants::handle;
use smbconv_core::{write_handle, ConvError, ExportTable};

/// Export table backed by an ordered map
///
/// Handles are assigned from [`handle::FIRST`]; the lowest free handle is
/// reused after a removal.
#[derive(Debug, Clone, Default)]
pub struct MemoryExportTable {
    structures: BTreeMap<u16, Vec<u8>>,
    limit: Option<usize>,
}

impl MemoryExportTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table that refuses to hold more than `limit` structures
    pub fn with_limit(limit: usize) -> Self {
        Self {
            structures: BTreeMap::new(),
            limit: Some(limit),
        }
    }

    /// Published structures in handle order
    pub fn iter(&self) -> impl Iterator<Item = (u16, &[u8])> {
        self.structures
            .iter()
            .map(|(&handle, structure)| (handle, structure.as_slice()))
    }

    fn next_handle(&self) -> Option<u16> {
        let mut candidate = handle::FIRST;
        for &used in self.structures.keys() {
            if used != candidate {
                break;
            }
            candidate = candidate.checked_add(1)?;
        }
        (candidate <= handle::LAST).then_some(candidate)
    }
}

impl ExportTable for MemoryExportTable {
    fn add(&mut self, mut structure: Vec<u8>) -> smbconv_core::Result<u16> {
        if self.limit.is_some_and(|limit| self.structures.len() >= limit) {
            return Err(ConvError::HandlesExhausted);
        }
        let handle = self.next_handle().ok_or(ConvError::HandlesExhausted)?;
        write_handle(&mut structure, handle)?;
        self.structures.insert(handle, structure);
        Ok(handle)
    }

    fn remove(&mut self, handle: u16) -> smbconv_core::Result<()> {
        self.structures
            .remove(&handle)
            .map(|_| ())
            .ok_or(ConvError::UnknownHandle)
    }

    fn structure(&self, handle: u16) -> Option<&[u8]> {
        self.structures.get(&handle).map(Vec::as_slice)
    }

    fn replace(&mut self, handle: u16, mut structure: Vec<u8>) -> smbconv_core::Result<()> {
        let slot = self
            .structures
            .get_mut(&handle)
            .ok_or(ConvError::UnknownHandle)?;
        write_handle(&mut structure, handle)?;
        *slot = structure;
        Ok(())
    }

    fn handles(&self) -> Vec<u16> {
        self.structures.keys().copied().collect()
    }

    fn len(&self) -> usize {
        self.structures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smbconv_core::read_handle;

    fn empty(schema: u8) -> Vec<u8> {
        vec![schema, 4, 0, 0, 0, 0]
    }

    #[test]
    fn test_handles_from_first() {
        let mut table = MemoryExportTable::new();
        assert_eq!(table.add(empty(0)).unwrap(), 1);
        assert_eq!(table.add(empty(1)).unwrap(), 2);
        assert_eq!(read_handle(table.get(2, 1).unwrap()).unwrap(), 2);
        assert!(table.get(2, 0).is_none());
    }

    #[test]
    fn test_lowest_free_handle_reused() {
        let mut table = MemoryExportTable::new();
        for schema in 0..3 {
            table.add(empty(schema)).unwrap();
        }
        table.remove(2).unwrap();
        assert_eq!(table.add(empty(9)).unwrap(), 2);
        assert_eq!(table.handles(), vec![1, 2, 3]);
        assert_eq!(table.remove(7), Err(ConvError::UnknownHandle));
    }

    #[test]
    fn test_replace_keeps_handle() {
        let mut table = MemoryExportTable::new();
        let handle = table.add(empty(3)).unwrap();
        table.replace(handle, vec![3, 4, 0xFF, 0xFF, b'a', 0, 0]).unwrap();
        let structure = table.get(handle, 3).unwrap();
        assert_eq!(read_handle(structure).unwrap(), handle);
        assert_eq!(structure.len(), 7);
        assert_eq!(table.replace(99, empty(3)), Err(ConvError::UnknownHandle));
    }

    #[test]
    fn test_update_string() {
        let mut table = MemoryExportTable::new();
        let handle = table.add(vec![8, 5, 0, 0, 1, b'o', b'l', b'd', 0, 0]).unwrap();
        table.update_string(handle, 8, 1, b"newer").unwrap();
        assert_eq!(&table.get(handle, 8).unwrap()[5..], b"newer\0\0");
    }

    #[test]
    fn test_limit() {
        let mut table = MemoryExportTable::with_limit(1);
        table.add(empty(0)).unwrap();
        assert_eq!(table.add(empty(1)), Err(ConvError::HandlesExhausted));
    }
}
