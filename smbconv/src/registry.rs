//! Structure registry
//!
//! Every structure under construction is a [`StructureNode`] owning its
//! working buffer. Nodes are found by schema and [`IdentityKey`]; the
//! export table receives a copy of the buffer each time a record commits.
//!
//! Nodes live in a slot arena and are addressed by [`NodeId`], so link
//! fixups and fill contexts never hold references into the arena.

use std::fmt;

use hashbrown::HashMap;
use smbconv_core::format::constants::{instance, schema::OEM_PASSTHROUGH};
use smbconv_core::validation::validate_declared_len;
use smbconv_core::{
    write_handle, ConvError, ExportTable, Guid, RecordHeader, StringLayout, StructureHeader,
};
use tracing::{debug, trace};

use crate::error::{EngineError, Result};
use crate::fixup::LinkFixupEntry;
use crate::rules::LocatingMethod;

/// Identity of a structure across records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey {
    pub taxonomy: Guid,
    pub instance: u16,
    pub sub_instance: u16,
    pub producer: Guid,
}

impl IdentityKey {
    pub const fn new(taxonomy: Guid, instance: u16, sub_instance: u16, producer: Guid) -> Self {
        Self {
            taxonomy,
            instance,
            sub_instance,
            producer,
        }
    }

    /// Key derived from a record according to the rule's locating method
    ///
    /// `ByInstanceOnly` ignores the sub-instance so all records of one
    /// instance accumulate into a single structure.
    pub fn locate(
        method: LocatingMethod,
        taxonomy: Guid,
        producer: Guid,
        header: &RecordHeader,
    ) -> Self {
        let sub_instance = match method {
            LocatingMethod::ByFullIdentity => header.sub_instance,
            LocatingMethod::ByInstanceOnly => instance::NOT_APPLICABLE,
        };
        Self::new(taxonomy, header.instance, sub_instance, producer)
    }

    /// Key used for structures nobody reported
    pub const fn placeholder() -> Self {
        Self::new(Guid::NIL, 1, instance::NOT_APPLICABLE, Guid::NIL)
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}.{:#06x}@{}",
            self.taxonomy, self.instance, self.sub_instance, self.producer
        )
    }
}

/// Index of a node in the registry arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const fn index(self) -> usize {
        self.0
    }
}

/// One structure under construction
#[derive(Debug, Clone)]
pub struct StructureNode {
    key: IdentityKey,
    schema: u8,
    pub(crate) structure: Vec<u8>,
    size: usize,
    handle: u16,
    pub(crate) pending: Vec<LinkFixupEntry>,
}

impl StructureNode {
    pub fn key(&self) -> &IdentityKey {
        &self.key
    }

    pub fn schema(&self) -> u8 {
        self.schema
    }

    pub fn handle(&self) -> u16 {
        self.handle
    }

    /// Current total size, string area included
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn structure(&self) -> &[u8] {
        &self.structure[..self.size]
    }

    /// Declared fixed-part length
    pub fn declared_len(&self) -> usize {
        self.structure.get(1).copied().unwrap_or(0) as usize
    }

    /// Link fixups waiting for their targets
    pub fn pending(&self) -> &[LinkFixupEntry] {
        &self.pending
    }

    /// Rescan the string area and record the structure's size
    pub(crate) fn refresh_size(&mut self) -> Result<usize> {
        let layout = StringLayout::scan(&self.structure)?;
        if layout.size != self.structure.len() {
            return Err(ConvError::MissingTerminator.into());
        }
        self.size = layout.size;
        Ok(self.size)
    }
}

/// Saved node state for rolling back a failed update
#[derive(Debug, Clone)]
pub struct NodeCheckpoint {
    structure: Vec<u8>,
    size: usize,
    pending: Vec<LinkFixupEntry>,
}

/// Allocate a zero-filled buffer, reporting failure instead of aborting
pub(crate) fn try_zeroed(len: usize) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| EngineError::OutOfResources(len))?;
    buffer.resize(len, 0);
    Ok(buffer)
}

/// All structures under construction
#[derive(Debug, Default)]
pub struct Registry {
    nodes: Vec<Option<StructureNode>>,
    free: Vec<usize>,
    index: HashMap<(u8, IdentityKey), NodeId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Node for `schema` and `key`, if one exists
    pub fn find(&self, schema: u8, key: &IdentityKey) -> Option<NodeId> {
        self.index.get(&(schema, *key)).copied()
    }

    /// Whether any node of `schema` exists
    pub fn has_schema(&self, schema: u8) -> bool {
        self.index.keys().any(|(s, _)| *s == schema)
    }

    pub fn node(&self, id: NodeId) -> Result<&StructureNode> {
        self.nodes
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(EngineError::StaleNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut StructureNode> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(EngineError::StaleNode(id))
    }

    /// Live nodes in arena order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &StructureNode)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|node| (NodeId(i), node)))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (NodeId, &mut StructureNode)> {
        self.nodes
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|node| (NodeId(i), node)))
    }

    /// Total number of unresolved link fixups
    pub fn pending_links(&self) -> usize {
        self.iter().map(|(_, node)| node.pending.len()).sum()
    }

    /// Create an empty structure of `schema`, publish it and register it
    ///
    /// `min_len` is the empty structure size: declared length plus the
    /// two-byte empty string area.
    pub fn create<E: ExportTable + ?Sized>(
        &mut self,
        schema: u8,
        key: IdentityKey,
        min_len: usize,
        export: &mut E,
    ) -> Result<NodeId> {
        let declared = min_len
            .checked_sub(smbconv_core::format::constants::TERMINATOR_LEN)
            .ok_or(ConvError::InvalidHeader)?;
        validate_declared_len(declared)?;

        let mut structure = try_zeroed(min_len)?;
        StructureHeader::new(schema, declared as u8).write_to(&mut structure)?;
        let handle = export.add(structure.clone())?;
        write_handle(&mut structure, handle)?;

        let node = StructureNode {
            key,
            schema,
            structure,
            size: min_len,
            handle,
            pending: Vec::new(),
        };

        let id = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                NodeId(slot)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        };
        self.index.insert((schema, key), id);
        debug!(schema, handle, %key, "created structure");
        Ok(id)
    }

    /// Withdraw a node from the export table and the registry
    pub fn remove<E: ExportTable + ?Sized>(
        &mut self,
        id: NodeId,
        export: &mut E,
    ) -> Result<StructureNode> {
        let node = self
            .nodes
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(EngineError::StaleNode(id))?;
        self.index.remove(&(node.schema, node.key));
        self.free.push(id.0);
        debug!(schema = node.schema, handle = node.handle, "removed structure");
        export.remove(node.handle)?;
        Ok(node)
    }

    /// Grow a node's buffer to `new_total` bytes
    ///
    /// The first `old_total` bytes are kept, the rest is zero-filled and the
    /// header's declared length becomes `new_declared`.
    pub fn grow(
        &mut self,
        id: NodeId,
        new_declared: usize,
        old_total: usize,
        new_total: usize,
    ) -> Result<()> {
        let node = self.node_mut(id)?;
        if old_total > node.structure.len() || new_total < old_total {
            return Err(ConvError::InsufficientBuffer.into());
        }
        let declared = u8::try_from(new_declared).map_err(|_| ConvError::ValueOutOfRange)?;

        let mut grown = try_zeroed(new_total)?;
        grown[..old_total].copy_from_slice(&node.structure[..old_total]);
        grown[1] = declared;
        node.structure = grown;
        node.size = new_total;
        trace!(handle = node.handle, old_total, new_total, "grew structure");
        Ok(())
    }

    /// Extend the declared fixed part by `extra` zero bytes
    ///
    /// The string area moves up behind the new bytes. Returns the offset
    /// of the first new byte.
    pub fn extend_body(&mut self, id: NodeId, extra: usize) -> Result<usize> {
        let layout = StringLayout::scan(self.node(id)?.structure())?;
        let new_declared = layout.declared_len + extra;
        if new_declared > u8::MAX as usize {
            return Err(ConvError::ValueOutOfRange.into());
        }

        self.grow(id, new_declared, layout.size, layout.size + extra)?;
        let node = self.node_mut(id)?;
        let at = layout.declared_len;
        node.structure.copy_within(at..layout.size, at + extra);
        node.structure[at..at + extra].fill(0);
        node.refresh_size()?;
        Ok(at)
    }

    /// Replace a node's whole structure, keeping its handle
    ///
    /// The new bytes carry their own header and string area; only the
    /// handle field is rewritten.
    pub fn load_structure(&mut self, id: NodeId, bytes: &[u8]) -> Result<()> {
        let node = self.node_mut(id)?;
        // Built-in schemas are indexed by their id and cannot be swapped
        let schema = StructureHeader::from_bytes(bytes)?.schema;
        let vendor = |schema: u8| schema >= OEM_PASSTHROUGH;
        if schema != node.schema && !(vendor(schema) && vendor(node.schema)) {
            return Err(ConvError::InvalidHeader.into());
        }
        if bytes.len() > node.size {
            let mut buffer = try_zeroed(bytes.len())?;
            buffer.copy_from_slice(bytes);
            node.structure = buffer;
        } else {
            node.structure[..bytes.len()].copy_from_slice(bytes);
            node.structure.truncate(bytes.len());
        }
        write_handle(&mut node.structure, node.handle)?;
        node.refresh_size()?;
        Ok(())
    }

    /// Snapshot a node before applying a record to it
    pub fn checkpoint(&self, id: NodeId) -> Result<NodeCheckpoint> {
        let node = self.node(id)?;
        Ok(NodeCheckpoint {
            structure: node.structure.clone(),
            size: node.size,
            pending: node.pending.clone(),
        })
    }

    /// Roll a node back to a snapshot
    pub fn restore(&mut self, id: NodeId, checkpoint: NodeCheckpoint) -> Result<()> {
        let node = self.node_mut(id)?;
        node.structure = checkpoint.structure;
        node.size = checkpoint.size;
        node.pending = checkpoint.pending;
        Ok(())
    }

    /// Copy a node's current bytes into the export table
    pub fn publish<E: ExportTable + ?Sized>(&self, id: NodeId, export: &mut E) -> Result<()> {
        let node = self.node(id)?;
        export.replace(node.handle, node.structure().to_vec())?;
        Ok(())
    }

    /// Remove every node, withdrawing them from the export table
    pub fn clear<E: ExportTable + ?Sized>(&mut self, export: &mut E) -> Result<()> {
        let ids: Vec<NodeId> = self.iter().map(|(id, _)| id).collect();
        for id in ids {
            self.remove(id, export)?;
        }
        self.nodes.clear();
        self.free.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::MemoryExportTable;
    use smbconv_core::taxonomy;

    fn key(instance: u16) -> IdentityKey {
        IdentityKey::new(taxonomy::MISC, instance, instance::NOT_APPLICABLE, Guid::NIL)
    }

    #[test]
    fn test_locate_by_method() {
        let header = RecordHeader::new(3, 2, 5);
        let locate = |method| IdentityKey::locate(method, taxonomy::CACHE, Guid::NIL, &header);
        let full = locate(LocatingMethod::ByFullIdentity);
        let inst = locate(LocatingMethod::ByInstanceOnly);
        assert_eq!(full.sub_instance, 5);
        assert_eq!(inst.sub_instance, instance::NOT_APPLICABLE);
        assert_eq!(full.instance, inst.instance);
    }

    #[test]
    fn test_create_publishes_empty_structure() {
        let mut export = MemoryExportTable::new();
        let mut registry = Registry::new();
        let id = registry.create(3, key(1), 0x17, &mut export).unwrap();

        let node = registry.node(id).unwrap();
        assert_eq!(node.size(), 0x17);
        assert_eq!(node.declared_len(), 0x15);
        assert_eq!(&node.structure()[0x15..], &[0, 0]);
        assert_eq!(export.get(node.handle(), 3), Some(node.structure()));
        assert_eq!(registry.find(3, &key(1)), Some(id));
        assert_eq!(registry.find(3, &key(2)), None);
    }

    #[test]
    fn test_create_rejects_bad_length() {
        let mut export = MemoryExportTable::new();
        let mut registry = Registry::new();
        assert!(registry.create(3, key(1), 3, &mut export).is_err());
        assert!(registry.create(3, key(1), 300, &mut export).is_err());
        assert!(export.is_empty());
    }

    #[test]
    fn test_grow_preserves_prefix() {
        let mut export = MemoryExportTable::new();
        let mut registry = Registry::new();
        let id = registry.create(8, key(1), 0x0B, &mut export).unwrap();
        registry.node_mut(id).unwrap().structure[4] = 0x42;

        registry.grow(id, 0x09, 0x0B, 0x10).unwrap();
        let node = registry.node(id).unwrap();
        assert_eq!(node.size(), 0x10);
        assert_eq!(node.structure()[4], 0x42);
        assert!(node.structure()[0x0B..].iter().all(|&b| b == 0));
        assert!(registry.grow(id, 0x09, 0x20, 0x30).is_err());
    }

    #[test]
    fn test_extend_body_moves_strings() {
        let mut export = MemoryExportTable::new();
        let mut registry = Registry::new();
        let id = registry.create(10, key(1), 0x06, &mut export).unwrap();
        let bytes = [10, 4, 0, 0, b'a', b'b', 0, 0];
        registry.load_structure(id, &bytes).unwrap();

        let at = registry.extend_body(id, 2).unwrap();
        assert_eq!(at, 4);
        let node = registry.node(id).unwrap();
        assert_eq!(node.declared_len(), 6);
        assert_eq!(&node.structure()[4..], &[0, 0, b'a', b'b', 0, 0]);
    }

    #[test]
    fn test_load_structure_keeps_schema_class() {
        let mut export = MemoryExportTable::new();
        let mut registry = Registry::new();
        let oem = registry.create(0x80, key(1), 0x06, &mut export).unwrap();
        let before = registry.node(oem).unwrap().structure().to_vec();

        let err = registry.load_structure(oem, &[127, 4, 0, 0, 0, 0]).unwrap_err();
        assert_eq!(err.conversion(), Some(ConvError::InvalidHeader));
        assert_eq!(registry.node(oem).unwrap().structure(), &before[..]);

        // Any vendor schema may replace another
        registry.load_structure(oem, &[0x85, 4, 0, 0, 0, 0]).unwrap();
        assert_eq!(registry.node(oem).unwrap().structure()[0], 0x85);

        let slot = registry.create(9, key(2), 0x06, &mut export).unwrap();
        assert!(registry.load_structure(slot, &[0x85, 4, 0, 0, 0, 0]).is_err());
        assert!(registry.load_structure(slot, &[8, 4, 0, 0, 0, 0]).is_err());
    }

    #[test]
    fn test_checkpoint_restore() {
        let mut export = MemoryExportTable::new();
        let mut registry = Registry::new();
        let id = registry.create(0x80, key(1), 0x06, &mut export).unwrap();
        let saved = registry.checkpoint(id).unwrap();

        registry.grow(id, 0x08, 0x06, 0x0A).unwrap();
        registry.restore(id, saved).unwrap();
        assert_eq!(registry.node(id).unwrap().size(), 0x06);
    }

    #[test]
    fn test_remove_frees_slot() {
        let mut export = MemoryExportTable::new();
        let mut registry = Registry::new();
        let first = registry.create(3, key(1), 0x17, &mut export).unwrap();
        registry.remove(first, &mut export).unwrap();
        assert!(registry.is_empty());
        assert!(export.is_empty());
        assert!(registry.node(first).is_err());

        let second = registry.create(3, key(2), 0x17, &mut export).unwrap();
        assert_eq!(second, first);
        assert_eq!(registry.find(3, &key(1)), None);
    }
}
