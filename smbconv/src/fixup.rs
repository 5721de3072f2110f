//! Inter-structure links
//!
//! A link field holds the handle of another structure. When the target
//! does not exist yet the field stays zero and the owner remembers a
//! [`LinkFixupEntry`]; once a structure commits, every pending entry that
//! names it is patched and dropped.

use smbconv_core::validation::validate_field_bounds;
use tracing::trace;

use crate::error::Result;
use crate::registry::{IdentityKey, NodeId, Registry};

/// A link field waiting for its target structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkFixupEntry {
    /// Offset of the 16-bit handle field in the owner
    pub offset: usize,
    pub target_schema: u8,
    pub target: IdentityKey,
}

impl LinkFixupEntry {
    fn matches(&self, schema: u8, key: &IdentityKey) -> bool {
        self.target_schema == schema && self.target == *key
    }
}

/// State of a link field after [`link`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// The field holds the target's handle
    Resolved(u16),
    /// The field is zero until the target commits
    Deferred,
}

/// Point the field at `offset` of `owner` to the structure of
/// `target_schema` identified by `target`
pub fn link(
    registry: &mut Registry,
    owner: NodeId,
    offset: usize,
    target_schema: u8,
    target: IdentityKey,
) -> Result<LinkState> {
    validate_field_bounds(offset, 2, registry.node(owner)?.declared_len())?;

    let resolved = match registry.find(target_schema, &target) {
        Some(id) => Some(registry.node(id)?.handle()),
        None => None,
    };

    let node = registry.node_mut(owner)?;
    node.pending.retain(|entry| entry.offset != offset);
    match resolved {
        Some(handle) => {
            node.structure[offset..offset + 2].copy_from_slice(&handle.to_le_bytes());
            Ok(LinkState::Resolved(handle))
        }
        None => {
            node.structure[offset..offset + 2].fill(0);
            node.pending.push(LinkFixupEntry {
                offset,
                target_schema,
                target,
            });
            trace!(offset, target_schema, %target, "deferred link");
            Ok(LinkState::Deferred)
        }
    }
}

/// Patch every pending link that targets `target` and return the owners
/// that changed
pub fn resolve_pending(registry: &mut Registry, target: NodeId) -> Result<Vec<NodeId>> {
    let node = registry.node(target)?;
    let (schema, key, handle) = (node.schema(), *node.key(), node.handle());

    let mut patched = Vec::new();
    for (id, owner) in registry.iter_mut() {
        let before = owner.pending.len();
        let structure = &mut owner.structure;
        owner.pending.retain(|entry| {
            if !entry.matches(schema, &key) {
                return true;
            }
            if let Some(field) = structure.get_mut(entry.offset..entry.offset + 2) {
                field.copy_from_slice(&handle.to_le_bytes());
            }
            false
        });
        if owner.pending.len() != before {
            trace!(handle, owner = owner.handle(), "resolved pending links");
            patched.push(id);
        }
    }
    Ok(patched)
}
