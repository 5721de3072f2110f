//! Field fillers
//!
//! A filler decodes one record payload shape and writes the result into
//! the structure under construction through a [`FillContext`]. Fillers are
//! plain functions, registered by name so configuration files can refer
//! to them.

use std::fmt;

use smbconv_core::codec::InterLink;
use smbconv_core::validation::validate_field_bounds;
use smbconv_core::{Guid, RecordHeader, StringResolver};
use tracing::warn;

use crate::catalog::to_ascii;
use crate::error::Result;
use crate::fixup::{self, LinkState};
use crate::options::EngineOptions;
use crate::registry::{IdentityKey, NodeId, Registry};
use crate::strings;

pub mod memory;
pub mod misc;
pub mod numeric;
pub mod oem;
pub mod processor;
pub mod text;

/// Signature of every filler: context, field offset, input bytes
pub type FieldFiller = fn(&mut FillContext<'_>, usize, &[u8]) -> Result<()>;

/// A named filler function
#[derive(Clone, Copy)]
pub struct Filler {
    name: &'static str,
    func: FieldFiller,
}

impl Filler {
    pub const fn new(name: &'static str, func: FieldFiller) -> Self {
        Self { name, func }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn apply(&self, ctx: &mut FillContext<'_>, offset: usize, input: &[u8]) -> Result<()> {
        (self.func)(ctx, offset, input)
    }
}

impl fmt::Debug for Filler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Filler").field(&self.name).finish()
    }
}

impl PartialEq for Filler {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Filler {}

/// Every registered filler
pub const FILLERS: &[Filler] = &[
    text::STRING,
    text::COUNTED_STRING,
    text::STRING_INDEX,
    numeric::TRUNCATE_BYTE,
    numeric::TRUNCATE_WORD,
    numeric::BASE10_MEGA_WORD,
    numeric::BASE10_NANO_BYTE,
    numeric::BASE2_KILO_GRANULAR,
    numeric::BASE2_KILO_DWORD,
    numeric::BASE2_MEGA_WORD,
    numeric::BASE2_64K_BYTE,
    numeric::SWAP_HALVES,
    numeric::FLAG_BYTE,
    misc::SEGMENT_FROM_ADDRESS,
    misc::ROM_SIZE,
    misc::CHASSIS_LINK,
    misc::PORT_CONNECTOR,
    misc::SYSTEM_SLOT,
    misc::ONBOARD_DEVICE,
    misc::ONBOARD_DEVICE_EXTENDED,
    processor::VOLTAGE,
    processor::STATUS,
    processor::CACHE_LINK,
    memory::ARRAY_LINK,
    memory::MEMORY_ARRAY,
    memory::ARRAY_MAPPED_ADDRESS,
    memory::DEVICE_MAPPED_ADDRESS,
    oem::PASSTHROUGH,
];

/// Look a filler up by its registered name
pub fn filler_by_name(name: &str) -> Option<Filler> {
    FILLERS.iter().find(|filler| filler.name == name).copied()
}

/// Record being applied
#[derive(Debug, Clone, Copy)]
pub struct RecordInfo {
    pub taxonomy: Guid,
    pub producer: Guid,
    pub header: RecordHeader,
}

/// Everything a filler may touch while applying one record
pub struct FillContext<'a> {
    registry: &'a mut Registry,
    strings: &'a dyn StringResolver,
    options: &'a EngineOptions,
    node: NodeId,
    record: RecordInfo,
}

impl<'a> FillContext<'a> {
    pub fn new(
        registry: &'a mut Registry,
        strings: &'a dyn StringResolver,
        options: &'a EngineOptions,
        node: NodeId,
        record: RecordInfo,
    ) -> Self {
        Self {
            registry,
            strings,
            options,
            node,
            record,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn record(&self) -> &RecordInfo {
        &self.record
    }

    /// Current bytes of the structure under construction
    pub fn structure(&self) -> Result<&[u8]> {
        Ok(self.registry.node(self.node)?.structure())
    }

    pub fn declared_len(&self) -> Result<usize> {
        Ok(self.registry.node(self.node)?.declared_len())
    }

    /// Copy `bytes` into the fixed part at `offset`
    pub fn write(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let node = self.registry.node_mut(self.node)?;
        validate_field_bounds(offset, bytes.len(), node.declared_len())?;
        node.structure[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    pub fn write_u8(&mut self, offset: usize, value: u8) -> Result<()> {
        self.write(offset, &[value])
    }

    pub fn write_u16(&mut self, offset: usize, value: u16) -> Result<()> {
        self.write(offset, &value.to_le_bytes())
    }

    pub fn write_u32(&mut self, offset: usize, value: u32) -> Result<()> {
        self.write(offset, &value.to_le_bytes())
    }

    /// Resolve a producer string token to ASCII text
    ///
    /// Token zero and unknown tokens resolve to nothing.
    pub fn resolve_text(&self, token: u16) -> Option<Vec<u8>> {
        if token == 0 {
            return None;
        }
        let units = self.strings.resolve(&self.record.producer, token)?;
        let (text, replaced) = to_ascii(units);
        if replaced > 0 {
            warn!(token, replaced, "replaced non-ASCII characters in string");
        }
        Some(text)
    }

    /// Store literal text in the string field at `offset`
    pub fn set_string(&mut self, offset: usize, text: Option<&[u8]>) -> Result<u8> {
        strings::set_string(self.registry, self.node, offset, text, self.options.string_limit())
    }

    /// Store the text behind `token` in the string field at `offset`
    pub fn set_string_token(&mut self, offset: usize, token: u16) -> Result<u8> {
        let text = self.resolve_text(token);
        self.set_string(offset, text.as_deref())
    }

    /// Append text to the string area without a referencing field
    pub fn append_string(&mut self, text: &[u8]) -> Result<u8> {
        strings::append_string(self.registry, self.node, text, self.options.string_limit())
    }

    /// Link the field at `offset` to another structure
    pub fn link(
        &mut self,
        offset: usize,
        target_schema: u8,
        target: IdentityKey,
    ) -> Result<LinkState> {
        fixup::link(self.registry, self.node, offset, target_schema, target)
    }

    /// Link the field at `offset` to the structure an [`InterLink`] names
    ///
    /// The target is looked up in `taxonomy`.
    pub fn link_to(
        &mut self,
        offset: usize,
        target_schema: u8,
        taxonomy: Guid,
        target: &InterLink,
    ) -> Result<LinkState> {
        let key = IdentityKey::new(taxonomy, target.instance, target.sub_instance, target.producer);
        self.link(offset, target_schema, key)
    }

    /// Grow the fixed part by `extra` bytes and return where they start
    pub fn extend_body(&mut self, extra: usize) -> Result<usize> {
        self.registry.extend_body(self.node, extra)
    }

    /// Replace the whole structure, keeping its handle
    pub fn load_structure(&mut self, bytes: &[u8]) -> Result<()> {
        self.registry.load_structure(self.node, bytes)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::catalog::StringCatalog;
    use crate::export::MemoryExportTable;
    use smbconv_core::format::constants::instance;
    use smbconv_core::taxonomy;

    /// A single structure and everything needed to run fillers on it
    pub(crate) struct Harness {
        pub registry: Registry,
        pub export: MemoryExportTable,
        pub strings: StringCatalog,
        pub options: EngineOptions,
        pub node: NodeId,
        pub record: RecordInfo,
    }

    impl Harness {
        pub fn new(schema: u8, min_len: usize) -> Self {
            let mut export = MemoryExportTable::new();
            let mut registry = Registry::new();
            let node = registry
                .create(schema, IdentityKey::placeholder(), min_len, &mut export)
                .unwrap();
            Self {
                registry,
                export,
                strings: StringCatalog::new(),
                options: EngineOptions::default(),
                node,
                record: RecordInfo {
                    taxonomy: taxonomy::MISC,
                    producer: Guid::NIL,
                    header: RecordHeader::new(1, 1, instance::NOT_APPLICABLE),
                },
            }
        }

        pub fn add_node(&mut self, schema: u8, key: IdentityKey, min_len: usize) -> NodeId {
            self.registry
                .create(schema, key, min_len, &mut self.export)
                .unwrap()
        }

        pub fn fill(&mut self, filler: Filler, offset: usize, input: &[u8]) -> Result<()> {
            let mut ctx = FillContext::new(
                &mut self.registry,
                &self.strings,
                &self.options,
                self.node,
                self.record,
            );
            filler.apply(&mut ctx, offset, input)
        }

        pub fn structure(&self) -> Vec<u8> {
            self.registry.node(self.node).unwrap().structure().to_vec()
        }

        pub fn word(&self, offset: usize) -> u16 {
            let s = self.structure();
            u16::from_le_bytes([s[offset], s[offset + 1]])
        }
    }
}
