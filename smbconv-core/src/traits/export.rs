//! Export table interface
//!
//! The export table owns published structures and assigns their handles.
//! Implementations may move a structure's bytes on any mutating call, so
//! callers look structures up by handle every time instead of keeping
//! references across `add`, `remove`, `replace` or `update_string`.

use alloc::vec::Vec;

use crate::format::strings::replace_string;
use crate::{ConvError, Result};

/// Collection of published structures addressed by handle
pub trait ExportTable {
    /// Publish a new structure and return its handle
    ///
    /// The implementation stores the handle in bytes 2..4 of the structure.
    fn add(&mut self, structure: Vec<u8>) -> Result<u16>;

    /// Withdraw a published structure
    fn remove(&mut self, handle: u16) -> Result<()>;

    /// Bytes of the structure published under `handle`
    fn structure(&self, handle: u16) -> Option<&[u8]>;

    /// Bytes of a published structure, if `handle` names one of `schema`
    fn get(&self, handle: u16, schema: u8) -> Option<&[u8]> {
        self.structure(handle)
            .filter(|structure| structure.first() == Some(&schema))
    }

    /// Replace the payload published under `handle`
    ///
    /// The handle stays the same; bytes 2..4 are rewritten to match it.
    fn replace(&mut self, handle: u16, structure: Vec<u8>) -> Result<()>;

    /// All published handles in ascending order
    fn handles(&self) -> Vec<u16>;

    /// Number of published structures
    fn len(&self) -> usize {
        self.handles().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace string `number` of a published structure in place
    ///
    /// The default implementation copies the structure out, edits it and
    /// republishes it under the same handle.
    fn update_string(&mut self, handle: u16, schema: u8, number: usize, text: &[u8]) -> Result<()> {
        let mut structure = self
            .get(handle, schema)
            .ok_or(ConvError::UnknownHandle)?
            .to_vec();
        replace_string(&mut structure, number, text)?;
        self.replace(handle, structure)
    }
}
