//! Producer string catalog
//!
//! Records refer to text by a 16-bit token scoped to their producer. The
//! catalog maps `(producer, token)` to UCS-2 text; structures store ASCII,
//! so resolved text is transliterated with [`to_ascii`].

use hashbrown::HashMap;
use smbconv_core::{Guid, StringResolver};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Replacement for characters outside 7-bit ASCII
pub const REPLACEMENT: u8 = b'?';

/// Convert UCS-2 text to ASCII, stopping at the first NUL
///
/// Returns the text and the number of characters that were replaced.
pub fn to_ascii(text: &[u16]) -> (Vec<u8>, usize) {
    let mut replaced = 0;
    let ascii = text
        .iter()
        .take_while(|&&unit| unit != 0)
        .map(|&unit| match u8::try_from(unit) {
            Ok(byte) if byte.is_ascii() => byte,
            _ => {
                replaced += 1;
                REPLACEMENT
            }
        })
        .collect();
    (ascii, replaced)
}

/// One catalog entry as stored in JSON
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CatalogEntry {
    pub producer: Guid,
    pub token: u16,
    pub text: String,
}

/// In-memory string catalog
#[derive(Debug, Clone, Default)]
pub struct StringCatalog {
    entries: HashMap<(Guid, u16), Vec<u16>>,
}

impl StringCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `text` under `(producer, token)`, replacing any previous text
    pub fn insert(&mut self, producer: Guid, token: u16, text: &str) {
        self.entries
            .insert((producer, token), text.encode_utf16().collect());
    }

    pub fn with(mut self, producer: Guid, token: u16, text: &str) -> Self {
        self.insert(producer, token, text);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load a catalog from a JSON array of [`CatalogEntry`]
    #[cfg(feature = "serde")]
    pub fn from_json_str(json: &str) -> crate::error::Result<Self> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)?;
        Ok(entries.into_iter().collect())
    }

    #[cfg(feature = "serde")]
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> crate::error::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

impl FromIterator<CatalogEntry> for StringCatalog {
    fn from_iter<I: IntoIterator<Item = CatalogEntry>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for entry in iter {
            catalog.insert(entry.producer, entry.token, &entry.text);
        }
        catalog
    }
}

impl StringResolver for StringCatalog {
    fn resolve(&self, producer: &Guid, token: u16) -> Option<&[u16]> {
        self.entries.get(&(*producer, token)).map(Vec::as_slice)
    }
}
