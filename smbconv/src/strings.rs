//! String table manager
//!
//! Edits the string area of a structure under construction. A string
//! field holds a 1-based string number, or zero for "no string".

use smbconv_core::format::strings::{place_appended, replace_string, validate_text};
use smbconv_core::validation::validate_field_bounds;
use smbconv_core::StringLayout;
use tracing::trace;

use crate::error::Result;
use crate::registry::{NodeId, Registry};

/// Store `text` as the string referenced by the field at `offset`
///
/// Empty or missing text writes zero. If the field already names a
/// string that string is replaced in place; otherwise the text is
/// appended and its number written to the field. Returns the number now
/// in the field.
pub fn set_string(
    registry: &mut Registry,
    id: NodeId,
    offset: usize,
    text: Option<&[u8]>,
    max_len: usize,
) -> Result<u8> {
    let node = registry.node(id)?;
    validate_field_bounds(offset, 1, node.declared_len())?;
    let current = node.structure()[offset];

    let Some(text) = text.filter(|text| !text.is_empty()) else {
        registry.node_mut(id)?.structure[offset] = 0;
        return Ok(0);
    };
    validate_text(text, max_len)?;

    if current != 0 {
        let node = registry.node_mut(id)?;
        replace_string(&mut node.structure, current as usize, text)?;
        node.refresh_size()?;
        trace!(offset, number = current, "replaced string");
        return Ok(current);
    }

    let number = append_string(registry, id, text, max_len)?;
    registry.node_mut(id)?.structure[offset] = number;
    Ok(number)
}

/// Append `text` to the string area and return its number
pub fn append_string(
    registry: &mut Registry,
    id: NodeId,
    text: &[u8],
    max_len: usize,
) -> Result<u8> {
    validate_text(text, max_len)?;

    let layout = StringLayout::scan(registry.node(id)?.structure())?;
    let new_total = layout.appended_size(text.len());
    registry.grow(id, layout.declared_len, layout.size, new_total)?;

    let node = registry.node_mut(id)?;
    let number = place_appended(&mut node.structure, &layout, text)?;
    node.refresh_size()?;
    trace!(number, size = new_total, "appended string");
    Ok(number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::MemoryExportTable;
    use crate::registry::IdentityKey;
    use smbconv_core::format::constants::MAX_STRING_LEN;
    use smbconv_core::{string_at, ConvError};

    fn setup() -> (Registry, NodeId) {
        let mut export = MemoryExportTable::new();
        let mut registry = Registry::new();
        let id = registry
            .create(8, IdentityKey::placeholder(), 0x0B, &mut export)
            .unwrap();
        (registry, id)
    }

    #[test]
    fn test_first_string_layout() {
        let (mut registry, id) = setup();
        assert_eq!(set_string(&mut registry, id, 4, Some(b"ABC"), MAX_STRING_LEN).unwrap(), 1);

        let node = registry.node(id).unwrap();
        assert_eq!(node.size(), 0x09 + 3 + 2);
        assert_eq!(&node.structure()[0x09..], b"ABC\0\0");
        assert_eq!(node.structure()[4], 1);
    }

    #[test]
    fn test_second_string_and_replace() {
        let (mut registry, id) = setup();
        set_string(&mut registry, id, 4, Some(b"J1"), MAX_STRING_LEN).unwrap();
        assert_eq!(set_string(&mut registry, id, 6, Some(b"USB"), MAX_STRING_LEN).unwrap(), 2);
        assert_eq!(registry.node(id).unwrap().size(), 0x09 + 3 + 4 + 1);

        assert_eq!(set_string(&mut registry, id, 4, Some(b"Rear J1"), MAX_STRING_LEN).unwrap(), 1);
        let node = registry.node(id).unwrap();
        assert_eq!(string_at(node.structure(), 1).unwrap(), b"Rear J1");
        assert_eq!(string_at(node.structure(), 2).unwrap(), b"USB");
        assert_eq!(node.size(), 0x09 + 8 + 4 + 1);
    }

    #[test]
    fn test_empty_text_clears_field() {
        let (mut registry, id) = setup();
        set_string(&mut registry, id, 4, Some(b"X"), MAX_STRING_LEN).unwrap();
        assert_eq!(set_string(&mut registry, id, 4, None, MAX_STRING_LEN).unwrap(), 0);
        assert_eq!(set_string(&mut registry, id, 4, Some(b""), MAX_STRING_LEN).unwrap(), 0);
        assert_eq!(registry.node(id).unwrap().structure()[4], 0);
    }

    #[test]
    fn test_empty_text_leaves_buffer_unchanged() {
        let (mut registry, id) = setup();
        let before = registry.node(id).unwrap().structure().to_vec();

        assert_eq!(set_string(&mut registry, id, 4, None, MAX_STRING_LEN).unwrap(), 0);
        assert_eq!(registry.node(id).unwrap().structure(), &before[..]);
        assert_eq!(set_string(&mut registry, id, 4, Some(b""), MAX_STRING_LEN).unwrap(), 0);
        assert_eq!(registry.node(id).unwrap().structure(), &before[..]);
        assert_eq!(registry.node(id).unwrap().size(), 0x0B);
    }

    #[test]
    fn test_rejects_long_and_out_of_bounds() {
        let (mut registry, id) = setup();
        let long = [b'x'; MAX_STRING_LEN + 1];
        let err = set_string(&mut registry, id, 4, Some(&long), MAX_STRING_LEN).unwrap_err();
        assert_eq!(err.conversion(), Some(ConvError::StringTooLong));

        let err = set_string(&mut registry, id, 0x09, Some(b"A"), MAX_STRING_LEN).unwrap_err();
        assert_eq!(err.conversion(), Some(ConvError::IndexOutOfBounds));
        assert_eq!(registry.node(id).unwrap().size(), 0x0B);
    }
}
