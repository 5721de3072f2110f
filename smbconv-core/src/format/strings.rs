//! String area layout of an exported structure
//!
//! After the declared fixed part a structure carries zero or more
//! NUL-terminated strings followed by one extra terminator byte. With no
//! strings the area is exactly two zero bytes. Strings are numbered from 1
//! in the order they were appended.

use core::ops::Range;

use super::constants::{MAX_STRING_COUNT, MAX_STRING_LEN, TERMINATOR_LEN};
use super::header::StructureHeader;
use crate::{ConvError, Result};

/// Result of scanning a structure's string area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringLayout {
    /// Declared fixed-part length from the header
    pub declared_len: usize,
    /// Number of strings in the area
    pub count: usize,
    /// Total structure size including the terminator
    pub size: usize,
}

impl StringLayout {
    /// Scan the string area of `structure`
    ///
    /// Bytes past the final terminator are ignored; the returned `size`
    /// says where the structure really ends.
    pub fn scan(structure: &[u8]) -> Result<Self> {
        let declared_len = declared_len(structure)?;
        let mut count = 0;
        let mut pos = declared_len;

        loop {
            match structure.get(pos) {
                None => return Err(ConvError::MissingTerminator),
                Some(0) if count == 0 => {
                    // Empty area needs a second zero byte
                    return match structure.get(pos + 1) {
                        Some(0) => Ok(Self {
                            declared_len,
                            count,
                            size: pos + TERMINATOR_LEN,
                        }),
                        _ => Err(ConvError::MissingTerminator),
                    };
                }
                Some(0) => {
                    return Ok(Self {
                        declared_len,
                        count,
                        size: pos + 1,
                    });
                }
                Some(_) => {
                    let nul = structure[pos..]
                        .iter()
                        .position(|&b| b == 0)
                        .ok_or(ConvError::MissingTerminator)?;
                    count += 1;
                    pos += nul + 1;
                }
            }
        }
    }

    /// Byte length of the string area including the terminator
    pub const fn area_len(&self) -> usize {
        self.size - self.declared_len
    }

    /// Offset at which the next appended string starts
    pub const fn insertion_point(&self) -> usize {
        if self.count == 0 {
            self.declared_len
        } else {
            self.size - 1
        }
    }

    /// Structure size after appending a string of `text_len` bytes
    ///
    /// The first string reuses the first of the two empty-area zero bytes
    /// as its own terminator; later strings need one extra byte.
    pub const fn appended_size(&self, text_len: usize) -> usize {
        if self.count == 0 {
            self.size + text_len
        } else {
            self.size + text_len + 1
        }
    }
}

/// Declared fixed-part length of a structure, checked against its size
pub fn declared_len(structure: &[u8]) -> Result<usize> {
    let header = StructureHeader::from_bytes(structure)?;
    let declared = header.length as usize;
    if declared > structure.len() {
        return Err(ConvError::InvalidHeader);
    }
    Ok(declared)
}

/// Total size of a structure: declared length plus string area
pub fn structure_size(structure: &[u8]) -> Result<usize> {
    StringLayout::scan(structure).map(|layout| layout.size)
}

/// Number of strings in a structure
pub fn string_count(structure: &[u8]) -> Result<usize> {
    StringLayout::scan(structure).map(|layout| layout.count)
}

/// Byte range of string `number` (1-based), excluding its NUL
pub fn locate_string(structure: &[u8], number: usize) -> Result<Range<usize>> {
    let layout = StringLayout::scan(structure)?;
    if number == 0 || number > layout.count {
        return Err(ConvError::InvalidIndex);
    }

    let mut start = layout.declared_len;
    for _ in 1..number {
        let nul = structure[start..]
            .iter()
            .position(|&b| b == 0)
            .ok_or(ConvError::MissingTerminator)?;
        start += nul + 1;
    }

    let len = structure[start..]
        .iter()
        .position(|&b| b == 0)
        .ok_or(ConvError::MissingTerminator)?;
    Ok(start..start + len)
}

/// Text of string `number` (1-based)
pub fn string_at(structure: &[u8], number: usize) -> Result<&[u8]> {
    locate_string(structure, number).map(|range| &structure[range])
}

/// Check that `text` may be stored as a string
///
/// Empty text is not storable; callers treat it as "no string" before
/// getting here.
pub fn validate_text(text: &[u8], max_len: usize) -> Result<()> {
    if text.is_empty() || text.contains(&0) {
        return Err(ConvError::InvalidSyntax);
    }
    if text.len() > max_len.min(MAX_STRING_LEN) {
        return Err(ConvError::StringTooLong);
    }
    Ok(())
}

/// Write an appended string into a structure already grown for it
///
/// `layout` must describe the structure before it was grown, and the
/// structure must be exactly `layout.appended_size(text.len())` bytes with
/// the grown tail zero-filled. Returns the new string's number.
pub fn place_appended(structure: &mut [u8], layout: &StringLayout, text: &[u8]) -> Result<u8> {
    if layout.count >= MAX_STRING_COUNT {
        return Err(ConvError::InvalidIndex);
    }
    if structure.len() != layout.appended_size(text.len()) {
        return Err(ConvError::InsufficientBuffer);
    }

    let at = layout.insertion_point();
    structure[at..at + text.len()].copy_from_slice(text);
    structure[at + text.len()..].fill(0);

    Ok((layout.count + 1) as u8)
}

/// Replace string `number` (1-based) with `text`, resizing the buffer
#[cfg(feature = "alloc")]
pub fn replace_string(
    structure: &mut alloc::vec::Vec<u8>,
    number: usize,
    text: &[u8],
) -> Result<()> {
    validate_text(text, MAX_STRING_LEN)?;
    let range = locate_string(structure, number)?;
    structure.splice(range, text.iter().copied());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn structure(strings: &[&[u8]]) -> [u8; 32] {
        let mut buf = [0u8; 32];
        buf[0] = 11;
        buf[1] = 5;
        buf[4] = strings.len() as u8;
        let mut pos = 5;
        for s in strings {
            buf[pos..pos + s.len()].copy_from_slice(s);
            pos += s.len() + 1;
        }
        buf
    }

    #[test]
    fn test_scan_empty_area() {
        let buf = structure(&[]);
        let layout = StringLayout::scan(&buf).unwrap();
        assert_eq!(layout.count, 0);
        assert_eq!(layout.size, 7);
        assert_eq!(layout.insertion_point(), 5);
        assert_eq!(layout.appended_size(3), 10);
    }

    #[test]
    fn test_scan_with_strings() {
        let buf = structure(&[b"abc", b"de"]);
        let layout = StringLayout::scan(&buf).unwrap();
        assert_eq!(layout.count, 2);
        // 5 + "abc\0" + "de\0" + final terminator
        assert_eq!(layout.size, 5 + 4 + 3 + 1);
        assert_eq!(layout.area_len(), 8);
        assert_eq!(layout.insertion_point(), 12);
        assert_eq!(string_at(&buf, 1).unwrap(), b"abc");
        assert_eq!(string_at(&buf, 2).unwrap(), b"de");
        assert_eq!(locate_string(&buf, 0), Err(ConvError::InvalidIndex));
        assert_eq!(locate_string(&buf, 3), Err(ConvError::InvalidIndex));
    }

    #[test]
    fn test_scan_missing_terminator() {
        let buf = [1u8, 4, 0, 0, b'x', b'y'];
        assert_eq!(StringLayout::scan(&buf), Err(ConvError::MissingTerminator));

        let lone = [1u8, 4, 0, 0, 0];
        assert_eq!(StringLayout::scan(&lone), Err(ConvError::MissingTerminator));
    }

    #[test]
    fn test_place_appended_first_string() {
        let mut buf = [0u8; 10];
        buf[..7].copy_from_slice(&structure(&[])[..7]);
        let layout = StringLayout::scan(&buf[..7]).unwrap();

        let number = place_appended(&mut buf, &layout, b"abc").unwrap();
        assert_eq!(number, 1);
        assert_eq!(&buf[5..], b"abc\0\0");
        assert_eq!(structure_size(&buf), Ok(10));
    }

    #[test]
    fn test_place_appended_rejects_wrong_size() {
        let buf = structure(&[b"abc"]);
        let layout = StringLayout::scan(&buf).unwrap();
        let mut short = [0u8; 12];
        short[..10].copy_from_slice(&buf[..10]);
        assert_eq!(
            place_appended(&mut short, &layout, b"xyz"),
            Err(ConvError::InsufficientBuffer)
        );
    }

    #[test]
    fn test_validate_text() {
        assert_eq!(validate_text(b"ok", 64), Ok(()));
        assert_eq!(validate_text(b"", 64), Err(ConvError::InvalidSyntax));
        assert_eq!(validate_text(b"a\0b", 64), Err(ConvError::InvalidSyntax));
        assert_eq!(validate_text(&[b'a'; 65], 64), Err(ConvError::StringTooLong));
        assert_eq!(validate_text(&[b'a'; 9], 8), Err(ConvError::StringTooLong));
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn test_replace_string_resizes() {
        let mut buf = structure(&[b"abc", b"de"]).to_vec();
        buf.truncate(13);

        replace_string(&mut buf, 1, b"longer").unwrap();
        assert_eq!(string_at(&buf, 1).unwrap(), b"longer");
        assert_eq!(string_at(&buf, 2).unwrap(), b"de");
        assert_eq!(structure_size(&buf), Ok(buf.len()));

        replace_string(&mut buf, 2, b"z").unwrap();
        assert_eq!(string_at(&buf, 2).unwrap(), b"z");
        assert_eq!(structure_size(&buf), Ok(buf.len()));
    }
}
