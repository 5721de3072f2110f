//! Field bounds and input shape validation
//!
//! Pure checks on offsets and sizes with no I/O dependencies. Every field
//! filler runs its input through [`expect_input_size`] before decoding it.

use crate::format::constants::{STRUCTURE_HEADER_SIZE, TERMINATOR_LEN};
use crate::ConvError;

/// Validate that a field of `width` bytes at `offset` lies inside the
/// declared fixed part and does not touch the header
pub const fn validate_field_bounds(
    offset: usize,
    width: usize,
    declared_len: usize,
) -> Result<(), ConvError> {
    if offset < STRUCTURE_HEADER_SIZE {
        return Err(ConvError::IndexOutOfBounds);
    }

    match offset.checked_add(width) {
        Some(end) if end <= declared_len => Ok(()),
        _ => Err(ConvError::IndexOutOfBounds),
    }
}

/// Validate that filler input has exactly the expected declared size
pub const fn expect_input_size(input: &[u8], expected: usize) -> Result<(), ConvError> {
    if input.len() != expected {
        return Err(ConvError::SizeMismatch);
    }
    Ok(())
}

/// Validate a declared length and return the matching empty structure size
///
/// The declared length is stored in one byte, so it must fit in a `u8`.
pub const fn validate_declared_len(declared_len: usize) -> Result<usize, ConvError> {
    if declared_len < STRUCTURE_HEADER_SIZE || declared_len > u8::MAX as usize {
        return Err(ConvError::InvalidHeader);
    }
    Ok(declared_len + TERMINATOR_LEN)
}

/// Read a fixed-size array from the input at `offset`
pub fn read_array<const N: usize>(input: &[u8], offset: usize) -> Result<[u8; N], ConvError> {
    let end = offset.checked_add(N).ok_or(ConvError::SizeMismatch)?;
    input
        .get(offset..end)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(ConvError::SizeMismatch)
}

/// Read a little-endian `u16` from the input at `offset`
pub fn read_u16(input: &[u8], offset: usize) -> Result<u16, ConvError> {
    read_array::<2>(input, offset).map(u16::from_le_bytes)
}

/// Read a little-endian `u32` from the input at `offset`
pub fn read_u32(input: &[u8], offset: usize) -> Result<u32, ConvError> {
    read_array::<4>(input, offset).map(u32::from_le_bytes)
}

/// Read a little-endian `u64` from the input at `offset`
pub fn read_u64(input: &[u8], offset: usize) -> Result<u64, ConvError> {
    read_array::<8>(input, offset).map(u64::from_le_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_field_bounds() {
        assert_eq!(validate_field_bounds(4, 1, 5), Ok(()));
        assert_eq!(validate_field_bounds(0x1E, 2, 0x20), Ok(()));

        // Header bytes are never filler targets
        assert_eq!(
            validate_field_bounds(2, 2, 0x20),
            Err(ConvError::IndexOutOfBounds)
        );
        assert_eq!(
            validate_field_bounds(0x1F, 2, 0x20),
            Err(ConvError::IndexOutOfBounds)
        );
        assert_eq!(
            validate_field_bounds(usize::MAX, 2, 0x20),
            Err(ConvError::IndexOutOfBounds)
        );
    }

    #[test]
    fn test_expect_input_size() {
        assert_eq!(expect_input_size(&[0; 4], 4), Ok(()));
        assert_eq!(expect_input_size(&[0; 3], 4), Err(ConvError::SizeMismatch));
        assert_eq!(expect_input_size(&[0; 5], 4), Err(ConvError::SizeMismatch));
    }

    #[test]
    fn test_validate_declared_len() {
        assert_eq!(validate_declared_len(4), Ok(6));
        assert_eq!(validate_declared_len(0x18), Ok(0x1A));
        assert_eq!(validate_declared_len(3), Err(ConvError::InvalidHeader));
        assert_eq!(validate_declared_len(256), Err(ConvError::InvalidHeader));
    }

    #[test]
    fn test_read_helpers() {
        let input = [0x34, 0x12, 0x78, 0x56, 0x00, 0x00, 0x00, 0x00, 0xAA];
        assert_eq!(read_u16(&input, 0), Ok(0x1234));
        assert_eq!(read_u32(&input, 0), Ok(0x5678_1234));
        assert_eq!(read_u64(&input, 0), Ok(0x5678_1234));
        assert_eq!(read_u16(&input, 8), Err(ConvError::SizeMismatch));
    }
}
