//! Narrowing copies between fixed field widths
//!
//! Producers frequently report enumerations as 32-bit values that a
//! structure stores in a byte or a word. The low-order bytes are kept.

use crate::validation::expect_input_size;
use crate::Result;

/// Keep the low `N` bytes of a little-endian value `input_width` bytes wide
pub fn narrow<const N: usize>(input: &[u8], input_width: usize) -> Result<[u8; N]> {
    expect_input_size(input, input_width)?;

    let mut out = [0u8; N];
    let keep = N.min(input_width);
    out[..keep].copy_from_slice(&input[..keep]);
    Ok(out)
}

/// Truncate a value to one byte
pub fn truncate_to_byte(input: &[u8], input_width: usize) -> Result<u8> {
    narrow::<1>(input, input_width).map(|b| b[0])
}

/// Truncate a value to a little-endian word
pub fn truncate_to_word(input: &[u8], input_width: usize) -> Result<u16> {
    narrow::<2>(input, input_width).map(u16::from_le_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConvError;

    #[test]
    fn test_truncate_to_byte() {
        assert_eq!(truncate_to_byte(&0x0000_0103u32.to_le_bytes(), 4), Ok(0x03));
        assert_eq!(truncate_to_byte(&[0x7F], 1), Ok(0x7F));
        assert_eq!(
            truncate_to_byte(&[1, 2], 4),
            Err(ConvError::SizeMismatch)
        );
    }

    #[test]
    fn test_truncate_to_word() {
        assert_eq!(truncate_to_word(&0x0012_3456u32.to_le_bytes(), 4), Ok(0x3456));
        assert_eq!(
            truncate_to_word(&[1, 2, 3, 4, 5], 4),
            Err(ConvError::SizeMismatch)
        );
    }

    #[test]
    fn test_narrow_widens_with_zeroes() {
        assert_eq!(narrow::<4>(&[0xAB], 1), Ok([0xAB, 0, 0, 0]));
    }
}
