//! Exponent-coded numeric values
//!
//! Producers report measurements as a mantissa with a decimal or binary
//! exponent. Structures store plain integers in a fixed unit, so the value
//! is rescaled until its exponent equals the unit's target exponent:
//! `result = mantissa * base^(exponent - target)`.
//!
//! Decimal rescaling truncates toward zero when dividing. Binary values
//! whose result does not fit in 15 bits may be stored in a coarser
//! granularity (64 times larger units), flagged by bit 15.

use bytemuck::{Pod, Zeroable};

use crate::validation::expect_input_size;
use crate::{ConvError, Result};

/// Target exponents used across schemas
pub mod target {
    /// Decimal mega units (Hz to MHz)
    pub const MEGA: i32 = 6;
    /// Decimal "nano" convention: the value is expressed against 10^9
    pub const NANO: i32 = 9;
    /// Decimal tenths (volts to decivolts)
    pub const DECI: i32 = -1;
    /// Binary kilo units (bytes to KiB)
    pub const KILO: u16 = 10;
    /// Binary mega units (bytes to MiB)
    pub const MEGA_BINARY: u16 = 20;
    /// Binary 64 KiB units
    pub const UNITS_64K: u16 = 16;
}

/// Bit 15 of a granular word: the value counts 64 KiB units instead of 1 KiB
pub const GRANULARITY_64K: u16 = 0x8000;

/// Mantissa and decimal exponent, both signed
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct ExpBase10 {
    pub value: i16,
    pub exponent: i16,
}

impl ExpBase10 {
    /// Size of the encoded value in bytes
    pub const SIZE: usize = 4;

    pub const fn new(value: i16, exponent: i16) -> Self {
        Self { value, exponent }
    }

    /// Decode from filler input, which must be exactly 4 bytes
    pub fn from_bytes(input: &[u8]) -> Result<Self> {
        expect_input_size(input, Self::SIZE)?;
        Ok(bytemuck::pod_read_unaligned(input))
    }

    pub fn to_bytes(&self) -> [u8; 4] {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(bytemuck::bytes_of(self));
        bytes
    }

    /// Rescale to `target` exponent
    pub fn rescale(&self, target: i32) -> Result<i64> {
        rescale_base10(self.value as i64, self.exponent as i32, target)
    }
}

/// Mantissa and binary exponent, both unsigned
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct ExpBase2 {
    pub value: u16,
    pub exponent: u16,
}

impl ExpBase2 {
    /// Size of the encoded value in bytes
    pub const SIZE: usize = 4;

    pub const fn new(value: u16, exponent: u16) -> Self {
        Self { value, exponent }
    }

    /// Decode from filler input, which must be exactly 4 bytes
    pub fn from_bytes(input: &[u8]) -> Result<Self> {
        expect_input_size(input, Self::SIZE)?;
        Ok(bytemuck::pod_read_unaligned(input))
    }

    pub fn to_bytes(&self) -> [u8; 4] {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(bytemuck::bytes_of(self));
        bytes
    }

    /// Rescale to `target` exponent
    pub fn rescale(&self, target: u16) -> Result<u64> {
        rescale_base2(self.value, self.exponent, target)
    }
}

/// Multiply by 10 while the exponent is above `target`, divide (truncating)
/// while it is below
pub fn rescale_base10(value: i64, exponent: i32, target: i32) -> Result<i64> {
    let mut value = value;
    let mut exponent = exponent;

    while exponent > target {
        value = value.checked_mul(10).ok_or(ConvError::ValueOutOfRange)?;
        exponent -= 1;
    }
    while exponent < target && value != 0 {
        value /= 10;
        exponent += 1;
    }

    Ok(value)
}

/// Shift left by `exponent - target`, or right when the exponent is smaller
pub fn rescale_base2(value: u16, exponent: u16, target: u16) -> Result<u64> {
    let value = value as u64;

    if exponent >= target {
        let shift = (exponent - target) as u32;
        if shift >= u64::BITS || value.leading_zeros() < shift {
            return Err(ConvError::ValueOutOfRange);
        }
        Ok(value << shift)
    } else {
        let shift = (target - exponent) as u32;
        Ok(value.checked_shr(shift).unwrap_or(0))
    }
}

/// Decimal value to an unsigned byte in the `target` unit
pub fn base10_to_u8(input: &[u8], target: i32) -> Result<u8> {
    let value = ExpBase10::from_bytes(input)?.rescale(target)?;
    u8::try_from(value).map_err(|_| ConvError::ValueOutOfRange)
}

/// Decimal value to an unsigned word in the `target` unit
pub fn base10_to_u16(input: &[u8], target: i32) -> Result<u16> {
    let value = ExpBase10::from_bytes(input)?.rescale(target)?;
    u16::try_from(value).map_err(|_| ConvError::ValueOutOfRange)
}

/// Binary value to a word with the 64 KiB granularity flag
///
/// Results up to 0x7FFF are stored as is. Larger results are shifted right
/// by 6 more bits and bit 15 is set.
pub fn base2_to_granular_u16(input: &[u8], target: u16) -> Result<u16> {
    let value = ExpBase2::from_bytes(input)?.rescale(target)?;
    if value <= 0x7FFF {
        return Ok(value as u16);
    }

    let coarse = value >> 6;
    if coarse > 0x7FFF {
        return Err(ConvError::ValueOutOfRange);
    }
    Ok(coarse as u16 | GRANULARITY_64K)
}

/// Binary value to a byte, no granularity flag
pub fn base2_to_u8(input: &[u8], target: u16) -> Result<u8> {
    let value = ExpBase2::from_bytes(input)?.rescale(target)?;
    u8::try_from(value).map_err(|_| ConvError::ValueOutOfRange)
}

/// Binary value to a word, no granularity flag
pub fn base2_to_u16(input: &[u8], target: u16) -> Result<u16> {
    let value = ExpBase2::from_bytes(input)?.rescale(target)?;
    u16::try_from(value).map_err(|_| ConvError::ValueOutOfRange)
}

/// Binary value to a double word, no granularity flag
pub fn base2_to_u32(input: &[u8], target: u16) -> Result<u32> {
    let value = ExpBase2::from_bytes(input)?.rescale(target)?;
    u32::try_from(value).map_err(|_| ConvError::ValueOutOfRange)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base10_nano_identity() {
        let input = ExpBase10::new(10, 9).to_bytes();
        assert_eq!(base10_to_u8(&input, target::NANO), Ok(10));
    }

    #[test]
    fn test_base10_mega_from_hz() {
        // 2.4 GHz reported as 24 * 10^8 Hz
        let input = ExpBase10::new(24, 8).to_bytes();
        assert_eq!(base10_to_u16(&input, target::MEGA), Ok(2400));

        // 133.33 MHz reported as 13333 * 10^4 truncates to 133
        let input = ExpBase10::new(13333, 4).to_bytes();
        assert_eq!(base10_to_u16(&input, target::MEGA), Ok(133));
    }

    #[test]
    fn test_base10_rejects_overflow_and_negative() {
        let input = ExpBase10::new(7, 12).to_bytes();
        assert_eq!(
            base10_to_u16(&input, target::MEGA),
            Err(ConvError::ValueOutOfRange)
        );

        let input = ExpBase10::new(-5, 6).to_bytes();
        assert_eq!(
            base10_to_u16(&input, target::MEGA),
            Err(ConvError::ValueOutOfRange)
        );
    }

    #[test]
    fn test_base10_rejects_wrong_shape() {
        assert_eq!(
            base10_to_u8(&[10, 0, 9], target::NANO),
            Err(ConvError::SizeMismatch)
        );
        assert_eq!(
            base10_to_u8(&[10, 0, 9, 0, 0], target::NANO),
            Err(ConvError::SizeMismatch)
        );
    }

    #[test]
    fn test_base2_kilo_granularity() {
        let input = ExpBase2::new(64, 20).to_bytes();
        assert_eq!(base2_to_granular_u16(&input, target::KILO), Ok(0x8400));

        // 512 KiB fits without the flag
        let input = ExpBase2::new(512, 10).to_bytes();
        assert_eq!(base2_to_granular_u16(&input, target::KILO), Ok(512));

        // 0x7FFF KiB is the largest fine-grained value
        let input = ExpBase2::new(0x7FFF, 10).to_bytes();
        assert_eq!(base2_to_granular_u16(&input, target::KILO), Ok(0x7FFF));
    }

    #[test]
    fn test_base2_64k_byte() {
        // 1 MiB is 16 units of 64 KiB
        let input = ExpBase2::new(1, 20).to_bytes();
        assert_eq!(base2_to_u8(&input, target::UNITS_64K), Ok(16));

        let input = ExpBase2::new(1, 30).to_bytes();
        assert_eq!(
            base2_to_u8(&input, target::UNITS_64K),
            Err(ConvError::ValueOutOfRange)
        );
    }

    #[test]
    fn test_base2_smaller_exponent_shifts_right() {
        assert_eq!(rescale_base2(4096, 0, 10), Ok(4));
        assert_eq!(rescale_base2(1, 0, 80), Ok(0));
        assert_eq!(rescale_base2(1, 70, 0), Err(ConvError::ValueOutOfRange));
    }
}
