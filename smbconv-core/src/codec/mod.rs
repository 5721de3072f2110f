//! Field encoding primitives
//!
//! Pure transforms from producer value shapes to structure field values.
//! Every primitive rejects input whose size does not match its shape
//! instead of truncating it.

pub mod bits;
pub mod exponent;
pub mod link;
pub mod narrow;

pub use bits::{compose_flag_byte, pack_bits, swap_fields, BitField};
pub use exponent::{
    base10_to_u16, base10_to_u8, base2_to_granular_u16, base2_to_u16, base2_to_u32, base2_to_u8,
    rescale_base10, rescale_base2, ExpBase10, ExpBase2,
};
pub use link::InterLink;
pub use narrow::{narrow, truncate_to_byte, truncate_to_word};
