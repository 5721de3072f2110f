//! Validation utilities for structure editing
//!
//! Pure validation and parsing functions with no I/O dependencies.

pub mod bounds;
pub mod parsing;

pub use bounds::{
    expect_input_size, read_array, read_u16, read_u32, read_u64, validate_declared_len,
    validate_field_bounds,
};
pub use parsing::{parse_guid, parse_hex, parse_schema_id};
