//! Binary format definitions for exported structures and input records
//!
//! This module contains pure data structure definitions and byte-level
//! scanning. No I/O operations.

pub mod constants;
pub mod guid;
pub mod header;
pub mod strings;

// Re-export format definitions
pub use guid::{taxonomy, Guid};
pub use header::{read_handle, write_handle, RecordHeader, StructureHeader};
pub use strings::{locate_string, string_at, string_count, structure_size, StringLayout};
