#![cfg_attr(not(test), no_std)]

//! smbconv core - structure table format definitions
//!
//! This crate provides the wire format of exported structures and input
//! records, the string-area layout, the numeric field codecs and the
//! collaborator traits used by the conversion engine. It performs no I/O.

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod codec;
pub mod error;
pub mod format;
pub mod traits;
pub mod validation;

pub use error::*;
pub use format::*;
pub use traits::*;
