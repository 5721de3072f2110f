//! Collaborator interfaces
//!
//! The conversion engine talks to the export table and to the string
//! source only through these traits. They are pure interfaces; concrete
//! implementations live in the engine crate.

#[cfg(feature = "alloc")]
pub mod export;
pub mod resolver;

#[cfg(feature = "alloc")]
pub use export::ExportTable;
pub use resolver::{NoStrings, StringResolver};
