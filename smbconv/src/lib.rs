//! smbconv - table-driven structure table builder
//!
//! This library turns a stream of producer records into an exported table
//! of fixed-layout structures with trailing string areas. Each record is
//! matched to a conversion rule, which locates (or creates) a structure and
//! fills one field or region of it.
//!
//! ## Architecture
//!
//! smbconv follows the same split as its core crate:
//!
//! - **smbconv-core**: wire formats, string-area layout, field codecs and
//!   collaborator traits (no I/O)
//! - **smbconv**: the engine, structure registry, fillers, configuration and
//!   record file input
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use smbconv::{Engine, RecordFile, StringCatalog};
//!
//! fn example() -> smbconv::Result<()> {
//!     let strings = StringCatalog::from_file("strings.json")?;
//!     let mut engine = Engine::builtin(strings);
//!
//!     let records = RecordFile::open("records.smdr")?;
//!     for record in records.records() {
//!         engine.process(&record?)?;
//!     }
//!
//!     let table = engine.finish()?;
//!     println!("{} structures, {} bytes", table.structure_count(), table.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Transactional records**: a record that fails leaves the table as it was
//! - **Order independence**: links to structures not seen yet are patched
//!   in when the target appears
//! - **Configurable tables**: rules and schemas load from JSON (`serde`)
//! - **Memory-mapped input**: record files are read in place (`mmap`)

// Re-export core abstractions and format definitions
pub use smbconv_core::{
    // Collaborator traits
    ExportTable, StringResolver,
    // Format definitions
    taxonomy, Guid, RecordHeader, StructureHeader,
    // Error handling
    ConvError,
};

pub mod catalog;
pub mod engine;
pub mod error;
pub mod export;
pub mod fill;
pub mod fixup;
pub mod options;
pub mod record;
#[cfg(feature = "mmap")]
pub mod record_file;
pub mod registry;
pub mod rules;
pub mod strings;
pub mod table;

// Public exports
pub use catalog::{CatalogEntry, StringCatalog};
pub use engine::{Engine, EngineStats};
pub use error::{Disposition, DropReason, EngineError, Result};
pub use export::MemoryExportTable;
pub use fill::{filler_by_name, FillContext, Filler, FILLERS};
pub use fixup::{LinkFixupEntry, LinkState};
pub use options::EngineOptions;
pub use record::DataRecord;
pub use registry::{IdentityKey, NodeId, Registry, StructureNode};
pub use rules::{
    ConversionRule, FillingMethod, LocatingMethod, RuleTable, SchemaMetadata, SchemaTable,
};
pub use table::TableImage;

// Configuration files
#[cfg(feature = "serde")]
pub use rules::config::{ConversionConfig, RuleSpec};

// Record file input
#[cfg(feature = "mmap")]
pub use record_file::{encode_records, parse_records, RecordFile, RecordFileWriter};
