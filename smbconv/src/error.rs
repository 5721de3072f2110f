//! Engine error and outcome types

use smbconv_core::ConvError;
use thiserror::Error;

use crate::registry::NodeId;

/// Errors raised while converting a record or finishing a table
#[derive(Debug, Error)]
pub enum EngineError {
    /// A field filler or structure edit failed
    #[error("conversion failed: {0}")]
    Conversion(#[from] ConvError),

    /// A rule targets a schema with no metadata entry
    #[error("no metadata for schema {0:#04x}")]
    UnknownSchema(u8),

    /// Allocating a structure buffer failed
    #[error("out of resources allocating {0} bytes")]
    OutOfResources(usize),

    /// A node id no longer names a live structure
    #[error("stale structure node {0:?}")]
    StaleNode(NodeId),

    /// A configured filler name is not registered
    #[error("unknown filler `{0}`")]
    UnknownFiller(String),

    /// Configuration is internally inconsistent
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Record file is malformed
    #[error("record file: {0}")]
    RecordFile(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[cfg(feature = "serde")]
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    /// Underlying conversion error, if this is one
    pub fn conversion(&self) -> Option<ConvError> {
        match self {
            EngineError::Conversion(err) => Some(*err),
            _ => None,
        }
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Why a record was dropped without changing any state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// Record is too short to carry a header
    MalformedHeader,
    /// No rule matches the record's taxonomy and type
    NoRule,
    /// Header size field is not the fixed header size
    HeaderSize,
    /// Instance or sub-instance carries the reserved value
    ReservedInstance,
}

/// Outcome of processing one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The record was applied to a structure
    Converted {
        node: NodeId,
        handle: u16,
        created: bool,
    },
    /// The record was ignored
    Dropped(DropReason),
}

impl Disposition {
    pub fn is_converted(&self) -> bool {
        matches!(self, Disposition::Converted { .. })
    }
}
