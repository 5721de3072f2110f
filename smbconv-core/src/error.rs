//! Error types for structure conversion

/// Errors that can occur while encoding or editing a structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvError {
    /// Record or structure header is malformed
    InvalidHeader,
    /// Instance or sub-instance carries the reserved sentinel
    ReservedInstance,
    /// Filler input does not have the expected declared size
    SizeMismatch,
    /// Field value cannot be represented at the target width
    ValueOutOfRange,
    /// String exceeds the maximum allowed length
    StringTooLong,
    /// 1-based index is zero or past the end
    InvalidIndex,
    /// Field write falls outside the declared fixed part
    IndexOutOfBounds,
    /// String area is missing its terminator
    MissingTerminator,
    /// Handle is not known to the export table
    UnknownHandle,
    /// Export table cannot assign another handle
    HandlesExhausted,
    /// Insufficient buffer space
    InsufficientBuffer,
    /// Text is not a valid GUID or number
    InvalidSyntax,
}

impl core::fmt::Display for ConvError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            ConvError::InvalidHeader => "Invalid header",
            ConvError::ReservedInstance => "Reserved instance number",
            ConvError::SizeMismatch => "Input size does not match field shape",
            ConvError::ValueOutOfRange => "Value out of range for field width",
            ConvError::StringTooLong => "String exceeds maximum length",
            ConvError::InvalidIndex => "Invalid 1-based index",
            ConvError::IndexOutOfBounds => "Field outside structure body",
            ConvError::MissingTerminator => "String area not terminated",
            ConvError::UnknownHandle => "Unknown structure handle",
            ConvError::HandlesExhausted => "No structure handles left",
            ConvError::InsufficientBuffer => "Insufficient buffer space",
            ConvError::InvalidSyntax => "Invalid syntax",
        };
        write!(f, "{msg}")
    }
}

impl core::error::Error for ConvError {}

/// Result type for conversion operations
pub type Result<T> = core::result::Result<T, ConvError>;
