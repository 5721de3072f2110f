//! Engine options

use smbconv_core::format::constants::MAX_STRING_LEN;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Behaviour switches for one conversion run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineOptions {
    /// Create empty structures for required schemas nobody reported
    pub synthesize_required: bool,
    /// Append the end-of-table structure when finishing
    pub end_of_table: bool,
    /// Longest string accepted, capped at the format maximum
    pub max_string_len: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            synthesize_required: true,
            end_of_table: true,
            max_string_len: MAX_STRING_LEN,
        }
    }
}

impl EngineOptions {
    pub fn with_synthesize_required(mut self, enabled: bool) -> Self {
        self.synthesize_required = enabled;
        self
    }

    pub fn with_end_of_table(mut self, enabled: bool) -> Self {
        self.end_of_table = enabled;
        self
    }

    pub fn with_max_string_len(mut self, len: usize) -> Self {
        self.max_string_len = len.min(MAX_STRING_LEN);
        self
    }

    /// Effective string limit; deserialized values may exceed the cap
    pub fn string_limit(&self) -> usize {
        self.max_string_len.min(MAX_STRING_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_limit_capped() {
        let options = EngineOptions::default().with_max_string_len(200);
        assert_eq!(options.max_string_len, MAX_STRING_LEN);
        assert_eq!(EngineOptions::default().with_max_string_len(8).string_limit(), 8);

        let oversized = EngineOptions {
            max_string_len: 1000,
            ..EngineOptions::default()
        };
        assert_eq!(oversized.string_limit(), MAX_STRING_LEN);
    }
}
