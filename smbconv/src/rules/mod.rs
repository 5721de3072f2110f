//! Conversion rules and schema metadata
//!
//! A [`ConversionRule`] says which structure a record of a given taxonomy
//! and type contributes to, how the structure is located, and how the
//! payload is written into it. [`SchemaMetadata`] gives each schema its
//! empty size and whether the final table must contain it.

use std::collections::BTreeMap;
use std::fmt;

use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use smbconv_core::format::constants::STRUCTURE_HEADER_SIZE;
use smbconv_core::validation::validate_declared_len;
use smbconv_core::Guid;
use tracing::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::fill::Filler;

pub mod builtin;
#[cfg(feature = "serde")]
pub mod config;

/// How records are matched to an existing structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LocatingMethod {
    /// Taxonomy, instance, sub-instance and producer must all match
    ByFullIdentity,
    /// The sub-instance is ignored
    ByInstanceOnly,
}

/// How a record's payload is written into its structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillingMethod {
    /// Copy the payload verbatim at the rule's offset
    CopyAtOffset,
    /// Run a filler on the payload at the rule's offset
    FunctionAtOffset(Filler),
    /// Run a filler on the payload; it chooses the offset itself
    FunctionComputesOffset(Filler),
    /// Run a filler on the whole record, header included
    FunctionWholeRecord(Filler),
}

impl FillingMethod {
    pub fn filler(&self) -> Option<Filler> {
        match self {
            FillingMethod::CopyAtOffset => None,
            FillingMethod::FunctionAtOffset(f)
            | FillingMethod::FunctionComputesOffset(f)
            | FillingMethod::FunctionWholeRecord(f) => Some(*f),
        }
    }

    /// Whether the rule's offset addresses a field
    pub fn uses_offset(&self) -> bool {
        matches!(
            self,
            FillingMethod::CopyAtOffset | FillingMethod::FunctionAtOffset(_)
        )
    }
}

/// One entry of the rule table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionRule {
    pub taxonomy: Guid,
    pub record_type: u32,
    pub schema: u8,
    pub locating: LocatingMethod,
    pub filling: FillingMethod,
    pub offset: usize,
}

impl ConversionRule {
    pub const fn new(
        taxonomy: Guid,
        record_type: u32,
        schema: u8,
        locating: LocatingMethod,
        filling: FillingMethod,
        offset: usize,
    ) -> Self {
        Self {
            taxonomy,
            record_type,
            schema,
            locating,
            filling,
            offset,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.filling.uses_offset() && self.offset < STRUCTURE_HEADER_SIZE {
            return Err(EngineError::Config(format!(
                "rule {}/{} writes into the structure header at offset {}",
                self.taxonomy, self.record_type, self.offset
            )));
        }
        Ok(())
    }
}

/// Rules indexed by `(taxonomy, record type)`
#[derive(Clone, Default)]
pub struct RuleTable {
    rules: Vec<ConversionRule>,
    index: HashMap<(Guid, u32), usize>,
}

impl RuleTable {
    /// Build a table; the first rule for a key wins
    pub fn from_rules(rules: Vec<ConversionRule>) -> Result<Self> {
        let mut index = HashMap::with_capacity(rules.len());
        for (i, rule) in rules.iter().enumerate() {
            rule.validate()?;
            match index.entry((rule.taxonomy, rule.record_type)) {
                Entry::Vacant(slot) => {
                    slot.insert(i);
                }
                Entry::Occupied(_) => {
                    warn!(
                        taxonomy = %rule.taxonomy,
                        record_type = rule.record_type,
                        "duplicate rule ignored"
                    );
                }
            }
        }
        Ok(Self { rules, index })
    }

    /// The built-in rule table, or an empty one if it fails validation
    pub fn builtin() -> Self {
        or_empty(Self::from_rules(builtin::rules()), "rule")
    }

    /// Rule for a record of `taxonomy` and `record_type`
    pub fn lookup(&self, taxonomy: &Guid, record_type: u32) -> Option<&ConversionRule> {
        self.index
            .get(&(*taxonomy, record_type))
            .map(|&i| &self.rules[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConversionRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl fmt::Debug for RuleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleTable")
            .field("rules", &self.rules.len())
            .finish()
    }
}

/// Size and requirement of one schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SchemaMetadata {
    pub schema: u8,
    /// Empty structure size: declared length plus the empty string area
    pub min_len: usize,
    #[cfg_attr(feature = "serde", serde(default))]
    pub required: bool,
}

impl SchemaMetadata {
    pub const fn new(schema: u8, min_len: usize, required: bool) -> Self {
        Self {
            schema,
            min_len,
            required,
        }
    }
}

/// Metadata for every known schema
#[derive(Debug, Clone, Default)]
pub struct SchemaTable {
    entries: BTreeMap<u8, SchemaMetadata>,
}

impl SchemaTable {
    pub fn from_entries(entries: Vec<SchemaMetadata>) -> Result<Self> {
        let mut table = BTreeMap::new();
        for entry in entries {
            let declared = entry.min_len.saturating_sub(2);
            if validate_declared_len(declared).ok() != Some(entry.min_len) {
                return Err(EngineError::Config(format!(
                    "schema {} has invalid size {}",
                    entry.schema, entry.min_len
                )));
            }
            table.insert(entry.schema, entry);
        }
        Ok(Self { entries: table })
    }

    /// The built-in schema catalog, or an empty one if it fails validation
    pub fn builtin() -> Self {
        or_empty(Self::from_entries(builtin::schemas()), "schema")
    }

    pub fn get(&self, schema: u8) -> Option<&SchemaMetadata> {
        self.entries.get(&schema)
    }

    /// Required schemas in ascending order
    pub fn required(&self) -> impl Iterator<Item = &SchemaMetadata> {
        self.entries.values().filter(|entry| entry.required)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchemaMetadata> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Check that every rule's schema has metadata and its offsets fit
pub fn check_tables(rules: &RuleTable, schemas: &SchemaTable) -> Result<()> {
    for rule in rules.iter() {
        let meta = schemas
            .get(rule.schema)
            .ok_or(EngineError::UnknownSchema(rule.schema))?;
        if rule.filling.uses_offset() && rule.offset >= meta.min_len - 2 {
            return Err(EngineError::Config(format!(
                "rule {}/{} offset {:#x} is past schema {} body",
                rule.taxonomy, rule.record_type, rule.offset, rule.schema
            )));
        }
    }
    Ok(())
}

fn or_empty<T: Default>(table: Result<T>, kind: &str) -> T {
    table.unwrap_or_else(|err| {
        warn!(error = %err, kind, "built-in table rejected, using an empty one");
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fill::text::STRING;
    use smbconv_core::taxonomy;

    #[test]
    fn test_first_rule_wins() {
        let rules = vec![
            ConversionRule::new(
                taxonomy::MISC,
                1,
                0,
                LocatingMethod::ByInstanceOnly,
                FillingMethod::FunctionAtOffset(STRING),
                4,
            ),
            ConversionRule::new(
                taxonomy::MISC,
                1,
                1,
                LocatingMethod::ByInstanceOnly,
                FillingMethod::CopyAtOffset,
                4,
            ),
        ];
        let table = RuleTable::from_rules(rules).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup(&taxonomy::MISC, 1).unwrap().schema, 0);
        assert!(table.lookup(&taxonomy::CACHE, 1).is_none());
    }

    #[test]
    fn test_rule_offset_in_header_rejected() {
        let rule = ConversionRule::new(
            taxonomy::MISC,
            1,
            0,
            LocatingMethod::ByFullIdentity,
            FillingMethod::CopyAtOffset,
            2,
        );
        assert!(RuleTable::from_rules(vec![rule]).is_err());
    }

    #[test]
    fn test_schema_table_validation() {
        assert!(SchemaTable::from_entries(vec![SchemaMetadata::new(3, 0x17, true)]).is_ok());
        assert!(SchemaTable::from_entries(vec![SchemaMetadata::new(3, 5, true)]).is_err());
        assert!(SchemaTable::from_entries(vec![SchemaMetadata::new(3, 258, true)]).is_err());
    }

    #[test]
    fn test_builtin_tables_consistent() {
        let rules = RuleTable::builtin();
        let schemas = SchemaTable::builtin();
        assert!(!rules.is_empty());
        assert_eq!(rules.len(), builtin::rules().len());
        assert_eq!(schemas.len(), builtin::schemas().len());
        check_tables(&rules, &schemas).unwrap();

        let required: Vec<u8> = schemas.required().map(|m| m.schema).collect();
        assert_eq!(required, vec![0, 1, 3, 4, 7, 9, 16, 17, 19, 32, 127]);
    }

    #[test]
    fn test_rejected_builtin_falls_back_to_empty() {
        let bad = SchemaTable::from_entries(vec![SchemaMetadata::new(3, 5, true)]);
        assert!(or_empty(bad, "schema").is_empty());

        let good = SchemaTable::from_entries(vec![SchemaMetadata::new(3, 0x17, true)]);
        assert_eq!(or_empty(good, "schema").len(), 1);
    }
}
