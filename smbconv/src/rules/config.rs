//! JSON conversion configuration
//!
//! A configuration may replace the built-in rule table, the schema table,
//! or both, and sets the engine options. Fillers are referenced by their
//! registered names.
//!
//! ```json
//! {
//!   "engine": { "synthesize_required": false },
//!   "rules": [
//!     { "taxonomy": "772484b2-7482-4b91-9f9a-ad43f81c5881", "record_type": 1,
//!       "schema": 0, "locating": "by_instance_only",
//!       "filling": "function_at_offset", "filler": "string", "offset": 4 }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use smbconv_core::Guid;

use super::{
    builtin, check_tables, ConversionRule, FillingMethod, LocatingMethod, RuleTable,
    SchemaMetadata, SchemaTable,
};
use crate::error::{EngineError, Result};
use crate::fill::filler_by_name;
use crate::options::EngineOptions;

/// Filling method without its filler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillingKind {
    CopyAtOffset,
    FunctionAtOffset,
    FunctionComputesOffset,
    FunctionWholeRecord,
}

/// One rule as written in a configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub taxonomy: Guid,
    pub record_type: u32,
    pub schema: u8,
    pub locating: LocatingMethod,
    pub filling: FillingKind,
    #[serde(default)]
    pub filler: Option<String>,
    #[serde(default)]
    pub offset: usize,
}

impl RuleSpec {
    /// Resolve the filler name and build the rule
    pub fn into_rule(self) -> Result<ConversionRule> {
        let filler = match (&self.filling, &self.filler) {
            (FillingKind::CopyAtOffset, None) => None,
            (FillingKind::CopyAtOffset, Some(name)) => {
                return Err(EngineError::Config(format!(
                    "copy rule {}/{} names filler `{name}`",
                    self.taxonomy, self.record_type
                )));
            }
            (_, Some(name)) => Some(
                filler_by_name(name).ok_or_else(|| EngineError::UnknownFiller(name.clone()))?,
            ),
            (_, None) => {
                return Err(EngineError::Config(format!(
                    "rule {}/{} needs a filler",
                    self.taxonomy, self.record_type
                )));
            }
        };

        let filling = match (self.filling, filler) {
            (FillingKind::FunctionAtOffset, Some(f)) => FillingMethod::FunctionAtOffset(f),
            (FillingKind::FunctionComputesOffset, Some(f)) => {
                FillingMethod::FunctionComputesOffset(f)
            }
            (FillingKind::FunctionWholeRecord, Some(f)) => FillingMethod::FunctionWholeRecord(f),
            _ => FillingMethod::CopyAtOffset,
        };

        Ok(ConversionRule::new(
            self.taxonomy,
            self.record_type,
            self.schema,
            self.locating,
            filling,
            self.offset,
        ))
    }
}

impl From<&ConversionRule> for RuleSpec {
    fn from(rule: &ConversionRule) -> Self {
        let filling = match rule.filling {
            FillingMethod::CopyAtOffset => FillingKind::CopyAtOffset,
            FillingMethod::FunctionAtOffset(_) => FillingKind::FunctionAtOffset,
            FillingMethod::FunctionComputesOffset(_) => FillingKind::FunctionComputesOffset,
            FillingMethod::FunctionWholeRecord(_) => FillingKind::FunctionWholeRecord,
        };
        Self {
            taxonomy: rule.taxonomy,
            record_type: rule.record_type,
            schema: rule.schema,
            locating: rule.locating,
            filling,
            filler: rule.filling.filler().map(|f| f.name().to_string()),
            offset: rule.offset,
        }
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionConfig {
    #[serde(default)]
    pub engine: EngineOptions,
    /// Replaces the built-in schema table when present
    #[serde(default)]
    pub schemas: Option<Vec<SchemaMetadata>>,
    /// Replaces the built-in rule table when present
    #[serde(default)]
    pub rules: Option<Vec<RuleSpec>>,
}

impl ConversionConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Configuration describing the built-in tables
    pub fn builtin() -> Self {
        Self {
            engine: EngineOptions::default(),
            schemas: Some(builtin::schemas()),
            rules: Some(builtin::rules().iter().map(RuleSpec::from).collect()),
        }
    }

    /// Build and cross-check the tables this configuration describes
    pub fn build(self) -> Result<(RuleTable, SchemaTable, EngineOptions)> {
        let rules = match self.rules {
            Some(specs) => {
                let rules = specs
                    .into_iter()
                    .map(RuleSpec::into_rule)
                    .collect::<Result<Vec<_>>>()?;
                RuleTable::from_rules(rules)?
            }
            None => RuleTable::from_rules(builtin::rules())?,
        };
        let schemas = SchemaTable::from_entries(self.schemas.unwrap_or_else(builtin::schemas))?;
        check_tables(&rules, &schemas)?;
        Ok((rules, schemas, self.engine))
    }
}
