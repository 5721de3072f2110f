//! Conversion engine
//!
//! The engine consumes records one at a time. Each record is matched to a
//! rule, the rule locates or creates a structure, and the rule's filling
//! method writes the payload into it. A record either commits completely
//! or leaves the structure and export table as they were.

use smbconv_core::format::constants::{schema, STRUCTURE_HEADER_SIZE, TERMINATOR_LEN};
use smbconv_core::{ConvError, ExportTable, StringResolver};
use tracing::{debug, info, trace, warn};

use crate::catalog::StringCatalog;
use crate::error::{Disposition, DropReason, EngineError, Result};
use crate::export::MemoryExportTable;
use crate::fill::{FillContext, RecordInfo};
use crate::fixup;
use crate::options::EngineOptions;
use crate::record::DataRecord;
use crate::registry::{IdentityKey, NodeCheckpoint, NodeId, Registry};
use crate::rules::{ConversionRule, FillingMethod, RuleTable, SchemaTable};
use crate::table::TableImage;

/// Counters for one conversion run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub converted: usize,
    pub dropped: usize,
    pub rejected: usize,
    pub created: usize,
    pub synthesized: usize,
}

/// Record-driven structure table builder
pub struct Engine<E: ExportTable = MemoryExportTable, S: StringResolver = StringCatalog> {
    rules: RuleTable,
    schemas: SchemaTable,
    options: EngineOptions,
    registry: Registry,
    export: E,
    strings: S,
    stats: EngineStats,
}

impl<S: StringResolver> Engine<MemoryExportTable, S> {
    /// Engine with the built-in tables and an in-memory export table
    pub fn builtin(strings: S) -> Self {
        Self::new(
            RuleTable::builtin(),
            SchemaTable::builtin(),
            EngineOptions::default(),
            MemoryExportTable::new(),
            strings,
        )
    }
}

impl<E: ExportTable, S: StringResolver> Engine<E, S> {
    pub fn new(
        rules: RuleTable,
        schemas: SchemaTable,
        options: EngineOptions,
        export: E,
        strings: S,
    ) -> Self {
        Self {
            rules,
            schemas,
            options,
            registry: Registry::new(),
            export,
            strings,
            stats: EngineStats::default(),
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn schemas(&self) -> &SchemaTable {
        &self.schemas
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn export(&self) -> &E {
        &self.export
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Release the export table and string source
    pub fn into_parts(self) -> (E, S) {
        (self.export, self.strings)
    }

    /// Withdraw every structure and start a new table
    pub fn reset(&mut self) -> Result<()> {
        self.registry.clear(&mut self.export)?;
        self.stats = EngineStats::default();
        Ok(())
    }

    /// Apply one record
    ///
    /// Records that do not concern the engine are dropped with `Ok`. An
    /// error means the record was rejected and nothing changed.
    pub fn process(&mut self, record: &DataRecord) -> Result<Disposition> {
        let Ok(header) = record.header() else {
            return Ok(self.drop_record(record, DropReason::MalformedHeader));
        };
        let Some(rule) = self.rules.lookup(&record.taxonomy, header.record_type).copied() else {
            return Ok(self.drop_record(record, DropReason::NoRule));
        };
        match header.validate() {
            Ok(()) => {}
            Err(ConvError::ReservedInstance) => {
                return Ok(self.drop_record(record, DropReason::ReservedInstance));
            }
            Err(_) => return Ok(self.drop_record(record, DropReason::HeaderSize)),
        }

        let result = self.convert(&rule, record);
        match &result {
            Ok(_) => self.stats.converted += 1,
            Err(err) => {
                self.stats.rejected += 1;
                warn!(
                    taxonomy = %record.taxonomy,
                    record_type = header.record_type,
                    instance = header.instance,
                    error = %err,
                    "rejected record"
                );
            }
        }
        result
    }

    /// Apply every record, logging and counting rejections
    pub fn process_all<'r, I>(&mut self, records: I) -> EngineStats
    where
        I: IntoIterator<Item = &'r DataRecord>,
    {
        for record in records {
            // Rejections are counted and logged by `process`
            let _ = self.process(record);
        }
        self.stats
    }

    fn drop_record(&mut self, record: &DataRecord, reason: DropReason) -> Disposition {
        self.stats.dropped += 1;
        trace!(taxonomy = %record.taxonomy, ?reason, "dropped record");
        Disposition::Dropped(reason)
    }

    fn convert(&mut self, rule: &ConversionRule, record: &DataRecord) -> Result<Disposition> {
        let header = record.header()?;
        let meta = *self
            .schemas
            .get(rule.schema)
            .ok_or(EngineError::UnknownSchema(rule.schema))?;
        let key = IdentityKey::locate(rule.locating, record.taxonomy, record.producer, &header);

        let (node, created) = match self.registry.find(rule.schema, &key) {
            Some(node) => (node, false),
            None => {
                let node = self.registry.create(rule.schema, key, meta.min_len, &mut self.export)?;
                (node, true)
            }
        };
        let checkpoint = if created {
            None
        } else {
            Some(self.registry.checkpoint(node)?)
        };

        let info = RecordInfo {
            taxonomy: record.taxonomy,
            producer: record.producer,
            header,
        };
        let applied = apply_rule(
            &mut self.registry,
            &self.strings,
            &self.options,
            rule,
            node,
            info,
            record,
        )
        .and_then(|()| self.commit(node));

        match applied {
            Ok(()) => {
                if created {
                    self.stats.created += 1;
                }
                let handle = self.registry.node(node)?.handle();
                Ok(Disposition::Converted { node, handle, created })
            }
            Err(err) => {
                self.rollback(node, checkpoint);
                Err(err)
            }
        }
    }

    /// Publish a node and every owner whose links it resolves
    fn commit(&mut self, node: NodeId) -> Result<()> {
        self.registry.publish(node, &mut self.export)?;
        for owner in fixup::resolve_pending(&mut self.registry, node)? {
            self.registry.publish(owner, &mut self.export)?;
        }
        Ok(())
    }

    /// Undo a failed record: new nodes go away, existing ones are restored
    fn rollback(&mut self, node: NodeId, checkpoint: Option<NodeCheckpoint>) {
        let outcome = match checkpoint {
            Some(checkpoint) => self
                .registry
                .restore(node, checkpoint)
                .and_then(|()| self.registry.publish(node, &mut self.export)),
            None => self.registry.remove(node, &mut self.export).map(drop),
        };
        match outcome {
            Ok(()) => debug!(?node, "rolled back record"),
            Err(err) => warn!(error = %err, "rollback incomplete"),
        }
    }

    /// Complete the table and return its image
    ///
    /// Required schemas nobody reported get an empty structure, and the
    /// end-of-table structure is appended. Links still pending stay zero.
    pub fn finish(&mut self) -> Result<TableImage> {
        if self.options.synthesize_required {
            let missing: Vec<_> = self
                .schemas
                .required()
                .filter(|meta| meta.schema != schema::END_OF_TABLE)
                .filter(|meta| !self.registry.has_schema(meta.schema))
                .copied()
                .collect();
            for meta in missing {
                let node = self.registry.create(
                    meta.schema,
                    IdentityKey::placeholder(),
                    meta.min_len,
                    &mut self.export,
                )?;
                self.commit(node)?;
                self.stats.synthesized += 1;
                debug!(schema = meta.schema, "synthesized required structure");
            }
        }

        if self.options.end_of_table && !self.registry.has_schema(schema::END_OF_TABLE) {
            let min_len = self
                .schemas
                .get(schema::END_OF_TABLE)
                .map_or(STRUCTURE_HEADER_SIZE + TERMINATOR_LEN, |meta| meta.min_len);
            self.registry.create(
                schema::END_OF_TABLE,
                IdentityKey::placeholder(),
                min_len,
                &mut self.export,
            )?;
        }

        let pending = self.registry.pending_links();
        if pending > 0 {
            debug!(pending, "links left unresolved");
        }

        let image = TableImage::collect(&self.export)?;
        info!(
            structures = image.structure_count(),
            bytes = image.len(),
            converted = self.stats.converted,
            dropped = self.stats.dropped,
            rejected = self.stats.rejected,
            "finished structure table"
        );
        Ok(image)
    }
}

/// Run a rule's filling method against a node
fn apply_rule(
    registry: &mut Registry,
    strings: &dyn StringResolver,
    options: &EngineOptions,
    rule: &ConversionRule,
    node: NodeId,
    info: RecordInfo,
    record: &DataRecord,
) -> Result<()> {
    let mut ctx = FillContext::new(registry, strings, options, node, info);
    match rule.filling {
        FillingMethod::CopyAtOffset => ctx.write(rule.offset, record.payload()),
        FillingMethod::FunctionAtOffset(filler) | FillingMethod::FunctionComputesOffset(filler) => {
            filler.apply(&mut ctx, rule.offset, record.payload())
        }
        FillingMethod::FunctionWholeRecord(filler) => {
            filler.apply(&mut ctx, rule.offset, &record.data)
        }
    }
}
