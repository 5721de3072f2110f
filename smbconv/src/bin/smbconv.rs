use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use smbconv::{
    ConversionConfig, Engine, MemoryExportTable, RecordFile, RuleSpec, StringCatalog, TableImage,
};
use smbconv_core::validation::parse_schema_id;
use smbconv_core::{read_handle, string_at, string_count, StructureHeader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, long_about = None)]
#[command(about = "smbconv - build structure tables from producer record files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a record file into a structure table
    Convert {
        /// Record file to convert
        records: PathBuf,

        /// JSON configuration replacing the built-in tables
        #[arg(long)]
        config: Option<PathBuf>,

        /// JSON string catalog
        #[arg(long)]
        strings: Option<PathBuf>,

        /// Where to write the finished table
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List the structures of a table image
    Dump {
        /// Table image written by `convert --out`
        table: PathBuf,

        /// Only list structures of this schema (decimal or 0x-prefixed)
        #[arg(long, value_parser = parse_schema)]
        schema: Option<u8>,
    },
    /// Print the effective rule and schema tables as JSON
    Rules {
        /// JSON configuration replacing the built-in tables
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let start_time = Instant::now();

    match &cli.command {
        Commands::Convert {
            records,
            config,
            strings,
            out,
        } => handle_convert(records, config.as_deref(), strings.as_deref(), out.as_deref())?,
        Commands::Dump { table, schema } => handle_dump(table, *schema)?,
        Commands::Rules { config } => handle_rules(config.as_deref())?,
    }

    info!(elapsed = ?start_time.elapsed(), "done");
    Ok(())
}

fn load_config(path: Option<&Path>) -> smbconv::Result<ConversionConfig> {
    match path {
        Some(path) => ConversionConfig::from_file(path),
        None => Ok(ConversionConfig::default()),
    }
}

fn handle_convert(
    records: &Path,
    config: Option<&Path>,
    strings: Option<&Path>,
    out: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (rules, schemas, options) = load_config(config)?.build()?;
    let strings = match strings {
        Some(path) => StringCatalog::from_file(path)?,
        None => StringCatalog::new(),
    };
    let mut engine = Engine::new(rules, schemas, options, MemoryExportTable::new(), strings);

    let file = RecordFile::open(records)?;
    for record in file.records() {
        // Rejected records are logged by the engine
        let _ = engine.process(&record?);
    }
    let table = engine.finish()?;
    let stats = engine.stats();

    println!("records:    {}", file.len());
    println!("converted:  {}", stats.converted);
    println!("dropped:    {}", stats.dropped);
    println!("rejected:   {}", stats.rejected);
    println!("structures: {}", table.structure_count());
    println!("largest:    {} bytes", table.max_structure_size());
    println!("table:      {} bytes", table.len());

    if let Some(out) = out {
        std::fs::write(out, table.bytes())?;
        println!("wrote {}", out.display());
    }
    Ok(())
}

fn parse_schema(s: &str) -> Result<u8, String> {
    parse_schema_id(s).map_err(|e| e.to_string())
}

fn handle_dump(path: &Path, schema: Option<u8>) -> Result<(), Box<dyn std::error::Error>> {
    let table = TableImage::parse(std::fs::read(path)?)?;
    println!(
        "{} structures, {} bytes, largest {} bytes",
        table.structure_count(),
        table.len(),
        table.max_structure_size()
    );

    for structure in table.structures() {
        let header = StructureHeader::from_bytes(structure)?;
        if schema.is_some_and(|schema| schema != header.schema) {
            continue;
        }
        let handle = read_handle(structure)?;
        println!(
            "handle {handle:#06x}  schema {:>3}  length {:#04x}  size {}",
            header.schema,
            header.length,
            structure.len()
        );
        for number in 1..=string_count(structure)? {
            let text = string_at(structure, number)?;
            println!("    {number:>3}: {}", String::from_utf8_lossy(text));
        }
    }
    Ok(())
}

fn handle_rules(config: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let (rules, schemas, options) = load_config(config)?.build()?;
    let effective = ConversionConfig {
        engine: options,
        schemas: Some(schemas.iter().copied().collect()),
        rules: Some(rules.iter().map(RuleSpec::from).collect()),
    };
    println!("{}", serde_json::to_string_pretty(&effective)?);
    Ok(())
}
