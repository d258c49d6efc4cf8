use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cleaner::DataCleaner;
use crate::db::connection::{init_db, Database};
use crate::db::{datasets, DatasetKind};
use crate::domain::{CleanedListing, PropertyKind, ALL_PROPERTY};
use crate::errors::{PipelineError, Result};
use crate::facets::Facets;
use crate::schema::SchemaRegistry;

mod cleaner;
mod db;
mod domain;
mod errors;
mod facets;
mod schema;
mod spreadsheets;

#[cfg(test)]
mod tests;

#[derive(Parser)]
#[command(name = "propclean", about = "Cleans scraped listing batches into per-type datasets")]
struct Cli {
    /// SQLite database file.
    #[arg(long, default_value = "propclean.sqlite3")]
    db: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a batch file's columns and prices without ingesting it.
    Validate { file: PathBuf },

    /// Clean a batch and persist it into the partition's datasets.
    Ingest {
        file: PathBuf,
        /// Replace the stored per-type slices instead of merging into them.
        #[arg(long)]
        replace: bool,
        #[arg(long, value_enum, default_value_t = DatasetKind::Main)]
        partition: DatasetKind,
    },

    /// Export one property-type dataset to a file.
    Export {
        prop_type: String,
        #[arg(long, value_enum, default_value_t = DatasetKind::Main)]
        partition: DatasetKind,
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print one property type's model column contract.
    Schema { prop_type: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let db = Database::new(cli.db.clone());
    init_db(&db).context("database initialization failed")?;

    let facets = Facets::load().context("failed to load facet tables")?;
    let registry = SchemaRegistry::load().context("failed to load property schemas")?;

    match cli.command {
        Command::Validate { file } => {
            let (headers, rows) = cleaner::validate::load_batch(&file)?;
            cleaner::validate::validate_dataset(&headers, &rows)?;
            info!(rows = rows.len(), "batch is ingestible");
        }
        Command::Ingest {
            file,
            replace,
            partition,
        } => {
            ingest(&db, &facets, &registry, &file, replace, partition)?;
        }
        Command::Export {
            prop_type,
            partition,
            format,
            out,
        } => {
            export(&db, &registry, &prop_type, partition, format, out)?;
        }
        Command::Schema { prop_type } => {
            let schema = registry.get(&prop_type)?;
            println!("{}", serde_json::to_string_pretty(schema)?);
        }
    }
    Ok(())
}

fn ingest(
    db: &Database,
    facets: &Facets,
    registry: &SchemaRegistry,
    file: &std::path::Path,
    replace: bool,
    partition: DatasetKind,
) -> Result<()> {
    let (headers, raw) = cleaner::validate::load_batch(file)?;
    cleaner::validate::validate_dataset(&headers, &raw)?;

    let cleaned = DataCleaner::new(facets).clean(&headers, raw)?;
    let stored = datasets::upsert_cleaned(db, partition, &cleaned)?;
    info!(stored, partition = partition.as_str(), "cleaned dataset persisted");

    for kind in &ALL_PROPERTY {
        schema_gate(registry, kind)?;
        let slice = kind.extract(&cleaned);
        let written = datasets::dump_property_dataset(db, partition, kind, &slice, !replace)?;
        info!(prop_type = kind.alias, written, "property dataset written");
    }

    for line in datasets::summarize_property_datasets(db, partition)? {
        info!(
            prop_type = %line.prop_type,
            rows = line.rows,
            mean_price = line.mean_price.unwrap_or(0.0),
            mean_area = line.mean_area.unwrap_or(0.0),
            "dataset summary"
        );
    }
    Ok(())
}

/// A type's slice only ships if its model contract can be satisfied by the
/// cleaned columns. Catches schema-document edits that drift from the
/// published column set.
fn schema_gate(registry: &SchemaRegistry, kind: &PropertyKind) -> Result<()> {
    let schema = registry.get(kind.alias)?;
    for col in schema.all_cols.iter().chain(std::iter::once(&schema.target)) {
        if !CleanedListing::COLUMNS.contains(&col.as_str()) {
            return Err(PipelineError::Validation(format!(
                "{}: schema column {col} is not produced by the cleaner",
                kind.alias
            )));
        }
    }
    Ok(())
}

fn export(
    db: &Database,
    registry: &SchemaRegistry,
    prop_type: &str,
    partition: DatasetKind,
    format: ExportFormat,
    out: Option<PathBuf>,
) -> Result<()> {
    // Resolves the alias first so a typo reports the known set.
    let kind = PropertyKind::by_alias(prop_type).ok_or_else(|| {
        PipelineError::Validation(format!(
            "unknown property type alias: {prop_type} (known: {})",
            registry.aliases().join(", ")
        ))
    })?;

    let rows = datasets::get_property_dataset(db, partition, kind)?;
    let path = out.unwrap_or_else(|| {
        PathBuf::from(format!(
            "{}_{}.{}",
            kind.alias,
            partition.as_str(),
            format.extension()
        ))
    });
    match format {
        ExportFormat::Csv => spreadsheets::export_listings_csv(&rows, &path)?,
        ExportFormat::Xlsx => spreadsheets::export_listings_xlsx(&rows, &path)?,
    }
    info!(rows = rows.len(), file = %path.display(), "dataset exported");
    Ok(())
}
