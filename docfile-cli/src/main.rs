use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use docfile_core::config::validate_collection_name;
use docfile_core::{
    init_logging, DatabaseConfig, DatabaseCore, Document, FileStorage, FindOptions, LogLevel,
    Query, Storage,
};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser)]
#[command(name = "docfile")]
#[command(about = "docfile CLI - import, export and inspect JSON collection files")]
#[command(version)]
struct Cli {
    /// Data directory (overrides config file and DOCFILE_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import documents from a JSON file
    Import {
        /// JSON file of the form { "collection": [documents...] }
        file: PathBuf,
    },
    /// Export collections to a JSON file
    Export {
        /// Output JSON file
        file: PathBuf,
        /// Export only this collection
        #[arg(long)]
        collection: Option<String>,
    },
    /// Count documents in a collection
    Count {
        collection: String,
        /// Exact-match filter as a JSON object
        #[arg(long)]
        filter: Option<String>,
    },
    /// Insert default documents into collections that are still empty
    Seed {
        /// JSON file of the form { "collection": [documents...] }
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(match cli.verbose {
        0 => LogLevel::Warn,
        1 => LogLevel::Info,
        2 => LogLevel::Debug,
        _ => LogLevel::Trace,
    });

    let mut config = DatabaseConfig::load_from(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(data_dir) = cli.data_dir {
        config = config.with_data_dir(data_dir);
    }

    match cli.command {
        Commands::Import { file } => {
            let total = import_data(&file, config, false)?;
            println!("Total: {} documents imported", total);
            Ok(())
        }
        Commands::Seed { file } => {
            let total = import_data(&file, config, true)?;
            println!("Total: {} documents seeded", total);
            Ok(())
        }
        Commands::Export { file, collection } => {
            let total = export_data(&file, &config, collection.as_deref())?;
            println!("Total: {} documents exported to {}", total, file.display());
            Ok(())
        }
        Commands::Count { collection, filter } => {
            let count = count_documents(&config, &collection, filter.as_deref())?;
            println!("{}", count);
            Ok(())
        }
    }
}

fn open_database(config: &DatabaseConfig) -> Result<DatabaseCore<FileStorage>> {
    DatabaseCore::open(config).with_context(|| {
        format!(
            "Failed to open data directory: {}",
            config.data_dir.display()
        )
    })
}

/// Add `names` to the registered collections, skipping ones already present.
fn register_collections(config: &mut DatabaseConfig, names: impl IntoIterator<Item = String>) {
    for name in names {
        if !config.collections.contains(&name) {
            config.collections.push(name);
        }
    }
}

/// Read `{ "collection": [documents...] }` from `file`.
fn read_collections(file: &Path) -> Result<Vec<(String, Vec<Document>)>> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read file: {}", file.display()))?;

    let data: Map<String, Value> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in file: {}", file.display()))?;

    let mut collections = Vec::with_capacity(data.len());
    for (collection_name, documents) in data {
        let Value::Array(items) = documents else {
            bail!("Collection '{}' must be an array", collection_name);
        };
        let docs = items
            .into_iter()
            .map(|item| {
                Document::from_value(item).with_context(|| {
                    format!("Document in '{}' must be an object", collection_name)
                })
            })
            .collect::<Result<Vec<_>>>()?;
        collections.push((collection_name, docs));
    }
    Ok(collections)
}

/// Insert every document of `file`. With `seed`, collections that already
/// hold documents are skipped. Collections named in the file are registered
/// on top of the configured ones.
fn import_data(file: &Path, mut config: DatabaseConfig, seed: bool) -> Result<usize> {
    let data = read_collections(file)?;

    register_collections(&mut config, data.iter().map(|(name, _)| name.clone()));
    let db = open_database(&config)?;

    let mut total_docs = 0;
    for (collection_name, docs) in data {
        let inserted = if seed {
            db.seed_if_empty(&collection_name, docs)
                .with_context(|| format!("Failed to seed {}", collection_name))?
        } else {
            db.insert_many(&collection_name, docs)
                .with_context(|| format!("Failed to insert documents into {}", collection_name))?
                .inserted_count
        };
        debug!(collection = %collection_name, inserted, seed, "imported collection");
        println!("Imported {} documents into '{}'", inserted, collection_name);
        total_docs += inserted;
    }

    db.close();
    Ok(total_docs)
}

fn export_data(
    file: &Path,
    config: &DatabaseConfig,
    collection_filter: Option<&str>,
) -> Result<usize> {
    // Collection files on disk count too, not only the configured names.
    let mut config = config.clone();
    let on_disk = open_database(&config)?
        .storage()
        .list_collections()
        .with_context(|| format!("Failed to list collections in {}", config.data_dir.display()))?;
    register_collections(
        &mut config,
        on_disk
            .into_iter()
            .filter(|name| validate_collection_name(name).is_ok()),
    );
    let db = open_database(&config)?;

    if let Some(filter) = collection_filter {
        if !db.has_collection(filter) {
            bail!("Unknown collection: {}", filter);
        }
    }

    let mut output: Map<String, Value> = Map::new();
    let mut total_docs = 0;

    for coll_name in db.list_collections() {
        if collection_filter.is_some_and(|filter| filter != coll_name) {
            continue;
        }

        let docs = db
            .find(&coll_name, &Query::new(), &FindOptions::new())
            .with_context(|| format!("Failed to query collection: {}", coll_name))?;

        println!("Exporting {} documents from '{}'", docs.len(), coll_name);
        total_docs += docs.len();
        output.insert(
            coll_name,
            Value::Array(docs.into_iter().map(Value::from).collect()),
        );
    }

    let json =
        serde_json::to_string_pretty(&output).with_context(|| "Failed to serialize to JSON")?;

    fs::write(file, json)
        .with_context(|| format!("Failed to write to file: {}", file.display()))?;

    db.close();
    Ok(total_docs)
}

fn count_documents(config: &DatabaseConfig, collection: &str, filter: Option<&str>) -> Result<u64> {
    let query = match filter {
        Some(raw) => {
            let value: Value = serde_json::from_str(raw).context("Filter is not valid JSON")?;
            Query::from_json(&value)?
        }
        None => Query::new(),
    };

    let db = open_database(config)?;
    let count = db
        .count_documents(collection, &query)
        .with_context(|| format!("Failed to count documents in {}", collection))?;
    db.close();
    Ok(count)
}
