use akku_core::model::source::{DEFAULT_CAPTURE_MARKER, DEFAULT_LIST_HEADING};
use akku_core::{EntryStore, Source, SourceConfig, SourceId, SqliteEntryStore};
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::path::PathBuf;

use super::{open_journal, DbArgs};

#[derive(Clone, Copy, ValueEnum)]
pub enum KindArg {
    /// Outline file with captured log headings
    Outline,
    /// Outline file with a checklist journal under one heading
    List,
    /// Directory of encrypted per-day files
    Archive,
}

#[derive(Args)]
pub struct AddSourceArgs {
    /// Journal database file
    pub db: PathBuf,
    pub kind: KindArg,
    /// Source file, or directory for archives
    pub path: PathBuf,
    /// Heading text marking captured entries (outline)
    #[arg(long, default_value = DEFAULT_CAPTURE_MARKER)]
    pub marker: String,
    /// Heading holding the list journal (list)
    #[arg(long, default_value = DEFAULT_LIST_HEADING)]
    pub heading: String,
}

#[derive(Args)]
pub struct RemoveSourceArgs {
    /// Journal database file
    pub db: PathBuf,
    /// Source id as printed by `akku sources`
    pub id: SourceId,
}

pub fn add(args: &AddSourceArgs) -> Result<()> {
    let path = std::fs::canonicalize(&args.path)
        .with_context(|| format!("Source path `{}` is not accessible", args.path.display()))?;
    let config = match args.kind {
        KindArg::Outline => SourceConfig::Outline {
            marker: args.marker.clone(),
        },
        KindArg::List => SourceConfig::List {
            heading: args.heading.clone(),
        },
        KindArg::Archive => SourceConfig::EncryptedArchive,
    };

    let mut conn = open_journal(&args.db)?;
    let store = SqliteEntryStore::new(&mut conn);
    let id = store
        .add_source(&Source::new(path, config))
        .context("Failed to register source")?;

    println!("{id}");
    Ok(())
}

pub fn list(args: &DbArgs) -> Result<()> {
    let mut conn = open_journal(&args.db)?;
    let store = SqliteEntryStore::new(&mut conn);
    let sources = store.list_sources().context("Failed to list sources")?;

    if sources.is_empty() {
        println!("No sources registered.");
        return Ok(());
    }
    for source in &sources {
        println!(
            "{}  {:<17}  {}",
            source.id,
            source.kind().as_str(),
            source.path.display()
        );
    }
    Ok(())
}

pub fn remove(args: &RemoveSourceArgs) -> Result<()> {
    let mut conn = open_journal(&args.db)?;
    let store = SqliteEntryStore::new(&mut conn);
    store
        .remove_source(args.id)
        .with_context(|| format!("Failed to remove source {}", args.id))?;
    println!("Removed {}", args.id);
    Ok(())
}
