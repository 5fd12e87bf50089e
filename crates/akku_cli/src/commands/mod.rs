pub mod refresh;
pub mod show;
pub mod source;
pub mod stats;

use akku_core::Connection;
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum Commands {
    /// Register a journal source
    AddSource(source::AddSourceArgs),
    /// List registered sources
    Sources(DbArgs),
    /// Unregister a source and drop its entries
    RemoveSource(source::RemoveSourceArgs),
    /// Re-parse sources whose content changed
    Refresh(refresh::RefreshArgs),
    /// Print per-day statistics
    Stats(stats::StatsArgs),
    /// Print the journal in chronological order
    Show(show::ShowArgs),
}

#[derive(Args)]
pub struct DbArgs {
    /// Journal database file
    pub db: PathBuf,
}

pub fn open_journal(path: &Path) -> Result<Connection> {
    akku_core::open_db(path)
        .with_context(|| format!("Failed to open journal database `{}`", path.display()))
}
