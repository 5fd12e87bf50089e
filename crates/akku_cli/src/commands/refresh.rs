use akku_core::{
    GpgDecryptor, RefreshEngine, RefreshOptions, RefreshResult, SourceState, SqliteEntryStore,
};
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use super::open_journal;

#[derive(Args)]
pub struct RefreshArgs {
    /// Journal database file
    pub db: PathBuf,
    /// Re-parse every source even when unchanged
    #[arg(long)]
    pub force: bool,
    /// Passphrase for encrypted archive sources
    #[arg(long, env = "AKKU_PASSPHRASE", hide_env_values = true)]
    pub passphrase: Option<String>,
}

pub fn run(args: &RefreshArgs) -> Result<()> {
    let mut conn = open_journal(&args.db)?;
    let mut engine = RefreshEngine::new(SqliteEntryStore::new(&mut conn), GpgDecryptor::default());
    let options = RefreshOptions {
        force: args.force,
        passphrase: args.passphrase.clone(),
    };
    let report = engine.refresh(&options).context("Failed to list sources")?;

    for outcome in &report.outcomes {
        let status = match &outcome.result {
            RefreshResult::Skipped => "unchanged".to_string(),
            RefreshResult::Replaced { entries } => format!("{entries} entries"),
            RefreshResult::Failed(err) => format!("failed: {err}"),
        };
        let state = match outcome.state {
            SourceState::Unknown => "unknown",
            SourceState::Fresh => "fresh",
            SourceState::Stale => "stale",
        };
        println!(
            "{}  {:<7}  {}  {}",
            outcome.source_id,
            state,
            outcome.path.display(),
            status
        );
    }

    let failed = report.failed_count();
    println!(
        "Refreshed {} source(s), {} unchanged, {failed} failed.",
        report.refreshed_count(),
        report.skipped_count()
    );
    if failed > 0 && failed == report.outcomes.len() {
        anyhow::bail!("every source failed to refresh; previous entries kept");
    }
    Ok(())
}
