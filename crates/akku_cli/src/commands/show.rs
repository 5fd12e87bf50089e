use akku_core::{Entry, EntryStore, SqliteEntryStore};
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::Args;
use std::path::PathBuf;

use super::open_journal;

#[derive(Args)]
pub struct ShowArgs {
    /// Journal database file
    pub db: PathBuf,
    /// Only show entries of this day (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

pub fn run(args: &ShowArgs) -> Result<()> {
    let mut conn = open_journal(&args.db)?;
    let store = SqliteEntryStore::new(&mut conn);
    let entries = store.all_entries().context("Failed to load entries")?;

    let mut shown = 0usize;
    for entry in entries
        .iter()
        .filter(|entry| args.date.map_or(true, |date| entry.date == date))
    {
        println!("{}\n{}\n", header(entry), entry.body);
        shown += 1;
    }
    if shown == 0 {
        println!("No entries found.");
    }
    Ok(())
}

fn header(entry: &Entry) -> String {
    match entry.time {
        Some(time) => NaiveDateTime::new(entry.date, time)
            .format("%b %d %Y %H:%M:%S")
            .to_string(),
        None => entry.date.format("%b %d %Y").to_string(),
    }
}
