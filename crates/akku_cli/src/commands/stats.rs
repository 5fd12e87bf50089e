use akku_core::stats::{
    aggregate_by_date, day_series, entry_count, filter_year, mean_mood, mention_count,
    mentions_of, value_range,
};
use akku_core::{EntryStore, SqliteEntryStore};
use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Args, ValueEnum};
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::open_journal;

const MOOD_RANGE: (f64, f64) = (-2.0, 2.0);

#[derive(Clone, Copy, ValueEnum)]
pub enum Metric {
    /// Mean `#mood(n)` value per day
    Mood,
    /// Number of entries per day
    Count,
    /// Person mentions per day
    Mentions,
}

#[derive(Args)]
pub struct StatsArgs {
    /// Journal database file
    pub db: PathBuf,
    pub metric: Metric,
    /// Count mentions of one person only
    #[arg(long)]
    pub person: Option<String>,
    /// Calendar year; defaults to the current year
    #[arg(long)]
    pub year: Option<i32>,
}

pub fn run(args: &StatsArgs) -> Result<()> {
    let mut conn = open_journal(&args.db)?;
    let store = SqliteEntryStore::new(&mut conn);
    let year = args.year.unwrap_or_else(|| Local::now().year());
    let entries = filter_year(
        &store.all_entries().context("Failed to load entries")?,
        year,
    );

    match args.metric {
        Metric::Mood => {
            let points = day_series(&aggregate_by_date(&entries, mean_mood));
            println!("# metric=mood year={year} range={}..{}", MOOD_RANGE.0, MOOD_RANGE.1);
            for point in points {
                println!("{} {:>3} {:.2}", point.date, point.day_of_year, point.value);
            }
        }
        Metric::Count => print_counts("count", year, &aggregate_by_date(&entries, entry_count)),
        Metric::Mentions => {
            let counts = match &args.person {
                Some(name) => aggregate_by_date(&entries, mentions_of(name)),
                None => aggregate_by_date(&entries, mention_count),
            };
            print_counts("mentions", year, &counts);
        }
    }
    Ok(())
}

fn print_counts(metric: &str, year: i32, counts: &BTreeMap<NaiveDate, usize>) {
    let max = value_range(counts.values()).map_or(0, |(_, high)| high);
    println!("# metric={metric} year={year} range=0..{max}");
    for (date, count) in counts {
        println!("{date} {:>3} {count}", date.ordinal());
    }
}
