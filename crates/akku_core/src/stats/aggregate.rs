//! Grouping and reductions over entries.
//!
//! # Invariants
//! - Grouping is by `date` only; time of day never splits a group.
//! - Every input entry lands in exactly one group, in input order.
//! - "No signal" is `None`, never zero.

use crate::model::entry::Entry;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

/// Tracker name holding the daily mood rating.
pub const MOOD_TRACKER: &str = "mood";

/// External sentiment scorer, expected to return values in `[-1, 1]`.
pub trait PolarityScorer {
    fn polarity(&self, text: &str) -> f64;
}

impl<F> PolarityScorer for F
where
    F: Fn(&str) -> f64,
{
    fn polarity(&self, text: &str) -> f64 {
        self(text)
    }
}

/// One calendar cell: day of year (1-based) and its value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayPoint<T> {
    pub date: NaiveDate,
    pub day_of_year: u32,
    pub value: T,
}

/// Groups entries by calendar date.
pub fn group_by_date(entries: &[Entry]) -> BTreeMap<NaiveDate, Vec<&Entry>> {
    let mut groups: BTreeMap<NaiveDate, Vec<&Entry>> = BTreeMap::new();
    for entry in entries {
        groups.entry(entry.date).or_default().push(entry);
    }
    groups
}

/// Groups entries by date and reduces every group with `reduce`.
pub fn aggregate_by_date<T, F>(entries: &[Entry], mut reduce: F) -> BTreeMap<NaiveDate, T>
where
    F: FnMut(&[&Entry]) -> T,
{
    group_by_date(entries)
        .into_iter()
        .map(|(date, group)| (date, reduce(&group)))
        .collect()
}

/// Mean of all valued `mood` trackers; `None` when the group has none.
pub fn mean_mood(group: &[&Entry]) -> Option<f64> {
    mean(
        group
            .iter()
            .flat_map(|entry| entry.tracker_values(MOOD_TRACKER))
            .map(|value| value as f64),
    )
}

/// Reduction computing the mean polarity of entry bodies.
pub fn mean_polarity<S: PolarityScorer>(scorer: &S) -> impl Fn(&[&Entry]) -> Option<f64> + '_ {
    move |group| mean(group.iter().map(|entry| scorer.polarity(&entry.body)))
}

/// Number of entries in the group.
pub fn entry_count(group: &[&Entry]) -> usize {
    group.len()
}

/// Total person mentions in the group, repeated mentions included.
pub fn mention_count(group: &[&Entry]) -> usize {
    group.iter().map(|entry| entry.people.len()).sum()
}

/// Reduction counting mentions of one person.
pub fn mentions_of(name: &str) -> impl Fn(&[&Entry]) -> usize + '_ {
    move |group| {
        group
            .iter()
            .flat_map(|entry| entry.people.iter())
            .filter(|person| person.name == name)
            .count()
    }
}

/// Entries dated within `year`.
pub fn filter_year(entries: &[Entry], year: i32) -> Vec<Entry> {
    entries
        .iter()
        .filter(|entry| entry.date.year() == year)
        .cloned()
        .collect()
}

/// Orders entries by date, then time; untimed entries sort as midnight.
pub fn sort_chronologically(entries: &mut [Entry]) {
    entries.sort_by_key(Entry::sort_key);
}

/// Flattens an optional-valued date map into calendar points.
///
/// Dates without a value are dropped so "no signal" cells stay blank.
pub fn day_series<T: Copy>(values: &BTreeMap<NaiveDate, Option<T>>) -> Vec<DayPoint<T>> {
    values
        .iter()
        .filter_map(|(date, value)| {
            value.map(|value| DayPoint {
                date: *date,
                day_of_year: date.ordinal(),
                value,
            })
        })
        .collect()
}

/// Smallest and largest value, used as the color domain for count metrics.
pub fn value_range<'a, T, I>(values: I) -> Option<(T, T)>
where
    T: PartialOrd + Copy + 'a,
    I: IntoIterator<Item = &'a T>,
{
    values.into_iter().fold(None, |range, &value| match range {
        None => Some((value, value)),
        Some((low, high)) => Some((
            if value < low { value } else { low },
            if value > high { value } else { high },
        )),
    })
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
