//! Date-keyed statistics over journal entries.
//!
//! # Responsibility
//! - Group entries by calendar date and reduce each group to one value.
//! - Shape results for calendar-style presentation.
//!
//! # See also
//! - `aggregate::aggregate_by_date`

pub mod aggregate;

pub use aggregate::{
    aggregate_by_date, day_series, entry_count, filter_year, group_by_date, mean_mood,
    mean_polarity, mention_count, mentions_of, sort_chronologically, value_range, DayPoint,
    PolarityScorer, MOOD_TRACKER,
};
