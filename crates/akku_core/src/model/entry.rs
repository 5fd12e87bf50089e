//! Entry domain model.
//!
//! # Responsibility
//! - Define the canonical journal record and its annotations.
//! - Provide the durable JSON form used by the entry store.
//!
//! # Invariants
//! - `date` is always present.
//! - `time` is present only when the source encodes sub-day precision.
//! - Annotation sequences keep order of first appearance in `body`.

use crate::scan::{scan_annotations, Annotations};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Named signal embedded in entry text, e.g. `#mood(-2)` or `#attack`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tracker {
    pub name: String,
    /// `None` for boolean trackers.
    pub value: Option<i64>,
}

impl Tracker {
    pub fn new(name: impl Into<String>, value: Option<i64>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Creates a tracker without a value.
    pub fn flag(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }
}

/// Individual mentioned with `@name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
}

impl Person {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Situational tag written as `+name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Context {
    pub name: String,
}

impl Context {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One journal record.
///
/// Serialized with `date` as `YYYY-MM-DD` and `time` as `HH:MM:SS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub body: String,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub trackers: Vec<Tracker>,
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub contexts: Vec<Context>,
}

impl Entry {
    /// Builds an entry and fills its annotations from `body`.
    ///
    /// This is the only constructor parsers use, so every parsed entry
    /// carries annotations derived from its final body text.
    pub fn from_body(body: impl Into<String>, date: NaiveDate, time: Option<NaiveTime>) -> Self {
        let body = body.into();
        let Annotations {
            trackers,
            people,
            contexts,
        } = scan_annotations(&body);
        Self {
            body,
            date,
            time,
            trackers,
            people,
            contexts,
        }
    }

    /// Date-time used for chronological ordering; missing time sorts as midnight.
    pub fn sort_key(&self) -> NaiveDateTime {
        self.date.and_time(self.time.unwrap_or(NaiveTime::MIN))
    }

    /// Values of all trackers named `name` that carry a value.
    pub fn tracker_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = i64> + 'a {
        self.trackers
            .iter()
            .filter(move |tracker| tracker.name == name)
            .filter_map(|tracker| tracker.value)
    }

    /// Serializes this entry into its stored JSON document.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decodes an entry from its stored JSON document.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
