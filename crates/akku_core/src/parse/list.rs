//! Checklist-style journal parser.
//!
//! Journals are kept as list items under one heading:
//!
//! ```text
//! * Log
//! - [2020-03-04 Wed 21:10] long walk #mood(2)
//!   continued on the next line
//! - [2020-03-05 Thu] quiet day
//! ```
//!
//! Items without a leading timestamp (plain checkboxes, notes) are common
//! noise and are dropped instead of failing the source.

use super::outline::OutlineDocument;
use super::timestamp::extract_timestamps;
use super::{read_source_text, FormatError, ParseResult, SourceParser};
use crate::model::entry::Entry;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static ITEM_START_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-] \[").expect("valid list item regex"));
static ITEM_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-] ?").expect("valid list marker regex"));

/// Parser for list journals kept under a fixed heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParser {
    heading: String,
}

impl ListParser {
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
        }
    }

    /// Parses list entries from outline text.
    pub fn parse_text(&self, text: &str) -> Vec<Entry> {
        let document = OutlineDocument::parse(text);
        document
            .headings()
            .iter()
            .filter(|node| node.heading == self.heading)
            .flat_map(|node| parse_list_body(&node.body))
            .collect()
    }
}

impl SourceParser for ListParser {
    fn parse(&self, path: &Path) -> ParseResult<Vec<Entry>> {
        Ok(self.parse_text(&read_source_text(path)?))
    }
}

/// Splits a heading body into items and parses each one.
pub fn parse_list_body(body: &str) -> Vec<Entry> {
    split_items(body)
        .iter()
        .filter_map(|item| match parse_list_item(item) {
            Ok(entry) => Some(entry),
            Err(err) => {
                debug!("event=list_item_skip module=parse status=skip reason={err}");
                None
            }
        })
        .collect()
}

/// Parses one accumulated item, delimiter included.
pub fn parse_list_item(item: &str) -> Result<Entry, FormatError> {
    let text = ITEM_MARKER_RE.replace(item, "");
    let text = text.trim();

    let close = text.find(']').ok_or(FormatError::MissingTimestamp)?;
    let (head, rest) = text.split_at(close + 1);
    let timestamp = extract_timestamps(head)
        .into_iter()
        .next()
        .ok_or(FormatError::MissingTimestamp)?;

    Ok(Entry::from_body(rest.trim(), timestamp.date, timestamp.time))
}

fn split_items(body: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current: Option<Vec<&str>> = None;

    for line in body.lines() {
        if ITEM_START_RE.is_match(line) {
            if let Some(lines) = current.take() {
                items.push(lines.join("\n"));
            }
            current = Some(vec![line]);
        } else if let Some(lines) = current.as_mut() {
            lines.push(line);
        }
    }
    if let Some(lines) = current {
        items.push(lines.join("\n"));
    }

    items
}
