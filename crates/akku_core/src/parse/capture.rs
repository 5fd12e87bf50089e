//! Outline-capture parser.
//!
//! Capture apps append a node headed with a marker (`log` by default) and a
//! `CREATED` property per journal entry. The whole source fails on the first
//! node whose `CREATED` value does not hold exactly one timestamp.

use super::outline::{OutlineDocument, OutlineNode};
use super::timestamp::extract_timestamps;
use super::{read_source_text, FormatError, ParseResult, SourceParser};
use crate::model::entry::Entry;
use std::path::Path;

const CREATED_PROPERTY: &str = "CREATED";

/// Parser for capture-style outline files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureParser {
    marker: String,
}

impl CaptureParser {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// Parses capture entries from outline text.
    pub fn parse_text(&self, text: &str) -> ParseResult<Vec<Entry>> {
        let document = OutlineDocument::parse(text);
        let entries = document
            .headings()
            .iter()
            .filter(|node| node.heading == self.marker)
            .map(parse_capture_node)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

impl SourceParser for CaptureParser {
    fn parse(&self, path: &Path) -> ParseResult<Vec<Entry>> {
        self.parse_text(&read_source_text(path)?)
    }
}

fn parse_capture_node(node: &OutlineNode) -> Result<Entry, FormatError> {
    let created = node
        .property(CREATED_PROPERTY)
        .ok_or_else(|| FormatError::MissingProperty {
            heading: node.heading.clone(),
            property: CREATED_PROPERTY,
        })?;

    let timestamps = extract_timestamps(created);
    let [timestamp] = timestamps.as_slice() else {
        return Err(FormatError::TimestampCount {
            heading: node.heading.clone(),
            found: timestamps.len(),
        });
    };

    Ok(Entry::from_body(
        node.body.trim(),
        timestamp.date,
        timestamp.time,
    ))
}
