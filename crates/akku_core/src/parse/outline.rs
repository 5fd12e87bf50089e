//! Line-oriented reader for org-style outline documents.
//!
//! Only the structure the journal formats rely on is modelled: heading
//! levels, cleaned heading text, a property drawer and body text.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\*+)(?:[ \t]+(.*?))?[ \t]*$").expect("valid heading regex"));
static KEYWORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:TODO|DONE)(?:[ \t]+|$)").expect("valid keyword regex"));
static PRIORITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[#[A-Za-z0-9]\](?:[ \t]+|$)").expect("valid priority regex"));
static TAGS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[ \t]+)(:[\w@#%:]+:)$").expect("valid tags regex"));
static PROPERTY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^:([^:\s]+):(?:[ \t]+(.*))?$").expect("valid property regex"));
static PLANNING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:SCHEDULED|DEADLINE|CLOSED):").expect("valid planning regex"));

/// One node of an outline document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutlineNode {
    /// Number of heading stars; `0` for the document root.
    pub level: usize,
    /// Heading text without keyword, priority cookie or tags.
    pub heading: String,
    /// Property drawer values keyed by upper-cased name.
    pub properties: BTreeMap<String, String>,
    /// Body lines joined with `\n`, drawer and planning lines excluded.
    pub body: String,
}

impl OutlineNode {
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .get(&name.to_ascii_uppercase())
            .map(String::as_str)
    }
}

/// Parsed outline document in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineDocument {
    nodes: Vec<OutlineNode>,
}

impl OutlineDocument {
    pub fn parse(text: &str) -> Self {
        let mut nodes = vec![OutlineNode::default()];
        let mut body_lines: Vec<&str> = Vec::new();
        let mut header = HeaderState::Closed;

        for line in text.lines() {
            if let Some(caps) = HEADING_RE.captures(line) {
                finish_body(&mut nodes, &mut body_lines);
                nodes.push(OutlineNode {
                    level: caps[1].len(),
                    heading: clean_heading(caps.get(2).map_or("", |m| m.as_str())),
                    ..OutlineNode::default()
                });
                header = HeaderState::Planning;
                continue;
            }

            let trimmed = line.trim();
            match header {
                HeaderState::Planning if PLANNING_RE.is_match(trimmed) => continue,
                HeaderState::Planning if trimmed.eq_ignore_ascii_case(":PROPERTIES:") => {
                    header = HeaderState::Drawer;
                    continue;
                }
                HeaderState::Drawer if trimmed.eq_ignore_ascii_case(":END:") => {
                    header = HeaderState::Closed;
                    continue;
                }
                HeaderState::Drawer => {
                    if let (Some(caps), Some(node)) = (PROPERTY_RE.captures(trimmed), nodes.last_mut())
                    {
                        let value = caps.get(2).map_or("", |m| m.as_str()).trim();
                        node.properties
                            .insert(caps[1].to_ascii_uppercase(), value.to_string());
                    }
                    continue;
                }
                _ => header = HeaderState::Closed,
            }
            body_lines.push(line);
        }
        finish_body(&mut nodes, &mut body_lines);

        Self { nodes }
    }

    /// Text before the first heading.
    pub fn root(&self) -> &OutlineNode {
        &self.nodes[0]
    }

    /// Every heading node below the root, in document order.
    pub fn headings(&self) -> &[OutlineNode] {
        &self.nodes[1..]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderState {
    /// Directly after a heading line: planning lines and a drawer may follow.
    Planning,
    Drawer,
    Closed,
}

fn finish_body(nodes: &mut [OutlineNode], body_lines: &mut Vec<&str>) {
    if let Some(node) = nodes.last_mut() {
        node.body = body_lines.join("\n").trim_end().to_string();
    }
    body_lines.clear();
}

fn clean_heading(raw: &str) -> String {
    let mut heading = raw.trim();
    if let Some(found) = KEYWORD_RE.find(heading) {
        heading = &heading[found.end()..];
    }
    if let Some(found) = PRIORITY_RE.find(heading) {
        heading = &heading[found.end()..];
    }
    if let Some(found) = TAGS_RE.find(heading) {
        heading = &heading[..found.start()];
    }
    heading.trim().to_string()
}
