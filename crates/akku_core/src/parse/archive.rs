//! Encrypted day-archive parser.
//!
//! # Responsibility
//! - Parse a directory of `YYYYMMDD*` files, one calendar day per file.
//! - Decrypt each top-level node independently and read the entries inside.
//!
//! # Invariants
//! - A failure in one node or file never drops entries of its siblings.
//! - Files are parsed in parallel; result order is unspecified.
//! - The passphrase is shared read-only and never logged.

use super::crypto::Decryptor;
use super::outline::{OutlineDocument, OutlineNode};
use super::{FormatError, ParseError, ParseResult, SourceParser};
use crate::model::entry::Entry;
use chrono::{NaiveDate, NaiveTime};
use log::{info, warn};
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Instant;

const BLOCK_LEVEL: usize = 1;
const ENTRY_LEVEL: usize = 2;
const FALLBACK_WORKERS: usize = 4;

static DAY_FILE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4})([0-9]{2})([0-9]{2})").expect("valid day file regex"));
static TIME_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{1,2}):([0-9]{2})$").expect("valid time token regex"));

/// Parser for directories of encrypted per-day outline files.
pub struct ArchiveParser<'a> {
    passphrase: &'a str,
    decryptor: &'a dyn Decryptor,
}

impl<'a> ArchiveParser<'a> {
    pub fn new(passphrase: &'a str, decryptor: &'a dyn Decryptor) -> Self {
        Self {
            passphrase,
            decryptor,
        }
    }

    /// Parses one day's file content.
    ///
    /// Nodes that fail to decrypt or carry a malformed time token are
    /// logged and skipped.
    pub fn parse_day(&self, text: &str, date: NaiveDate) -> Vec<Entry> {
        let document = OutlineDocument::parse(text);
        let mut entries = Vec::new();

        let blocks = document
            .headings()
            .iter()
            .filter(|node| node.level == BLOCK_LEVEL);
        for (index, node) in blocks.enumerate() {
            let plain = match self.decryptor.decrypt(&node.body, self.passphrase) {
                Ok(plain) => plain,
                Err(err) => {
                    warn!(
                        "event=archive_decrypt module=parse status=error date={date} node={index} error={err}"
                    );
                    continue;
                }
            };

            let inner = OutlineDocument::parse(&plain);
            for entry_node in inner
                .headings()
                .iter()
                .filter(|node| node.level == ENTRY_LEVEL)
            {
                match parse_entry_node(entry_node, date) {
                    Ok(entry) => entries.push(entry),
                    Err(err) => warn!(
                        "event=archive_entry module=parse status=skip date={date} node={index} error={err}"
                    ),
                }
            }
        }

        entries
    }

    fn parse_file(&self, path: &Path, date: NaiveDate) -> Vec<Entry> {
        match std::fs::read_to_string(path) {
            Ok(text) => self.parse_day(&text, date),
            Err(err) => {
                warn!(
                    "event=archive_read module=parse status=error file={} error={err}",
                    path.display()
                );
                Vec::new()
            }
        }
    }
}

impl SourceParser for ArchiveParser<'_> {
    fn parse(&self, path: &Path) -> ParseResult<Vec<Entry>> {
        let started_at = Instant::now();
        let files = list_day_files(path)?;
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let workers = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(FALLBACK_WORKERS)
            .min(files.len());
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("akku-archive-{index}"))
            .build()
            .map_err(|err| ParseError::WorkerPool(err.to_string()))?;

        let entries: Vec<Entry> = pool.install(|| {
            files
                .par_iter()
                .flat_map_iter(|(file, date)| self.parse_file(file, *date))
                .collect()
        });

        info!(
            "event=archive_parse module=parse status=ok files={} entries={} workers={} duration_ms={}",
            files.len(),
            entries.len(),
            workers,
            started_at.elapsed().as_millis()
        );
        Ok(entries)
    }
}

/// Date encoded by a `YYYYMMDD` file name prefix.
///
/// Returns `None` for other names and for prefixes that are not calendar dates.
pub fn day_from_file_name(name: &str) -> Option<NaiveDate> {
    let caps = DAY_FILE_RE.captures(name)?;
    NaiveDate::from_ymd_opt(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    )
}

fn list_day_files(directory: &Path) -> ParseResult<Vec<(PathBuf, NaiveDate)>> {
    let read_dir = std::fs::read_dir(directory).map_err(|err| ParseError::io(directory, err))?;
    let mut files = Vec::new();

    for item in read_dir {
        let item = item.map_err(|err| ParseError::io(directory, err))?;
        let path = item.path();
        if !path.is_file() {
            continue;
        }
        let name = item.file_name();
        match name.to_str().and_then(day_from_file_name) {
            Some(date) => files.push((path, date)),
            None => continue,
        }
    }

    files.sort();
    Ok(files)
}

fn parse_entry_node(node: &OutlineNode, date: NaiveDate) -> Result<Entry, FormatError> {
    let (token, title) = match node.heading.split_once(' ') {
        Some((token, title)) => (token, Some(title.trim())),
        None => (node.heading.as_str(), None),
    };

    let time = parse_time_token(token)?;
    let body = match title {
        Some(title) if title.is_empty() => node.body.clone(),
        Some(title) if node.body.is_empty() => title.to_string(),
        Some(title) => format!("{title}\n{}", node.body),
        None => node.body.clone(),
    };

    Ok(Entry::from_body(body, date, Some(time)))
}

fn parse_time_token(token: &str) -> Result<NaiveTime, FormatError> {
    let invalid = || FormatError::InvalidTimeToken(token.to_string());
    let caps = TIME_TOKEN_RE.captures(token).ok_or_else(invalid)?;
    let hour = caps[1].parse().map_err(|_| invalid())?;
    let minute = caps[2].parse().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::{day_from_file_name, parse_time_token, ArchiveParser};
    use crate::model::entry::Person;
    use crate::parse::{DecryptionError, FormatError};
    use chrono::{NaiveDate, NaiveTime};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn plain(cipher: &str, passphrase: &str) -> Result<String, DecryptionError> {
        if passphrase == "secret" {
            Ok(cipher.to_string())
        } else {
            Err(DecryptionError::Rejected("bad passphrase".to_string()))
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 2, 14).unwrap()
    }

    #[test]
    fn file_names_need_a_valid_date_prefix() {
        assert_eq!(day_from_file_name("20200214"), Some(day()));
        assert_eq!(day_from_file_name("20200214.org.gpg"), Some(day()));
        assert_eq!(day_from_file_name("20201345"), None);
        assert_eq!(day_from_file_name("notes.org"), None);
    }

    #[test]
    fn time_token_is_validated() {
        assert_eq!(
            parse_time_token("9:05").unwrap(),
            NaiveTime::from_hms_opt(9, 5, 0).unwrap()
        );
        assert!(matches!(
            parse_time_token("25:00"),
            Err(FormatError::InvalidTimeToken(_))
        ));
        assert!(parse_time_token("noon").is_err());
    }

    #[test]
    fn level_two_nodes_become_entries_with_title_prepended() {
        let decryptor = |_: &str, _: &str| -> Result<String, DecryptionError> {
            Ok("* Friday\n** 08:30 breakfast\ncoffee with @ana\n** 21:00\nbed\n*** nested detail".to_string())
        };
        let parser = ArchiveParser::new("secret", &decryptor);
        let entries = parser.parse_day("* Friday\nCIPHER", day());

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].body, "breakfast\ncoffee with @ana");
        assert_eq!(entries[0].time, NaiveTime::from_hms_opt(8, 30, 0));
        assert_eq!(entries[0].people, vec![Person::new("ana")]);
        assert_eq!(entries[1].body, "bed");
        assert!(entries.iter().all(|entry| entry.date == day()));
    }

    #[test]
    fn only_top_level_nodes_are_decrypted() {
        let calls = AtomicUsize::new(0);
        let decryptor = |_: &str, _: &str| -> Result<String, DecryptionError> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(String::new())
        };
        let parser = ArchiveParser::new("secret", &decryptor);
        let entries = parser.parse_day("* a\nX\n** 10:00 b\nY\n* c\nZ\n", day());
        assert!(entries.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn wrong_passphrase_skips_nodes() {
        let decryptor = plain;
        let parser = ArchiveParser::new("wrong", &decryptor);
        assert!(parser.parse_day("* day\n** 10:00 x\n", day()).is_empty());
    }

    #[test]
    fn malformed_time_skips_only_that_node() {
        let decryptor = |_: &str, _: &str| -> Result<String, DecryptionError> {
            Ok("** late night\nbroken\n** 23:10 fine\nok".to_string())
        };
        let parser = ArchiveParser::new("secret", &decryptor);
        let entries = parser.parse_day("* day\ncipher", day());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].time, NaiveTime::from_hms_opt(23, 10, 0));
    }
}
