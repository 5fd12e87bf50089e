//! Source format parsers.
//!
//! # Responsibility
//! - Turn each supported source format into canonical `Entry` values.
//! - Keep per-format failure policy local to the format.
//!
//! # Invariants
//! - Every parsed entry gets its annotations from `Entry::from_body`.
//! - Capture parsing is strict: one malformed node fails the whole source.
//! - List parsing is lenient: items without a timestamp are dropped.
//! - Archive parsing is per-node: undecryptable or malformed nodes are skipped.

pub mod archive;
pub mod capture;
pub mod crypto;
pub mod list;
pub mod outline;
pub mod timestamp;

use crate::model::entry::Entry;
use crate::model::source::{Source, SourceConfig};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

pub use archive::ArchiveParser;
pub use capture::CaptureParser;
pub use crypto::{DecryptionError, Decryptor, GpgDecryptor};
pub use list::ListParser;

pub type ParseResult<T> = Result<T, ParseError>;

/// Structural violation of a format's assumptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// A capture node lacks its timestamp property.
    MissingProperty {
        heading: String,
        property: &'static str,
    },
    /// A capture node's timestamp property holds zero or several timestamps.
    TimestampCount { heading: String, found: usize },
    /// A list item does not start with a bracketed timestamp.
    MissingTimestamp,
    /// An archive heading does not start with an `HH:MM` token.
    InvalidTimeToken(String),
}

impl Display for FormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingProperty { heading, property } => {
                write!(f, "node `{heading}` has no `{property}` property")
            }
            Self::TimestampCount { heading, found } => write!(
                f,
                "node `{heading}` must carry exactly one timestamp, found {found}"
            ),
            Self::MissingTimestamp => write!(f, "list item has no leading timestamp"),
            Self::InvalidTimeToken(token) => write!(f, "invalid time token `{token}`"),
        }
    }
}

impl Error for FormatError {}

/// Failure to parse one source.
#[derive(Debug)]
pub enum ParseError {
    Io { path: PathBuf, source: io::Error },
    Format(FormatError),
    /// Encrypted archives cannot be parsed without a caller-supplied passphrase.
    MissingPassphrase,
    WorkerPool(String),
}

impl ParseError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read `{}`: {source}", path.display()),
            Self::Format(err) => write!(f, "{err}"),
            Self::MissingPassphrase => write!(f, "encrypted archive requires a passphrase"),
            Self::WorkerPool(message) => write!(f, "failed to start parser workers: {message}"),
        }
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Format(err) => Some(err),
            Self::MissingPassphrase | Self::WorkerPool(_) => None,
        }
    }
}

impl From<FormatError> for ParseError {
    fn from(value: FormatError) -> Self {
        Self::Format(value)
    }
}

/// Common contract of all source format parsers.
pub trait SourceParser {
    /// Parses every entry found at `path`.
    fn parse(&self, path: &Path) -> ParseResult<Vec<Entry>>;
}

/// Parses one registered source with the parser matching its config.
///
/// `passphrase` is only consulted for encrypted archives.
pub fn parse_source(
    source: &Source,
    passphrase: Option<&str>,
    decryptor: &dyn Decryptor,
) -> ParseResult<Vec<Entry>> {
    match &source.config {
        SourceConfig::Outline { marker } => CaptureParser::new(marker.as_str()).parse(&source.path),
        SourceConfig::List { heading } => ListParser::new(heading.as_str()).parse(&source.path),
        SourceConfig::EncryptedArchive => {
            let passphrase = passphrase.ok_or(ParseError::MissingPassphrase)?;
            ArchiveParser::new(passphrase, decryptor).parse(&source.path)
        }
    }
}

pub(crate) fn read_source_text(path: &Path) -> ParseResult<String> {
    std::fs::read_to_string(path).map_err(|err| ParseError::io(path, err))
}
