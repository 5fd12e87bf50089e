//! Core of the akku personal journal.
//!
//! Parses journal sources into dated entries, keeps them in a SQLite entry
//! store, and aggregates them per calendar day.

pub mod db;
pub mod logging;
pub mod model;
pub mod parse;
pub mod refresh;
pub mod repo;
pub mod scan;
pub mod stats;

pub use db::{open_db, open_db_in_memory, Connection, DbError};
pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget,
};
pub use model::entry::{Context, Entry, Person, Tracker};
pub use model::source::{Source, SourceConfig, SourceId, SourceKind};
pub use parse::{
    parse_source, DecryptionError, Decryptor, FormatError, GpgDecryptor, ParseError,
};
pub use refresh::{
    RefreshEngine, RefreshError, RefreshOptions, RefreshReport, RefreshResult, SourceOutcome,
    SourceState,
};
pub use repo::entry_repo::{EntryStore, RepoError, RepoResult, SqliteEntryStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
