//! Entry store contract and SQLite implementation.
//!
//! # Responsibility
//! - Register, list and remove journal sources.
//! - Own the entries and fingerprint stored per source.
//!
//! # Invariants
//! - `replace_entries` deletes, inserts and records the fingerprint in a
//!   single immediate transaction; on error nothing is changed.
//! - Removing a source cascades to its entries and fingerprint.
//! - `all_entries` is ordered by date, then time with untimed entries first.

use crate::db::DbError;
use crate::model::entry::Entry;
use crate::model::source::{Source, SourceConfig, SourceId, SourceKind};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use uuid::Uuid;

const SOURCE_SELECT_SQL: &str = "SELECT id, kind, path, config FROM sources";

pub type RepoResult<T> = Result<T, RepoError>;

/// Store error for source and entry persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    SourceNotFound(SourceId),
    /// Persisted row cannot be decoded.
    InvalidData(String),
    /// Entry or config cannot be encoded to its stored form.
    Encode(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::SourceNotFound(id) => write!(f, "source not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::Encode(err) => write!(f, "failed to encode stored value: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::SourceNotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence contract for the source registry and entry store.
pub trait EntryStore {
    /// Registers a source and returns its id.
    fn add_source(&self, source: &Source) -> RepoResult<SourceId>;
    /// Removes a source with its entries and fingerprint.
    fn remove_source(&self, id: SourceId) -> RepoResult<()>;
    fn get_source(&self, id: SourceId) -> RepoResult<Option<Source>>;
    /// Lists sources in registration order.
    fn list_sources(&self) -> RepoResult<Vec<Source>>;
    fn entries_for(&self, id: SourceId) -> RepoResult<Vec<Entry>>;
    /// Every stored entry across all sources, chronologically.
    fn all_entries(&self) -> RepoResult<Vec<Entry>>;
    /// Last recorded fingerprint; `None` before the first successful refresh.
    fn fingerprint(&self, id: SourceId) -> RepoResult<Option<String>>;
    fn set_fingerprint(&mut self, id: SourceId, fingerprint: &str) -> RepoResult<()>;
    /// Atomically replaces all entries of a source and records `fingerprint`.
    fn replace_entries(
        &mut self,
        id: SourceId,
        entries: &[Entry],
        fingerprint: &str,
    ) -> RepoResult<()>;
}

/// SQLite-backed entry store.
pub struct SqliteEntryStore<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteEntryStore<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl EntryStore for SqliteEntryStore<'_> {
    fn add_source(&self, source: &Source) -> RepoResult<SourceId> {
        let config = serde_json::to_string(&source.config).map_err(RepoError::Encode)?;
        self.conn.execute(
            "INSERT INTO sources (id, kind, path, config) VALUES (?1, ?2, ?3, ?4);",
            params![
                source.id.to_string(),
                source.kind().as_str(),
                source.path.to_string_lossy().into_owned(),
                config,
            ],
        )?;
        Ok(source.id)
    }

    fn remove_source(&self, id: SourceId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM sources WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::SourceNotFound(id));
        }
        Ok(())
    }

    fn get_source(&self, id: SourceId) -> RepoResult<Option<Source>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SOURCE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_source_row(row)?));
        }
        Ok(None)
    }

    fn list_sources(&self) -> RepoResult<Vec<Source>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SOURCE_SELECT_SQL} ORDER BY created_at ASC, rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut sources = Vec::new();
        while let Some(row) = rows.next()? {
            sources.push(parse_source_row(row)?);
        }
        Ok(sources)
    }

    fn entries_for(&self, id: SourceId) -> RepoResult<Vec<Entry>> {
        let mut stmt = self.conn.prepare(
            "SELECT data FROM entries
             WHERE source_id = ?1
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }
        Ok(entries)
    }

    fn all_entries(&self) -> RepoResult<Vec<Entry>> {
        let mut stmt = self.conn.prepare(
            "SELECT data FROM entries
             ORDER BY entry_date ASC, entry_time ASC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }
        Ok(entries)
    }

    fn fingerprint(&self, id: SourceId) -> RepoResult<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT fingerprint FROM source_fingerprints WHERE source_id = ?1;")?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(row.get(0)?));
        }
        Ok(None)
    }

    fn set_fingerprint(&mut self, id: SourceId, fingerprint: &str) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        ensure_source_in_tx(&tx, id)?;
        upsert_fingerprint_in_tx(&tx, id, fingerprint)?;
        tx.commit()?;
        Ok(())
    }

    fn replace_entries(
        &mut self,
        id: SourceId,
        entries: &[Entry],
        fingerprint: &str,
    ) -> RepoResult<()> {
        // Encode first so a bad entry cannot leave a half-written source.
        let rows = entries
            .iter()
            .map(|entry| {
                entry
                    .to_json()
                    .map(|data| (entry, data))
                    .map_err(RepoError::Encode)
            })
            .collect::<RepoResult<Vec<_>>>()?;

        let source_id = id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        ensure_source_in_tx(&tx, id)?;

        tx.execute("DELETE FROM entries WHERE source_id = ?1;", [source_id.as_str()])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO entries (source_id, entry_date, entry_time, data)
                 VALUES (?1, ?2, ?3, ?4);",
            )?;
            for (entry, data) in &rows {
                insert.execute(params![
                    source_id.as_str(),
                    entry.date.format("%Y-%m-%d").to_string(),
                    entry.time.map(|time| time.format("%H:%M:%S").to_string()),
                    data,
                ])?;
            }
        }
        upsert_fingerprint_in_tx(&tx, id, fingerprint)?;

        tx.commit()?;
        Ok(())
    }
}

fn ensure_source_in_tx(tx: &Transaction<'_>, id: SourceId) -> RepoResult<()> {
    let exists: i64 = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM sources WHERE id = ?1);",
        [id.to_string()],
        |row| row.get(0),
    )?;
    if exists == 1 {
        Ok(())
    } else {
        Err(RepoError::SourceNotFound(id))
    }
}

fn upsert_fingerprint_in_tx(tx: &Transaction<'_>, id: SourceId, fingerprint: &str) -> RepoResult<()> {
    tx.execute(
        "INSERT INTO source_fingerprints (source_id, fingerprint)
         VALUES (?1, ?2)
         ON CONFLICT (source_id) DO UPDATE SET
            fingerprint = excluded.fingerprint,
            refreshed_at = (strftime('%s', 'now') * 1000);",
        params![id.to_string(), fingerprint],
    )?;
    Ok(())
}

fn parse_source_row(row: &Row<'_>) -> RepoResult<Source> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in sources.id"))
    })?;

    let kind_text: String = row.get("kind")?;
    let kind = SourceKind::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid source kind `{kind_text}` in sources.kind"))
    })?;

    let config_text: String = row.get("config")?;
    let config: SourceConfig = serde_json::from_str(&config_text).map_err(|err| {
        RepoError::InvalidData(format!("invalid config for source {id}: {err}"))
    })?;
    if config.kind() != kind {
        return Err(RepoError::InvalidData(format!(
            "source {id} has kind `{kind_text}` but config for `{}`",
            config.kind().as_str()
        )));
    }

    let path: String = row.get("path")?;
    Ok(Source {
        id,
        path: PathBuf::from(path),
        config,
    })
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<Entry> {
    let data: String = row.get("data")?;
    Entry::from_json(&data)
        .map_err(|err| RepoError::InvalidData(format!("invalid entry document: {err}")))
}
