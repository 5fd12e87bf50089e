//! Refresh orchestration over the entry store.
//!
//! # Responsibility
//! - Classify each source as fresh or stale from its fingerprint.
//! - Re-parse stale sources and hand results to the store atomically.
//! - Report per-source outcomes without aborting on a single failure.
//!
//! # Invariants
//! - `Stale` sources are written with `EntryStore::replace_entries` only, so
//!   entries and fingerprint change together or not at all.
//! - Force refresh classifies every source as `Stale`.

use super::fingerprint::fingerprint_path;
use crate::model::source::{Source, SourceId};
use crate::parse::{parse_source, Decryptor, ParseError};
use crate::repo::entry_repo::{EntryStore, RepoError, RepoResult};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;
use std::time::Instant;

/// Per-source refresh state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    /// Not classified, e.g. because its fingerprint could not be computed.
    Unknown,
    /// Stored fingerprint matches current content.
    Fresh,
    /// Content changed, never refreshed, or force refresh requested.
    Stale,
}

/// Classifies a source from its stored and current fingerprints.
pub fn classify(stored: Option<&str>, current: &str, force: bool) -> SourceState {
    match stored {
        _ if force => SourceState::Stale,
        Some(stored) if stored == current => SourceState::Fresh,
        _ => SourceState::Stale,
    }
}

/// Options for one refresh run.
#[derive(Debug, Clone, Default)]
pub struct RefreshOptions {
    /// Re-parse every source regardless of fingerprints.
    pub force: bool,
    /// Required by encrypted archive sources; never persisted.
    pub passphrase: Option<String>,
}

/// Failure to refresh one source.
#[derive(Debug)]
pub enum RefreshError {
    Fingerprint { path: PathBuf, source: io::Error },
    Parse(ParseError),
    Store(RepoError),
}

impl Display for RefreshError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fingerprint { path, source } => {
                write!(f, "cannot fingerprint `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "parse failed: {err}"),
            Self::Store(err) => write!(f, "store update failed: {err}"),
        }
    }
}

impl Error for RefreshError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Fingerprint { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<ParseError> for RefreshError {
    fn from(value: ParseError) -> Self {
        Self::Parse(value)
    }
}

impl From<RepoError> for RefreshError {
    fn from(value: RepoError) -> Self {
        Self::Store(value)
    }
}

/// What happened to one source during a refresh.
#[derive(Debug)]
pub enum RefreshResult {
    /// Fresh source; entries untouched.
    Skipped,
    /// Stale source re-parsed; entries replaced.
    Replaced { entries: usize },
    /// Last-good entries and fingerprint preserved.
    Failed(RefreshError),
}

/// Outcome for one source.
#[derive(Debug)]
pub struct SourceOutcome {
    pub source_id: SourceId,
    pub path: PathBuf,
    pub state: SourceState,
    pub result: RefreshResult,
}

impl SourceOutcome {
    pub fn error(&self) -> Option<&RefreshError> {
        match &self.result {
            RefreshResult::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Outcomes of one refresh run, in source registration order.
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub outcomes: Vec<SourceOutcome>,
}

impl RefreshReport {
    pub fn failures(&self) -> impl Iterator<Item = &SourceOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.error().is_some())
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    /// Number of sources whose entries were replaced.
    pub fn refreshed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome.result, RefreshResult::Replaced { .. }))
            .count()
    }

    /// Number of fresh sources left untouched.
    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome.result, RefreshResult::Skipped))
            .count()
    }
}

/// Re-synchronizes an entry store with its registered sources.
pub struct RefreshEngine<S: EntryStore, D: Decryptor> {
    store: S,
    decryptor: D,
}

impl<S: EntryStore, D: Decryptor> RefreshEngine<S, D> {
    pub fn new(store: S, decryptor: D) -> Self {
        Self { store, decryptor }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Refreshes every registered source.
    ///
    /// Only listing the sources can fail the whole run; per-source failures
    /// are recorded in the report.
    pub fn refresh(&mut self, options: &RefreshOptions) -> RepoResult<RefreshReport> {
        let started_at = Instant::now();
        let sources = self.store.list_sources()?;
        info!(
            "event=refresh module=refresh status=start sources={} force={}",
            sources.len(),
            options.force
        );

        let outcomes: Vec<SourceOutcome> = sources
            .iter()
            .map(|source| self.refresh_source(source, options))
            .collect();
        let report = RefreshReport { outcomes };

        info!(
            "event=refresh module=refresh status=ok refreshed={} skipped={} failed={} duration_ms={}",
            report.refreshed_count(),
            report.skipped_count(),
            report.failed_count(),
            started_at.elapsed().as_millis()
        );
        Ok(report)
    }

    /// Refreshes one source and records its outcome.
    pub fn refresh_source(&mut self, source: &Source, options: &RefreshOptions) -> SourceOutcome {
        let mut state = SourceState::Unknown;
        let result = match self.sync_source(source, options, &mut state) {
            Ok(result) => result,
            Err(err) => {
                error!(
                    "event=source_refresh module=refresh status=error source_id={} kind={} error={err}",
                    source.id,
                    source.kind().as_str()
                );
                RefreshResult::Failed(err)
            }
        };

        SourceOutcome {
            source_id: source.id,
            path: source.path.clone(),
            state,
            result,
        }
    }

    fn sync_source(
        &mut self,
        source: &Source,
        options: &RefreshOptions,
        state: &mut SourceState,
    ) -> Result<RefreshResult, RefreshError> {
        let current = fingerprint_path(&source.path).map_err(|err| RefreshError::Fingerprint {
            path: source.path.clone(),
            source: err,
        })?;
        let stored = self.store.fingerprint(source.id)?;
        *state = classify(stored.as_deref(), &current, options.force);

        match *state {
            SourceState::Fresh => {
                self.store.set_fingerprint(source.id, &current)?;
                info!(
                    "event=source_refresh module=refresh status=skip source_id={} reason=fresh",
                    source.id
                );
                Ok(RefreshResult::Skipped)
            }
            SourceState::Stale | SourceState::Unknown => {
                let entries = parse_source(source, options.passphrase.as_deref(), &self.decryptor)?;
                self.store.replace_entries(source.id, &entries, &current)?;
                info!(
                    "event=source_refresh module=refresh status=ok source_id={} kind={} entries={}",
                    source.id,
                    source.kind().as_str(),
                    entries.len()
                );
                Ok(RefreshResult::Replaced {
                    entries: entries.len(),
                })
            }
        }
    }
}
