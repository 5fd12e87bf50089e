//! Source refresh with content fingerprints.
//!
//! # Responsibility
//! - Detect which registered sources changed since the last refresh.
//! - Re-parse only changed sources and replace their stored entries.
//!
//! # Invariants
//! - A failing source keeps its last-good entries and fingerprint.
//! - One failing source never stops the refresh of the others.
//! - The store is written only from the refreshing thread.

pub mod engine;
pub mod fingerprint;

pub use engine::{
    classify, RefreshEngine, RefreshError, RefreshOptions, RefreshReport, RefreshResult,
    SourceOutcome, SourceState,
};
pub use fingerprint::fingerprint_path;
