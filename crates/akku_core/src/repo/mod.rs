//! Persistence of sources, entries and fingerprints.
//!
//! # Responsibility
//! - Define the key-value style store contract consumed by refresh.
//! - Isolate SQLite query details from parsing and aggregation.
//!
//! # Invariants
//! - Replacing a source's entries and its fingerprint is one atomic unit.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod entry_repo;
