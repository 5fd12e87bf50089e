//! Canonical journal data model.
//!
//! # Responsibility
//! - Define the entry shape every source format is parsed into.
//! - Define typed source configuration persisted by the registry.
//!
//! # Invariants
//! - Every `Entry` carries a calendar date; time is optional.
//! - Entries are never mutated after a parse; re-parsing yields a new set.

pub mod entry;
pub mod source;
