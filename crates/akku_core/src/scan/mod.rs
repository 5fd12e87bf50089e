//! Lexical annotation scanning over entry text.
//!
//! # Responsibility
//! - Extract trackers (`#name(n)`), people (`@name`) and contexts (`+name`).
//!
//! # Invariants
//! - Scanning never fails for any input.
//! - Results keep order of appearance and retain duplicates.

pub mod annotations;

pub use annotations::{scan_annotations, scan_contexts, scan_people, scan_trackers, Annotations};
