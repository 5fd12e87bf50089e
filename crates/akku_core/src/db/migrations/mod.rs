//! Schema migrations for sources, entries and fingerprints.
//!
//! # Invariants
//! - Versions start at 1 and increase by exactly one per step.
//! - All pending steps run in one transaction together with the
//!   `user_version` bump; a failed step leaves the schema untouched.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// One schema step; `MIGRATIONS[i]` upgrades version `i` to `i + 1`.
struct Step {
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Step] = &[
    Step {
        name: "init",
        sql: include_str!("0001_init.sql"),
    },
    Step {
        name: "fingerprints",
        sql: include_str!("0002_fingerprints.sql"),
    },
];

/// Schema version written by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.len() as u32
}

/// Brings the schema on `conn` up to `latest_version()`.
///
/// # Errors
/// - `DbError::UnsupportedSchemaVersion` when the file is newer than this binary.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = schema_version(conn)?;
    let to = latest_version();
    if from > to {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: to,
        });
    }

    let pending = &MIGRATIONS[from as usize..];
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (offset, step) in pending.iter().enumerate() {
        let version = from + offset as u32 + 1;
        tx.execute_batch(step.sql)?;
        info!(
            "event=db_migrate module=db status=ok version={version} step={}",
            step.name
        );
    }
    tx.pragma_update(None, "user_version", to)?;
    tx.commit()?;
    Ok(())
}

fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}
