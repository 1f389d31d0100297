//! Schema migration registry.
//!
//! # Responsibility
//! - Apply pending migrations atomically, in strictly increasing order.
//!
//! # Invariants
//! - The applied version is mirrored to `PRAGMA user_version`.
//! - A database from a newer binary is rejected, never "repaired".

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

/// Ordered `(version, sql)` pairs; versions must stay monotonic.
const MIGRATIONS: &[(u32, &str)] = &[(1, include_str!("0001_init.sql"))];

/// Latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |(version, _)| *version)
}

/// Applies every migration newer than the database's current version.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;

    if current > latest_version() {
        return Err(DbError::SchemaTooNew {
            db_version: current,
            supported: latest_version(),
        });
    }

    let pending: Vec<_> = MIGRATIONS
        .iter()
        .filter(|(version, _)| *version > current)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (version, sql) in pending {
        tx.execute_batch(sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {version};"))?;
    }
    tx.commit()?;

    Ok(())
}
