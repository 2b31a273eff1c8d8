//! SQLite migration registry and executor.
//!
//! # Invariants
//! - `version` values are strictly increasing, starting at 1.
//! - Applied version is mirrored to `PRAGMA user_version` inside the same
//!   transaction as the schema change.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_init.sql"),
}];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies every migration newer than the connection's `user_version`.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the database is newer than this binary.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let pending = pending_migrations(from_version)?;
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in pending {
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
        debug!(
            "event=db_migrate module=db status=ok version={}",
            migration.version
        );
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=done from_version={from_version} to_version={}",
        latest_version()
    );
    Ok(())
}

fn pending_migrations(from_version: u32) -> DbResult<&'static [Migration]> {
    let latest = latest_version();
    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }
    let start = MIGRATIONS
        .iter()
        .position(|migration| migration.version > from_version)
        .unwrap_or(MIGRATIONS.len());
    Ok(&MIGRATIONS[start..])
}

#[cfg(test)]
mod tests {
    use super::{latest_version, pending_migrations, MIGRATIONS};

    #[test]
    fn versions_are_strictly_increasing_from_one() {
        for (index, migration) in MIGRATIONS.iter().enumerate() {
            assert_eq!(migration.version as usize, index + 1);
        }
    }

    #[test]
    fn fresh_database_runs_every_migration() {
        assert_eq!(pending_migrations(0).unwrap().len(), MIGRATIONS.len());
        assert!(pending_migrations(latest_version()).unwrap().is_empty());
    }

    #[test]
    fn newer_database_is_rejected() {
        assert!(pending_migrations(latest_version() + 1).is_err());
    }
}
