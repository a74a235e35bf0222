//! Schema steps for the key-value store.
//!
//! Each step is a `(version, name, sql)` triple applied in order inside one
//! transaction; the last applied version is recorded in `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

const SCHEMA_STEPS: &[(u32, &str, &str)] =
    &[(1, "kv_entries", include_str!("0001_kv_entries.sql"))];

/// Highest schema version this build can open.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |(version, _, _)| *version)
}

/// Schema version recorded in the store file.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

/// Brings the schema up to [`latest_version`]. Returns how many steps ran.
///
/// A store written by a newer build is refused rather than downgraded.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let found = schema_version(conn)?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::UnsupportedSchemaVersion { found, supported });
    }

    let pending: Vec<_> = SCHEMA_STEPS
        .iter()
        .filter(|(version, _, _)| *version > found)
        .collect();
    if pending.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    for (version, name, sql) in &pending {
        tx.execute_batch(sql)
            .and_then(|()| tx.pragma_update(None, "user_version", version))
            .map_err(|source| DbError::Migration {
                version: *version,
                source,
            })?;
        info!("event=db_migrate module=db status=ok version={version} step={name}");
    }
    tx.commit()?;

    Ok(pending.len())
}
