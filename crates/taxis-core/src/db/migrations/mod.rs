//! SQLite schema migrations for the item store.
//!
//! `PRAGMA user_version` says which migrations have run. Each migration's
//! SQL also writes its own version into `store_meta`.

use super::schema;
use rusqlite::Connection;
use tracing::info;

/// Latest schema version understood by this binary.
pub const LATEST_SCHEMA_VERSION: u32 = 2;

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "items",
        sql: schema::MIGRATION_V1_SQL,
    },
    Migration {
        version: 2,
        name: "ordering indexes",
        sql: schema::MIGRATION_V2_SQL,
    },
];

/// The database's `PRAGMA user_version`.
///
/// # Errors
///
/// Returns an error if the pragma cannot be read or is negative.
pub fn current_schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
}

/// Run every migration newer than the database, oldest first, each in its
/// own transaction. Returns the resulting schema version.
///
/// # Errors
///
/// Returns an error if any migration fails; earlier ones stay applied.
pub fn migrate(conn: &mut Connection) -> rusqlite::Result<u32> {
    let found = current_schema_version(conn)?;
    let mut reached = found;

    for migration in MIGRATIONS.iter().filter(|m| m.version > found) {
        let tx = conn.transaction()?;
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
        tx.commit()?;
        info!(
            version = migration.version,
            migration = migration.name,
            "migrated store schema"
        );
        reached = migration.version;
    }

    Ok(reached)
}
