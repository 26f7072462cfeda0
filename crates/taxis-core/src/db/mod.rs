//! SQLite store database utilities.
//!
//! Runtime defaults:
//! - `journal_mode = WAL` to allow concurrent readers while a writer commits
//! - `busy_timeout` (5s unless configured) to ride out short lock contention
//! - `foreign_keys = ON`

pub mod migrations;
pub mod schema;
pub mod sqlite;

use crate::error::OpenError;
use rusqlite::Connection;
use std::{path::Path, time::Duration};

/// Busy timeout used when the config does not override it.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (or create) the store database, apply runtime pragmas, and migrate
/// the schema to the latest version.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created, the database
/// cannot be opened or configured, its schema is newer than this binary, or
/// a migration fails.
pub fn open_store(path: &Path, busy_timeout: Duration) -> Result<Connection, OpenError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| OpenError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut conn = Connection::open(path).map_err(|source| OpenError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    configure_connection(&conn, busy_timeout).map_err(OpenError::Configure)?;
    prepare_schema(&mut conn)?;

    tracing::debug!(path = %path.display(), "opened item store");
    Ok(conn)
}

/// Open a private in-memory store with the latest schema.
///
/// # Errors
///
/// Returns an error if SQLite cannot allocate the database or migration fails.
pub fn open_in_memory() -> Result<Connection, OpenError> {
    let mut conn = Connection::open_in_memory().map_err(|source| OpenError::Open {
        path: ":memory:".into(),
        source,
    })?;
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(OpenError::Configure)?;
    prepare_schema(&mut conn)?;
    Ok(conn)
}

fn prepare_schema(conn: &mut Connection) -> Result<(), OpenError> {
    let found = migrations::current_schema_version(conn).map_err(OpenError::Migrate)?;
    if found > migrations::LATEST_SCHEMA_VERSION {
        return Err(OpenError::SchemaTooNew {
            found,
            supported: migrations::LATEST_SCHEMA_VERSION,
        });
    }
    migrations::migrate(conn).map_err(OpenError::Migrate)?;
    Ok(())
}

fn configure_connection(conn: &Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    let _journal_mode: String =
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    conn.busy_timeout(busy_timeout)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_BUSY_TIMEOUT, open_store};
    use crate::db::migrations;
    use crate::error::{ErrorCode, OpenError};
    use std::time::Duration;
    use tempfile::TempDir;

    fn temp_db_path() -> (TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(".taxis").join("taxis.db");
        (dir, path)
    }

    #[test]
    fn open_store_sets_wal_busy_timeout_and_fk() {
        let (_dir, path) = temp_db_path();
        let conn = open_store(&path, DEFAULT_BUSY_TIMEOUT).expect("open store db");

        let journal_mode: String = conn
            .pragma_query_value(None, "journal_mode", |row| row.get(0))
            .expect("query journal_mode");
        assert_eq!(journal_mode.to_ascii_lowercase(), "wal");

        let busy_timeout_ms: u64 = conn
            .pragma_query_value(None, "busy_timeout", |row| row.get(0))
            .expect("query busy_timeout");
        assert_eq!(
            u128::from(busy_timeout_ms),
            DEFAULT_BUSY_TIMEOUT.as_millis()
        );

        let foreign_keys: i64 = conn
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .expect("query foreign_keys");
        assert_eq!(foreign_keys, 1);
    }

    #[test]
    fn open_store_honors_configured_busy_timeout() {
        let (_dir, path) = temp_db_path();
        let conn = open_store(&path, Duration::from_millis(250)).expect("open store db");
        let busy_timeout_ms: u64 = conn
            .pragma_query_value(None, "busy_timeout", |row| row.get(0))
            .expect("query busy_timeout");
        assert_eq!(busy_timeout_ms, 250);
    }

    #[test]
    fn open_store_runs_migrations() {
        let (_dir, path) = temp_db_path();
        let conn = open_store(&path, DEFAULT_BUSY_TIMEOUT).expect("open store db");

        let version = migrations::current_schema_version(&conn).expect("schema version query");
        assert_eq!(version, migrations::LATEST_SCHEMA_VERSION);

        let meta_version: i64 = conn
            .query_row(
                "SELECT schema_version FROM store_meta WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .expect("store_meta schema version");
        assert_eq!(meta_version, i64::from(migrations::LATEST_SCHEMA_VERSION));
    }

    #[test]
    fn open_store_rejects_newer_schema() {
        let (_dir, path) = temp_db_path();
        {
            let conn = open_store(&path, DEFAULT_BUSY_TIMEOUT).expect("open store db");
            conn.pragma_update(
                None,
                "user_version",
                i64::from(migrations::LATEST_SCHEMA_VERSION + 1),
            )
            .expect("bump user_version");
        }

        let err = open_store(&path, DEFAULT_BUSY_TIMEOUT).expect_err("newer schema must fail");
        assert!(matches!(err, OpenError::SchemaTooNew { .. }));
        assert_eq!(err.code(), ErrorCode::SchemaTooNew);
    }
}
