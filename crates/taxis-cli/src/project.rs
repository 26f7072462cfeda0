//! Locate the enclosing `.taxis/` project and open its store.

use crate::output::{CliError, OutputMode, fail};
use anyhow::Result;
use std::path::Path;
use taxis_core::config::{self, ProjectConfig};
use taxis_core::error::ErrorCode;
use taxis_core::{OrderedItemStore, SqliteBackend, WriteError};

pub type Store = OrderedItemStore<SqliteBackend>;

/// Find the project enclosing `cwd`, load its config, and open the store.
///
/// Failures are rendered in `output` before being returned.
///
/// # Errors
///
/// Returns an error if no project is found, the config cannot be parsed, or
/// the database cannot be opened.
pub fn open(cwd: &Path, output: OutputMode) -> Result<Store> {
    let Some(root) = config::find_project_root(cwd) else {
        return fail(
            output,
            &CliError::with_code(
                ErrorCode::NotInitialized,
                format!("no {} directory found from {}", config::PROJECT_DIR, cwd.display()),
            ),
        );
    };

    let project_config = match config::load_project_config(&root) {
        Ok(cfg) => cfg,
        Err(err) => {
            return fail(
                output,
                &CliError::with_code(ErrorCode::ConfigParseError, format!("{err:#}")),
            );
        }
    };

    open_store(&root, &project_config, output)
}

/// Open (creating if needed) the store described by `project_config`.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or migrated.
pub fn open_store(root: &Path, project_config: &ProjectConfig, output: OutputMode) -> Result<Store> {
    let path = project_config.store.db_path(root);
    match SqliteBackend::open(&path, project_config.store.busy_timeout()) {
        Ok(backend) => {
            tracing::debug!(root = %root.display(), "opened project store");
            Ok(OrderedItemStore::new(backend))
        }
        Err(err) => fail(output, &CliError::from(&err)),
    }
}

/// Render a store failure and convert it into a command error.
pub fn store_failure<T>(output: OutputMode, err: &rusqlite::Error) -> Result<T> {
    tracing::warn!(error = %err, "store operation failed");
    fail(output, &CliError::from(err))
}

/// Render a rejected insert or update: payload errors as `InvalidPayload`,
/// everything else as a store failure.
pub fn write_failure<T>(output: OutputMode, err: &WriteError<rusqlite::Error>) -> Result<T> {
    match err {
        WriteError::Payload(payload) => fail(
            output,
            &CliError::with_code(ErrorCode::InvalidPayload, payload.to_string()),
        ),
        WriteError::Backend(err) => store_failure(output, err),
    }
}

/// Render an `ItemNotFound` error for `id`.
pub fn not_found<T>(output: OutputMode, id: i64) -> Result<T> {
    fail(
        output,
        &CliError::with_code(ErrorCode::ItemNotFound, format!("item {id} not found"))
            .suggest("use `taxis ls --group <GROUP>` to see item ids"),
    )
}
