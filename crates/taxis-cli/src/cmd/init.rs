use crate::output::{CliError, OutputMode, fail, pretty_kv, render_mode};
use crate::project;
use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use taxis_core::config::{self, CONFIG_FILE, PROJECT_DIR, ProjectConfig};
use taxis_core::db::migrations::LATEST_SCHEMA_VERSION;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Rewrite `.taxis/config.toml` even if the project already exists.
    #[arg(long)]
    pub force: bool,
}

const GITIGNORE: &str = "*.db\n*.db-wal\n*.db-shm\n";

#[derive(Debug, Serialize)]
struct InitReport {
    root: PathBuf,
    config: PathBuf,
    database: PathBuf,
    schema_version: u32,
    reinitialized: bool,
}

/// Execute `taxis init`. Creates the project skeleton:
///
/// ```text
/// .taxis/
///   config.toml   (default project config)
///   .gitignore    (database and WAL side files)
///   taxis.db      (migrated SQLite store)
/// ```
///
/// An existing database is kept; `--force` only rewrites the config.
///
/// # Errors
///
/// Returns an error if `.taxis/` already exists without `--force`, or if any
/// filesystem or database step fails.
pub fn run_init(args: &InitArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let taxis_dir = project_root.join(PROJECT_DIR);
    let existed = taxis_dir.exists();

    if existed && !args.force {
        return fail(
            output,
            &CliError::new(format!("{PROJECT_DIR}/ already exists"))
                .suggest("use `taxis init --force` to rewrite the config"),
        );
    }

    std::fs::create_dir_all(&taxis_dir)
        .with_context(|| format!("Failed to create {}", taxis_dir.display()))?;

    let project_config = ProjectConfig::default();
    let config_path = taxis_dir.join(CONFIG_FILE);
    std::fs::write(&config_path, config::render_project_config(&project_config)?)
        .with_context(|| format!("Failed to write config: {}", config_path.display()))?;

    let gitignore_path = taxis_dir.join(".gitignore");
    std::fs::write(&gitignore_path, GITIGNORE)
        .with_context(|| format!("Failed to write .gitignore: {}", gitignore_path.display()))?;

    // opening the store creates and migrates the database
    project::open_store(project_root, &project_config, output)?;

    let report = InitReport {
        root: project_root.to_path_buf(),
        config: config_path,
        database: project_config.store.db_path(project_root),
        schema_version: LATEST_SCHEMA_VERSION,
        reinitialized: existed,
    };
    tracing::info!(root = %project_root.display(), reinitialized = existed, "initialized project");

    render_mode(
        output,
        &report,
        |r, w| writeln!(w, "{}", r.database.display()),
        |r, w| {
            writeln!(w, "✓ Initialized {PROJECT_DIR}/ project structure.")?;
            writeln!(w)?;
            pretty_kv(w, "config", r.config.display().to_string())?;
            pretty_kv(w, "database", r.database.display().to_string())?;
            pretty_kv(w, "schema", format!("v{}", r.schema_version))?;
            writeln!(w)?;
            writeln!(w, "Next: taxis add --group 0 --name <NAME>")
        },
    )
}
