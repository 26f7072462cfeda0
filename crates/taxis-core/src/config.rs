use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory holding the project config and database.
pub const PROJECT_DIR: &str = ".taxis";

/// Project config file name inside [`PROJECT_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database file, relative to [`PROJECT_DIR`] unless absolute.
    #[serde(default = "default_db_file")]
    pub db_file: PathBuf,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_file: default_db_file(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl StoreConfig {
    #[must_use]
    pub const fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Resolve the database path for a project rooted at `project_root`.
    #[must_use]
    pub fn db_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(PROJECT_DIR).join(&self.db_file)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

/// Load `.taxis/config.toml` under `project_root`, or defaults if absent.
///
/// # Errors
///
/// Fails when the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(PROJECT_DIR).join(CONFIG_FILE);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load `<config_dir>/taxis/config.toml`, or defaults if absent.
///
/// # Errors
///
/// Fails when the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };
    load_user_config_from(&config_dir.join("taxis").join(CONFIG_FILE))
}

fn load_user_config_from(path: &Path) -> Result<UserConfig> {
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Render the config written by `taxis init`.
///
/// # Errors
///
/// Fails only if TOML serialization fails.
pub fn render_project_config(config: &ProjectConfig) -> Result<String> {
    toml::to_string_pretty(config).context("Failed to serialize project config")
}

/// Walk up from `start` to the first directory containing [`PROJECT_DIR`].
#[must_use]
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(PROJECT_DIR).is_dir())
        .map(Path::to_path_buf)
}

/// Canonical output mode name for a user-supplied string.
#[must_use]
pub fn normalize_output_mode(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pretty" | "human" => Some("pretty"),
        "text" | "table" => Some("text"),
        "json" => Some("json"),
        _ => None,
    }
}

fn default_db_file() -> PathBuf {
    PathBuf::from("taxis.db")
}

const fn default_busy_timeout_ms() -> u64 {
    5_000
}
