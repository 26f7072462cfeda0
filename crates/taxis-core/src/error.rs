use std::fmt;
use std::io;
use std::path::PathBuf;

/// Machine-readable error codes for scripts and operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    ItemNotFound,
    InvalidPayload,
    StoreOpenFailed,
    SchemaTooNew,
    CorruptStore,
    LockContention,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::ItemNotFound => "E2001",
            Self::InvalidPayload => "E2002",
            Self::StoreOpenFailed => "E3001",
            Self::SchemaTooNew => "E3002",
            Self::CorruptStore => "E3003",
            Self::LockContention => "E5002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Project not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::ItemNotFound => "Item not found",
            Self::InvalidPayload => "Item name or value too long",
            Self::StoreOpenFailed => "Could not open item store",
            Self::SchemaTooNew => "Store schema is newer than this binary",
            Self::CorruptStore => "Corrupt SQLite store",
            Self::LockContention => "Lock contention",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `taxis init` to create .taxis/ here."),
            Self::ConfigParseError => Some("Fix syntax in .taxis/config.toml and retry."),
            Self::ItemNotFound => None,
            Self::InvalidPayload => Some("Names and values are limited to 255 characters."),
            Self::StoreOpenFailed => Some("Check that .taxis/ is readable and writable."),
            Self::SchemaTooNew => Some("Upgrade taxis to a release that knows this schema."),
            Self::CorruptStore => Some("Restore .taxis/taxis.db from backup."),
            Self::LockContention => {
                Some("Retry after the other process finishes, or raise busy_timeout_ms.")
            }
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }

    /// Classify a raw SQLite failure.
    #[must_use]
    pub fn from_sqlite(err: &rusqlite::Error) -> Self {
        use rusqlite::ErrorCode as Sqlite;
        match err.sqlite_error_code() {
            Some(Sqlite::DatabaseBusy | Sqlite::DatabaseLocked) => Self::LockContention,
            Some(Sqlite::DatabaseCorrupt | Sqlite::NotADatabase) => Self::CorruptStore,
            Some(Sqlite::ConstraintViolation) => Self::InvalidPayload,
            _ => Self::InternalUnexpected,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failure to open, configure, or migrate a store database.
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("create store directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("open store database {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },

    #[error("configure sqlite pragmas: {0}")]
    Configure(#[source] rusqlite::Error),

    #[error("apply store migrations: {0}")]
    Migrate(#[source] rusqlite::Error),

    #[error("store schema version {found} is newer than supported version {supported}")]
    SchemaTooNew { found: u32, supported: u32 },
}

impl OpenError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::CreateDir { .. } => ErrorCode::StoreOpenFailed,
            Self::Open { source, .. } => match ErrorCode::from_sqlite(source) {
                ErrorCode::InternalUnexpected => ErrorCode::StoreOpenFailed,
                code => code,
            },
            Self::Configure(source) | Self::Migrate(source) => ErrorCode::from_sqlite(source),
            Self::SchemaTooNew { .. } => ErrorCode::SchemaTooNew,
        }
    }

    /// Optional remediation hint for operators.
    #[must_use]
    pub fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}
