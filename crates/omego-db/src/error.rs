//! Error types for omego-db

use thiserror::Error;

/// Database collaborator errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Executable not found on PATH (D001)
    #[error("[D001] Executable not found: {exe}")]
    CommandNotFound { exe: String },

    /// Process could not be started (D002)
    #[error("[D002] Failed to execute {command}: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    /// Non-zero exit status (D003)
    #[error("[D003] Non-zero return code {code}\ncommand: {command}\nstderr: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stdout: String,
        stderr: String,
    },

    /// Query returned the wrong number of rows (D004)
    #[error("[D004] Got {found} rows, expected {expected}")]
    UnexpectedRows { expected: usize, found: usize },

    /// Version recorded in the database is not a schema token (D005)
    #[error("[D005] Invalid database version '{value}': {reason}")]
    InvalidVersion { value: String, reason: String },

    /// No database name configured (D006)
    #[error("[D006] Database name required")]
    MissingDatabaseName,

    /// OMERO command line client not usable (D007)
    #[error("[D007] OMERO CLI unavailable: {reason}")]
    OmeroCliUnavailable { reason: String },
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// True if an external command ran and reported failure, as opposed to
    /// the command being missing or its output being malformed.
    pub fn is_command_failure(&self) -> bool {
        matches!(self, DbError::CommandFailed { .. })
    }
}
