//! Error types for omego-schema

use omego_db::DbError;
use thiserror::Error;

/// Schema planning and upgrade errors
#[derive(Error, Debug)]
pub enum SchemaError {
    /// No chain of scripts reaches the latest version (S001)
    #[error("[S001] No upgrade path found from {from} to {to}")]
    NoUpgradePath { from: String, to: String },

    /// Version is not part of the version graph (S002)
    #[error("[S002] Schema version {version} is not known")]
    UnknownVersion { version: String },

    /// Database has never been initialised (S003)
    #[error("[S003] OMERO database not found, it must be initialised first")]
    InitRequired,

    /// Database is behind and upgrading was not requested (S004)
    #[error("[S004] OMERO database at {current} is out of date (latest {latest}), pass --managedb or upgrade the database manually")]
    UpgradeRequired { current: String, latest: String },

    /// An upgrade or creation script failed (S005)
    #[error("[S005] Script {script} failed: {source}")]
    ScriptApplication { script: String, source: DbError },

    /// The creation script could not be generated (S006)
    #[error("[S006] Failed to create SQL script {script}: {source}")]
    InitScript { script: String, source: DbError },

    /// Current version query returned something unusable (S007)
    #[error("[S007] Failed to read current database version: {0}")]
    CurrentVersion(#[source] DbError),

    /// Upgrade script tree could not be scanned (S008)
    #[error("[S008] Failed to scan upgrade scripts under {root}: {message}")]
    Discovery { root: String, message: String },

    /// Database is ahead of every shipped upgrade script (S009)
    #[error("[S009] Database version {current} is newer than the latest upgrade script version {latest}")]
    DatabaseNewer { current: String, latest: String },
}

/// Result type alias for SchemaError
pub type SchemaResult<T> = Result<T, SchemaError>;
