//! Collaborator traits driven by the schema manager

use crate::error::DbResult;
use async_trait::async_trait;
use omego_core::SchemaVersion;
use std::path::Path;

/// A database whose schema is tracked by version and changed by scripts.
///
/// Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait SchemaDatabase: Send + Sync {
    /// Verify the database server accepts connections
    async fn check_connection(&self) -> DbResult<()>;

    /// Schema version most recently recorded in the database.
    ///
    /// Fails with [`DbError::CommandFailed`](crate::DbError::CommandFailed)
    /// when the version table cannot be queried, e.g. because the database
    /// was never initialised.
    async fn current_version(&self) -> DbResult<SchemaVersion>;

    /// Execute one SQL script. The script is applied atomically or not at all
    /// as far as the implementation can guarantee.
    async fn apply_script(&self, script: &Path) -> DbResult<()>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}

/// Backup support
#[async_trait]
pub trait DatabaseDump: Send + Sync {
    /// Write a dump of the whole database to `target`
    async fn dump(&self, target: &Path) -> DbResult<()>;
}

/// Produces the SQL script that creates a new database
#[async_trait]
pub trait InitScriptGenerator: Send + Sync {
    /// Write the creation script to `target`
    async fn generate_init_script(&self, target: &Path, rootpass: &str) -> DbResult<()>;
}
