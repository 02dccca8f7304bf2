//! PostgreSQL backend driven through the `psql` and `pg_dump` clients

use crate::error::{DbError, DbResult};
use crate::external::ExternalCommand;
use crate::traits::{DatabaseDump, SchemaDatabase};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone};
use omego_core::{DbConfig, EnvironmentSnapshot, SchemaVersion};
use std::collections::HashMap;
use std::path::Path;

/// Query for the most recently applied schema patch
pub const CURRENT_VERSION_QUERY: &str =
    "SELECT currentversion, currentpatch FROM dbpatch ORDER BY id DESC LIMIT 1";

/// PostgreSQL database reached with the command line clients.
///
/// The password is passed through `PGPASSWORD` and `-w` stops the clients
/// from ever prompting.
#[derive(Debug, Clone)]
pub struct PsqlBackend {
    host: String,
    name: String,
    user: String,
    pass: String,
    child_env: HashMap<String, String>,
}

impl PsqlBackend {
    /// Create a backend from validated database settings
    pub fn new(db: &DbConfig, env: &EnvironmentSnapshot) -> DbResult<Self> {
        let name = db
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or(DbError::MissingDatabaseName)?;
        Ok(Self {
            host: db.host().to_string(),
            name: name.to_string(),
            user: db.user.clone(),
            pass: db.pass.clone(),
            child_env: env.child_env(),
        })
    }

    /// Database name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Connection arguments shared by every psql call: unaligned, tuples only
    pub fn connection_args(&self) -> Vec<String> {
        vec![
            "-d".to_string(),
            self.name.clone(),
            "-h".to_string(),
            self.host.clone(),
            "-U".to_string(),
            self.user.clone(),
            "-w".to_string(),
            "-A".to_string(),
            "-t".to_string(),
        ]
    }

    fn command(&self, exe: &str) -> ExternalCommand {
        ExternalCommand::new(exe)
            .envs(self.child_env.clone())
            .env("PGPASSWORD", self.pass.clone())
    }

    /// Build a psql invocation with connection arguments followed by `args`
    pub fn psql_command<I, S>(&self, args: I) -> ExternalCommand
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command("psql")
            .args(self.connection_args())
            .args(args)
    }

    /// Run psql and return its stdout
    pub async fn psql<I, S>(&self, args: I) -> DbResult<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let out = self.psql_command(args).run().await?;
        if !out.stderr.trim().is_empty() {
            log::warn!("stderr: {}", out.stderr.trim());
        }
        log::debug!("stdout: {}", out.stdout);
        Ok(out.stdout)
    }

    /// Version string of the psql client
    pub async fn client_version(&self) -> DbResult<String> {
        let out = ExternalCommand::new("psql").arg("--version").run().await?;
        Ok(out.stdout.trim().to_string())
    }

    /// Build the pg_dump invocation writing a custom-format archive
    pub fn dump_command(&self, target: &Path) -> ExternalCommand {
        self.command("pg_dump").args([
            "-d".to_string(),
            self.name.clone(),
            "-h".to_string(),
            self.host.clone(),
            "-U".to_string(),
            self.user.clone(),
            "-w".to_string(),
            "-Fc".to_string(),
            "-f".to_string(),
            target.display().to_string(),
        ])
    }
}

#[async_trait]
impl SchemaDatabase for PsqlBackend {
    async fn check_connection(&self) -> DbResult<()> {
        self.psql(["-c", "\\conninfo"]).await.map(|_| ())
    }

    async fn current_version(&self) -> DbResult<SchemaVersion> {
        log::debug!("Executing query: {}", CURRENT_VERSION_QUERY);
        let stdout = self.psql(["-c", CURRENT_VERSION_QUERY]).await?;
        let version = parse_version_rows(&stdout)?;
        log::info!("Current omero db version: {}", version);
        Ok(version)
    }

    async fn apply_script(&self, script: &Path) -> DbResult<()> {
        // psql exits 0 after a failed statement unless told to stop
        self.psql([
            "-v".to_string(),
            "ON_ERROR_STOP=on".to_string(),
            "-f".to_string(),
            script.display().to_string(),
        ])
        .await
        .map(|_| ())
    }

    fn db_type(&self) -> &'static str {
        "postgresql"
    }
}

#[async_trait]
impl DatabaseDump for PsqlBackend {
    async fn dump(&self, target: &Path) -> DbResult<()> {
        self.dump_command(target).run().await.map(|_| ())
    }
}

/// Parse the unaligned output of [`CURRENT_VERSION_QUERY`], e.g. `OMERO4.4|0`
pub fn parse_version_rows(stdout: &str) -> DbResult<SchemaVersion> {
    let rows: Vec<&str> = stdout.lines().filter(|l| !l.trim().is_empty()).collect();
    let [row] = rows.as_slice() else {
        return Err(DbError::UnexpectedRows {
            expected: 1,
            found: rows.len(),
        });
    };

    let (version, patch) = row.split_once('|').ok_or_else(|| DbError::InvalidVersion {
        value: row.to_string(),
        reason: "expected 'version|patch'".to_string(),
    })?;

    SchemaVersion::from_db_row(version, patch).map_err(|e| DbError::InvalidVersion {
        value: row.to_string(),
        reason: e.to_string(),
    })
}

/// File name for a database dump taken at `now`
pub fn dump_file_name<Tz: TimeZone>(dbname: &str, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "omero-database-{}-{}.pgdump",
        dbname,
        now.format("%Y%m%d-%H%M%S-%6f")
    )
}

#[cfg(test)]
#[path = "psql_test.rs"]
mod tests;
