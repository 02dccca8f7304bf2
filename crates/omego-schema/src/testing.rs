//! In-memory collaborators for tests

use async_trait::async_trait;
use omego_core::SchemaVersion;
use omego_db::{DbError, DbResult, InitScriptGenerator, SchemaDatabase};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A database that records every script it is asked to apply
#[derive(Debug, Default)]
pub struct RecordingDatabase {
    current: Option<String>,
    connected: bool,
    fail_on: Option<PathBuf>,
    applied: Mutex<Vec<PathBuf>>,
    version_queries: Mutex<usize>,
}

impl RecordingDatabase {
    /// A database whose `dbpatch` table reports `token`
    pub fn at(token: &str) -> Self {
        Self {
            current: Some(token.to_string()),
            connected: true,
            ..Self::default()
        }
    }

    /// A reachable database without a `dbpatch` table
    pub fn uninitialised() -> Self {
        Self {
            connected: true,
            ..Self::default()
        }
    }

    /// Refuse connections
    pub fn disconnected(mut self) -> Self {
        self.connected = false;
        self
    }

    /// Fail when asked to apply `script`
    pub fn failing_on(mut self, script: impl Into<PathBuf>) -> Self {
        self.fail_on = Some(script.into());
        self
    }

    /// Scripts applied so far, in order
    pub fn applied(&self) -> Vec<PathBuf> {
        self.applied.lock().unwrap().clone()
    }

    pub fn version_queries(&self) -> usize {
        *self.version_queries.lock().unwrap()
    }
}

fn command_failed(command: &str, stderr: &str) -> DbError {
    DbError::CommandFailed {
        command: command.to_string(),
        code: 1,
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

#[async_trait]
impl SchemaDatabase for RecordingDatabase {
    async fn check_connection(&self) -> DbResult<()> {
        if self.connected {
            Ok(())
        } else {
            Err(command_failed("psql -c \\conninfo", "could not connect to server"))
        }
    }

    async fn current_version(&self) -> DbResult<SchemaVersion> {
        *self.version_queries.lock().unwrap() += 1;
        match &self.current {
            Some(token) => SchemaVersion::parse(token).map_err(|e| DbError::InvalidVersion {
                value: token.clone(),
                reason: e.to_string(),
            }),
            None => Err(command_failed(
                "psql -c SELECT currentversion, currentpatch FROM dbpatch",
                "relation \"dbpatch\" does not exist",
            )),
        }
    }

    async fn apply_script(&self, script: &Path) -> DbResult<()> {
        self.applied.lock().unwrap().push(script.to_path_buf());
        if self.fail_on.as_deref() == Some(script) {
            return Err(command_failed(
                &format!("psql -f {}", script.display()),
                "ERROR: syntax error",
            ));
        }
        Ok(())
    }

    fn db_type(&self) -> &'static str {
        "recording"
    }
}

/// Writes a placeholder creation script and records the calls
#[derive(Debug, Default)]
pub struct RecordingGenerator {
    generated: Mutex<Vec<(PathBuf, String)>>,
}

impl RecordingGenerator {
    /// (target, rootpass) pairs, in call order
    pub fn generated(&self) -> Vec<(PathBuf, String)> {
        self.generated.lock().unwrap().clone()
    }
}

#[async_trait]
impl InitScriptGenerator for RecordingGenerator {
    async fn generate_init_script(&self, target: &Path, rootpass: &str) -> DbResult<()> {
        self.generated
            .lock()
            .unwrap()
            .push((target.to_path_buf(), rootpass.to_string()));
        std::fs::write(target, "-- generated\n").map_err(|e| DbError::Spawn {
            command: "omero db script".to_string(),
            source: e,
        })
    }
}

/// Create `<root>/<to>/<from>.sql` for each `(from, to)` pair and return the
/// script paths in the same order
pub fn write_script_tree(root: &Path, pairs: &[(&str, &str)]) -> Vec<PathBuf> {
    pairs
        .iter()
        .map(|(from, to)| {
            let dir = root.join(to);
            std::fs::create_dir_all(&dir).unwrap();
            let path = dir.join(format!("{from}.sql"));
            std::fs::write(&path, format!("-- {from} -> {to}\n")).unwrap();
            path
        })
        .collect()
}
