//! Creation of a new OMERO database

use crate::error::{SchemaError, SchemaResult};
use async_trait::async_trait;
use omego_db::{InitScriptGenerator, SchemaDatabase};
use std::path::{Path, PathBuf};

/// Creates the schema of an uninitialised database
#[async_trait]
pub trait SchemaInitializer: Send + Sync {
    async fn initialise(&self) -> SchemaResult<()>;
}

/// Initialises a database from a creation script, generating the script
/// first if it does not exist yet.
///
/// An existing script is reused as is, which lets an administrator review or
/// edit it between a dry run and the real run.
pub struct ScriptInitializer<'a> {
    db: &'a dyn SchemaDatabase,
    generator: &'a dyn InitScriptGenerator,
    script: PathBuf,
    rootpass: String,
    dry_run: bool,
}

impl<'a> ScriptInitializer<'a> {
    pub fn new(
        db: &'a dyn SchemaDatabase,
        generator: &'a dyn InitScriptGenerator,
        script: impl Into<PathBuf>,
        rootpass: impl Into<String>,
    ) -> Self {
        Self {
            db,
            generator,
            script: script.into(),
            rootpass: rootpass.into(),
            dry_run: false,
        }
    }

    /// Log what would happen without generating or applying anything
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn script(&self) -> &Path {
        &self.script
    }
}

#[async_trait]
impl SchemaInitializer for ScriptInitializer<'_> {
    async fn initialise(&self) -> SchemaResult<()> {
        let script = self.script.display().to_string();

        if self.script.exists() {
            log::info!("Using existing SQL: {}", script);
        } else {
            log::info!("Creating SQL: {}", script);
            if !self.dry_run {
                self.generator
                    .generate_init_script(&self.script, &self.rootpass)
                    .await
                    .map_err(|source| SchemaError::InitScript {
                        script: script.clone(),
                        source,
                    })?;
            }
        }

        log::info!("Creating database using {}", script);
        if self.dry_run {
            return Ok(());
        }
        self.db
            .apply_script(&self.script)
            .await
            .map_err(|source| SchemaError::ScriptApplication { script, source })
    }
}

#[cfg(test)]
#[path = "init_test.rs"]
mod tests;
