//! OMERO command line client, run through a Python interpreter

use crate::error::{DbError, DbResult};
use crate::external::{CommandOutput, ExternalCommand};
use crate::traits::InitScriptGenerator;
use async_trait::async_trait;
use omego_core::EnvironmentSnapshot;
use std::collections::HashMap;
use std::path::Path;

/// A located, working `bin/omero`
#[derive(Debug, Clone)]
pub struct OmeroCli {
    python: String,
    bin: String,
    child_env: HashMap<String, String>,
}

impl OmeroCli {
    /// Find a usable OMERO CLI: the server's own `bin/omero` first, then
    /// `omero` from PATH. A candidate is usable if `omero version` succeeds.
    pub async fn locate(
        python: &str,
        server_dir: &Path,
        env: &EnvironmentSnapshot,
    ) -> DbResult<Self> {
        let server_bin = server_dir.join("bin").join("omero");
        let mut candidates = Vec::new();
        if server_bin.exists() {
            candidates.push(server_bin.display().to_string());
        }
        candidates.push("omero".to_string());

        for bin in candidates {
            let cli = Self {
                python: python.to_string(),
                bin,
                child_env: env.child_env(),
            };
            match cli.run(["version"]).await {
                Ok(_) => {
                    log::debug!("Using omero CLI from {}", cli.bin);
                    return Ok(cli);
                }
                Err(e) => log::debug!("{} not usable: {}", cli.bin, e),
            }
        }

        Err(DbError::OmeroCliUnavailable {
            reason: format!(
                "unable to find a working omero executable in {} or on PATH",
                server_dir.display()
            ),
        })
    }

    /// Path of the `omero` script in use
    pub fn bin(&self) -> &str {
        &self.bin
    }

    fn command<I, S>(&self, args: I) -> ExternalCommand
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ExternalCommand::new(self.python.clone())
            .arg(self.bin.clone())
            .args(args)
            .envs(self.child_env.clone())
    }

    /// Run an OMERO CLI command
    pub async fn run<I, S>(&self, args: I) -> DbResult<CommandOutput>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command(args).run().await
    }

    /// `omero db script` writing the creation script for the server's
    /// current schema to `target`
    fn init_script_command(&self, target: &Path, rootpass: &str) -> ExternalCommand {
        // Positional arguments: db version and patch left empty, then the
        // root password
        self.command([
            "db".to_string(),
            "script".to_string(),
            "-f".to_string(),
            target.display().to_string(),
            String::new(),
            String::new(),
        ])
        .secret_arg(rootpass)
    }
}

#[async_trait]
impl InitScriptGenerator for OmeroCli {
    async fn generate_init_script(&self, target: &Path, rootpass: &str) -> DbResult<()> {
        self.init_script_command(target, rootpass)
            .run()
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
#[path = "omero_cli_test.rs"]
mod tests;
