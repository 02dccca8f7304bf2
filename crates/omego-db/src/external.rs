//! Logged execution of external programs.
//!
//! Every invocation is logged with its command line (secrets masked) and its
//! elapsed time. A non-zero exit status becomes [`DbError::CommandFailed`]
//! carrying the captured output.

use crate::error::{DbError, DbResult};
use std::collections::{BTreeMap, BTreeSet};
use std::process::Stdio;
use std::time::Instant;

const MASK: &str = "****";

/// Captured output of a successful command
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// An external program invocation
#[derive(Debug, Clone)]
pub struct ExternalCommand {
    exe: String,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    /// Indices into `args` masked in [`ExternalCommand::display`]
    secret_args: BTreeSet<usize>,
}

impl ExternalCommand {
    pub fn new(exe: impl Into<String>) -> Self {
        Self {
            exe: exe.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            secret_args: BTreeSet::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set a variable in the child environment, on top of the inherited one
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Append an argument that must never appear in logs or errors
    pub fn secret_arg(mut self, arg: impl Into<String>) -> Self {
        let arg = arg.into();
        if !arg.is_empty() {
            self.secret_args.insert(self.args.len());
        }
        self.args.push(arg);
        self
    }

    pub fn exe(&self) -> &str {
        &self.exe
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Child environment overrides
    pub fn get_env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Command line for display, with secret arguments masked
    pub fn display(&self) -> String {
        std::iter::once(self.exe.as_str())
            .chain(self.args.iter().enumerate().map(|(i, a)| {
                if self.secret_args.contains(&i) {
                    MASK
                } else {
                    a.as_str()
                }
            }))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run to completion, capturing stdout and stderr
    pub async fn run(&self) -> DbResult<CommandOutput> {
        let command = self.display();
        if self.env.is_empty() {
            log::info!("Executing: {}", command);
        } else {
            log::info!("Executing [custom environment]: {}", command);
        }
        let start = Instant::now();

        let output = tokio::process::Command::new(&self.exe)
            .args(&self.args)
            .envs(&self.env)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    DbError::CommandNotFound {
                        exe: self.exe.clone(),
                    }
                } else {
                    DbError::Spawn {
                        command: command.clone(),
                        source: e,
                    }
                }
            })?;

        let elapsed = start.elapsed().as_secs_f64();
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            log::error!("Failed [{:.3} s]", elapsed);
            return Err(DbError::CommandFailed {
                command,
                code: output.status.code().unwrap_or(-1),
                stdout,
                stderr,
            });
        }
        log::info!("Completed [{:.3} s]", elapsed);

        Ok(CommandOutput { stdout, stderr })
    }
}

#[cfg(test)]
#[path = "external_test.rs"]
mod tests;
