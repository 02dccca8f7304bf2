//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use omego_core::{Config, EnvironmentSnapshot};
use std::fmt;
use std::path::Path;

use crate::cli::{DbArgs, GlobalArgs};

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Empty: main turns this into the process status without printing it
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Exit code when the database server cannot be reached
pub(crate) const CONNECTION_FAILED: i32 = 30;

/// Load the config file, apply command line and environment overrides, and
/// validate the result.
///
/// Without `--config`, `omego.yml` or `omego.yaml` in `cwd` is used if
/// present.
pub(crate) fn load_config(
    global: &GlobalArgs,
    args: &DbArgs,
    cwd: &Path,
    env: &EnvironmentSnapshot,
) -> Result<Config> {
    let mut config = match &global.config {
        Some(path) => Config::load(path),
        None => Config::load_or_default(cwd),
    }
    .context("Failed to load configuration")?;

    apply_overrides(&mut config, args);
    Ok(config.finalize(env)?)
}

/// Replace config file values with those given on the command line or
/// through `OMEGO_*` variables
pub(crate) fn apply_overrides(config: &mut Config, args: &DbArgs) {
    if let Some(dir) = &args.serverdir {
        config.serverdir = Some(dir.clone());
    }
    if let Some(host) = &args.dbhost {
        config.db.host = Some(host.clone());
    }
    if let Some(name) = &args.dbname {
        config.db.name = Some(name.clone());
    }
    if let Some(user) = &args.dbuser {
        config.db.user = user.clone();
    }
    if let Some(pass) = &args.dbpass {
        config.db.pass = pass.clone();
    }
    if let Some(sql) = &args.omerosql {
        config.db.omerosql = sql.clone();
    }
    if let Some(rootpass) = &args.rootpass {
        config.db.rootpass = rootpass.clone();
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
