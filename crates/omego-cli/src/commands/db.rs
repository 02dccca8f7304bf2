//! Db command implementation
//!
//! `db upgrade --dry-run` reports the database status through the exit code:
//! 0 up to date, 2 upgrade needed, 3 initialisation needed. A database that
//! cannot be reached exits with 30.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Local;
use omego_core::EnvironmentSnapshot;
use omego_db::psql::dump_file_name;
use omego_db::{
    DatabaseDump, DbResult, InitScriptGenerator, OmeroCli, PsqlBackend, SchemaDatabase,
};
use omego_schema::{
    DbStatus, ManagePolicy, RunMode, SchemaError, SchemaInitializer, SchemaManager,
    ScriptInitializer, UpgradePlan,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::cli::{DbAction, DbArgs, GlobalArgs, OutputFormat};
use crate::commands::common::{load_config, ExitCode, CONNECTION_FAILED};

/// Execute the db command
pub async fn execute(args: &DbArgs, global: &GlobalArgs) -> Result<()> {
    let env = EnvironmentSnapshot::capture();
    let cwd = std::env::current_dir().context("Failed to determine working directory")?;
    let config = load_config(global, args, &cwd, &env)?;
    let server_dir = config.server_dir()?.to_path_buf();
    log::info!(
        "Database {} on {} for server {}",
        config.db.name(),
        config.db.host(),
        server_dir.display()
    );

    let backend = PsqlBackend::new(&config.db, &env)?;
    let psql_version = backend
        .client_version()
        .await
        .context("psql client not available")?;
    log::info!("psql version: {}", psql_version);

    check_connection(&backend).await?;

    let generator = OmeroCliGenerator {
        python: &config.python,
        server_dir: &server_dir,
        env: &env,
    };
    let initializer = ScriptInitializer::new(
        &backend,
        &generator,
        &config.db.omerosql,
        &config.db.rootpass,
    )
    .dry_run(args.dry_run);

    match args.action {
        DbAction::Upgrade => upgrade(&backend, &server_dir, args, &initializer).await,
        DbAction::Init => {
            initializer.initialise().await?;
            Ok(())
        }
        DbAction::Dump => dump(&backend, backend.name(), args).await.map(|_| ()),
    }
}

/// Fail with exit code 30 if the database cannot be reached
pub(crate) async fn check_connection(db: &dyn SchemaDatabase) -> Result<()> {
    if let Err(e) = db.check_connection().await {
        log::error!("{}", e);
        log::error!("Database connection check failed");
        return Err(ExitCode(CONNECTION_FAILED).into());
    }
    Ok(())
}

/// Report or perform the upgrade of `db` with the scripts under `server_dir`
pub(crate) async fn upgrade(
    db: &dyn SchemaDatabase,
    server_dir: &Path,
    args: &DbArgs,
    initializer: &dyn SchemaInitializer,
) -> Result<()> {
    let manager = SchemaManager::new(db, server_dir);

    if args.dry_run {
        let plan = manager.upgrade(RunMode::Check).await?;
        print_report(&UpgradeReport::from_plan(&plan, false), args.output)?;
        return exit_status(plan.status());
    }

    if args.managedb {
        let plan = manager.manage(ManagePolicy::all(), initializer).await?;
        return print_report(&UpgradeReport::from_plan(&plan, true), args.output);
    }

    match manager.upgrade(RunMode::Apply).await {
        Ok(plan) => print_report(&UpgradeReport::from_plan(&plan, true), args.output),
        Err(SchemaError::InitRequired) => {
            log::error!("OMERO database not found, pass --managedb to initialise it");
            exit_status(DbStatus::InitNeeded)
        }
        Err(e) => Err(e.into()),
    }
}

/// Write a dump of the database named `dbname` to a timestamped file in the
/// working directory
pub(crate) async fn dump(db: &dyn DatabaseDump, dbname: &str, args: &DbArgs) -> Result<PathBuf> {
    let target = PathBuf::from(dump_file_name(dbname, &Local::now()));
    if args.dry_run {
        log::info!("Would dump database to {}", target.display());
    } else {
        log::info!("Dumping database to {}", target.display());
        db.dump(&target)
            .await
            .with_context(|| format!("Failed to dump database {}", dbname))?;
    }
    println!("{}", target.display());
    Ok(target)
}

fn exit_status(status: DbStatus) -> Result<()> {
    match status.exit_code() {
        0 => Ok(()),
        code => Err(ExitCode(code).into()),
    }
}

/// Generates creation scripts with the OMERO CLI, locating it on first use
struct OmeroCliGenerator<'a> {
    python: &'a str,
    server_dir: &'a Path,
    env: &'a EnvironmentSnapshot,
}

#[async_trait]
impl InitScriptGenerator for OmeroCliGenerator<'_> {
    async fn generate_init_script(&self, target: &Path, rootpass: &str) -> DbResult<()> {
        let cli = OmeroCli::locate(self.python, self.server_dir, self.env).await?;
        cli.generate_init_script(target, rootpass).await
    }
}

const UPGRADED: &str = "upgraded";
const INITIALISED: &str = "initialised";

/// Machine-readable result of `db upgrade`
#[derive(Debug, Serialize)]
pub(crate) struct UpgradeReport {
    pub(crate) status: &'static str,
    pub(crate) exit_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) current: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) latest: Option<String>,
    pub(crate) scripts: Vec<String>,
    pub(crate) applied: bool,
}

impl UpgradeReport {
    /// Report for `plan`; once `applied`, the status and exit code describe
    /// the database after the corrective action
    pub(crate) fn from_plan(plan: &UpgradePlan, applied: bool) -> Self {
        let status = plan.status();
        let applied = applied && status != DbStatus::UpToDate;
        let (status_name, exit_code) = match (status, applied) {
            (DbStatus::UpgradeNeeded, true) => (UPGRADED, 0),
            (DbStatus::InitNeeded, true) => (INITIALISED, 0),
            _ => (status.as_str(), status.exit_code()),
        };
        let mut report = Self {
            status: status_name,
            exit_code,
            current: plan.current().map(ToString::to_string),
            latest: None,
            scripts: Vec::new(),
            applied,
        };
        if let UpgradePlan::UpgradeNeeded { latest, path, .. } = plan {
            report.latest = Some(latest.to_string());
            report.scripts = path.scripts().map(|s| s.display().to_string()).collect();
        }
        report
    }

    pub(crate) fn text(&self) -> String {
        let current = self.current.as_deref().unwrap_or("unknown");
        let latest = self.latest.as_deref().unwrap_or("unknown");
        let mut out = match self.status {
            "up_to_date" => format!("Database is up to date at {}", current),
            "upgrade_needed" => format!(
                "Database needs upgrading from {} to {} using {} scripts",
                current,
                latest,
                self.scripts.len()
            ),
            UPGRADED => format!("Database upgraded from {} to {}", current, latest),
            "init_needed" => "Database needs initialising".to_string(),
            INITIALISED => "Database initialised".to_string(),
            other => format!("Database status: {}", other),
        };
        for script in &self.scripts {
            out.push_str("\n  ");
            out.push_str(script);
        }
        out
    }
}

fn print_report(report: &UpgradeReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => println!("{}", report.text()),
    }
    Ok(())
}

#[cfg(test)]
#[path = "db_test.rs"]
mod tests;
