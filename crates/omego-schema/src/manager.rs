//! Schema manager: decides whether a database needs creating or upgrading
//! and applies the scripts that get it to the latest version.

use crate::discovery::discover;
use crate::error::{SchemaError, SchemaResult};
use crate::graph::VersionGraph;
use crate::init::SchemaInitializer;
use crate::resolver::{resolve_path, UpgradePath};
use omego_core::SchemaVersion;
use omego_db::SchemaDatabase;
use std::fmt;
use std::path::{Path, PathBuf};

/// Location of the PostgreSQL upgrade scripts inside a server directory
pub const SQL_SUBDIR: [&str; 2] = ["sql", "psql"];

/// Database state relative to the latest schema version.
///
/// The discriminants are the process exit codes reported by `omego db upgrade
/// --dry-run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbStatus {
    UpToDate,
    UpgradeNeeded,
    InitNeeded,
}

impl DbStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            DbStatus::UpToDate => 0,
            DbStatus::UpgradeNeeded => 2,
            DbStatus::InitNeeded => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DbStatus::UpToDate => "up_to_date",
            DbStatus::UpgradeNeeded => "upgrade_needed",
            DbStatus::InitNeeded => "init_needed",
        }
    }
}

impl fmt::Display for DbStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of inspecting a database
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradePlan {
    UpToDate {
        current: SchemaVersion,
    },
    UpgradeNeeded {
        current: SchemaVersion,
        latest: SchemaVersion,
        path: UpgradePath,
    },
    /// The version table could not be read; `reason` carries the query error
    InitNeeded {
        reason: String,
    },
}

impl UpgradePlan {
    pub fn status(&self) -> DbStatus {
        match self {
            UpgradePlan::UpToDate { .. } => DbStatus::UpToDate,
            UpgradePlan::UpgradeNeeded { .. } => DbStatus::UpgradeNeeded,
            UpgradePlan::InitNeeded { .. } => DbStatus::InitNeeded,
        }
    }

    pub fn current(&self) -> Option<&SchemaVersion> {
        match self {
            UpgradePlan::UpToDate { current } | UpgradePlan::UpgradeNeeded { current, .. } => {
                Some(current)
            }
            UpgradePlan::InitNeeded { .. } => None,
        }
    }
}

/// Whether `upgrade` only reports or also applies scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Check,
    Apply,
}

/// Which corrective actions `manage` may take
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManagePolicy {
    pub init: bool,
    pub upgrade: bool,
}

impl ManagePolicy {
    /// Initialise or upgrade as needed
    pub fn all() -> Self {
        Self {
            init: true,
            upgrade: true,
        }
    }
}

/// Drives one database through the upgrade scripts of one server directory
pub struct SchemaManager<'a> {
    db: &'a dyn SchemaDatabase,
    scripts_root: PathBuf,
}

impl<'a> SchemaManager<'a> {
    /// Manager using the scripts shipped under `server_dir`
    pub fn new(db: &'a dyn SchemaDatabase, server_dir: &Path) -> Self {
        let scripts_root = SQL_SUBDIR
            .iter()
            .fold(server_dir.to_path_buf(), |dir, part| dir.join(part));
        Self::with_scripts_root(db, scripts_root)
    }

    /// Manager using scripts laid out directly under `scripts_root`
    pub fn with_scripts_root(db: &'a dyn SchemaDatabase, scripts_root: impl Into<PathBuf>) -> Self {
        Self {
            db,
            scripts_root: scripts_root.into(),
        }
    }

    pub fn scripts_root(&self) -> &Path {
        &self.scripts_root
    }

    /// Inspect the database and work out what it needs.
    ///
    /// A failing version query is taken to mean the database was never
    /// initialised. Any other error, including an unresolvable upgrade path
    /// or a database newer than every script, is returned.
    pub async fn plan(&self) -> SchemaResult<UpgradePlan> {
        let current = match self.db.current_version().await {
            Ok(version) => version,
            Err(e) if e.is_command_failure() => {
                log::debug!("Version query failed: {}", e);
                log::info!("OMERO database not initialised");
                return Ok(UpgradePlan::InitNeeded {
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(SchemaError::CurrentVersion(e)),
        };
        log::info!("Current database version: {}", current);

        let scripts = discover(&self.scripts_root)?;
        if !scripts.versions().contains(&current) {
            if let Some(latest) = scripts.versions().iter().next_back() {
                if current > *latest {
                    return Err(SchemaError::DatabaseNewer {
                        current: current.to_string(),
                        latest: latest.to_string(),
                    });
                }
                log::warn!(
                    "Database version {} does not appear in any upgrade script under {}",
                    current,
                    self.scripts_root.display()
                );
            }
        }

        let graph = VersionGraph::from_scripts(&scripts, [current.clone()]);
        let path = resolve_path(&graph, &current)?;

        match path.steps().last() {
            None => {
                log::info!("Database is already at {}", current);
                Ok(UpgradePlan::UpToDate { current })
            }
            Some(last) => {
                let latest = last.to.clone();
                log::info!(
                    "Database at {} needs upgrading to {} ({} scripts)",
                    current,
                    latest,
                    path.len()
                );
                for script in path.scripts() {
                    log::debug!("  {}", script.display());
                }
                Ok(UpgradePlan::UpgradeNeeded {
                    current,
                    latest,
                    path,
                })
            }
        }
    }

    /// Plan, and in [`RunMode::Apply`] also apply, the upgrade.
    ///
    /// Applying to a database that needs initialising fails with
    /// [`SchemaError::InitRequired`].
    pub async fn upgrade(&self, mode: RunMode) -> SchemaResult<UpgradePlan> {
        let plan = self.plan().await?;
        if mode == RunMode::Apply {
            match &plan {
                UpgradePlan::InitNeeded { .. } => return Err(SchemaError::InitRequired),
                UpgradePlan::UpgradeNeeded { path, .. } => self.apply(path).await?,
                UpgradePlan::UpToDate { .. } => {}
            }
        }
        Ok(plan)
    }

    /// Apply each script of `path` in order, stopping at the first failure
    pub async fn apply(&self, path: &UpgradePath) -> SchemaResult<()> {
        for step in path.steps() {
            log::info!("Upgrading database using {}", step.script.display());
            self.db
                .apply_script(&step.script)
                .await
                .map_err(|source| SchemaError::ScriptApplication {
                    script: step.script.display().to_string(),
                    source,
                })?;
            log::debug!("Database now at {}", step.to);
        }
        Ok(())
    }

    /// Bring the database to the latest version if `policy` allows it.
    ///
    /// Returns the plan found before any action was taken. A database
    /// needing an action the policy forbids is an error.
    pub async fn manage(
        &self,
        policy: ManagePolicy,
        initializer: &dyn SchemaInitializer,
    ) -> SchemaResult<UpgradePlan> {
        let plan = self.plan().await?;
        log::debug!("OMERO database upgrade status: {}", plan.status());

        match &plan {
            UpgradePlan::UpToDate { .. } => {}
            UpgradePlan::InitNeeded { .. } => {
                if !policy.init {
                    log::error!("OMERO database not found");
                    return Err(SchemaError::InitRequired);
                }
                log::debug!("Initialising OMERO database");
                initializer.initialise().await?;
            }
            UpgradePlan::UpgradeNeeded {
                current,
                latest,
                path,
            } => {
                log::warn!("OMERO database exists but is out of date");
                if !policy.upgrade {
                    return Err(SchemaError::UpgradeRequired {
                        current: current.to_string(),
                        latest: latest.to_string(),
                    });
                }
                log::debug!("Upgrading OMERO database");
                self.apply(path).await?;
            }
        }
        Ok(plan)
    }
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod tests;
