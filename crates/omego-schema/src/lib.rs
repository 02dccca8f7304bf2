//! omego-schema - Database schema upgrade planning
//!
//! Upgrade scripts live under `<server>/sql/psql/<to-version>/<from-version>.sql`.
//! This crate discovers them, arranges the versions they connect into a
//! [`VersionGraph`], resolves the chain of scripts leading from the database's
//! current version to the latest one, and drives the database through it.

pub mod discovery;
pub mod error;
pub mod graph;
pub mod init;
pub mod manager;
pub mod resolver;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use discovery::{discover, ScriptSet, SkippedScript, UpgradeEdge};
pub use error::{SchemaError, SchemaResult};
pub use graph::VersionGraph;
pub use init::{SchemaInitializer, ScriptInitializer};
pub use manager::{DbStatus, ManagePolicy, RunMode, SchemaManager, UpgradePlan};
pub use resolver::{resolve_path, UpgradePath, UpgradeStep};
