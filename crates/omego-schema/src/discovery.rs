//! Upgrade script discovery.
//!
//! Scripts are laid out as `<root>/<to-version>/<from-version>.sql`. Files
//! whose directory or file name is not a schema version token share the tree
//! (e.g. `omero-4.1-*.sql` helpers or `OMERO5.2__precheck.sql`); they are
//! partitioned out into [`ScriptSet::skipped`] rather than treated as errors.

use crate::error::{SchemaError, SchemaResult};
use omego_core::SchemaVersion;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// File extension of upgrade scripts
pub const SCRIPT_EXTENSION: &str = "sql";

/// One upgrade script and the versions it connects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeEdge {
    pub from: SchemaVersion,
    pub to: SchemaVersion,
    pub script: PathBuf,
}

/// A file that was found but is not an upgrade script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedScript {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of scanning a script tree
#[derive(Debug, Clone, Default)]
pub struct ScriptSet {
    edges: BTreeMap<(SchemaVersion, SchemaVersion), UpgradeEdge>,
    versions: BTreeSet<SchemaVersion>,
    skipped: Vec<SkippedScript>,
}

impl ScriptSet {
    /// Record an edge. A later script for the same version pair replaces the
    /// earlier one.
    pub fn insert(&mut self, edge: UpgradeEdge) {
        self.versions.insert(edge.from.clone());
        self.versions.insert(edge.to.clone());
        let key = (edge.from.clone(), edge.to.clone());
        if let Some(previous) = self.edges.insert(key, edge) {
            log::warn!(
                "Duplicate upgrade script for {} -> {}, ignoring {}",
                previous.from,
                previous.to,
                previous.script.display()
            );
        }
    }

    /// Upgrade edges ordered by (from, to)
    pub fn edges(&self) -> impl Iterator<Item = &UpgradeEdge> {
        self.edges.values()
    }

    /// Every version named by an edge, ascending
    pub fn versions(&self) -> &BTreeSet<SchemaVersion> {
        &self.versions
    }

    /// Files found under the root that were not upgrade scripts
    pub fn skipped(&self) -> &[SkippedScript] {
        &self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }
}

/// Interpret a script path as an upgrade edge.
///
/// The target version is the parent directory name and the source version is
/// the file stem.
pub fn classify(path: &Path) -> Result<UpgradeEdge, String> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| "file name is not valid UTF-8".to_string())?;
    let dir = path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|s| s.to_str())
        .ok_or_else(|| "no parent directory name".to_string())?;

    let from = SchemaVersion::parse(stem).map_err(|e| e.to_string())?;
    let to = SchemaVersion::parse(dir).map_err(|e| e.to_string())?;
    if from == to {
        return Err(format!("script upgrades {} to itself", from));
    }

    Ok(UpgradeEdge {
        from,
        to,
        script: path.to_path_buf(),
    })
}

/// Recursively scan `root` for upgrade scripts.
///
/// A missing root yields an empty set.
pub fn discover(root: &Path) -> SchemaResult<ScriptSet> {
    let root_str = root.to_str().ok_or_else(|| SchemaError::Discovery {
        root: root.display().to_string(),
        message: "path is not valid UTF-8".to_string(),
    })?;
    let pattern = format!(
        "{}/**/*.{}",
        glob::Pattern::escape(root_str),
        SCRIPT_EXTENSION
    );

    if !root.is_dir() {
        log::warn!("Upgrade script directory {} not found", root.display());
    }

    let entries = glob::glob(&pattern).map_err(|e| SchemaError::Discovery {
        root: root.display().to_string(),
        message: e.to_string(),
    })?;

    let mut set = ScriptSet::default();
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                set.skipped.push(SkippedScript {
                    path: e.path().to_path_buf(),
                    reason: e.error().to_string(),
                });
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }
        match classify(&path) {
            Ok(edge) => set.insert(edge),
            Err(reason) => {
                log::debug!("Skipping {}: {}", path.display(), reason);
                set.skipped.push(SkippedScript { path, reason });
            }
        }
    }

    log::debug!(
        "Found {} upgrade scripts under {} ({} other files skipped)",
        set.len(),
        root.display(),
        set.skipped.len()
    );
    Ok(set)
}

#[cfg(test)]
#[path = "discovery_test.rs"]
mod tests;
