//! Upgrade path resolution.
//!
//! The target is always the latest version in the graph. From each version
//! the candidate next hops are tried from the highest version down, and a
//! candidate is abandoned only if no chain continues from it to the target.
//! This is not a shortest-path search: when several chains exist, the one
//! whose first script jumps furthest wins, which prefers the larger, more
//! recent upgrade scripts shipped with a release.

use crate::error::{SchemaError, SchemaResult};
use crate::graph::VersionGraph;
use omego_core::SchemaVersion;
use std::path::{Path, PathBuf};

/// One script application in an upgrade path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeStep {
    pub from: SchemaVersion,
    pub to: SchemaVersion,
    pub script: PathBuf,
}

/// Ordered scripts leading from a version to the latest version
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpgradePath {
    steps: Vec<UpgradeStep>,
}

impl UpgradePath {
    pub fn steps(&self) -> &[UpgradeStep] {
        &self.steps
    }

    /// Script paths in application order
    pub fn scripts(&self) -> impl Iterator<Item = &Path> {
        self.steps.iter().map(|s| s.script.as_path())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Resolve the scripts upgrading `from` to the latest version in `graph`.
///
/// Returns an empty path if `from` already is the latest version.
pub fn resolve_path(graph: &VersionGraph, from: &SchemaVersion) -> SchemaResult<UpgradePath> {
    let from_idx = graph
        .index_of(from)
        .ok_or_else(|| SchemaError::UnknownVersion {
            version: from.to_string(),
        })?;
    let target = graph.len() - 1;

    if from_idx == target {
        return Ok(UpgradePath::default());
    }

    let mut on_path = vec![false; graph.len()];
    let hops = resolve_index(graph, from_idx, target, &mut on_path).ok_or_else(|| {
        SchemaError::NoUpgradePath {
            from: from.to_string(),
            to: graph.versions()[target].to_string(),
        }
    })?;

    let mut steps = Vec::with_capacity(hops.len());
    let mut current = from_idx;
    for (next, script) in hops {
        steps.push(UpgradeStep {
            from: graph.versions()[current].clone(),
            to: graph.versions()[next].clone(),
            script: script.to_path_buf(),
        });
        current = next;
    }

    Ok(UpgradePath { steps })
}

/// Hops (rank, script) after `from` on a chain ending at `target`, or `None`.
///
/// `on_path` marks ranks on the chain being explored so a downgrade script
/// cannot send the search round in a cycle. Rank 0 is never a hop.
fn resolve_index<'g>(
    graph: &'g VersionGraph,
    from: usize,
    target: usize,
    on_path: &mut [bool],
) -> Option<Vec<(usize, &'g Path)>> {
    on_path[from] = true;
    let found = (1..=target).rev().find_map(|p| {
        let script = graph.script(from, p)?;
        if p == target {
            return Some(vec![(p, script)]);
        }
        if on_path[p] {
            return None;
        }
        let mut rest = resolve_index(graph, p, target, on_path)?;
        rest.insert(0, (p, script));
        Some(rest)
    });
    on_path[from] = false;
    found
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
