//! Version graph: an adjacency matrix over the sorted schema versions

use crate::discovery::{ScriptSet, UpgradeEdge};
use omego_core::SchemaVersion;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Direct upgrade scripts between schema versions.
///
/// Rows and columns are indexed by each version's rank in ascending order.
/// Cell `(i, j)` holds the script upgrading version `i` to version `j`. Only
/// discovered scripts appear; no transitive edges are synthesised, and the
/// diagonal is always empty.
#[derive(Debug, Clone)]
pub struct VersionGraph {
    versions: Vec<SchemaVersion>,
    matrix: Vec<Vec<Option<PathBuf>>>,
}

impl VersionGraph {
    /// Build the graph over the union of `versions` and every edge endpoint
    pub fn new<'a, V, E>(versions: V, edges: E) -> Self
    where
        V: IntoIterator<Item = SchemaVersion>,
        E: IntoIterator<Item = &'a UpgradeEdge> + Clone,
    {
        let mut all: BTreeSet<SchemaVersion> = versions.into_iter().collect();
        for edge in edges.clone() {
            all.insert(edge.from.clone());
            all.insert(edge.to.clone());
        }
        let versions: Vec<SchemaVersion> = all.into_iter().collect();

        let n = versions.len();
        let mut matrix = vec![vec![None; n]; n];
        for edge in edges {
            let (Ok(i), Ok(j)) = (
                versions.binary_search(&edge.from),
                versions.binary_search(&edge.to),
            ) else {
                continue;
            };
            if i != j {
                matrix[i][j] = Some(edge.script.clone());
            }
        }

        Self { versions, matrix }
    }

    /// Build the graph of a discovered script set, adding `extra` versions
    /// that are known from elsewhere (such as the database's current version)
    pub fn from_scripts(scripts: &ScriptSet, extra: impl IntoIterator<Item = SchemaVersion>) -> Self {
        let versions = scripts.versions().iter().cloned().chain(extra);
        let edges: Vec<&UpgradeEdge> = scripts.edges().collect();
        Self::new(versions, edges.iter().copied())
    }

    /// Versions in ascending order
    pub fn versions(&self) -> &[SchemaVersion] {
        &self.versions
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Rank of `version`, if known
    pub fn index_of(&self, version: &SchemaVersion) -> Option<usize> {
        self.versions.binary_search(version).ok()
    }

    /// Highest version
    pub fn latest(&self) -> Option<&SchemaVersion> {
        self.versions.last()
    }

    /// Script upgrading version `from` directly to version `to`, by rank
    pub fn script(&self, from: usize, to: usize) -> Option<&Path> {
        self.matrix
            .get(from)
            .and_then(|row| row.get(to))
            .and_then(|cell| cell.as_deref())
    }
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
