//! Persona catalog — maps cluster labels to human-readable descriptors.
//!
//! The catalog is hand-authored, versioned with the service, and bundled
//! into the binary. An operator can override it with a TOML file of the
//! same shape via `artifacts.catalog_path`. There is no inference of
//! persona text from cluster statistics.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Bundled catalog, embedded at compile time.
const BUNDLED_CATALOG: &str = include_str!("../config/personas.toml");

/// Human-readable descriptor for one cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaDescriptor {
    /// Short label, e.g. "Si Penjelajah Ahli"
    pub name: String,

    /// Free-text description shown to the user
    pub description: String,
}

/// TOML shape of a catalog file.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    persona: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    cluster: u32,
    name: String,
    description: String,
}

/// Fixed mapping from cluster label to persona descriptor.
///
/// Populated once before the first request and immutable thereafter.
#[derive(Debug, Clone)]
pub struct PersonaCatalog {
    entries: BTreeMap<u32, PersonaDescriptor>,
}

impl PersonaCatalog {
    /// The catalog bundled into the binary.
    pub fn bundled() -> Self {
        // The bundled file is covered by tests; a parse failure here is a
        // build defect, not a runtime condition.
        Self::parse(BUNDLED_CATALOG, Path::new("<bundled>"))
            .expect("bundled persona catalog is malformed")
    }

    /// Load a catalog from an operator-supplied TOML file.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::artifact_missing(path));
        }
        let content = fs::read_to_string(path)
            .map_err(|e| Error::artifact_corrupt(path, format!("unreadable: {}", e)))?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)
            .map_err(|e| Error::artifact_corrupt(path, format!("invalid TOML: {}", e)))?;

        if file.persona.is_empty() {
            return Err(Error::artifact_corrupt(path, "catalog defines no personas"));
        }

        let mut entries = BTreeMap::new();
        for entry in file.persona {
            if entry.name.is_empty() {
                return Err(Error::artifact_corrupt(
                    path,
                    format!("cluster {} has an empty persona name", entry.cluster),
                ));
            }
            let previous = entries.insert(
                entry.cluster,
                PersonaDescriptor {
                    name: entry.name,
                    description: entry.description,
                },
            );
            if previous.is_some() {
                return Err(Error::artifact_corrupt(
                    path,
                    format!("duplicate catalog entry for cluster {}", entry.cluster),
                ));
            }
        }

        Ok(Self { entries })
    }

    /// Constant-time lookup of a cluster's descriptor.
    ///
    /// Absence means the catalog is out of sync with the assignment table,
    /// which callers surface as a data-consistency fault distinct from
    /// "user unknown".
    pub fn describe(&self, cluster_id: u32) -> Option<&PersonaDescriptor> {
        self.entries.get(&cluster_id)
    }

    /// Cluster labels this catalog defines.
    pub fn known_clusters(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.keys().copied()
    }

    /// Number of personas defined.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty (never true for a loaded catalog).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clusters from `clusters` that have no catalog entry, deduplicated
    /// and sorted. Used by the startup consistency check and
    /// `artifacts validate`.
    pub fn uncovered(&self, clusters: impl Iterator<Item = u32>) -> Vec<u32> {
        let mut missing: Vec<u32> = clusters
            .filter(|c| !self.entries.contains_key(c))
            .collect();
        missing.sort_unstable();
        missing.dedup();
        missing
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
