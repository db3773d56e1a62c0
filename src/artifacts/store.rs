//! Cluster-assignment table and the artifact store that owns it.
//!
//! The assignment table is the output of the offline clustering pipeline:
//! one row per clustered user, keyed by `user_id`, with the cluster label
//! in a `cluster` column. Feature columns the pipeline writes alongside
//! are ignored here.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use tracing::{debug, info};

use crate::config::ArtifactSettings;
use crate::error::{Error, Result};

use super::blob::{ArtifactBlob, BlobKind};

const USER_ID_COLUMN: &str = "user_id";
const CLUSTER_COLUMN: &str = "cluster";

/// Immutable `user_id → cluster_id` table with O(1) lookup.
#[derive(Debug, Clone, Default)]
pub struct AssignmentTable {
    assignments: HashMap<u64, u32>,
}

impl AssignmentTable {
    /// Load the table from a CSV file.
    ///
    /// The file must have a header row containing `user_id` and `cluster`
    /// columns (any order, extra columns ignored). The table is built
    /// privately and returned whole, so a failure can never expose a
    /// partially populated table.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::artifact_missing(path));
        }

        let file = File::open(path)
            .map_err(|e| Error::artifact_corrupt(path, format!("unreadable: {}", e)))?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers = reader
            .headers()
            .map_err(|e| Error::artifact_corrupt(path, format!("invalid header row: {}", e)))?;

        let user_id_idx = headers
            .iter()
            .position(|h| h == USER_ID_COLUMN)
            .ok_or_else(|| {
                Error::artifact_corrupt(path, format!("missing '{}' column", USER_ID_COLUMN))
            })?;
        let cluster_idx = headers
            .iter()
            .position(|h| h == CLUSTER_COLUMN)
            .ok_or_else(|| {
                Error::artifact_corrupt(path, format!("missing '{}' column", CLUSTER_COLUMN))
            })?;

        let mut assignments = HashMap::new();
        for (line, record) in reader.records().enumerate() {
            let record = record.map_err(|e| {
                Error::artifact_corrupt(path, format!("row {}: {}", line + 2, e))
            })?;

            let user_id: u64 = record
                .get(user_id_idx)
                .and_then(|v| v.parse().ok())
                .ok_or_else(|| {
                    Error::artifact_corrupt(
                        path,
                        format!("row {}: '{}' is not a valid user id", line + 2,
                            record.get(user_id_idx).unwrap_or("")),
                    )
                })?;

            let cluster: u32 = record
                .get(cluster_idx)
                .and_then(|v| v.parse().ok())
                .ok_or_else(|| {
                    Error::artifact_corrupt(
                        path,
                        format!("row {}: '{}' is not a valid cluster label", line + 2,
                            record.get(cluster_idx).unwrap_or("")),
                    )
                })?;

            if assignments.insert(user_id, cluster).is_some() {
                return Err(Error::artifact_corrupt(
                    path,
                    format!("row {}: duplicate user id {}", line + 2, user_id),
                ));
            }
        }

        if assignments.is_empty() {
            return Err(Error::artifact_corrupt(path, "assignment table has no rows"));
        }

        debug!(rows = assignments.len(), path = %path.display(), "Assignment table loaded");
        Ok(Self { assignments })
    }

    /// Cluster label for a user, absent if the user was never clustered.
    ///
    /// Pure read; absence is a normal outcome, not a fault.
    pub fn lookup(&self, user_id: u64) -> Option<u32> {
        self.assignments.get(&user_id).copied()
    }

    /// Number of clustered users.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Whether the table is empty (never true for a loaded table).
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Distinct cluster labels present in the table.
    pub fn clusters(&self) -> impl Iterator<Item = u32> + '_ {
        self.assignments.values().copied()
    }

    /// Build a table from known pairs. Used by tests.
    #[cfg(test)]
    pub(crate) fn from_pairs(pairs: &[(u64, u32)]) -> Self {
        Self {
            assignments: pairs.iter().copied().collect(),
        }
    }
}

/// All pipeline artifacts, loaded once and held immutably.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    assignments: AssignmentTable,
    model: ArtifactBlob,
    scaler: ArtifactBlob,
}

impl ArtifactStore {
    /// Load every artifact named in the settings.
    ///
    /// Any failure fails the whole load; callers degrade to an explicit
    /// unavailable state rather than serving from a half-loaded store.
    pub fn load(settings: &ArtifactSettings) -> Result<Self> {
        let assignments = AssignmentTable::load(Path::new(&settings.assignments_path))?;
        let model = ArtifactBlob::load(Path::new(&settings.model_path), BlobKind::Model)?;
        let scaler = ArtifactBlob::load(Path::new(&settings.scaler_path), BlobKind::Scaler)?;

        info!(
            users = assignments.len(),
            model_bytes = model.len(),
            model_sha256 = %model.fingerprint(),
            scaler_bytes = scaler.len(),
            scaler_sha256 = %scaler.fingerprint(),
            "Artifacts loaded"
        );

        Ok(Self {
            assignments,
            model,
            scaler,
        })
    }

    /// The cluster-assignment table.
    pub fn assignments(&self) -> &AssignmentTable {
        &self.assignments
    }

    /// The serialized clustering model (opaque, unused by the read path).
    pub fn model(&self) -> &ArtifactBlob {
        &self.model
    }

    /// The serialized feature scaler (opaque, unused by the read path).
    pub fn scaler(&self) -> &ArtifactBlob {
        &self.scaler
    }

    /// Build a store from parts. Used by tests.
    #[cfg(test)]
    pub(crate) fn from_parts(
        assignments: AssignmentTable,
        model: ArtifactBlob,
        scaler: ArtifactBlob,
    ) -> Self {
        Self {
            assignments,
            model,
            scaler,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
