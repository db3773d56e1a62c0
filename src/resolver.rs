//! Resolution service — the single public read operation.
//!
//! `resolve` composes the assignment-table lookup and the catalog lookup
//! into a `ResolvedPersona`, with a closed set of failure variants so
//! every call site accounts for "user unknown" and "catalog out of sync"
//! separately. Each call is a stateless single pass: no retries, no
//! caching beyond the in-memory store, no cross-request ordering.

use serde::{Deserialize, Serialize};

use crate::artifacts::ArtifactStore;
use crate::catalog::PersonaCatalog;
use crate::error::{Error, Result};

/// Outcome of the one-time startup artifact load.
///
/// Decided before the first request is served and never changed afterwards;
/// a failed load degrades the service to answering every request with a
/// server fault instead of crashing the process.
#[derive(Debug)]
pub enum ArtifactState {
    /// Artifacts loaded; lookups are served from memory.
    Ready(ArtifactStore),

    /// Startup load failed; the reason is kept for logs and health checks.
    Unavailable { reason: String },
}

/// Response entity composed per request from the two lookups.
///
/// Serialized as the API success body with exactly these field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPersona {
    pub user_id: u64,
    pub cluster: u32,
    pub persona_name: String,
    pub persona_description: String,
}

/// The resolution service. Owns no mutable state; holds the artifact
/// state and persona catalog populated once at startup.
#[derive(Debug)]
pub struct Resolver {
    state: ArtifactState,
    catalog: PersonaCatalog,
}

impl Resolver {
    pub fn new(state: ArtifactState, catalog: PersonaCatalog) -> Self {
        Self { state, catalog }
    }

    /// Whether the artifact store loaded successfully at startup.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, ArtifactState::Ready(_))
    }

    /// Why the store is unavailable, if it is.
    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.state {
            ArtifactState::Ready(_) => None,
            ArtifactState::Unavailable { reason } => Some(reason),
        }
    }

    /// Number of clustered users, when the store is ready.
    pub fn user_count(&self) -> Option<usize> {
        match &self.state {
            ArtifactState::Ready(store) => Some(store.assignments().len()),
            ArtifactState::Unavailable { .. } => None,
        }
    }

    /// The persona catalog.
    pub fn catalog(&self) -> &PersonaCatalog {
        &self.catalog
    }

    /// Resolve a user id to its learning-style persona.
    ///
    /// Input validation happens before any store access; a negative id is
    /// `InvalidInput`. An id absent from the table is `UserNotFound`, the
    /// expected outcome for users the pipeline never clustered. A cluster
    /// absent from the catalog is `CatalogInconsistency`, a server fault.
    pub fn resolve(&self, user_id: i64) -> Result<ResolvedPersona> {
        if user_id < 0 {
            return Err(Error::invalid_input(format!(
                "user_id must be a non-negative integer, got {}",
                user_id
            )));
        }
        let user_id = user_id as u64;

        let store = match &self.state {
            ArtifactState::Ready(store) => store,
            ArtifactState::Unavailable { reason } => {
                return Err(Error::ArtifactUnavailable {
                    reason: reason.clone(),
                })
            }
        };

        let cluster_id = store
            .assignments()
            .lookup(user_id)
            .ok_or(Error::UserNotFound {
                user_id: user_id as i64,
            })?;

        let persona = self
            .catalog
            .describe(cluster_id)
            .ok_or(Error::CatalogInconsistency { cluster_id })?;

        Ok(ResolvedPersona {
            user_id,
            cluster: cluster_id,
            persona_name: persona.name.clone(),
            persona_description: persona.description.clone(),
        })
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
