//! Artifact store — the in-memory copy of everything the offline
//! clustering pipeline produces.
//!
//! Artifacts are loaded exactly once at startup, before any request is
//! accepted; every request-time operation is a pure read over the loaded
//! structures. Restarting the process is the only refresh mechanism,
//! mirroring the batch nature of the upstream clustering job.

mod blob;
mod store;

pub use blob::{ArtifactBlob, BlobKind};
pub use store::{ArtifactStore, AssignmentTable};
