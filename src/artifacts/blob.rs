//! Opaque artifact blobs — the serialized clustering model and feature
//! scaler.
//!
//! The read path never exercises these; they are loaded, checked for
//! basic sanity, and fingerprinted so operators can confirm which
//! pipeline export a running process holds. A future predictive endpoint
//! would deserialize them properly.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Which artifact a blob holds. Only affects logging and error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobKind {
    /// Serialized clustering model
    Model,
    /// Serialized feature scaler
    Scaler,
}

impl fmt::Display for BlobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlobKind::Model => write!(f, "model"),
            BlobKind::Scaler => write!(f, "scaler"),
        }
    }
}

/// An artifact held as raw bytes with a SHA-256 fingerprint.
#[derive(Debug, Clone)]
pub struct ArtifactBlob {
    kind: BlobKind,
    path: PathBuf,
    bytes: Vec<u8>,
    fingerprint: String,
}

impl ArtifactBlob {
    /// Load a blob from disk.
    ///
    /// A missing file is `ArtifactMissing`; an empty or unreadable file is
    /// `ArtifactCorrupt`. The contents are not parsed beyond that.
    pub fn load(path: &Path, kind: BlobKind) -> Result<Self> {
        if !path.exists() {
            return Err(Error::artifact_missing(path));
        }

        let bytes = fs::read(path)
            .map_err(|e| Error::artifact_corrupt(path, format!("unreadable: {}", e)))?;

        if bytes.is_empty() {
            return Err(Error::artifact_corrupt(
                path,
                format!("{} artifact is empty", kind),
            ));
        }

        Ok(Self::from_bytes(kind, path.to_path_buf(), bytes))
    }

    /// Build a blob from in-memory bytes. Used by `load` and by tests.
    pub(crate) fn from_bytes(kind: BlobKind, path: PathBuf, bytes: Vec<u8>) -> Self {
        let fingerprint = hex::encode(Sha256::digest(&bytes));
        Self {
            kind,
            path,
            bytes,
            fingerprint,
        }
    }

    /// Which artifact this blob holds.
    pub fn kind(&self) -> BlobKind {
        self.kind
    }

    /// Where the blob was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the blob is empty (never true for a loaded blob).
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Hex-encoded SHA-256 of the contents.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_blob() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("kmeans_model.bin");
        fs::write(&path, b"serialized model bytes").unwrap();

        let blob = ArtifactBlob::load(&path, BlobKind::Model).unwrap();
        assert_eq!(blob.kind(), BlobKind::Model);
        assert_eq!(blob.len(), 22);
        // SHA-256 hex digest is 64 chars
        assert_eq!(blob.fingerprint().len(), 64);
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("scaler.bin");
        fs::write(&path, b"scaler").unwrap();

        let a = ArtifactBlob::load(&path, BlobKind::Scaler).unwrap();
        let b = ArtifactBlob::load(&path, BlobKind::Scaler).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_missing_blob() {
        let result = ArtifactBlob::load(Path::new("/nonexistent/model.bin"), BlobKind::Model);
        assert!(matches!(result, Err(Error::ArtifactMissing { .. })));
    }

    #[test]
    fn test_empty_blob_is_corrupt() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("empty.bin");
        fs::write(&path, b"").unwrap();

        let result = ArtifactBlob::load(&path, BlobKind::Scaler);
        assert!(matches!(result, Err(Error::ArtifactCorrupt { .. })));
    }
}
