//! The file under analysis.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::error::{ModelError, Result};

/// Identity of the currently selected file.
///
/// The bytes are shared so that in-flight requests can hold the artifact
/// without copying it. `local_sha256` is computed once on construction and
/// is used only as a transfer-integrity check against the digest the backend
/// reports after upload.
#[derive(Clone, PartialEq, Eq)]
pub struct ArtifactReference {
    name: String,
    bytes: Arc<[u8]>,
    local_sha256: String,
}

impl ArtifactReference {
    /// Create an artifact from an in-memory buffer.
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let bytes = bytes.into();
        let local_sha256 = hex::encode(Sha256::digest(&bytes));
        Self {
            name: name.into(),
            bytes,
            local_sha256,
        }
    }

    /// Read an artifact from disk, using the file name as the backend name.
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| ModelError::ArtifactName(path.to_path_buf()))?
            .to_string();
        let bytes = std::fs::read(path).map_err(|source| ModelError::ArtifactRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(name, bytes))
    }

    /// File name as the backend will store it.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lowercase hex SHA-256 of the bytes as read locally.
    pub fn local_sha256(&self) -> &str {
        &self.local_sha256
    }
}

impl fmt::Debug for ArtifactReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactReference")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .field("local_sha256", &self.local_sha256)
            .finish()
    }
}
