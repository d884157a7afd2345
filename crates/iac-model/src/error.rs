use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModelError {
    #[error("failed to read artifact {path}: {source}")]
    ArtifactRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("artifact path has no file name: {0}")]
    ArtifactName(PathBuf),
    #[error("metadata must be a JSON object, got {0}")]
    MetadataShape(String),
    #[error("`{0}` is not an editable metadata field")]
    FieldNotEditable(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
