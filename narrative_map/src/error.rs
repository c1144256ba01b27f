//! Errors raised while loading a narrative document.

use std::path::PathBuf;

/// Result alias for narrative map operations.
pub type MapResult<T> = Result<T, MapError>;

/// Fatal problems with a narrative document.
///
/// Per-entity problems (a section without decisions, a trigger without an id)
/// are not errors; they are logged and the entity is skipped.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("malformed narrative graph: {reason}")]
    MalformedGraph { reason: String },

    #[error("failed to read narrative document {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("narrative document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl MapError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        MapError::MalformedGraph {
            reason: reason.into(),
        }
    }
}
