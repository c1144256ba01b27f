//! Error types for deviation analysis.

use narrative_map::MapError;
use std::path::PathBuf;

/// Result alias used throughout the crate.
pub type DeviationResult<T> = Result<T, DeviationError>;

/// Errors that abort an analysis run.
///
/// Row-level problems in transcripts and event logs never surface here; those
/// rows are logged and skipped.
#[derive(Debug, thiserror::Error)]
pub enum DeviationError {
    #[error(transparent)]
    Map(#[from] MapError),

    #[error("embedding provider failed: {reason}")]
    Embedding { reason: String },

    #[error("invalid configuration: {reason}")]
    Config { reason: String },

    #[error("unusable input: {reason}")]
    Input { reason: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl DeviationError {
    pub fn embedding(reason: impl Into<String>) -> Self {
        DeviationError::Embedding {
            reason: reason.into(),
        }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        DeviationError::Config {
            reason: reason.into(),
        }
    }

    pub fn input(reason: impl Into<String>) -> Self {
        DeviationError::Input {
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DeviationError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Read a whole input file, attaching its path to any failure.
pub(crate) fn read_input(path: &std::path::Path) -> DeviationResult<String> {
    std::fs::read_to_string(path).map_err(|e| DeviationError::io(path, e))
}
