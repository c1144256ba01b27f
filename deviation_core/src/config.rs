//! Analysis configuration, read from TOML.
//!
//! ```toml
//! [matcher]
//! trigger_scope = "scoped_or_all"
//! tie_break = "generation_order"
//!
//! [embedding]
//! dimensions = 384
//! cache_capacity = 10000
//!
//! [run]
//! parallel = false
//! ```
//!
//! Every key is optional.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::embedding::EmbeddingConfig;
use crate::error::{read_input, DeviationError, DeviationResult};
use crate::matcher::MatcherConfig;

/// Execution settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Process sessions on a thread pool.
    pub parallel: bool,
}

/// Complete configuration for an analysis run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub matcher: MatcherConfig,
    pub embedding: EmbeddingConfig,
    pub run: RunConfig,
}

impl AnalysisConfig {
    pub fn from_toml_str(raw: &str) -> DeviationResult<Self> {
        toml::from_str(raw).map_err(|e| DeviationError::config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> DeviationResult<Self> {
        Self::from_toml_str(&read_input(path.as_ref())?)
    }
}
