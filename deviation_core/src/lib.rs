//! # Deviation Core
//!
//! The analysis engine. This crate replays recorded conversation transcripts
//! against a `narrative_map` graph, infers which edge each user turn took, and
//! scores how far the character's actual response drifted from the scripted one.
//!
//! ## Core Components
//!
//! - **embedding**: The embedding provider seam, a hashed bag-of-words provider and a cache
//! - **matcher**: Candidate generation and best-edge selection for one utterance
//! - **scorer**: Deviation score between actual and expected responses
//! - **walker**: Per-session state machine over the graph
//! - **analysis**: Whole-transcript runs, optionally session-parallel
//! - **transcript** / **events**: Input readers
//! - **report**: Scored records and table output
//! - **variability**: Consistency of repeated answers to the same prompt
//! - **config**: TOML run configuration
//!
//! ## Design Philosophy
//!
//! - **Explicit dependencies**: The graph and provider are passed in, never global
//! - **Ground truth wins**: Recorded section visits override inferred transitions
//! - **Lenient input**: Bad rows are logged and skipped, a malformed graph is fatal

pub mod analysis;
pub mod config;
pub mod embedding;
pub mod error;
pub mod events;
pub mod matcher;
pub mod report;
mod rows;
pub mod scorer;
pub mod transcript;
pub mod variability;
pub mod walker;

pub use analysis::*;
pub use config::*;
pub use embedding::*;
pub use error::*;
pub use events::*;
pub use matcher::*;
pub use report::*;
pub use scorer::*;
pub use transcript::*;
pub use variability::*;
pub use walker::*;
