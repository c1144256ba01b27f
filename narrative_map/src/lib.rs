//! # Narrative Map
//!
//! The "script" crate - holds the branching narrative a character is expected to
//! follow: sections, the decisions leading out of them, and the triggers that can
//! fire from anywhere. This crate is the single source of truth for graph data
//! and does not contain any embedding or scoring logic.
//!
//! ## Core Components
//!
//! - **section**: Sections, decisions, triggers and their identifiers
//! - **edge**: The canonical edge shape shared by decisions and triggers
//! - **graph**: The loaded graph, its diagnostics index and the expected-response resolver

pub mod edge;
pub mod error;
pub mod graph;
pub mod section;

pub use edge::*;
pub use error::*;
pub use graph::*;
pub use section::*;
