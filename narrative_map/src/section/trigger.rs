//! Trigger definitions.

use serde::{Deserialize, Serialize};

use super::SectionId;

/// A graph edge keyed by a phrase, optionally scoped to a source section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub id: String,
    pub name: Option<String>,

    /// Phrase that should cause this edge to fire. Never empty once loaded.
    pub message: String,

    /// `None` means the trigger is not scoped to any single section.
    pub source_section: Option<SectionId>,

    pub destination_section: Option<SectionId>,
}

impl Trigger {
    /// Create an unscoped trigger.
    pub fn new(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            message: message.into(),
            source_section: None,
            destination_section: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn from_section(mut self, source: impl Into<SectionId>) -> Self {
        self.source_section = Some(source.into());
        self
    }

    pub fn to_section(mut self, destination: impl Into<SectionId>) -> Self {
        self.destination_section = Some(destination.into());
        self
    }

    /// Whether this trigger is scoped to exactly the given section.
    ///
    /// An unscoped trigger is scoped to the "no section" state.
    pub fn is_scoped_to(&self, section: Option<&SectionId>) -> bool {
        self.source_section.as_ref() == section
    }
}
