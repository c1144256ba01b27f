//! Section definitions for the narrative graph.

mod trigger;

pub use trigger::*;

use serde::{Deserialize, Serialize};

/// Identifier of a section in the narrative graph.
///
/// Identifiers are opaque strings assigned by the authoring tool. A section id
/// referenced by an edge is not guaranteed to name a loaded section.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(pub String);

impl SectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SectionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SectionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for SectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An outgoing edge of a section, keyed by the criterion the user has to meet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Free-text criterion. Never empty once loaded.
    pub criteria: String,
    /// Where the conversation goes next. `None` when the document gave no destination.
    pub next_section: Option<SectionId>,
}

impl Decision {
    pub fn new(criteria: impl Into<String>, next_section: Option<SectionId>) -> Self {
        Self {
            criteria: criteria.into(),
            next_section,
        }
    }
}

/// One beat of the scripted conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub name: String,

    /// What the character is trying to achieve here. May be empty.
    pub objective: String,

    /// The scripted line the character should say on arrival. May be empty.
    pub expected_response: String,

    /// Outgoing decisions, in document order.
    pub decisions: Vec<Decision>,
}

impl Section {
    /// Create a section with no objective, response or decisions.
    pub fn new(id: impl Into<SectionId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            objective: String::new(),
            expected_response: String::new(),
            decisions: Vec::new(),
        }
    }

    pub fn with_objective(mut self, objective: impl Into<String>) -> Self {
        self.objective = objective.into();
        self
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.expected_response = response.into();
        self
    }

    pub fn with_decision(mut self, criteria: impl Into<String>, next: Option<&str>) -> Self {
        self.decisions
            .push(Decision::new(criteria, next.map(SectionId::from)));
        self
    }

    /// Text a character is expected to produce on arrival.
    ///
    /// Falls back from the scripted response to the objective; returns `None`
    /// when both are blank.
    pub fn expected_text(&self) -> Option<&str> {
        [self.expected_response.as_str(), self.objective.as_str()]
            .into_iter()
            .find(|text| !text.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_text_prefers_response() {
        let section = Section::new("S2", "Cave")
            .with_objective("Greet the explorer")
            .with_response("Welcome to the cave.");
        assert_eq!(section.expected_text(), Some("Welcome to the cave."));
    }

    #[test]
    fn test_expected_text_falls_back_to_objective() {
        let section = Section::new("S2", "Cave")
            .with_objective("Greet the explorer")
            .with_response("   ");
        assert_eq!(section.expected_text(), Some("Greet the explorer"));
    }

    #[test]
    fn test_expected_text_blank() {
        let section = Section::new("S2", "Cave").with_objective("\n");
        assert_eq!(section.expected_text(), None);
    }

    #[test]
    fn test_section_id_display() {
        assert_eq!(SectionId::from("S1").to_string(), "S1");
    }
}
