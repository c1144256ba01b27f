//! Narrative graph - the loaded sections and triggers plus lookup helpers.

mod loader;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::edge::Edge;
use crate::section::{Section, SectionId, Trigger};

/// Summary counts for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GraphStats {
    pub sections: usize,
    pub decisions: usize,
    pub triggers: usize,
    /// Distinct destination ids that name no loaded section.
    pub dangling_destinations: usize,
}

/// The complete narrative a character is scripted to follow.
///
/// Immutable once loaded; shared read-only between session workers.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NarrativeGraph {
    sections: HashMap<SectionId, Section>,

    /// All triggers in document order.
    triggers: Vec<Trigger>,

    /// Index: destination section -> positions in `triggers`. Diagnostics only.
    triggers_by_destination: HashMap<SectionId, Vec<usize>>,
}

impl NarrativeGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a section, replacing any section with the same id.
    pub fn add_section(&mut self, section: Section) -> SectionId {
        let id = section.id.clone();
        self.sections.insert(id.clone(), section);
        id
    }

    /// Append a trigger and index it by destination.
    pub fn add_trigger(&mut self, trigger: Trigger) {
        if let Some(dest) = &trigger.destination_section {
            self.triggers_by_destination
                .entry(dest.clone())
                .or_default()
                .push(self.triggers.len());
        }
        self.triggers.push(trigger);
    }

    /// Get section by ID.
    pub fn section(&self, id: &SectionId) -> Option<&Section> {
        self.sections.get(id)
    }

    pub fn has_section(&self, id: &SectionId) -> bool {
        self.sections.contains_key(id)
    }

    /// Get all sections in the graph.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    /// Get all triggers in document order.
    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    /// Triggers pointing at the given section.
    pub fn triggers_by_destination(&self, id: &SectionId) -> Vec<&Trigger> {
        self.triggers_by_destination
            .get(id)
            .map(|positions| positions.iter().map(|&i| &self.triggers[i]).collect())
            .unwrap_or_default()
    }

    /// Decisions leaving a section, as edges. Empty for unknown sections.
    pub fn decision_edges(&self, id: &SectionId) -> Vec<Edge> {
        self.sections
            .get(id)
            .map(|section| {
                section
                    .decisions
                    .iter()
                    .map(|d| Edge::from_decision(id, d))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Expected response text for a section.
    ///
    /// Returns an empty string for a missing or unknown id, or when neither the
    /// scripted response nor the objective has any text.
    pub fn expected_response(&self, id: Option<&SectionId>) -> &str {
        id.and_then(|id| self.sections.get(id))
            .and_then(Section::expected_text)
            .unwrap_or("")
    }

    /// Destination ids referenced by decisions or triggers that name no loaded section.
    pub fn dangling_destinations(&self) -> BTreeSet<SectionId> {
        let decision_targets = self
            .sections
            .values()
            .flat_map(|s| s.decisions.iter())
            .filter_map(|d| d.next_section.as_ref());
        let trigger_targets = self
            .triggers
            .iter()
            .filter_map(|t| t.destination_section.as_ref());

        decision_targets
            .chain(trigger_targets)
            .filter(|id| !self.sections.contains_key(*id))
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            sections: self.sections.len(),
            decisions: self.sections.values().map(|s| s.decisions.len()).sum(),
            triggers: self.triggers.len(),
            dangling_destinations: self.dangling_destinations().len(),
        }
    }
}
