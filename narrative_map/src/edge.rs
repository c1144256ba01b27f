//! Canonical edge shape shared by decisions and triggers.

use serde::{Deserialize, Serialize};

use crate::section::{Decision, SectionId, Trigger};

/// Kind of graph edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Attached to a single section, keyed by a criterion.
    Decision,
    /// Keyed by a trigger message, optionally scoped to a source section.
    Trigger,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Decision => "decision",
            EdgeKind::Trigger => "trigger",
        }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decision or trigger seen through the same lens: matchable text plus endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub kind: EdgeKind,
    pub text: String,
    pub from: Option<SectionId>,
    pub to: Option<SectionId>,
}

impl Edge {
    pub fn from_decision(section: &SectionId, decision: &Decision) -> Self {
        Self {
            kind: EdgeKind::Decision,
            text: decision.criteria.clone(),
            from: Some(section.clone()),
            to: decision.next_section.clone(),
        }
    }

    pub fn from_trigger(trigger: &Trigger) -> Self {
        Self {
            kind: EdgeKind::Trigger,
            text: trigger.message.clone(),
            from: trigger.source_section.clone(),
            to: trigger.destination_section.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_edge() {
        let decision = Decision::new("go north", Some(SectionId::from("S2")));
        let edge = Edge::from_decision(&SectionId::from("S1"), &decision);
        assert_eq!(edge.kind, EdgeKind::Decision);
        assert_eq!(edge.text, "go north");
        assert_eq!(edge.from, Some(SectionId::from("S1")));
        assert_eq!(edge.to, Some(SectionId::from("S2")));
    }

    #[test]
    fn test_trigger_edge_keeps_missing_source() {
        let trigger = Trigger::new("t1", "found oxygen").to_section("S5");
        let edge = Edge::from_trigger(&trigger);
        assert_eq!(edge.kind, EdgeKind::Trigger);
        assert!(edge.from.is_none());
        assert_eq!(edge.to, Some(SectionId::from("S5")));
    }

    #[test]
    fn test_edge_kind_serializes_lowercase() {
        let json = serde_json::to_string(&EdgeKind::Trigger).unwrap();
        assert_eq!(json, "\"trigger\"");
    }
}
