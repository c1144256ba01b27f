//! Normalises an exported narrative document into a [`NarrativeGraph`].
//!
//! The exporter's records are loose: destinations go by two names, trigger
//! scoping is usually absent, and older exports keep their cleaned-up fields in
//! a `_normalized` sub-object. All of that is folded into the canonical section
//! and trigger types here, once.

use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info, warn};

use super::NarrativeGraph;
use crate::error::{MapError, MapResult};
use crate::section::{Decision, Section, SectionId, Trigger};

type Record = Map<String, Value>;

impl NarrativeGraph {
    /// Read and normalise a narrative document from disk.
    pub fn load(path: impl AsRef<Path>) -> MapResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> MapResult<Self> {
        let document: Value = serde_json::from_str(raw)?;
        Self::from_value(&document)
    }

    /// Build a graph from an already parsed document.
    ///
    /// Fails only when the document lacks a `sections` mapping or a `triggers`
    /// sequence. Individual malformed entries are logged and skipped.
    pub fn from_value(document: &Value) -> MapResult<Self> {
        let top = document
            .as_object()
            .ok_or_else(|| MapError::malformed("top-level document is not an object"))?;
        let sections = top
            .get("sections")
            .and_then(Value::as_object)
            .ok_or_else(|| MapError::malformed("missing `sections` mapping"))?;
        let triggers = top
            .get("triggers")
            .and_then(Value::as_array)
            .ok_or_else(|| MapError::malformed("missing `triggers` sequence"))?;

        let mut graph = NarrativeGraph::new();

        for (key, raw) in sections {
            if let Some(section) = parse_section(key, raw) {
                graph.add_section(section);
            }
        }

        for (position, raw) in triggers.iter().enumerate() {
            if let Some(trigger) = parse_trigger(position, raw) {
                graph.add_trigger(trigger);
            }
        }

        let stats = graph.stats();
        info!(
            sections = stats.sections,
            decisions = stats.decisions,
            triggers = stats.triggers,
            dangling = stats.dangling_destinations,
            "narrative graph loaded"
        );

        Ok(graph)
    }
}

fn parse_section(key: &str, raw: &Value) -> Option<Section> {
    let Some(record) = raw.as_object() else {
        warn!(section = key, "section record is not an object, skipping");
        return None;
    };
    let normalized = normalized(record);

    let name = text(record, "section_name")
        .or_else(|| normalized.and_then(|n| text(n, "section_name")))
        .unwrap_or_default();
    let objective = text(record, "objective")
        .or_else(|| normalized.and_then(|n| text(n, "objective")))
        .unwrap_or_default();
    let response = record
        .get("response")
        .and_then(Value::as_object)
        .and_then(|r| text(r, "text"))
        .or_else(|| normalized.and_then(|n| text(n, "response_text")))
        .unwrap_or_default();

    let raw_decisions = record
        .get("decisions")
        .and_then(Value::as_array)
        .or_else(|| normalized.and_then(|n| n.get("decisions")).and_then(Value::as_array));

    let decisions = match raw_decisions {
        Some(entries) => entries
            .iter()
            .filter_map(|entry| parse_decision(key, entry))
            .collect(),
        None => {
            warn!(section = key, "missing field `decisions`, section has no outgoing decisions");
            Vec::new()
        }
    };

    Some(Section {
        id: SectionId::from(key),
        name,
        objective,
        expected_response: response,
        decisions,
    })
}

fn parse_decision(section: &str, raw: &Value) -> Option<Decision> {
    let Some(record) = raw.as_object() else {
        warn!(section, "decision entry is not an object, skipping");
        return None;
    };

    let criteria = text(record, "criteria").unwrap_or_default();
    let criteria = criteria.trim();
    if criteria.is_empty() {
        debug!(section, "dropping decision with empty criteria");
        return None;
    }

    let next = id(record, "next_section").or_else(|| id(record, "destination_section"));
    Some(Decision::new(criteria, next))
}

fn parse_trigger(position: usize, raw: &Value) -> Option<Trigger> {
    let Some(record) = raw.as_object() else {
        warn!(position, "trigger record is not an object, skipping");
        return None;
    };
    let normalized = normalized(record);
    let field = |raw_key: &str, normalized_key: &str| {
        text(record, raw_key).or_else(|| normalized.and_then(|n| text(n, normalized_key)))
    };

    let Some(trigger_id) = field("trigger_id", "trigger_id") else {
        warn!(position, "missing field `trigger_id`, skipping trigger");
        return None;
    };

    let message = field("trigger_message", "message").unwrap_or_default();
    let message = message.trim();
    if message.is_empty() {
        debug!(trigger = %trigger_id, "dropping trigger with empty message");
        return None;
    }

    Some(Trigger {
        id: trigger_id,
        name: field("trigger_name", "trigger_name"),
        message: message.to_string(),
        source_section: field("source_section", "source_section").map(SectionId::from),
        destination_section: field("destination_section", "destination_section")
            .map(SectionId::from),
    })
}

fn normalized(record: &Record) -> Option<&Record> {
    record.get("_normalized").and_then(Value::as_object)
}

/// Non-blank string (or number) field.
fn text(record: &Record, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn id(record: &Record, key: &str) -> Option<SectionId> {
    text(record, key).map(|s| SectionId::from(s.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sid(id: &str) -> SectionId {
        SectionId::from(id)
    }

    #[test]
    fn test_rejects_non_object_document() {
        let err = NarrativeGraph::from_value(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, MapError::MalformedGraph { .. }));
    }

    #[test]
    fn test_rejects_missing_sections_or_triggers() {
        let no_sections = json!({ "triggers": [] });
        assert!(matches!(
            NarrativeGraph::from_value(&no_sections),
            Err(MapError::MalformedGraph { .. })
        ));

        let no_triggers = json!({ "sections": {} });
        assert!(matches!(
            NarrativeGraph::from_value(&no_triggers),
            Err(MapError::MalformedGraph { .. })
        ));

        let wrong_shape = json!({ "sections": [], "triggers": [] });
        assert!(NarrativeGraph::from_value(&wrong_shape).is_err());
    }

    #[test]
    fn test_loads_sections_and_decisions() {
        let doc = json!({
            "sections": {
                "S1": {
                    "section_name": "Entrance",
                    "objective": "Point the way",
                    "decisions": [
                        { "criteria": "go north", "next_section": "S2" },
                        { "criteria": "go south", "destination_section": "S3" },
                        { "criteria": "wander" },
                        { "criteria": "   ", "next_section": "S4" },
                        "not a decision"
                    ]
                },
                "S2": { "section_name": "Cave", "response": { "text": "Welcome to the cave." } }
            },
            "triggers": []
        });

        let graph = NarrativeGraph::from_value(&doc).unwrap();
        let entrance = graph.section(&sid("S1")).unwrap();
        assert_eq!(entrance.name, "Entrance");
        assert_eq!(
            entrance.decisions,
            vec![
                Decision::new("go north", Some(sid("S2"))),
                Decision::new("go south", Some(sid("S3"))),
                Decision::new("wander", None),
            ]
        );

        // S2 lacks decisions: kept, with none
        let cave = graph.section(&sid("S2")).unwrap();
        assert!(cave.decisions.is_empty());
        assert_eq!(cave.expected_response, "Welcome to the cave.");
    }

    #[test]
    fn test_loads_triggers() {
        let doc = json!({
            "sections": {},
            "triggers": [
                { "trigger_id": "t1", "trigger_name": "Oxygen", "trigger_message": "found oxygen", "destination_section": "S5" },
                { "trigger_id": "t2", "trigger_message": "open hatch", "source_section": "S1", "destination_section": "S6" },
                { "trigger_message": "no id here", "destination_section": "S7" },
                { "trigger_id": "t4", "trigger_message": "", "destination_section": "S8" }
            ]
        });

        let graph = NarrativeGraph::from_value(&doc).unwrap();
        let triggers = graph.triggers();
        assert_eq!(triggers.len(), 2);
        assert_eq!(triggers[0].name.as_deref(), Some("Oxygen"));
        assert!(triggers[0].source_section.is_none());
        assert_eq!(triggers[1].source_section, Some(sid("S1")));
        assert_eq!(graph.triggers_by_destination(&sid("S5")).len(), 1);
    }

    #[test]
    fn test_reads_exporter_normalized_fields() {
        let doc = json!({
            "sections": {
                "S1": {
                    "section_name": "Raw name",
                    "_normalized": {
                        "section_id": "S1",
                        "objective": "Normalized objective",
                        "response_text": "Normalized line",
                        "decisions": [{ "criteria": "climb", "next_section": "S2" }]
                    }
                }
            },
            "triggers": [
                { "trigger_id": "t1", "_normalized": { "message": "found oxygen", "destination_section": "S2" } }
            ],
            "triggers_by_destination": {}
        });

        let graph = NarrativeGraph::from_value(&doc).unwrap();
        let section = graph.section(&sid("S1")).unwrap();
        assert_eq!(section.name, "Raw name");
        assert_eq!(section.objective, "Normalized objective");
        assert_eq!(section.expected_response, "Normalized line");
        assert_eq!(section.decisions.len(), 1);
        assert_eq!(graph.triggers()[0].message, "found oxygen");
        assert_eq!(graph.triggers()[0].destination_section, Some(sid("S2")));
    }

    #[test]
    fn test_dangling_destination_is_not_an_error() {
        let doc = json!({
            "sections": {
                "S1": { "decisions": [{ "criteria": "jump", "next_section": "S404" }] }
            },
            "triggers": []
        });
        let graph = NarrativeGraph::from_value(&doc).unwrap();
        assert_eq!(graph.expected_response(Some(&sid("S404"))), "");
        assert_eq!(graph.stats().dangling_destinations, 1);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("narrative_map.json");
        std::fs::write(&path, r#"{"sections": {"S1": {"decisions": []}}, "triggers": []}"#).unwrap();

        let graph = NarrativeGraph::load(&path).unwrap();
        assert!(graph.has_section(&sid("S1")));

        let missing = NarrativeGraph::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(missing, MapError::Io { .. }));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            NarrativeGraph::from_json_str("{ nope"),
            Err(MapError::Json(_))
        ));
    }
}
