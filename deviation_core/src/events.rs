//! Session event log - recorded ground-truth section visits.

use narrative_map::SectionId;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use tracing::{info, warn};

use crate::error::{read_input, DeviationResult};
use crate::rows::{as_key, ensure_accepted, field, parse_rows};

/// Per-session ordered section visits, authoritative over inferred matching.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionEventLog {
    visits: HashMap<String, Vec<SectionId>>,
}

impl SessionEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a visit at the end of a session's sequence.
    pub fn record(&mut self, session_id: impl Into<String>, section: impl Into<SectionId>) {
        self.visits
            .entry(session_id.into())
            .or_default()
            .push(section.into());
    }

    pub fn load(path: impl AsRef<Path>) -> DeviationResult<Self> {
        let log = Self::parse(&read_input(path.as_ref())?)?;
        info!(
            path = %path.as_ref().display(),
            sessions = log.visits.len(),
            "session event log loaded"
        );
        Ok(log)
    }

    /// Parse `{session_id, section_id}` records as JSON lines, a JSON array or CSV.
    pub fn parse(raw: &str) -> DeviationResult<Self> {
        let rows = parse_rows(raw)?;
        let mut log = Self::new();
        let mut accepted = 0;
        for (i, row) in rows.iter().enumerate() {
            let Some(record) = row.as_object() else {
                warn!(row = i + 1, "event record is not an object, skipping");
                continue;
            };
            let session = field(record, &["session_id"]).and_then(as_key);
            let section = field(record, &["section_id"]).and_then(as_key);
            match (session, section) {
                (Some(session), Some(section)) => {
                    log.record(session, section);
                    accepted += 1;
                }
                _ => warn!(row = i + 1, "event record lacks session_id or section_id, skipping"),
            }
        }
        ensure_accepted(raw, rows.len(), accepted, "section visits")?;
        Ok(log)
    }

    /// A fresh queue of the session's visits, or `None` when it has none.
    pub fn queue_for(&self, session_id: &str) -> Option<VecDeque<SectionId>> {
        self.visits
            .get(session_id)
            .filter(|v| !v.is_empty())
            .map(|v| v.iter().cloned().collect())
    }

    pub fn session_count(&self) -> usize {
        self.visits.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_order_per_session() {
        let raw = concat!(
            r#"{"session_id": "s1", "section_id": "S1"}"#,
            "\n",
            r#"{"session_id": "s2", "section_id": "S9"}"#,
            "\n",
            r#"{"session_id": "s1", "section_id": "S3"}"#,
            "\n",
        );
        let log = SessionEventLog::parse(raw).unwrap();
        assert_eq!(log.session_count(), 2);
        let queue: Vec<_> = log.queue_for("s1").unwrap().into_iter().collect();
        assert_eq!(queue, vec![SectionId::from("S1"), SectionId::from("S3")]);
    }

    #[test]
    fn test_skips_incomplete_records() {
        let raw = concat!(
            r#"{"session_id": "s1"}"#,
            "\n",
            "garbage\n",
            r#"{"session_id": "s1", "section_id": "S2"}"#,
            "\n",
        );
        let log = SessionEventLog::parse(raw).unwrap();
        assert_eq!(log.queue_for("s1").unwrap().len(), 1);
    }

    #[test]
    fn test_reads_csv_event_log() {
        let raw = "session_id,section_id\ns1,S1\ns1,S4\n";
        let log = SessionEventLog::parse(raw).unwrap();
        let queue: Vec<_> = log.queue_for("s1").unwrap().into_iter().collect();
        assert_eq!(queue, vec![SectionId::from("S1"), SectionId::from("S4")]);
    }

    #[test]
    fn test_log_without_usable_records_is_an_error() {
        let raw = concat!(r#"{"session_id": "s1"}"#, "\n", "garbage\n");
        assert!(SessionEventLog::parse(raw).is_err());
        assert_eq!(SessionEventLog::parse("").unwrap().session_count(), 0);
    }

    #[test]
    fn test_unknown_session_has_no_queue() {
        let log = SessionEventLog::new();
        assert!(log.queue_for("nobody").is_none());
    }

    #[test]
    fn test_queue_is_fresh_each_time() {
        let mut log = SessionEventLog::new();
        log.record("s1", "S1");
        let mut first = log.queue_for("s1").unwrap();
        first.pop_front();
        assert_eq!(log.queue_for("s1").unwrap().len(), 1);
    }
}
