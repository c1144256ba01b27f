//! Transcript input - chat turns grouped by session.
//!
//! Rows arrive as a JSON array, newline-delimited JSON objects or the
//! scraper's CSV export. Both the snake_case keys and the exporter's column
//! headers ("Session ID", "User Input", ...) are accepted. Rows that cannot be
//! used are logged and skipped; a non-blank document with no usable turn at
//! all is an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{read_input, DeviationResult};
use crate::rows::{as_key, ensure_accepted, field, parse_rows, text_field};

/// One user/character exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptTurn {
    pub session_id: String,

    /// Position within the session, counting accepted rows from zero.
    pub ordinal: usize,

    pub timestamp: Option<String>,
    pub user_input: String,
    pub character_response: String,

    /// Whether the platform flagged the input as a trigger invocation.
    pub is_trigger_input: Option<bool>,
}

impl TranscriptTurn {
    pub fn new(
        session_id: impl Into<String>,
        user_input: impl Into<String>,
        character_response: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            ordinal: 0,
            timestamp: None,
            user_input: user_input.into(),
            character_response: character_response.into(),
            is_trigger_input: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }
}

/// All turns of one session, in traversal order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub turns: Vec<TranscriptTurn>,
}

/// Turns grouped by session, sessions in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    sessions: Vec<Session>,

    /// Session id to position in `sessions`.
    index: HashMap<String, usize>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn to its session. Row order is traversal order.
    pub fn push(&mut self, mut turn: TranscriptTurn) {
        let position = match self.index.get(&turn.session_id) {
            Some(&position) => position,
            None => {
                let position = self.sessions.len();
                self.index.insert(turn.session_id.clone(), position);
                self.sessions.push(Session {
                    id: turn.session_id.clone(),
                    turns: Vec::new(),
                });
                position
            }
        };
        let session = &mut self.sessions[position];
        turn.ordinal = session.turns.len();
        session.turns.push(turn);
    }

    pub fn from_turns(turns: impl IntoIterator<Item = TranscriptTurn>) -> Self {
        let mut transcript = Self::new();
        for turn in turns {
            transcript.push(turn);
        }
        transcript
    }

    pub fn load(path: impl AsRef<Path>) -> DeviationResult<Self> {
        let transcript = Self::parse(&read_input(path.as_ref())?)?;
        info!(
            path = %path.as_ref().display(),
            sessions = transcript.sessions.len(),
            turns = transcript.turn_count(),
            "transcript loaded"
        );
        Ok(transcript)
    }

    /// Parse a JSON array, JSON-lines or CSV transcript.
    pub fn parse(raw: &str) -> DeviationResult<Self> {
        let rows = parse_rows(raw)?;
        let mut transcript = Self::new();
        for (line, row) in rows.iter().enumerate() {
            if let Some(turn) = turn_from_row(line + 1, row) {
                transcript.push(turn);
            }
        }
        ensure_accepted(raw, rows.len(), transcript.turn_count(), "transcript turns")?;
        Ok(transcript)
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn session(&self, id: &str) -> Option<&Session> {
        self.index.get(id).map(|&position| &self.sessions[position])
    }

    pub fn turn_count(&self) -> usize {
        self.sessions.iter().map(|s| s.turns.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

fn as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn turn_from_row(row_number: usize, row: &Value) -> Option<TranscriptTurn> {
    let Some(record) = row.as_object() else {
        warn!(row = row_number, "transcript row is not an object, skipping");
        return None;
    };

    let Some(session_id) = field(record, &["session_id", "Session ID"]).and_then(as_key) else {
        warn!(row = row_number, "transcript row has no session id, skipping");
        return None;
    };

    let (Some(user_input), Some(character_response)) = (
        text_field(record, &["user_input", "User Input"]),
        text_field(record, &["character_response", "Character Response"]),
    ) else {
        warn!(
            row = row_number,
            session = %session_id,
            "user input or character response is not text, skipping turn"
        );
        return None;
    };

    Some(TranscriptTurn {
        session_id,
        ordinal: 0,
        timestamp: field(record, &["timestamp", "Timestamp"]).and_then(as_key),
        user_input,
        character_response,
        is_trigger_input: field(record, &["is_trigger_input", "Is Trigger Input"]).and_then(as_flag),
    })
}
