//! Loose tabular input shared by the transcript, event log and sample readers.
//!
//! The format is chosen by the first non-blank character:
//! - `[`: one JSON array of objects
//! - `{`: JSON lines, one object per line
//! - anything else: CSV with a header row, as written by the chat scrapers
//!
//! Every row comes back as a JSON object so the readers can look fields up by
//! alias regardless of the source format. CSV cells are always strings.

use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::warn;

use crate::error::{DeviationError, DeviationResult};

/// Rows of a JSON array, JSON-lines or CSV document.
///
/// A malformed array document is an error; a malformed line or record is skipped.
pub(crate) fn parse_rows(raw: &str) -> DeviationResult<Vec<Value>> {
    match raw.trim_start().chars().next() {
        None => Ok(Vec::new()),
        Some('[') => Ok(serde_json::from_str(raw)?),
        Some('{') => Ok(json_lines(raw)),
        Some(_) => Ok(csv_records(raw)),
    }
}

fn json_lines(raw: &str) -> Vec<Value> {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(i, line)| match serde_json::from_str(line) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(line = i + 1, error = %e, "skipping unparsable row");
                None
            }
        })
        .collect()
}

fn csv_records(raw: &str) -> Vec<Value> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(raw.as_bytes());

    reader
        .deserialize::<HashMap<String, String>>()
        .enumerate()
        .filter_map(|(i, record)| match record {
            Ok(record) => Some(Value::Object(
                record
                    .into_iter()
                    .map(|(column, cell)| (column, Value::String(cell)))
                    .collect(),
            )),
            Err(e) => {
                warn!(record = i + 1, error = %e, "skipping unparsable CSV record");
                None
            }
        })
        .collect()
}

/// Fail when a document with content produced nothing usable.
///
/// Blank input and an empty JSON array are empty documents, not errors.
pub(crate) fn ensure_accepted(
    raw: &str,
    rows: usize,
    accepted: usize,
    what: &str,
) -> DeviationResult<()> {
    let raw = raw.trim();
    let has_content = rows > 0 || !(raw.is_empty() || raw.starts_with('['));
    if accepted == 0 && has_content {
        return Err(DeviationError::input(format!(
            "no usable {what} in {rows} parsed rows"
        )));
    }
    Ok(())
}

/// First present key among aliases.
pub(crate) fn field<'v>(record: &'v Map<String, Value>, keys: &[&str]) -> Option<&'v Value> {
    keys.iter().find_map(|k| record.get(*k)).filter(|v| !v.is_null())
}

/// Render a string or number as an identifier.
pub(crate) fn as_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn text_field(record: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    field(record, keys).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_json_array_lines_and_csv() {
        assert_eq!(parse_rows(r#"[{"a": 1}, {"a": 2}]"#).unwrap().len(), 2);
        assert_eq!(parse_rows("{\"a\": 1}\n{\"a\": 2}\n").unwrap().len(), 2);
        assert_eq!(parse_rows("\"a\",\"b\"\n\"1\",\"2\"\n").unwrap().len(), 1);
        assert!(parse_rows("  \n ").unwrap().is_empty());
    }

    #[test]
    fn test_csv_cells_become_strings() {
        let rows = parse_rows("\"Prompt #\",\"Response\"\n\"3\",\"Hello, \"\"friend\"\"\"\n").unwrap();
        assert_eq!(rows[0]["Prompt #"], "3");
        assert_eq!(rows[0]["Response"], "Hello, \"friend\"");
    }

    #[test]
    fn test_ensure_accepted() {
        assert!(ensure_accepted("", 0, 0, "rows").is_ok());
        assert!(ensure_accepted(" [ ] ", 0, 0, "rows").is_ok());
        assert!(ensure_accepted("not json\n", 0, 0, "rows").is_err());
        assert!(ensure_accepted("x", 3, 1, "rows").is_ok());
        let err = ensure_accepted("x", 3, 0, "transcript turns").unwrap_err();
        assert!(matches!(err, DeviationError::Input { .. }));
        assert!(err.to_string().contains("no usable transcript turns"));
    }
}
