//! Scored output rows and table writers.

use narrative_map::{EdgeKind, SectionId};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::error::DeviationResult;

/// Placeholder written for scores that could not be computed.
pub const UNAVAILABLE: &str = "unavailable";

/// One analysed transcript turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub session_id: String,
    pub turn: usize,
    pub timestamp: Option<String>,
    pub user_input: String,

    /// Text of the matched decision criterion or trigger message.
    pub matched_criterion: Option<String>,
    pub match_kind: Option<EdgeKind>,

    /// Walker position before this turn.
    pub from_section: Option<SectionId>,
    /// Destination of the matched edge.
    pub to_section: Option<SectionId>,

    pub expected_response: String,
    pub actual_response: String,

    /// Similarity of actual to expected response; `None` when nothing was expected.
    pub deviation_score: Option<f32>,
    /// Similarity of the best edge; `None` when there were no candidates.
    pub match_score: Option<f32>,

    pub is_trigger_input: Option<bool>,
}

/// Output table encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One JSON object per line.
    #[default]
    Jsonl,
    /// Header row plus fully quoted fields.
    Csv,
}

/// A row type that can be written as a CSV record.
pub trait TableRow: Serialize {
    fn header() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

impl TableRow for ScoredRecord {
    fn header() -> &'static [&'static str] {
        &[
            "session_id",
            "turn",
            "timestamp",
            "user_input",
            "matched_criterion",
            "match_kind",
            "from_section",
            "to_section",
            "expected_response",
            "actual_response",
            "deviation_score",
            "match_score",
        ]
    }

    fn cells(&self) -> Vec<String> {
        let section = |s: &Option<SectionId>| s.as_ref().map(|s| s.to_string()).unwrap_or_default();
        vec![
            self.session_id.clone(),
            self.turn.to_string(),
            self.timestamp.clone().unwrap_or_default(),
            self.user_input.clone(),
            self.matched_criterion.clone().unwrap_or_default(),
            self.match_kind
                .map(|k| k.to_string())
                .unwrap_or_else(|| "none".to_string()),
            section(&self.from_section),
            section(&self.to_section),
            self.expected_response.clone(),
            self.actual_response.clone(),
            format_score(self.deviation_score),
            format_score(self.match_score),
        ]
    }
}

/// Three decimals, or [`UNAVAILABLE`].
pub fn format_score(score: Option<f32>) -> String {
    score
        .map(|s| format!("{s:.3}"))
        .unwrap_or_else(|| UNAVAILABLE.to_string())
}

/// Write rows in the requested format.
pub fn write_table<T: TableRow, W: Write>(
    rows: &[T],
    format: OutputFormat,
    mut out: W,
) -> DeviationResult<()> {
    match format {
        OutputFormat::Jsonl => {
            for row in rows {
                serde_json::to_writer(&mut out, row)?;
                out.write_all(b"\n")?;
            }
        }
        OutputFormat::Csv => {
            let mut writer = csv::WriterBuilder::new()
                .quote_style(csv::QuoteStyle::Always)
                .from_writer(&mut out);
            writer.write_record(T::header())?;
            for row in rows {
                writer.write_record(row.cells())?;
            }
            writer.flush()?;
        }
    }
    out.flush()?;
    Ok(())
}
