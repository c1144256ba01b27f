//! Response variability - how consistently a character answers the same prompt.
//!
//! Summaries are built as follows:
//! 1. Samples are grouped by prompt key, in first-appearance order
//! 2. Blank responses are dropped and groups with fewer than two responses skipped
//! 3. Each group is embedded in one batch and compared pairwise
//! 4. Groups are reported most varied first (ascending mean similarity)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::embedding::EmbeddingProvider;
use crate::error::{read_input, DeviationError, DeviationResult};
use crate::report::TableRow;
use crate::rows::{as_key, ensure_accepted, field, parse_rows, text_field};

/// One sampled answer to a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSample {
    pub prompt: String,
    pub response: String,
}

impl ResponseSample {
    pub fn new(prompt: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            response: response.into(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> DeviationResult<Vec<Self>> {
        let samples = Self::parse(&read_input(path.as_ref())?)?;
        info!(
            path = %path.as_ref().display(),
            samples = samples.len(),
            "response samples loaded"
        );
        Ok(samples)
    }

    /// Parse `{prompt, response}` rows as a JSON array, JSON lines or CSV.
    ///
    /// Sampler-style `"Prompt #"` and `"Response"` columns are accepted too.
    pub fn parse(raw: &str) -> DeviationResult<Vec<Self>> {
        let rows = parse_rows(raw)?;
        let mut samples = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            let Some(record) = row.as_object() else {
                warn!(row = i + 1, "sample is not an object, skipping");
                continue;
            };
            let prompt = field(record, &["prompt", "Prompt #", "prompt_id"]).and_then(as_key);
            let response = text_field(record, &["response", "Response", "character_response"]);
            match (prompt, response) {
                (Some(prompt), Some(response)) => samples.push(Self::new(prompt, response)),
                _ => warn!(row = i + 1, "sample lacks a prompt or response, skipping"),
            }
        }
        ensure_accepted(raw, rows.len(), samples.len(), "response samples")?;
        Ok(samples)
    }
}

/// Pairwise similarity statistics for one prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariabilitySummary {
    pub prompt: String,
    pub average_similarity: f32,
    pub min_similarity: f32,
    pub max_similarity: f32,
    pub response_count: usize,
}

impl TableRow for VariabilitySummary {
    fn header() -> &'static [&'static str] {
        &[
            "prompt",
            "average_similarity",
            "min_similarity",
            "max_similarity",
            "response_count",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.prompt.clone(),
            format!("{:.4}", self.average_similarity),
            format!("{:.4}", self.min_similarity),
            format!("{:.4}", self.max_similarity),
            self.response_count.to_string(),
        ]
    }
}

/// Summarise response consistency per prompt.
pub fn summarize_variability<P: EmbeddingProvider + ?Sized>(
    samples: &[ResponseSample],
    provider: &P,
) -> DeviationResult<Vec<VariabilitySummary>> {
    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for sample in samples {
        if sample.response.trim().is_empty() {
            continue;
        }
        match index.get(sample.prompt.as_str()) {
            Some(&position) => groups[position].1.push(sample.response.as_str()),
            None => {
                index.insert(sample.prompt.as_str(), groups.len());
                groups.push((sample.prompt.as_str(), vec![sample.response.as_str()]));
            }
        }
    }

    let mut summaries = Vec::new();
    for (prompt, responses) in groups {
        if responses.len() < 2 {
            debug!(prompt, "fewer than two responses, skipping");
            continue;
        }

        let vectors = provider.encode_batch(&responses)?;
        if vectors.len() != responses.len() {
            return Err(DeviationError::embedding(format!(
                "provider returned {} embeddings for {} responses",
                vectors.len(),
                responses.len()
            )));
        }

        let mut pairs = Vec::new();
        for i in 0..vectors.len() {
            for j in (i + 1)..vectors.len() {
                pairs.push(provider.similarity(&vectors[i], &vectors[j]));
            }
        }

        let average = pairs.iter().sum::<f32>() / pairs.len() as f32;
        summaries.push(VariabilitySummary {
            prompt: prompt.to_string(),
            average_similarity: average,
            min_similarity: pairs.iter().copied().fold(f32::INFINITY, f32::min),
            max_similarity: pairs.iter().copied().fold(f32::NEG_INFINITY, f32::max),
            response_count: responses.len(),
        });
    }

    summaries.sort_by(|a, b| a.average_similarity.total_cmp(&b.average_similarity));
    info!(prompts = summaries.len(), "variability summarised");
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;

    fn samples() -> Vec<ResponseSample> {
        vec![
            ResponseSample::new("1", "The cave is dark and cold."),
            ResponseSample::new("2", "I like turtles."),
            ResponseSample::new("1", "The cave is dark and cold."),
            ResponseSample::new("2", "Spaceships are loud."),
            ResponseSample::new("3", "Only one answer."),
            ResponseSample::new("3", "   "),
            ResponseSample::new("2", "Bread rises slowly."),
        ]
    }

    #[test]
    fn test_skips_groups_with_fewer_than_two_responses() {
        let provider = HashingEmbedder::new(128);
        let summaries = summarize_variability(&samples(), &provider).unwrap();
        let prompts: Vec<_> = summaries.iter().map(|s| s.prompt.as_str()).collect();
        assert!(!prompts.contains(&"3"));
        assert_eq!(summaries.len(), 2);
    }

    #[test]
    fn test_most_varied_prompt_first() {
        let provider = HashingEmbedder::new(128);
        let summaries = summarize_variability(&samples(), &provider).unwrap();

        assert_eq!(summaries[0].prompt, "2");
        assert_eq!(summaries[0].response_count, 3);
        assert!(summaries[0].min_similarity <= summaries[0].average_similarity);
        assert!(summaries[0].average_similarity <= summaries[0].max_similarity);

        assert_eq!(summaries[1].prompt, "1");
        assert!((summaries[1].average_similarity - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_parse_accepts_sampler_keys() {
        let raw = concat!(
            r#"{"Prompt #": 4, "Response": "Hello there"}"#,
            "\n",
            r#"{"prompt": "4", "response": "Hi"}"#,
            "\n",
            r#"{"prompt": "5"}"#,
            "\n",
        );
        let samples = ResponseSample::parse(raw).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0], ResponseSample::new("4", "Hello there"));
        assert_eq!(samples[1].prompt, "4");
    }

    #[test]
    fn test_parse_reads_sampler_csv() {
        let raw = concat!(
            "\"Prompt #\",\"Response\"\n",
            "\"1\",\"The cave is dark, and cold.\"\n",
            "\"1\",\"It is \"\"very\"\" dark.\"\n",
            "\"2\",\"\"\n",
        );
        let samples = ResponseSample::parse(raw).unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0], ResponseSample::new("1", "The cave is dark, and cold."));
        assert_eq!(samples[1].response, "It is \"very\" dark.");
        assert_eq!(samples[2].prompt, "2");
    }

    #[test]
    fn test_parse_without_usable_samples_is_an_error() {
        let transcript_csv = "\"Session ID\",\"User Input\"\n\"s1\",\"hi\"\n";
        assert!(ResponseSample::parse(transcript_csv).is_err());
        assert!(ResponseSample::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_table_cells() {
        let summary = VariabilitySummary {
            prompt: "7".to_string(),
            average_similarity: 0.5,
            min_similarity: 0.25,
            max_similarity: 0.75,
            response_count: 3,
        };
        assert_eq!(summary.cells(), vec!["7", "0.5000", "0.2500", "0.7500", "3"]);
    }
}
