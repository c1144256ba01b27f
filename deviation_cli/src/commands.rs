//! Subcommand handlers.

use anyhow::{Context, Result};
use deviation_core::{
    default_provider, summarize_variability, write_table, AnalysisConfig, Analyzer, Matcher,
    OutputFormat, ResponseSample, SessionEventLog, TableRow, Transcript,
};
use narrative_map::{NarrativeGraph, SectionId};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cli::AnalysisOverrides;

/// Inputs of the `analyze` command.
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    pub graph: PathBuf,
    pub transcript: PathBuf,
    pub events: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    pub overrides: AnalysisOverrides,
}

pub fn analyze(args: &AnalyzeArgs) -> Result<()> {
    let config = args.overrides.apply(load_config(args.config.as_deref())?);

    let graph = NarrativeGraph::load(&args.graph)
        .with_context(|| format!("failed to load narrative graph {}", args.graph.display()))?;
    let transcript = Transcript::load(&args.transcript)
        .with_context(|| format!("failed to load transcript {}", args.transcript.display()))?;
    let events = args
        .events
        .as_deref()
        .map(|path| {
            SessionEventLog::load(path)
                .with_context(|| format!("failed to load event log {}", path.display()))
        })
        .transpose()?;

    let provider = default_provider(&config.embedding);
    let matcher = Matcher::new(&graph, provider.as_ref(), config.matcher);
    let records = Analyzer::new(matcher)
        .parallel(config.run.parallel)
        .analyze(&transcript, events.as_ref())
        .context("analysis failed")?;

    emit(&records, args.format, args.output.as_deref())?;
    info!(records = records.len(), "analysis written");
    Ok(())
}

pub fn inspect(graph_path: &Path, out: &mut impl Write) -> Result<()> {
    let graph = NarrativeGraph::load(graph_path)
        .with_context(|| format!("failed to load narrative graph {}", graph_path.display()))?;
    let stats = graph.stats();

    writeln!(out, "sections:              {}", stats.sections)?;
    writeln!(out, "decisions:             {}", stats.decisions)?;
    writeln!(out, "triggers:              {}", stats.triggers)?;
    writeln!(out, "dangling destinations: {}", stats.dangling_destinations)?;

    for id in graph.dangling_destinations() {
        writeln!(out, "  missing section {id}")?;
    }

    let destinations: BTreeSet<&SectionId> = graph
        .triggers()
        .iter()
        .filter_map(|t| t.destination_section.as_ref())
        .collect();
    if !destinations.is_empty() {
        writeln!(out, "triggers by destination:")?;
    }
    for destination in destinations {
        writeln!(out, "  {destination}")?;
        for trigger in graph.triggers_by_destination(destination) {
            let scope = trigger
                .source_section
                .as_ref()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "*".to_string());
            writeln!(out, "    [{}] from {scope}: {}", trigger.id, trigger.message)?;
        }
    }
    Ok(())
}

pub fn variability(
    responses: &Path,
    config: Option<&Path>,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let config = load_config(config)?;
    let samples = ResponseSample::load(responses)
        .with_context(|| format!("failed to load responses {}", responses.display()))?;

    let provider = default_provider(&config.embedding);
    let summaries = summarize_variability(&samples, provider.as_ref())
        .context("variability summary failed")?;

    emit(&summaries, format, output)
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("failed to load configuration {}", path.display())),
        None => Ok(AnalysisConfig::default()),
    }
}

fn emit<T: TableRow>(rows: &[T], format: OutputFormat, output: Option<&Path>) -> Result<()> {
    let out: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };
    write_table(rows, format, out).context("failed to write output")
}
