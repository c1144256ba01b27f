//! Command-line interface for narrative deviation analysis.
//!
//! - `analyze`: score every transcript turn against the narrative graph
//! - `inspect`: graph statistics and diagnostics
//! - `variability`: consistency of repeated answers per prompt

use clap::{Parser, Subcommand, ValueEnum};
use deviation_core::{AnalysisConfig, OutputFormat, TieBreak, TriggerScope};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "narrative-deviation")]
#[command(about = "Measure how far character responses drift from a scripted narrative", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score transcript turns against the narrative graph
    Analyze {
        /// Exported narrative graph (JSON)
        #[arg(short, long)]
        graph: PathBuf,

        /// Transcript turns (JSON array, JSON lines or scraper CSV)
        #[arg(short, long)]
        transcript: PathBuf,

        /// Recorded section visits (session_id, section_id as JSON lines or CSV)
        #[arg(short, long)]
        events: Option<PathBuf>,

        /// Analysis configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output encoding
        #[arg(short, long, value_enum, default_value_t = FormatArg::Jsonl)]
        format: FormatArg,

        #[command(flatten)]
        overrides: AnalysisOverrides,
    },

    /// Print graph statistics, dangling destinations and triggers by destination
    Inspect {
        /// Exported narrative graph (JSON)
        #[arg(short, long)]
        graph: PathBuf,
    },

    /// Summarise how consistently each prompt is answered
    Variability {
        /// Prompt/response samples (JSON array, JSON lines or CSV)
        #[arg(short, long)]
        responses: PathBuf,

        /// Analysis configuration (TOML), for embedding settings
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output encoding
        #[arg(short, long, value_enum, default_value_t = FormatArg::Csv)]
        format: FormatArg,
    },
}

/// Flags that take precedence over the configuration file.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct AnalysisOverrides {
    /// Process sessions in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Which triggers compete with a section's decisions
    #[arg(long, value_enum)]
    pub trigger_scope: Option<ScopeArg>,

    /// How equal best scores are resolved
    #[arg(long, value_enum)]
    pub tie_break: Option<TieBreakArg>,
}

impl AnalysisOverrides {
    pub fn apply(&self, mut config: AnalysisConfig) -> AnalysisConfig {
        if self.parallel {
            config.run.parallel = true;
        }
        if let Some(scope) = self.trigger_scope {
            config.matcher.trigger_scope = scope.into();
        }
        if let Some(tie_break) = self.tie_break {
            config.matcher.tie_break = tie_break.into();
        }
        config
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Jsonl,
    Csv,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Jsonl => OutputFormat::Jsonl,
            FormatArg::Csv => OutputFormat::Csv,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeArg {
    ScopedOrAll,
    ScopedOnly,
    All,
}

impl From<ScopeArg> for TriggerScope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::ScopedOrAll => TriggerScope::ScopedOrAll,
            ScopeArg::ScopedOnly => TriggerScope::ScopedOnly,
            ScopeArg::All => TriggerScope::All,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreakArg {
    GenerationOrder,
    Lexical,
}

impl From<TieBreakArg> for TieBreak {
    fn from(arg: TieBreakArg) -> Self {
        match arg {
            TieBreakArg::GenerationOrder => TieBreak::GenerationOrder,
            TieBreakArg::Lexical => TieBreak::Lexical,
        }
    }
}
