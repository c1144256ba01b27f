mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use commands::AnalyzeArgs;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Analyze {
            graph,
            transcript,
            events,
            config,
            output,
            format,
            overrides,
        } => commands::analyze(&AnalyzeArgs {
            graph,
            transcript,
            events,
            config,
            output,
            format: format.into(),
            overrides,
        }),

        Commands::Inspect { graph } => commands::inspect(&graph, &mut std::io::stdout().lock()),

        Commands::Variability {
            responses,
            config,
            output,
            format,
        } => commands::variability(
            &responses,
            config.as_deref(),
            output.as_deref(),
            format.into(),
        ),
    }
}
