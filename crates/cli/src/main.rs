//! `workflow-preview` CLI entry-point.
//!
//! Available sub-commands:
//! - `validate` — check a workflow JSON file and report errors/warnings.
//! - `simulate` — validate, then simulate a workflow and print its trace.
//! - `actions`  — list the automated actions an Automated node can use.

mod logging;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use actions::{ActionCatalogue, BuiltinCatalogue};
use engine::{preview, PreviewConfig, Workflow};

#[derive(Parser)]
#[command(
    name = "workflow-preview",
    about = "Validate and preview-simulate workflow graphs",
    version
)]
struct Cli {
    /// Print results as JSON instead of a report.
    #[arg(long, global = true, env = "WORKFLOW_PREVIEW_JSON")]
    json: bool,

    /// Enable debug logging on stderr.
    #[arg(long, global = true, env = "WORKFLOW_PREVIEW_DEBUG")]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a workflow definition JSON file.
    Validate {
        /// Path to the workflow JSON file.
        path: PathBuf,
    },
    /// Validate and simulate a workflow definition JSON file.
    Simulate {
        /// Path to the workflow JSON file.
        path: PathBuf,
        /// Skip the artificial service latency.
        #[arg(long, env = "WORKFLOW_PREVIEW_NO_LATENCY")]
        no_latency: bool,
    },
    /// List the available automated actions.
    Actions {
        /// Skip the artificial service latency.
        #[arg(long, env = "WORKFLOW_PREVIEW_NO_LATENCY")]
        no_latency: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    logging::init_logging(cli.debug)?;

    let mode = output::OutputMode::from_flag(cli.json);

    match cli.command {
        Command::Validate { path } => {
            let workflow = load(&path)?;
            let result = engine::validate(&workflow.graph);
            output::print_validation(mode, &result)?;
            Ok(exit_code(result.is_valid))
        }
        Command::Simulate { path, no_latency } => {
            let workflow = load(&path)?;
            let config = if no_latency {
                PreviewConfig::instant()
            } else {
                PreviewConfig::default()
            };
            let preview = preview::run(&workflow.graph, &config).await;
            output::print_preview(mode, &preview)?;
            let success = preview.trace.as_ref().is_some_and(|t| t.success);
            Ok(exit_code(success))
        }
        Command::Actions { no_latency } => {
            let catalogue = if no_latency {
                BuiltinCatalogue::instant()
            } else {
                BuiltinCatalogue::default()
            };
            let actions = catalogue
                .list()
                .await
                .context("failed to fetch automated actions")?;
            output::print_actions(mode, &actions)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load(path: &std::path::Path) -> anyhow::Result<Workflow> {
    let workflow = Workflow::load(path)
        .with_context(|| format!("cannot load workflow from {}", path.display()))?;
    info!(
        "loaded workflow '{}' with {} nodes and {} edges",
        workflow.name,
        workflow.graph.nodes.len(),
        workflow.graph.edges.len()
    );
    Ok(workflow)
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
