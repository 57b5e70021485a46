//! Output handlers for CLI commands.
//!
//! Results go to stdout, either as a console report or as JSON.

use std::io::{self, Write};

use serde::Serialize;

use actions::AutomationAction;
use engine::preview::Preview;
use engine::simulator::{SimulationTrace, StepStatus};
use engine::ValidationResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Console,
    Json,
}

impl OutputMode {
    pub fn from_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Console
        }
    }
}

pub fn print_validation(mode: OutputMode, result: &ValidationResult) -> io::Result<()> {
    let mut out = io::stdout().lock();
    match mode {
        OutputMode::Json => write_json(&mut out, result),
        OutputMode::Console => write_validation(&mut out, result),
    }
}

pub fn print_preview(mode: OutputMode, preview: &Preview) -> io::Result<()> {
    let mut out = io::stdout().lock();
    match mode {
        OutputMode::Json => write_json(&mut out, preview),
        OutputMode::Console => {
            write_validation(&mut out, &preview.validation)?;
            if let Some(trace) = &preview.trace {
                writeln!(out)?;
                write_trace(&mut out, trace)?;
            }
            Ok(())
        }
    }
}

pub fn print_actions(mode: OutputMode, actions: &[AutomationAction]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    match mode {
        OutputMode::Json => write_json(&mut out, &actions),
        OutputMode::Console => {
            for action in actions {
                writeln!(out, "{:<20} {}", action.id, action.label)?;
                writeln!(out, "{:<20} {}", "", action.description)?;
                writeln!(out, "{:<20} params: {}", "", action.params.join(", "))?;
            }
            Ok(())
        }
    }
}

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

fn write_validation<W: Write>(out: &mut W, result: &ValidationResult) -> io::Result<()> {
    if result.is_valid {
        writeln!(out, "✅ Workflow is valid.")?;
    } else {
        writeln!(out, "❌ Workflow is invalid ({} errors):", result.errors.len())?;
    }

    for error in &result.errors {
        let category = error.category;
        match &error.node_id {
            Some(node_id) => writeln!(out, "  [{category}] {} (node {node_id})", error.message)?,
            None => writeln!(out, "  [{category}] {}", error.message)?,
        }
    }
    for warning in &result.warnings {
        writeln!(out, "  ⚠ {}", warning.message)?;
    }
    Ok(())
}

fn write_trace<W: Write>(out: &mut W, trace: &SimulationTrace) -> io::Result<()> {
    if !trace.success {
        writeln!(out, "Simulation failed:")?;
        for error in &trace.errors {
            writeln!(out, "  {error}")?;
        }
        return Ok(());
    }

    writeln!(out, "Simulation ({} steps, {}):", trace.steps.len(), format_duration(trace.duration_ms))?;
    for (i, step) in trace.steps.iter().enumerate() {
        let marker = match step.status {
            StepStatus::Completed => "✔",
            StepStatus::Failed => "✘",
            StepStatus::Pending => "…",
        };
        writeln!(
            out,
            "  {:>2}. {marker} {} ({}) at {} [{}]",
            i + 1,
            step.node_title,
            step.node_kind,
            step.timestamp.format("%H:%M:%S%.3f"),
            format_duration(step.duration_ms),
        )?;
        writeln!(out, "        {}", step.details)?;
    }
    Ok(())
}

fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{ms}ms")
    } else {
        format!("{:.1}s", ms as f64 / 1000.0)
    }
}
