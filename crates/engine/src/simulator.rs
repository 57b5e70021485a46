//! Execution simulator.
//!
//! Produces a plausible preview trace for a workflow:
//! 1. Re-validates the graph; any error yields a failed, empty trace.
//! 2. Walks the directed edges breadth-first from the Entry node, visiting
//!    each reachable node once in hop-distance order.
//! 3. Gives every visited node a synthetic duration and stamps it with a
//!    simulated clock that is advanced before each stamp.
//!
//! Nothing is executed; statuses are always `completed`.

use std::ops::Range;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::graph::{bfs, GraphIndex};
use crate::models::{Graph, NodeData, NodeKind};
use crate::validation::validate;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tuning knobs for the simulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorConfig {
    /// Inclusive lower bound of a step's synthetic duration.
    pub min_step_ms: u64,
    /// Exclusive upper bound of a step's synthetic duration.
    pub max_step_ms: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            min_step_ms: 1000,
            max_step_ms: 3000,
        }
    }
}

impl SimulatorConfig {
    fn step_range(&self) -> Range<u64> {
        self.min_step_ms..self.max_step_ms
    }
}

// ---------------------------------------------------------------------------
// Trace types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Completed,
    Failed,
}

/// One simulated visit of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStep {
    pub node_id: String,
    pub node_kind: NodeKind,
    pub node_title: String,
    pub status: StepStatus,
    /// Simulated clock after this step finished.
    #[serde(with = "rfc3339_millis")]
    pub timestamp: DateTime<Utc>,
    pub details: String,
    pub duration_ms: u64,
}

/// The outcome of a simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationTrace {
    pub success: bool,
    pub steps: Vec<SimulationStep>,
    pub errors: Vec<String>,
    /// Sum of step durations, not wall-clock time.
    pub duration_ms: u64,
}

impl SimulationTrace {
    fn failed(errors: Vec<String>) -> Self {
        Self {
            success: false,
            steps: Vec::new(),
            errors,
            duration_ms: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Simulate `graph` with default timing, a thread-local RNG and the current
/// time (to the millisecond) as the clock origin.
pub fn simulate(graph: &Graph) -> SimulationTrace {
    let now = Utc::now().trunc_subsecs(3);
    simulate_with(graph, &SimulatorConfig::default(), &mut rand::rng(), now)
}

/// Simulate `graph` with explicit timing, randomness and clock origin.
#[instrument(skip_all, fields(nodes = graph.nodes.len(), edges = graph.edges.len()))]
pub fn simulate_with<R: Rng>(
    graph: &Graph,
    config: &SimulatorConfig,
    rng: &mut R,
    started_at: DateTime<Utc>,
) -> SimulationTrace {
    let validation = validate(graph);
    if !validation.is_valid {
        debug!(errors = validation.errors.len(), "refusing to simulate invalid workflow");
        return SimulationTrace::failed(validation.messages());
    }

    let index = GraphIndex::build(graph);
    let order = visit_order(&index);

    let range = config.step_range();
    let mut clock = started_at;
    let mut total_ms = 0u64;
    let mut steps = Vec::with_capacity(order.len());

    for (n, position) in order.into_iter().enumerate() {
        let node = index.node(position);

        let duration_ms = if range.is_empty() {
            config.min_step_ms
        } else {
            rng.random_range(range.clone())
        };
        clock = i64::try_from(duration_ms)
            .ok()
            .and_then(Duration::try_milliseconds)
            .and_then(|step| clock.checked_add_signed(step))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        total_ms = total_ms.saturating_add(duration_ms);

        let node_title = if node.title().trim().is_empty() {
            format!("Node {}", n + 1)
        } else {
            node.title().to_owned()
        };

        steps.push(SimulationStep {
            node_id: node.id.clone(),
            node_kind: node.kind(),
            node_title,
            status: StepStatus::Completed,
            timestamp: clock,
            details: describe(&node.data),
            duration_ms,
        });
    }

    info!(
        "simulated {} steps in {}ms of synthetic time",
        steps.len(),
        total_ms
    );

    SimulationTrace {
        success: true,
        steps,
        errors: Vec::new(),
        duration_ms: total_ms,
    }
}

/// Node ids in simulated execution order: directed BFS from the Entry node.
///
/// Empty when there is no Entry node.  This is hop-distance order, not a
/// topological sort.
pub fn execution_order(graph: &Graph) -> Vec<String> {
    let index = GraphIndex::build(graph);
    visit_order(&index)
        .into_iter()
        .map(|p| index.node(p).id.clone())
        .collect()
}

fn visit_order(index: &GraphIndex<'_>) -> Vec<usize> {
    index
        .entry()
        .map(|entry| bfs(index.outgoing(), entry))
        .unwrap_or_default()
}

/// Human-readable outcome for a node of the given payload.
pub fn describe(data: &NodeData) -> String {
    match data {
        NodeData::Entry { .. } => "Workflow started successfully".to_owned(),
        NodeData::Task { assignee, .. } => {
            format!("Task assigned to {}", or_fallback(assignee, "unassigned"))
        }
        NodeData::Approval { approver_role, .. } => match approver_role {
            Some(role) => format!("Pending approval from {role}"),
            None => "Pending approval from approver".to_owned(),
        },
        NodeData::Automated { action_id, action_label, .. } => {
            format!(
                "Executing automated action: {}",
                or_fallback(action_label, action_id)
            )
        }
        NodeData::Exit { end_message, .. } => {
            or_fallback(end_message, "Workflow completed").to_owned()
        }
    }
}

/// Step timestamps are written as RFC 3339 with exactly three fractional
/// digits and a `Z` suffix.
mod rfc3339_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(deserializer)
    }
}

fn or_fallback<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}
