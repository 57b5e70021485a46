//! Async preview boundary.
//!
//! The editor talks to the engine as if it were a remote service, so this
//! layer adds an artificial latency before running the synchronous
//! validator and simulator.  Dropping the returned future cancels the
//! preview; the core computation itself never blocks.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::models::Graph;
use crate::simulator::{self, SimulationTrace};
use crate::validation::{self, ValidationResult};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Latency injected in front of a simulation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewConfig {
    pub min_latency: Duration,
    pub max_latency: Duration,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            min_latency: Duration::from_millis(500),
            max_latency: Duration::from_millis(1500),
        }
    }
}

impl PreviewConfig {
    /// No artificial delay at all.
    pub fn instant() -> Self {
        Self {
            min_latency: Duration::ZERO,
            max_latency: Duration::ZERO,
        }
    }

    /// A latency drawn uniformly from `[min_latency, max_latency)`.
    pub fn sample_latency(&self) -> Duration {
        let min = self.min_latency.as_millis() as u64;
        let max = self.max_latency.as_millis() as u64;
        if max <= min {
            return self.min_latency;
        }
        Duration::from_millis(rand::rng().random_range(min..max))
    }
}

// ---------------------------------------------------------------------------
// Preview
// ---------------------------------------------------------------------------

/// What the editor shows after pressing "simulate".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preview {
    pub validation: ValidationResult,
    /// Present only when validation passed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<SimulationTrace>,
}

/// Simulate `graph` behind the configured artificial latency.
#[instrument(skip_all, fields(nodes = graph.nodes.len()))]
pub async fn simulate(graph: &Graph, config: &PreviewConfig) -> SimulationTrace {
    let latency = config.sample_latency();
    debug!(?latency, "delaying simulation");
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
    simulator::simulate(graph)
}

/// Validate first and only simulate a valid graph.
///
/// Validation runs without delay; an invalid graph never reaches the
/// simulator.
pub async fn run(graph: &Graph, config: &PreviewConfig) -> Preview {
    let validation = validation::validate(graph);
    if !validation.is_valid {
        return Preview { validation, trace: None };
    }
    let trace = simulate(graph, config).await;
    Preview { validation, trace: Some(trace) }
}
