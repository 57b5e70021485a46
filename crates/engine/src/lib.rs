//! `engine` crate — workflow graph models, validation, and the execution
//! simulator.

pub mod models;
pub mod error;
pub mod graph;
pub mod validation;
pub mod simulator;
pub mod preview;
mod edit;

pub use models::{Edge, Graph, Node, NodeData, NodeKind, Workflow};
pub use error::EngineError;
pub use validation::{validate, ErrorCategory, ValidationResult};
pub use simulator::{simulate, SimulationStep, SimulationTrace, SimulatorConfig};
pub use preview::PreviewConfig;
