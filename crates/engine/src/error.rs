//! Engine-level error types.
//!
//! Validation and simulation never fail with these: their outcomes are data
//! (see [`crate::ValidationResult`] and [`crate::SimulationTrace`]).  These
//! errors cover loading documents and rejected editing operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::NodeKind;

/// Errors produced while loading or editing a workflow.
#[derive(Debug, Error)]
pub enum EngineError {
    // ------ Editing errors ------

    /// Two or more nodes share the same ID.
    #[error("duplicate node ID: '{0}'")]
    DuplicateNodeId(String),

    /// An edge references a node ID that doesn't exist in the workflow.
    #[error("edge references unknown node '{node_id}' ({side} side)")]
    UnknownNodeReference {
        node_id: String,
        side: &'static str,
    },

    /// An edge would start and end at the same node.
    #[error("node '{0}' cannot connect to itself")]
    SelfEdge(String),

    /// The ordered pair is already connected.
    #[error("an edge from '{from}' to '{to}' already exists")]
    DuplicateEdge { from: String, to: String },

    #[error("no node with ID '{0}'")]
    UnknownNode(String),

    #[error("no edge with ID '{0}'")]
    UnknownEdge(String),

    /// An update tried to swap a node's payload for one of another kind.
    #[error("node '{node_id}' is a {expected} node, not a {found} node")]
    KindMismatch {
        node_id: String,
        expected: NodeKind,
        found: NodeKind,
    },

    // ------ Loading errors ------

    #[error("failed to read workflow file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid workflow definition: {0}")]
    InvalidDefinition(#[from] serde_json::Error),
}
