//! Editing operations on a [`Workflow`].
//!
//! This is where graph construction invariants are enforced: edges never
//! loop back to their source, never repeat an ordered pair, and never name
//! a missing node.  Removing a node removes its edges with it.

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::models::{Edge, Node, NodeData, NodeKind, Position, Workflow};
use crate::EngineError;

impl Workflow {
    /// Drop a new node of `kind` at `position` with default payload and
    /// return its generated id.
    pub fn add_node(&mut self, kind: NodeKind, position: Position) -> String {
        let id = format!("{kind}-{}", Uuid::new_v4().simple());
        self.graph.nodes.push(Node {
            id: id.clone(),
            position,
            data: NodeData::default_for(kind),
        });
        self.touch();
        debug!(node_id = %id, %kind, "node added");
        id
    }

    /// Insert a fully formed node, rejecting an id already in use.
    pub fn insert_node(&mut self, node: Node) -> Result<(), EngineError> {
        if self.graph.node(&node.id).is_some() {
            return Err(EngineError::DuplicateNodeId(node.id));
        }
        self.graph.nodes.push(node);
        self.touch();
        Ok(())
    }

    /// Replace a node's payload. The node keeps its kind.
    pub fn update_node(&mut self, node_id: &str, data: NodeData) -> Result<(), EngineError> {
        let node = self
            .graph
            .nodes
            .iter_mut()
            .find(|n| n.id == node_id)
            .ok_or_else(|| EngineError::UnknownNode(node_id.to_owned()))?;

        if node.kind() != data.kind() {
            return Err(EngineError::KindMismatch {
                node_id: node_id.to_owned(),
                expected: node.kind(),
                found: data.kind(),
            });
        }
        node.data = data;
        self.touch();
        Ok(())
    }

    pub fn move_node(&mut self, node_id: &str, position: Position) -> Result<(), EngineError> {
        let node = self
            .graph
            .nodes
            .iter_mut()
            .find(|n| n.id == node_id)
            .ok_or_else(|| EngineError::UnknownNode(node_id.to_owned()))?;
        node.position = position;
        self.touch();
        Ok(())
    }

    /// Remove a node together with every edge touching it.
    pub fn remove_node(&mut self, node_id: &str) -> Result<Node, EngineError> {
        let position = self
            .graph
            .nodes
            .iter()
            .position(|n| n.id == node_id)
            .ok_or_else(|| EngineError::UnknownNode(node_id.to_owned()))?;

        let node = self.graph.nodes.remove(position);
        let before = self.graph.edges.len();
        self.graph
            .edges
            .retain(|e| e.source != node_id && e.target != node_id);
        self.touch();

        debug!(
            node_id,
            edges_removed = before - self.graph.edges.len(),
            "node removed"
        );
        Ok(node)
    }

    /// Connect `source` to `target` and return the new edge's id.
    pub fn connect(&mut self, source: &str, target: &str) -> Result<String, EngineError> {
        for (node_id, side) in [(source, "source"), (target, "target")] {
            if self.graph.node(node_id).is_none() {
                return Err(EngineError::UnknownNodeReference {
                    node_id: node_id.to_owned(),
                    side,
                });
            }
        }
        if source == target {
            return Err(EngineError::SelfEdge(source.to_owned()));
        }
        if self
            .graph
            .edges
            .iter()
            .any(|e| e.source == source && e.target == target)
        {
            return Err(EngineError::DuplicateEdge {
                from: source.to_owned(),
                to: target.to_owned(),
            });
        }

        let edge = Edge::new(source, target);
        let id = edge.id.clone();
        self.graph.edges.push(edge);
        self.touch();
        Ok(id)
    }

    pub fn disconnect(&mut self, edge_id: &str) -> Result<Edge, EngineError> {
        let position = self
            .graph
            .edges
            .iter()
            .position(|e| e.id == edge_id)
            .ok_or_else(|| EngineError::UnknownEdge(edge_id.to_owned()))?;
        let edge = self.graph.edges.remove(position);
        self.touch();
        Ok(edge)
    }

    /// Remove every node and edge.
    pub fn clear(&mut self) {
        self.graph.nodes.clear();
        self.graph.edges.clear();
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
