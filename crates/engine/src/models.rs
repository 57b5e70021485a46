//! Core domain models for workflow graphs.
//!
//! These types mirror what the editor produces: a flat list of nodes, each
//! carrying a kind-tagged payload, and a flat list of directed edges.  They
//! can be serialised to/from the workflow JSON documents the CLI loads.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

// ---------------------------------------------------------------------------
// NodeKind
// ---------------------------------------------------------------------------

/// The closed set of step kinds a node can represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Entry,
    Task,
    Approval,
    Automated,
    Exit,
}

impl NodeKind {
    pub const ALL: [NodeKind; 5] = [
        NodeKind::Entry,
        NodeKind::Task,
        NodeKind::Approval,
        NodeKind::Automated,
        NodeKind::Exit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Entry => "entry",
            NodeKind::Task => "task",
            NodeKind::Approval => "approval",
            NodeKind::Automated => "automated",
            NodeKind::Exit => "exit",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ApproverRole
// ---------------------------------------------------------------------------

/// Roles that may sign off an approval step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApproverRole {
    Manager,
    #[serde(rename = "HRBP")]
    Hrbp,
    Director,
    #[serde(rename = "VP")]
    Vp,
    Executive,
}

impl fmt::Display for ApproverRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ApproverRole::Manager => "Manager",
            ApproverRole::Hrbp => "HRBP",
            ApproverRole::Director => "Director",
            ApproverRole::Vp => "VP",
            ApproverRole::Executive => "Executive",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// NodeData
// ---------------------------------------------------------------------------

/// A single `key: value` pair, used for entry metadata and task custom fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

/// Kind-specific payload of a node.
///
/// The variant *is* the node's kind, so the two can never disagree.
/// Documents exported by the editor use `start`/`end` tags and camelCase
/// field names; both spellings are accepted on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeData {
    #[serde(alias = "start")]
    Entry {
        #[serde(default)]
        title: String,
        #[serde(default)]
        metadata: Vec<KeyValue>,
    },
    Task {
        #[serde(default)]
        title: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        assignee: String,
        #[serde(default, alias = "dueDate")]
        due_date: Option<String>,
        #[serde(default, alias = "customFields")]
        custom_fields: Vec<KeyValue>,
    },
    Approval {
        #[serde(default)]
        title: String,
        #[serde(default, alias = "approverRole")]
        approver_role: Option<ApproverRole>,
        /// Days after which the step approves itself; `None` disables it.
        #[serde(default, alias = "autoApproveThreshold")]
        auto_approve_threshold: Option<u32>,
    },
    Automated {
        #[serde(default)]
        title: String,
        #[serde(default, alias = "actionId")]
        action_id: String,
        #[serde(default, alias = "actionLabel")]
        action_label: String,
        #[serde(default)]
        parameters: BTreeMap<String, String>,
    },
    #[serde(alias = "end")]
    Exit {
        #[serde(default)]
        title: String,
        #[serde(default, alias = "endMessage")]
        end_message: String,
        #[serde(default, alias = "showSummary")]
        show_summary: bool,
    },
}

impl NodeData {
    /// The payload a freshly dropped node of `kind` starts with.
    pub fn default_for(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Entry => NodeData::Entry {
                title: "Start".into(),
                metadata: Vec::new(),
            },
            NodeKind::Task => NodeData::Task {
                title: String::new(),
                description: String::new(),
                assignee: String::new(),
                due_date: None,
                custom_fields: Vec::new(),
            },
            NodeKind::Approval => NodeData::Approval {
                title: String::new(),
                approver_role: Some(ApproverRole::Manager),
                auto_approve_threshold: None,
            },
            NodeKind::Automated => NodeData::Automated {
                title: String::new(),
                action_id: String::new(),
                action_label: String::new(),
                parameters: BTreeMap::new(),
            },
            NodeKind::Exit => NodeData::Exit {
                title: "End".into(),
                end_message: String::new(),
                show_summary: false,
            },
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Entry { .. } => NodeKind::Entry,
            NodeData::Task { .. } => NodeKind::Task,
            NodeData::Approval { .. } => NodeKind::Approval,
            NodeData::Automated { .. } => NodeKind::Automated,
            NodeData::Exit { .. } => NodeKind::Exit,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            NodeData::Entry { title, .. }
            | NodeData::Task { title, .. }
            | NodeData::Approval { title, .. }
            | NodeData::Automated { title, .. }
            | NodeData::Exit { title, .. } => title,
        }
    }

    pub fn set_title(&mut self, value: impl Into<String>) {
        match self {
            NodeData::Entry { title, .. }
            | NodeData::Task { title, .. }
            | NodeData::Approval { title, .. }
            | NodeData::Automated { title, .. }
            | NodeData::Exit { title, .. } => *title = value.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// Canvas coordinates. Carried through untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A single step in the workflow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier within this workflow (referenced by edges).
    pub id: String,
    #[serde(default)]
    pub position: Position,
    pub data: NodeData,
}

impl Node {
    pub fn new(id: impl Into<String>, data: NodeData) -> Self {
        Self {
            id: id.into(),
            position: Position::default(),
            data,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    pub fn title(&self) -> &str {
        self.data.title()
    }
}

// ---------------------------------------------------------------------------
// Edge
// ---------------------------------------------------------------------------

/// Directed transition from one node to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    #[serde(default)]
    pub id: String,
    #[serde(alias = "from")]
    pub source: String,
    #[serde(alias = "to")]
    pub target: String,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: Self::fresh_id(),
            source: source.into(),
            target: target.into(),
        }
    }

    fn fresh_id() -> String {
        format!("e-{}", Uuid::new_v4().simple())
    }
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// The node/edge set that validation and simulation operate on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// A complete workflow document.
///
/// Every metadata field is defaulted, so a bare `{ "nodes": [], "edges": [] }`
/// document loads as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub graph: Graph,
    #[serde(default = "Utc::now", alias = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now", alias = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl Workflow {
    pub fn new(name: impl Into<String>, graph: Graph) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            graph,
            created_at: now,
            updated_at: now,
        }
    }

    /// Parse a workflow document from JSON.
    ///
    /// Edges stored without an id are given a fresh one.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let mut workflow: Self = serde_json::from_str(json)?;
        for edge in workflow.graph.edges.iter_mut().filter(|e| e.id.is_empty()) {
            edge.id = Edge::fresh_id();
        }
        Ok(workflow)
    }

    /// Read and parse a workflow document from disk.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_tag_determines_kind() {
        let node: Node = serde_json::from_str(
            r#"{ "id": "t1", "data": { "type": "task", "title": "Review", "assignee": "Jo" } }"#,
        )
        .expect("task node should parse");

        assert_eq!(node.kind(), NodeKind::Task);
        assert_eq!(node.title(), "Review");
        assert_eq!(node.position, Position::default());
    }

    #[test]
    fn legacy_start_and_end_tags_are_accepted() {
        let start: NodeData = serde_json::from_str(r#"{ "type": "start", "title": "Go" }"#).unwrap();
        let end: NodeData =
            serde_json::from_str(r#"{ "type": "end", "title": "Stop", "end_message": "bye now" }"#)
                .unwrap();

        assert_eq!(start.kind(), NodeKind::Entry);
        assert_eq!(end.kind(), NodeKind::Exit);
    }

    #[test]
    fn approver_roles_use_display_spelling() {
        let data: NodeData = serde_json::from_str(
            r#"{ "type": "approval", "title": "Sign off", "approver_role": "HRBP", "auto_approve_threshold": 3 }"#,
        )
        .unwrap();

        match data {
            NodeData::Approval { approver_role, auto_approve_threshold, .. } => {
                assert_eq!(approver_role, Some(ApproverRole::Hrbp));
                assert_eq!(approver_role.unwrap().to_string(), "HRBP");
                assert_eq!(auto_approve_threshold, Some(3));
            }
            other => panic!("expected approval payload, got {other:?}"),
        }
    }

    #[test]
    fn negative_threshold_is_rejected() {
        let parsed = serde_json::from_str::<NodeData>(
            r#"{ "type": "approval", "title": "x", "auto_approve_threshold": -1 }"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn bare_graph_document_loads_as_workflow() {
        let wf = Workflow::from_json(
            r#"{
                "nodes": [
                    { "id": "s", "data": { "type": "entry", "title": "Start" } },
                    { "id": "e", "data": { "type": "exit", "title": "End", "end_message": "All done" } }
                ],
                "edges": [ { "from": "s", "to": "e" } ]
            }"#,
        )
        .expect("bare graph should load");

        assert_eq!(wf.graph.nodes.len(), 2);
        assert_eq!(wf.graph.edges[0].source, "s");
        assert_eq!(wf.graph.edges[0].target, "e");
        assert!(wf.name.is_empty());
    }

    #[test]
    fn unknown_kind_is_a_definition_error() {
        let err = Workflow::from_json(
            r#"{ "nodes": [ { "id": "x", "data": { "type": "webhook" } } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidDefinition(_)));
    }

    #[test]
    fn camel_case_editor_export_loads() {
        let wf = Workflow::from_json(
            r#"{
                "name": "Onboarding",
                "createdAt": "2024-05-01T09:00:00.000Z",
                "nodes": [
                    { "id": "s", "data": { "type": "start", "title": "Start" } },
                    { "id": "a", "data": { "type": "approval", "title": "Sign off",
                                           "approverRole": "VP", "autoApproveThreshold": 2 } },
                    { "id": "x", "data": { "type": "automated", "title": "Mail",
                                           "actionId": "send_email", "actionLabel": "Send Email" } },
                    { "id": "e", "data": { "type": "end", "title": "End",
                                           "endMessage": "All done here", "showSummary": true } }
                ],
                "edges": [
                    { "source": "s", "target": "a" },
                    { "source": "a", "target": "x" },
                    { "source": "x", "target": "e" }
                ]
            }"#,
        )
        .expect("editor export should load");

        assert_eq!(wf.created_at.timestamp(), 1_714_554_000);
        assert_eq!(
            wf.graph.nodes[1].data,
            NodeData::Approval {
                title: "Sign off".into(),
                approver_role: Some(ApproverRole::Vp),
                auto_approve_threshold: Some(2),
            }
        );
        assert!(matches!(
            &wf.graph.nodes[2].data,
            NodeData::Automated { action_id, action_label, .. }
                if action_id == "send_email" && action_label == "Send Email"
        ));
        assert_eq!(
            wf.graph.nodes[3].data,
            NodeData::Exit {
                title: "End".into(),
                end_message: "All done here".into(),
                show_summary: true,
            }
        );

        let result = crate::validate(&wf.graph);
        assert!(result.is_valid, "unexpected errors: {:?}", result.errors);
    }

    #[test]
    fn camel_case_task_fields_load() {
        let data: NodeData = serde_json::from_str(
            r#"{ "type": "task", "title": "Collect", "assignee": "Jo", "dueDate": "2024-06-01",
                 "customFields": [ { "key": "team", "value": "ops" } ] }"#,
        )
        .unwrap();

        match data {
            NodeData::Task { due_date, custom_fields, .. } => {
                assert_eq!(due_date.as_deref(), Some("2024-06-01"));
                assert_eq!(custom_fields, vec![KeyValue::new("team", "ops")]);
            }
            other => panic!("expected task payload, got {other:?}"),
        }
    }

    #[test]
    fn edge_ids_are_unique() {
        let a = Edge::new("a-b", "c");
        let b = Edge::new("a", "b-c");
        assert_ne!(a.id, b.id);
        assert_ne!(Edge::new("s", "e").id, Edge::new("s", "e").id);
    }

    #[test]
    fn loaded_edges_without_ids_get_distinct_ones() {
        let wf = Workflow::from_json(
            r#"{
                "nodes": [],
                "edges": [
                    { "from": "s", "to": "a" },
                    { "id": "keep", "from": "a", "to": "e" },
                    { "from": "a", "to": "e" }
                ]
            }"#,
        )
        .unwrap();

        let ids: Vec<&str> = wf.graph.edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids[1], "keep");
        assert!(ids[0].starts_with("e-"));
        assert!(ids[2].starts_with("e-"));
        assert_ne!(ids[0], ids[2]);
    }

    #[test]
    fn defaults_match_palette_drop() {
        assert_eq!(NodeData::default_for(NodeKind::Entry).title(), "Start");
        assert_eq!(NodeData::default_for(NodeKind::Exit).title(), "End");
        for kind in NodeKind::ALL {
            assert_eq!(NodeData::default_for(kind).kind(), kind);
        }
    }
}
