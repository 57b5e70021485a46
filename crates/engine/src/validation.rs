//! Workflow validation — run this before simulating a workflow.
//!
//! Rules, evaluated in order and accumulated rather than short-circuited
//! (only an empty graph returns early):
//! 1. The graph must not be empty.
//! 2. Exactly one Entry node.
//! 3. At least one Exit node.
//! 4. Every node must be reachable from the Entry node when edges are
//!    followed in either direction (checked only with a single Entry).
//! 5. A directed cycle produces a warning, never an error.
//! 6. Per-node payload checks (title, assignee, end message, action).
//! 7. Entry nodes take no incoming edges, Exit nodes emit no outgoing edges.
//! 8. Node ids are unique; edges are not self-loops or repeated pairs.
//!    Edges naming unknown nodes are reported as warnings.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::graph::{bfs, has_cycle, GraphIndex};
use crate::models::{Graph, Node, NodeData, NodeKind};

const MIN_ASSIGNEE_CHARS: usize = 2;
const MIN_END_MESSAGE_CHARS: usize = 5;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Which aspect of the workflow an error concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Graph-level shape: empty graph, Entry/Exit cardinality, duplicate ids.
    Structural,
    /// Edge topology: disconnection, illegal Entry/Exit edges, bad edges.
    Connection,
    /// A node's own payload.
    Data,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorCategory::Structural => "structural",
            ErrorCategory::Connection => "connection",
            ErrorCategory::Data => "data",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    pub message: String,
    pub category: ErrorCategory,
}

impl ValidationError {
    fn structural(message: impl Into<String>) -> Self {
        Self { node_id: None, message: message.into(), category: ErrorCategory::Structural }
    }

    fn connection(node_id: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            node_id: node_id.map(str::to_owned),
            message: message.into(),
            category: ErrorCategory::Connection,
        }
    }

    fn data(node: &Node, message: impl Into<String>) -> Self {
        Self {
            node_id: Some(node.id.clone()),
            message: message.into(),
            category: ErrorCategory::Data,
        }
    }
}

/// Advisory finding; never affects validity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationWarning {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    fn from_findings(errors: Vec<ValidationError>, warnings: Vec<ValidationWarning>) -> Self {
        Self { is_valid: errors.is_empty(), errors, warnings }
    }

    /// Error messages in report order.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.message.clone()).collect()
    }
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

/// Check `graph` against every rule and report all findings.
///
/// Never panics: malformed input becomes a reported error or warning.
#[instrument(skip(graph), fields(nodes = graph.nodes.len(), edges = graph.edges.len()))]
pub fn validate(graph: &Graph) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if graph.nodes.is_empty() {
        errors.push(ValidationError::structural(
            "Workflow is empty. Add at least an Entry and Exit node.",
        ));
        return ValidationResult::from_findings(errors, warnings);
    }

    let index = GraphIndex::build(graph);

    // -----------------------------------------------------------------------
    // Entry / Exit cardinality
    // -----------------------------------------------------------------------
    let entries: Vec<&Node> = graph.nodes.iter().filter(|n| n.kind() == NodeKind::Entry).collect();
    let exits: Vec<&Node> = graph.nodes.iter().filter(|n| n.kind() == NodeKind::Exit).collect();

    match entries.len() {
        0 => errors.push(ValidationError::structural("Workflow must have an Entry node")),
        1 => {}
        _ => errors.push(ValidationError::structural("Workflow can only have one Entry node")),
    }
    if exits.is_empty() {
        errors.push(ValidationError::structural("Workflow must have at least one Exit node"));
    }

    // -----------------------------------------------------------------------
    // Connectivity (undirected reachability from the Entry node)
    // -----------------------------------------------------------------------
    if let ([_], Some(entry)) = (entries.as_slice(), index.entry()) {
        let mut reached = vec![false; index.len()];
        for position in bfs(&index.undirected(), entry) {
            reached[position] = true;
        }

        for node in &graph.nodes {
            let connected = index.position(&node.id).is_some_and(|p| reached[p]);
            if !connected {
                errors.push(ValidationError::connection(
                    Some(node.id.as_str()),
                    format!("Node \"{}\" is not connected to the workflow", display_name(node)),
                ));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Cycles
    // -----------------------------------------------------------------------
    if has_cycle(index.outgoing()) {
        warnings.push(ValidationWarning {
            node_id: None,
            message: "Workflow contains a cycle. This may cause infinite loops during execution."
                .into(),
        });
    }

    // -----------------------------------------------------------------------
    // Per-node payloads
    // -----------------------------------------------------------------------
    for node in &graph.nodes {
        errors.extend(validate_node_data(node));
    }

    // -----------------------------------------------------------------------
    // Entry / Exit edge direction
    // -----------------------------------------------------------------------
    for entry in &entries {
        if graph.edges.iter().any(|e| e.target == entry.id) {
            errors.push(ValidationError::connection(
                Some(entry.id.as_str()),
                "Entry node cannot have incoming connections",
            ));
        }
    }
    for exit in &exits {
        if graph.edges.iter().any(|e| e.source == exit.id) {
            errors.push(ValidationError::connection(
                Some(exit.id.as_str()),
                "Exit node cannot have outgoing connections",
            ));
        }
    }

    // -----------------------------------------------------------------------
    // Construction invariants
    // -----------------------------------------------------------------------
    let mut seen_ids: HashSet<&str> = HashSet::new();
    for node in &graph.nodes {
        if !seen_ids.insert(node.id.as_str()) {
            errors.push(ValidationError::structural(format!(
                "Node ID \"{}\" is used by more than one node",
                node.id
            )));
        }
    }

    let mut seen_pairs: HashSet<(&str, &str)> = HashSet::new();
    for edge in &graph.edges {
        if edge.source == edge.target {
            errors.push(ValidationError::connection(
                Some(edge.source.as_str()),
                "A node cannot be connected to itself",
            ));
        } else if !seen_pairs.insert((edge.source.as_str(), edge.target.as_str())) {
            errors.push(ValidationError::connection(
                Some(edge.source.as_str()),
                format!(
                    "Duplicate connection from \"{}\" to \"{}\"",
                    edge.source, edge.target
                ),
            ));
        }
    }

    for edge in index.dangling() {
        let missing = if index.position(&edge.source).is_none() {
            &edge.source
        } else {
            &edge.target
        };
        warnings.push(ValidationWarning {
            node_id: None,
            message: format!("Connection references unknown node \"{missing}\" and was ignored"),
        });
    }

    let result = ValidationResult::from_findings(errors, warnings);
    debug!(
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "validation finished"
    );
    result
}

fn validate_node_data(node: &Node) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let title = node.title();

    if is_blank(title) {
        errors.push(ValidationError::data(node, "Node is missing a title"));
    }

    match &node.data {
        NodeData::Task { assignee, .. } if assignee.trim().chars().count() < MIN_ASSIGNEE_CHARS => {
            errors.push(ValidationError::data(
                node,
                format!("Task \"{title}\" requires an assignee (min {MIN_ASSIGNEE_CHARS} characters)"),
            ));
        }
        NodeData::Exit { end_message, .. }
            if end_message.trim().chars().count() < MIN_END_MESSAGE_CHARS =>
        {
            errors.push(ValidationError::data(
                node,
                format!(
                    "Exit node \"{title}\" requires an end message (min {MIN_END_MESSAGE_CHARS} characters)"
                ),
            ));
        }
        NodeData::Automated { action_id, .. } if action_id.is_empty() => {
            errors.push(ValidationError::data(
                node,
                format!("Automated node \"{title}\" requires an action to be selected"),
            ));
        }
        _ => {}
    }

    errors
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Title for messages, falling back to the id when the title is blank.
fn display_name(node: &Node) -> &str {
    if is_blank(node.title()) {
        &node.id
    } else {
        node.title()
    }
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Edge, NodeData};

    fn entry(id: &str) -> Node {
        Node::new(id, NodeData::Entry { title: "Start".into(), metadata: vec![] })
    }

    fn exit(id: &str) -> Node {
        Node::new(
            id,
            NodeData::Exit { title: "Done".into(), end_message: "All done here".into(), show_summary: false },
        )
    }

    fn task(id: &str, title: &str, assignee: &str) -> Node {
        Node::new(
            id,
            NodeData::Task {
                title: title.into(),
                description: String::new(),
                assignee: assignee.into(),
                due_date: None,
                custom_fields: vec![],
            },
        )
    }

    fn edges(pairs: &[(&str, &str)]) -> Vec<Edge> {
        pairs.iter().map(|(a, b)| Edge::new(*a, *b)).collect()
    }

    fn minimal() -> Graph {
        Graph::new(vec![entry("s"), exit("e")], edges(&[("s", "e")]))
    }

    fn has_error(result: &ValidationResult, category: ErrorCategory, needle: &str) -> bool {
        result
            .errors
            .iter()
            .any(|e| e.category == category && e.message.contains(needle))
    }

    #[test]
    fn empty_graph_reports_single_structural_error() {
        let result = validate(&Graph::default());
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].category, ErrorCategory::Structural);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn minimal_entry_to_exit_is_valid() {
        let result = validate(&minimal());
        assert!(result.is_valid, "unexpected errors: {:?}", result.errors);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn two_entries_are_rejected() {
        let g = Graph::new(
            vec![entry("s1"), entry("s2"), exit("e")],
            edges(&[("s1", "e"), ("s2", "e")]),
        );
        let result = validate(&g);
        assert!(!result.is_valid);
        assert!(has_error(&result, ErrorCategory::Structural, "only have one Entry"));
    }

    #[test]
    fn missing_entry_skips_connectivity() {
        let g = Graph::new(vec![exit("e"), task("t", "Review", "Jo")], vec![]);
        let result = validate(&g);
        assert!(has_error(&result, ErrorCategory::Structural, "must have an Entry"));
        assert!(!result.errors.iter().any(|e| e.category == ErrorCategory::Connection));
    }

    #[test]
    fn missing_exit_is_structural() {
        let g = Graph::new(vec![entry("s")], vec![]);
        let result = validate(&g);
        assert!(has_error(&result, ErrorCategory::Structural, "at least one Exit"));
    }

    #[test]
    fn disconnected_node_is_named_and_reconnecting_clears_it() {
        let mut g = Graph::new(
            vec![entry("s"), task("t", "Review", "Jo"), exit("e")],
            edges(&[("s", "e")]),
        );
        let result = validate(&g);
        assert!(has_error(&result, ErrorCategory::Connection, "\"Review\" is not connected"));
        assert_eq!(result.errors[0].node_id.as_deref(), Some("t"));

        // Upstream-only link still counts: reachability is undirected.
        g.edges.push(Edge::new("t", "e"));
        let result = validate(&g);
        assert!(result.is_valid, "unexpected errors: {:?}", result.errors);
    }

    #[test]
    fn disconnected_node_without_title_is_named_by_id() {
        let g = Graph::new(
            vec![entry("s"), task("t-42", "  ", "Jo"), exit("e")],
            edges(&[("s", "e")]),
        );
        let result = validate(&g);
        assert!(has_error(&result, ErrorCategory::Connection, "\"t-42\" is not connected"));
        assert!(has_error(&result, ErrorCategory::Data, "missing a title"));
    }

    #[test]
    fn cycle_warns_without_invalidating() {
        let g = Graph::new(
            vec![entry("s"), task("a", "A", "Jo"), task("b", "B", "Jo"), exit("e")],
            edges(&[("s", "a"), ("a", "b"), ("b", "a"), ("b", "e")]),
        );
        let result = validate(&g);
        assert!(result.is_valid, "unexpected errors: {:?}", result.errors);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].message.contains("cycle"));
    }

    #[test]
    fn any_selected_action_id_satisfies_the_automated_rule() {
        let automated = Node::new(
            "auto",
            NodeData::Automated {
                title: "Notify".into(),
                action_id: " ".into(),
                action_label: String::new(),
                parameters: Default::default(),
            },
        );
        let g = Graph::new(
            vec![entry("s"), automated, exit("e")],
            edges(&[("s", "auto"), ("auto", "e")]),
        );
        let result = validate(&g);
        assert!(result.is_valid, "unexpected errors: {:?}", result.errors);
    }

    #[test]
    fn payload_rules_per_kind() {
        let automated = Node::new(
            "auto",
            NodeData::Automated {
                title: "Notify".into(),
                action_id: String::new(),
                action_label: String::new(),
                parameters: Default::default(),
            },
        );
        let short_exit = Node::new(
            "e",
            NodeData::Exit { title: "Done".into(), end_message: " bye ".into(), show_summary: true },
        );
        let g = Graph::new(
            vec![entry("s"), task("t", "Review", " J "), automated, short_exit],
            edges(&[("s", "t"), ("t", "auto"), ("auto", "e")]),
        );
        let result = validate(&g);

        assert!(has_error(&result, ErrorCategory::Data, "Task \"Review\" requires an assignee"));
        assert!(has_error(&result, ErrorCategory::Data, "Exit node \"Done\" requires an end message"));
        assert!(has_error(&result, ErrorCategory::Data, "Automated node \"Notify\" requires an action"));
        assert_eq!(result.errors.len(), 3);
    }

    #[test]
    fn approval_defaults_pass_payload_checks() {
        let mut approval = NodeData::default_for(NodeKind::Approval);
        approval.set_title("Manager sign-off");
        let g = Graph::new(
            vec![entry("s"), Node::new("a", approval), exit("e")],
            edges(&[("s", "a"), ("a", "e")]),
        );
        assert!(validate(&g).is_valid);
    }

    #[test]
    fn entry_and_exit_edge_direction() {
        let g = Graph::new(
            vec![entry("s"), task("t", "Review", "Jo"), exit("e")],
            edges(&[("s", "t"), ("t", "e"), ("e", "s")]),
        );
        let result = validate(&g);

        assert!(has_error(&result, ErrorCategory::Connection, "Entry node cannot have incoming"));
        assert!(has_error(&result, ErrorCategory::Connection, "Exit node cannot have outgoing"));
        // The back edge also closes a cycle.
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn construction_invariants_are_rechecked() {
        let g = Graph::new(
            vec![entry("s"), task("t", "Review", "Jo"), task("t", "Again", "Jo"), exit("e")],
            edges(&[("s", "t"), ("s", "t"), ("t", "t"), ("t", "e")]),
        );
        let result = validate(&g);

        assert!(has_error(&result, ErrorCategory::Structural, "\"t\" is used by more than one"));
        assert!(has_error(&result, ErrorCategory::Connection, "Duplicate connection"));
        assert!(has_error(&result, ErrorCategory::Connection, "connected to itself"));
    }

    #[test]
    fn dangling_edges_warn_but_do_not_invalidate() {
        let mut g = minimal();
        g.edges.push(Edge::new("s", "ghost"));
        let result = validate(&g);

        assert!(result.is_valid, "unexpected errors: {:?}", result.errors);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].message.contains("\"ghost\""));
    }

    #[test]
    fn errors_accumulate_per_node() {
        // Blank title, too-short assignee and disconnected: three entries for one node.
        let g = Graph::new(vec![entry("s"), task("t", "", "x"), exit("e")], edges(&[("s", "e")]));
        let result = validate(&g);
        let for_t = result.errors.iter().filter(|e| e.node_id.as_deref() == Some("t")).count();
        assert_eq!(for_t, 3);
    }

    #[test]
    fn validation_is_idempotent() {
        let g = Graph::new(
            vec![entry("s"), task("t", "", "x"), exit("e")],
            edges(&[("s", "t"), ("t", "s"), ("e", "t")]),
        );
        assert_eq!(validate(&g), validate(&g));
    }
}
