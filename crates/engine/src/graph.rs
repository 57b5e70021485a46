//! Graph primitives shared by the validator and the simulator.
//!
//! Nodes and edges stay in the caller's flat vectors; [`GraphIndex`] resolves
//! ids to positions once per call and builds index-based adjacency lists.
//! Edges whose endpoints don't resolve are kept aside as dangling and are
//! otherwise treated as absent.

use std::collections::{HashMap, VecDeque};

use crate::models::{Edge, Graph, Node, NodeKind};

/// Adjacency list over node positions.
pub type Adjacency = Vec<Vec<usize>>;

/// Id → position lookup plus directed adjacency for one graph.
#[derive(Debug)]
pub struct GraphIndex<'a> {
    nodes: &'a [Node],
    positions: HashMap<&'a str, usize>,
    outgoing: Adjacency,
    resolved: Vec<(usize, usize)>,
    dangling: Vec<&'a Edge>,
}

impl<'a> GraphIndex<'a> {
    /// Index `graph`. When ids repeat, the first node with that id wins.
    pub fn build(graph: &'a Graph) -> Self {
        let mut positions: HashMap<&str, usize> = HashMap::with_capacity(graph.nodes.len());
        for (i, node) in graph.nodes.iter().enumerate() {
            positions.entry(node.id.as_str()).or_insert(i);
        }

        let mut outgoing: Adjacency = vec![Vec::new(); graph.nodes.len()];
        let mut resolved = Vec::with_capacity(graph.edges.len());
        let mut dangling = Vec::new();

        // Edge order is preserved so neighbour expansion is deterministic.
        for edge in &graph.edges {
            match (
                positions.get(edge.source.as_str()),
                positions.get(edge.target.as_str()),
            ) {
                (Some(&from), Some(&to)) => {
                    outgoing[from].push(to);
                    resolved.push((from, to));
                }
                _ => dangling.push(edge),
            }
        }

        Self {
            nodes: &graph.nodes,
            positions,
            outgoing,
            resolved,
            dangling,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, position: usize) -> &'a Node {
        &self.nodes[position]
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Position of the first Entry node, if any.
    pub fn entry(&self) -> Option<usize> {
        self.nodes.iter().position(|n| n.kind() == NodeKind::Entry)
    }

    pub fn outgoing(&self) -> &Adjacency {
        &self.outgoing
    }

    /// Both directions of every resolved edge, in edge order.
    pub fn undirected(&self) -> Adjacency {
        let mut adjacency: Adjacency = vec![Vec::new(); self.nodes.len()];
        for &(from, to) in &self.resolved {
            adjacency[from].push(to);
            adjacency[to].push(from);
        }
        adjacency
    }

    /// Edges with at least one endpoint that names no node.
    pub fn dangling(&self) -> &[&'a Edge] {
        &self.dangling
    }
}

/// Breadth-first visit order from `start`; each reachable node appears once.
pub fn bfs(adjacency: &Adjacency, start: usize) -> Vec<usize> {
    let mut visited = vec![false; adjacency.len()];
    let mut order = Vec::new();
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        if visited[current] {
            continue;
        }
        visited[current] = true;
        order.push(current);

        for &next in &adjacency[current] {
            if !visited[next] {
                queue.push_back(next);
            }
        }
    }

    order
}

/// Whether any directed cycle exists, trying every node as a DFS root.
///
/// Iterative: the stack holds `(node, next neighbour offset)` frames and
/// `on_path` marks the nodes of the current DFS path.
pub fn has_cycle(adjacency: &Adjacency) -> bool {
    let mut visited = vec![false; adjacency.len()];
    let mut on_path = vec![false; adjacency.len()];
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in 0..adjacency.len() {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        on_path[root] = true;
        stack.push((root, 0));

        while let Some(frame) = stack.last_mut() {
            let (node, offset) = *frame;
            if let Some(&next) = adjacency[node].get(offset) {
                frame.1 += 1;
                if !visited[next] {
                    visited[next] = true;
                    on_path[next] = true;
                    stack.push((next, 0));
                } else if on_path[next] {
                    return true;
                }
            } else {
                on_path[node] = false;
                stack.pop();
            }
        }
    }

    false
}
