//! Mutable word graph used during construction
//!
//! Nodes live in an arena and are addressed by dense [`NodeId`]s. A label
//! table maps each `word/-/POS` label to the ids of its nodes, ordered by
//! disambiguation index, so `(label, index)` resolves to a handle in O(1).

use rustc_hash::FxHashMap;

use crate::types::{make_label, END_TOKEN, START_TOKEN};

/// Dense node handle
pub type NodeId = u32;

/// One occurrence of a node: (sentence index, position in sentence)
pub type Occurrence = (usize, usize);

/// A node of the word graph
#[derive(Debug, Clone)]
pub struct WordNode {
    /// `word/-/POS` label shared by all nodes of the same word and tag
    pub label: String,
    /// Display form (the lowercased word)
    pub word: String,
    /// Disambiguation index among nodes sharing `label`
    pub index: usize,
    /// Where this node occurs; never holds the same sentence twice
    pub occurrences: Vec<Occurrence>,
    /// Successors: target node ID -> edge weight
    pub edges: FxHashMap<NodeId, f64>,
}

impl WordNode {
    /// Check whether `sentence` already maps a position to this node
    pub fn contains_sentence(&self, sentence: usize) -> bool {
        self.occurrences.iter().any(|&(s, _)| s == sentence)
    }

    /// Number of occurrences
    pub fn frequency(&self) -> usize {
        self.occurrences.len()
    }
}

/// Directed acyclic word graph under construction
#[derive(Debug, Default)]
pub struct WordGraph {
    label_to_ids: FxHashMap<String, Vec<NodeId>>,
    nodes: Vec<WordNode>,
}

impl WordGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a graph with pre-allocated capacity
    pub fn with_capacity(node_capacity: usize) -> Self {
        Self {
            label_to_ids: FxHashMap::with_capacity_and_hasher(node_capacity, Default::default()),
            nodes: Vec::with_capacity(node_capacity),
        }
    }

    /// Nodes sharing `label`, ordered by disambiguation index
    pub fn candidates(&self, label: &str) -> &[NodeId] {
        self.label_to_ids.get(label).map_or(&[], |ids| ids.as_slice())
    }

    /// Resolve `(label, index)` to a node handle
    pub fn node_id(&self, label: &str, index: usize) -> Option<NodeId> {
        self.candidates(label).get(index).copied()
    }

    /// Create a node for `label` with the next free disambiguation index
    pub fn add_node(&mut self, label: &str, word: &str, occurrence: Occurrence) -> NodeId {
        let id = self.nodes.len() as NodeId;
        let ids = self.label_to_ids.entry(label.to_string()).or_default();
        let index = ids.len();
        ids.push(id);
        self.nodes.push(WordNode {
            label: label.to_string(),
            word: word.to_string(),
            index,
            occurrences: vec![occurrence],
            edges: FxHashMap::default(),
        });
        id
    }

    /// Record another occurrence on an existing node
    pub fn attach(&mut self, id: NodeId, occurrence: Occurrence) {
        if let Some(node) = self.nodes.get_mut(id as usize) {
            debug_assert!(!node.contains_sentence(occurrence.0));
            node.occurrences.push(occurrence);
        }
    }

    /// Get a node by ID
    pub fn node(&self, id: NodeId) -> Option<&WordNode> {
        self.nodes.get(id as usize)
    }

    /// Iterate over all nodes
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &WordNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (i as NodeId, n))
    }

    /// The START sentinel node, once a sentence has been merged
    pub fn start(&self) -> Option<NodeId> {
        self.node_id(&make_label(START_TOKEN, START_TOKEN), 0)
    }

    /// The END sentinel node, once a sentence has been merged
    pub fn end(&self) -> Option<NodeId> {
        self.node_id(&make_label(END_TOKEN, END_TOKEN), 0)
    }

    /// Insert the edge `from -> to` unless it would close a cycle
    ///
    /// Returns `true` if the edge is present afterwards. The graph is
    /// acyclic before the call, so the edge closes a cycle exactly when
    /// `from` is already reachable from `to`.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) -> bool {
        if from == to {
            return false;
        }
        match self.nodes.get(from as usize) {
            Some(node) if node.edges.contains_key(&to) => return true,
            Some(_) => {}
            None => return false,
        }
        if self.reaches(to, from) {
            return false;
        }
        if let Some(node) = self.nodes.get_mut(from as usize) {
            node.edges.insert(to, 0.0);
        }
        true
    }

    /// Check whether a directed path leads from `from` to `to`
    pub fn reaches(&self, from: NodeId, to: NodeId) -> bool {
        if from == to {
            return true;
        }
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![from];
        visited[from as usize] = true;

        while let Some(current) = stack.pop() {
            for &next in self.nodes[current as usize].edges.keys() {
                if next == to {
                    return true;
                }
                if !visited[next as usize] {
                    visited[next as usize] = true;
                    stack.push(next);
                }
            }
        }
        false
    }

    /// Set the weight of an existing edge
    pub fn set_edge_weight(&mut self, from: NodeId, to: NodeId, weight: f64) {
        if let Some(w) = self
            .nodes
            .get_mut(from as usize)
            .and_then(|n| n.edges.get_mut(&to))
        {
            *w = weight;
        }
    }

    /// Weight of the edge `from -> to`, if present
    pub fn edge_weight(&self, from: NodeId, to: NodeId) -> Option<f64> {
        self.node(from).and_then(|n| n.edges.get(&to).copied())
    }

    /// Iterate over all edges as (from, to, weight)
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, f64)> + '_ {
        self.nodes().flat_map(|(from, node)| {
            node.edges.iter().map(move |(&to, &w)| (from, to, w))
        })
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of directed edges
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum()
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check for directed cycles (Kahn's algorithm)
    pub fn is_acyclic(&self) -> bool {
        let mut in_degree = vec![0usize; self.nodes.len()];
        for node in &self.nodes {
            for &to in node.edges.keys() {
                in_degree[to as usize] += 1;
            }
        }

        let mut ready: Vec<NodeId> = (0..self.nodes.len() as NodeId)
            .filter(|&n| in_degree[n as usize] == 0)
            .collect();
        let mut removed = 0;

        while let Some(n) = ready.pop() {
            removed += 1;
            for &to in self.nodes[n as usize].edges.keys() {
                in_degree[to as usize] -= 1;
                if in_degree[to as usize] == 0 {
                    ready.push(to);
                }
            }
        }

        removed == self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> (WordGraph, NodeId, NodeId, NodeId) {
        let mut graph = WordGraph::new();
        let a = graph.add_node("a/-/DT", "a", (0, 1));
        let b = graph.add_node("b/-/NN", "b", (0, 2));
        let c = graph.add_node("c/-/VB", "c", (0, 3));
        assert!(graph.add_edge(a, b));
        assert!(graph.add_edge(b, c));
        (graph, a, b, c)
    }

    #[test]
    fn test_disambiguation_indices() {
        let mut graph = WordGraph::new();
        let first = graph.add_node("the/-/DT", "the", (0, 1));
        let second = graph.add_node("the/-/DT", "the", (0, 4));

        assert_eq!(graph.candidates("the/-/DT"), &[first, second]);
        assert_eq!(graph.node(second).unwrap().index, 1);
        assert_eq!(graph.node_id("the/-/DT", 1), Some(second));
        assert_eq!(graph.node_id("the/-/DT", 2), None);
        assert!(graph.candidates("cat/-/NN").is_empty());
    }

    #[test]
    fn test_attach_occurrence() {
        let mut graph = WordGraph::new();
        let id = graph.add_node("cat/-/NN", "cat", (0, 2));
        graph.attach(id, (1, 5));

        let node = graph.node(id).unwrap();
        assert_eq!(node.occurrences, vec![(0, 2), (1, 5)]);
        assert!(node.contains_sentence(1));
        assert!(!node.contains_sentence(2));
        assert_eq!(node.frequency(), 2);
    }

    #[test]
    fn test_cycle_closing_edge_refused() {
        let (mut graph, a, _, c) = chain();

        assert!(!graph.add_edge(c, a));
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.is_acyclic());

        // Forward shortcut is fine
        assert!(graph.add_edge(a, c));
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_self_loops_prevented() {
        let (mut graph, a, _, _) = chain();
        assert!(!graph.add_edge(a, a));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_duplicate_edge_is_noop() {
        let (mut graph, a, b, _) = chain();
        graph.set_edge_weight(a, b, 0.5);
        assert!(graph.add_edge(a, b));
        assert_eq!(graph.edge_weight(a, b), Some(0.5));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_reachability() {
        let (graph, a, b, c) = chain();
        assert!(graph.reaches(a, c));
        assert!(graph.reaches(b, c));
        assert!(!graph.reaches(c, a));
    }

    #[test]
    fn test_sentinel_lookup() {
        let mut graph = WordGraph::new();
        assert!(graph.start().is_none());
        let start = graph.add_node("-start-/-/-start-", "-start-", (0, 0));
        let end = graph.add_node("-end-/-/-end-", "-end-", (0, 1));
        assert_eq!(graph.start(), Some(start));
        assert_eq!(graph.end(), Some(end));
    }
}
