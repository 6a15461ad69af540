//! Compressed Sparse Row (CSR) view of a finished word graph
//!
//! Path search only ever asks for the successors of a node and the weight of
//! one edge, so the weighted graph is frozen into contiguous rows sorted by
//! target id. Sorting also makes successor iteration deterministic.

use super::word_graph::{NodeId, WordGraph};

/// A read-only directed graph in CSR format
#[derive(Debug, Clone)]
pub struct CsrGraph {
    /// Number of nodes
    pub num_nodes: usize,
    /// Row pointers: node i's edges are at indices row_ptr[i]..row_ptr[i+1]
    pub row_ptr: Vec<usize>,
    /// Column indices (target nodes) for each edge
    pub col_idx: Vec<NodeId>,
    /// Edge weights
    pub weights: Vec<f64>,
    /// Display word for each node
    pub words: Vec<String>,
    /// `word/-/POS` label for each node
    pub labels: Vec<String>,
    /// START sentinel, if any sentence was merged
    pub start: Option<NodeId>,
    /// END sentinel, if any sentence was merged
    pub end: Option<NodeId>,
}

impl CsrGraph {
    /// Freeze a weighted [`WordGraph`]
    pub fn from_word_graph(graph: &WordGraph) -> Self {
        let num_nodes = graph.node_count();
        let mut row_ptr = Vec::with_capacity(num_nodes + 1);
        let mut col_idx = Vec::with_capacity(graph.edge_count());
        let mut weights = Vec::with_capacity(graph.edge_count());
        let mut words = Vec::with_capacity(num_nodes);
        let mut labels = Vec::with_capacity(num_nodes);

        row_ptr.push(0);

        for (_, node) in graph.nodes() {
            words.push(node.word.clone());
            labels.push(node.label.clone());

            let mut edges: Vec<_> = node.edges.iter().map(|(&k, &v)| (k, v)).collect();
            edges.sort_by_key(|(k, _)| *k);

            for (target, weight) in edges {
                col_idx.push(target);
                weights.push(weight);
            }

            row_ptr.push(col_idx.len());
        }

        Self {
            num_nodes,
            row_ptr,
            col_idx,
            weights,
            words,
            labels,
            start: graph.start(),
            end: graph.end(),
        }
    }

    /// Iterate over successors of a node with their edge weights
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        let start = self.row_ptr[node as usize];
        let end = self.row_ptr[node as usize + 1];
        (start..end).map(move |i| (self.col_idx[i], self.weights[i]))
    }

    /// Weight of the edge `from -> to`, if present
    pub fn edge_weight(&self, from: NodeId, to: NodeId) -> Option<f64> {
        let start = *self.row_ptr.get(from as usize)?;
        let end = *self.row_ptr.get(from as usize + 1)?;
        self.col_idx[start..end]
            .binary_search(&to)
            .ok()
            .map(|offset| self.weights[start + offset])
    }

    /// Get the out-degree of a node
    pub fn degree(&self, node: NodeId) -> usize {
        self.row_ptr[node as usize + 1] - self.row_ptr[node as usize]
    }

    /// Get the display word of a node
    pub fn word(&self, node: NodeId) -> &str {
        &self.words[node as usize]
    }

    /// Get the label of a node
    pub fn label(&self, node: NodeId) -> &str {
        &self.labels[node as usize]
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.num_nodes == 0
    }

    /// Get the total number of directed edges
    pub fn num_edges(&self) -> usize {
        self.col_idx.len()
    }
}

impl Default for CsrGraph {
    fn default() -> Self {
        Self {
            num_nodes: 0,
            row_ptr: vec![0],
            col_idx: Vec::new(),
            weights: Vec::new(),
            words: Vec::new(),
            labels: Vec::new(),
            start: None,
            end: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_test_graph() -> WordGraph {
        let mut graph = WordGraph::new();
        let a = graph.add_node("a/-/DT", "a", (0, 1));
        let b = graph.add_node("b/-/NN", "b", (0, 2));
        let c = graph.add_node("c/-/VB", "c", (0, 3));

        graph.add_edge(a, c);
        graph.add_edge(a, b);
        graph.add_edge(b, c);
        graph.set_edge_weight(a, b, 1.0);
        graph.set_edge_weight(b, c, 2.0);
        graph.set_edge_weight(a, c, 1.5);

        graph
    }

    #[test]
    fn test_csr_conversion() {
        let csr = CsrGraph::from_word_graph(&build_test_graph());

        assert_eq!(csr.num_nodes, 3);
        assert_eq!(csr.words, vec!["a", "b", "c"]);
        assert_eq!(csr.label(1), "b/-/NN");
        assert_eq!(csr.num_edges(), 3);
        assert!(csr.start.is_none());
    }

    #[test]
    fn test_neighbors_sorted_and_directed() {
        let csr = CsrGraph::from_word_graph(&build_test_graph());

        let neighbors: Vec<_> = csr.neighbors(0).collect();
        assert_eq!(neighbors, vec![(1, 1.0), (2, 1.5)]);
        assert_eq!(csr.degree(2), 0);
        assert_eq!(csr.neighbors(2).count(), 0);
    }

    #[test]
    fn test_edge_weight_lookup() {
        let csr = CsrGraph::from_word_graph(&build_test_graph());

        assert_eq!(csr.edge_weight(1, 2), Some(2.0));
        assert_eq!(csr.edge_weight(2, 1), None);
        assert_eq!(csr.edge_weight(9, 1), None);
    }

    #[test]
    fn test_empty_graph() {
        let csr = CsrGraph::from_word_graph(&WordGraph::new());

        assert!(csr.is_empty());
        assert_eq!(csr.num_edges(), 0);
        assert_eq!(csr.row_ptr, CsrGraph::default().row_ptr);
    }
}
