//! Graphviz DOT export

use std::io::{self, Write};

use super::csr::CsrGraph;

/// Write the graph in DOT format
///
/// Nodes are named by id and labelled with their `word/-/POS` label; edges
/// carry their weight with four decimals.
pub fn write_dot<W: Write>(graph: &CsrGraph, out: &mut W) -> io::Result<()> {
    writeln!(out, "digraph wordgraph {{")?;
    for node in 0..graph.num_nodes {
        let label = escape(&graph.labels[node]);
        writeln!(out, "  n{} [label=\"{}\"];", node, label)?;
    }
    for node in 0..graph.num_nodes as u32 {
        for (target, weight) in graph.neighbors(node) {
            writeln!(out, "  n{} -> n{} [label=\"{:.4}\"];", node, target, weight)?;
        }
    }
    writeln!(out, "}}")
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::word_graph::WordGraph;

    #[test]
    fn test_dot_output() {
        let mut graph = WordGraph::new();
        let a = graph.add_node("\"/-/PUNCT", "\"", (0, 1));
        let b = graph.add_node("cat/-/NN", "cat", (0, 2));
        graph.add_edge(a, b);
        graph.set_edge_weight(a, b, 0.5);

        let mut out = Vec::new();
        write_dot(&CsrGraph::from_word_graph(&graph), &mut out).unwrap();
        let dot = String::from_utf8(out).unwrap();

        assert!(dot.starts_with("digraph wordgraph {"));
        assert!(dot.contains("n0 [label=\"\\\"/-/PUNCT\"];"));
        assert!(dot.contains("n0 -> n1 [label=\"0.5000\"];"));
        assert!(dot.trim_end().ends_with('}'));
    }
}
