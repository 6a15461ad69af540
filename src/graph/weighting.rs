//! Edge weighting
//!
//! For an edge `(i, j)` with aggregate label weights `w_i`, `w_j`:
//!
//! ```text
//! D = Σ_s 1 / min{ pos(s, j) - pos(s, i) > 0 }      (0 when i never precedes j in s)
//! weight = (w_i + w_j) / D / (w_i * w_j)
//! ```
//!
//! A weight of 0 marks the edge as unusable: either endpoint has no weight,
//! or the two words never appear in that order.

use rustc_hash::FxHashMap;

use crate::graph::word_graph::{NodeId, WordGraph};
use crate::nlp::statistics::TermStatistics;

/// Compute the weight of the edge `from -> to`
pub fn edge_weight(graph: &WordGraph, stats: &TermStatistics, from: NodeId, to: NodeId) -> f64 {
    let (Some(first), Some(second)) = (graph.node(from), graph.node(to)) else {
        return 0.0;
    };

    let w1 = stats.weight(&first.label);
    let w2 = stats.weight(&second.label);
    if w1 == 0.0 || w2 == 0.0 {
        return 0.0;
    }

    // Minimum forward distance per sentence
    let mut min_diff: FxHashMap<usize, usize> = FxHashMap::default();
    for &(s1, p1) in &first.occurrences {
        for &(s2, p2) in &second.occurrences {
            if s1 == s2 && p2 > p1 {
                let diff = p2 - p1;
                min_diff
                    .entry(s1)
                    .and_modify(|d| *d = (*d).min(diff))
                    .or_insert(diff);
            }
        }
    }

    let sum_diff: f64 = min_diff.values().map(|&d| 1.0 / d as f64).sum();
    if sum_diff == 0.0 {
        return 0.0;
    }

    (w1 + w2) / sum_diff / (w1 * w2)
}

/// Assign a weight to every edge of the graph
pub fn assign_weights(graph: &mut WordGraph, stats: &TermStatistics) {
    let weights: Vec<(NodeId, NodeId, f64)> = graph
        .edges()
        .map(|(from, to, _)| (from, to, edge_weight(graph, stats, from, to)))
        .collect();

    for (from, to, weight) in weights {
        graph.set_edge_weight(from, to, weight);
    }
}
