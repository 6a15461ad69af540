//! Final re-scoring of completed paths
//!
//! `score = path_length / path_weight + lambda * fluency / words`, where the
//! path weight sums the edges between real words (the START and END edges
//! are left out) and `path_length` counts every node including sentinels.

use crate::graph::csr::CsrGraph;
use crate::graph::word_graph::NodeId;
use crate::lm::FluencyScorer;
use crate::types::Candidate;

/// Score completed paths and keep the best `limit`
///
/// Paths without a single real word are skipped. Ties keep search order.
pub fn rank_paths<S: FluencyScorer + ?Sized>(
    graph: &CsrGraph,
    paths: &[Vec<NodeId>],
    scorer: &S,
    lambda: f64,
    limit: usize,
) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = paths
        .iter()
        .filter_map(|path| score_path(graph, path, scorer, lambda))
        .collect();

    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates.truncate(limit);
    candidates
}

/// Score one START-to-END path
pub fn score_path<S: FluencyScorer + ?Sized>(
    graph: &CsrGraph,
    path: &[NodeId],
    scorer: &S,
    lambda: f64,
) -> Option<Candidate> {
    if path.len() < 3 {
        return None;
    }
    let words = &path[1..path.len() - 1];

    let path_weight: f64 = words
        .windows(2)
        .map(|pair| graph.edge_weight(pair[0], pair[1]).unwrap_or(0.0))
        .sum();

    let text = words
        .iter()
        .map(|&node| graph.word(node))
        .collect::<Vec<_>>()
        .join(" ");

    let structural = if path_weight > 0.0 {
        path.len() as f64 / path_weight
    } else {
        0.0
    };
    let fluency = scorer.fluency(&text) / words.len() as f64;

    Some(Candidate {
        score: structural + lambda * fluency,
        text,
        path_length: path.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::word_graph::WordGraph;

    struct ConstScorer(f64);

    impl FluencyScorer for ConstScorer {
        fn fluency(&self, _sentence: &str) -> f64 {
            self.0
        }
    }

    /// s -> a -> b -> c -> e with weights 9, 1, 3, 9
    fn graph() -> CsrGraph {
        let mut graph = WordGraph::new();
        let ids: Vec<NodeId> = ["s", "a", "b", "c", "e"]
            .iter()
            .enumerate()
            .map(|(i, w)| graph.add_node(&format!("{w}/-/X"), w, (0, i)))
            .collect();
        for (pair, weight) in ids.windows(2).zip([9.0, 1.0, 3.0, 9.0]) {
            graph.add_edge(pair[0], pair[1]);
            graph.set_edge_weight(pair[0], pair[1], weight);
        }
        graph.add_edge(ids[1], ids[3]);
        graph.set_edge_weight(ids[1], ids[3], 2.0);
        CsrGraph::from_word_graph(&graph)
    }

    #[test]
    fn test_score_excludes_sentinel_edges() {
        let csr = graph();
        let candidate = score_path(&csr, &[0, 1, 2, 3, 4], &ConstScorer(6.0), 0.5).unwrap();

        assert_eq!(candidate.text, "a b c");
        assert_eq!(candidate.path_length, 5);
        // 5 / (1 + 3) + 0.5 * 6 / 3
        assert!((candidate.score - 2.25).abs() < 1e-10);
    }

    #[test]
    fn test_single_word_path_has_no_structural_term() {
        let csr = graph();
        let candidate = score_path(&csr, &[0, 1, 4], &ConstScorer(2.0), 1.0).unwrap();

        assert_eq!(candidate.text, "a");
        assert!((candidate.score - 2.0).abs() < 1e-10);
        assert!(score_path(&csr, &[0, 4], &ConstScorer(2.0), 1.0).is_none());
    }

    #[test]
    fn test_rank_sorts_and_truncates() {
        let csr = graph();
        let paths = vec![vec![0, 1, 2, 3, 4], vec![0, 1, 3, 4]];

        let ranked = rank_paths(&csr, &paths, &ConstScorer(0.0), 1.0, 5);
        assert_eq!(ranked.len(), 2);
        // 4 / 2 beats 5 / 4
        assert_eq!(ranked[0].text, "a c");
        assert!(ranked[0].score >= ranked[1].score);

        let ranked = rank_paths(&csr, &paths, &ConstScorer(0.0), 1.0, 1);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].format(6), "2.000000#a c");
    }
}
