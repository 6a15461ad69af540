//! Pruned breadth-first search over the frozen word graph
//!
//! Partial paths are kept in a FIFO queue seeded with the START node. Each
//! popped path is either accepted (it ends at END and is long enough) or
//! expanded with its best successors, where a successor is ranked by
//! `1 / edge_weight + lambda * fluency(phrase + successor) / (tokens + 1)`,
//! where the phrase spells out every node of the path, sentinels included.
//! The queue never holds more than `queue_size` paths.

use std::collections::VecDeque;

use crate::graph::csr::CsrGraph;
use crate::graph::word_graph::NodeId;
use crate::lm::FluencyScorer;
use crate::types::{CompressionConfig, OverflowPolicy};

/// A path under construction
#[derive(Debug, Clone)]
struct PartialPath {
    nodes: Vec<NodeId>,
    /// Space-joined words of every node on the path
    phrase: String,
    /// Guidance score of the last expansion step
    score: f64,
}

impl PartialPath {
    /// Fluency normalizer for a successor of this path: the phrase tokens
    /// with a trailing empty slot, plus one for the successor
    fn denominator(&self) -> f64 {
        (self.nodes.len() + 2) as f64
    }
}

/// Completed START-to-END paths plus search bookkeeping
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    /// Accepted paths as node id sequences, sentinels included
    pub paths: Vec<Vec<NodeId>>,
    /// Whether any expansion was dropped because the queue was full, or the
    /// expansion budget ran out
    pub truncated: bool,
    /// Number of paths expanded
    pub expansions: usize,
}

/// Capacity-bounded, fluency-guided BFS
pub struct PathSearch<'a, S: FluencyScorer + ?Sized> {
    graph: &'a CsrGraph,
    scorer: &'a S,
    config: &'a CompressionConfig,
}

impl<'a, S: FluencyScorer + ?Sized> PathSearch<'a, S> {
    /// Create a search over `graph`
    pub fn new(graph: &'a CsrGraph, scorer: &'a S, config: &'a CompressionConfig) -> Self {
        Self {
            graph,
            scorer,
            config,
        }
    }

    /// Run the search until the queue drains or the expansion budget is spent
    pub fn run(&self) -> SearchOutcome {
        let mut outcome = SearchOutcome::default();
        let (Some(start), Some(end)) = (self.graph.start, self.graph.end) else {
            return outcome;
        };
        if self.config.queue_size == 0 {
            return outcome;
        }

        let mut queue = VecDeque::with_capacity(self.config.queue_size.min(4096));
        queue.push_back(PartialPath {
            nodes: vec![start],
            phrase: self.graph.word(start).to_string(),
            score: 0.0,
        });

        while let Some(path) = queue.pop_front() {
            let last = path.nodes[path.nodes.len() - 1];
            if last == end {
                if path.nodes.len() >= self.config.min_path_length {
                    outcome.paths.push(path.nodes);
                }
                continue;
            }

            if let Some(budget) = self.config.max_expansions {
                if outcome.expansions >= budget {
                    tracing::debug!(budget, queued = queue.len() + 1, "expansion budget spent");
                    outcome.truncated = true;
                    break;
                }
            }
            outcome.expansions += 1;

            tracing::debug!(
                results = outcome.paths.len(),
                queue = queue.len(),
                phrase = %path.phrase,
                "expanding"
            );

            let successors = self.rank_successors(&path);
            for (node, score) in successors.into_iter().take(self.config.max_neighbors) {
                let next = extend(&path, node, self.graph.word(node), score);
                if queue.len() < self.config.queue_size {
                    queue.push_back(next);
                    continue;
                }

                outcome.truncated = true;
                match self.config.overflow_policy {
                    OverflowPolicy::DropIncoming => break,
                    OverflowPolicy::EvictLowest => {
                        if !evict_lowest(&mut queue, next) {
                            // successors arrive best first
                            break;
                        }
                    }
                }
            }
        }

        if outcome.truncated {
            tracing::debug!(expansions = outcome.expansions, "search truncated");
        }
        outcome
    }

    /// Successors with non-zero edge weight, best guidance score first
    fn rank_successors(&self, path: &PartialPath) -> Vec<(NodeId, f64)> {
        let last = path.nodes[path.nodes.len() - 1];
        let denominator = path.denominator();

        let mut ranked: Vec<(NodeId, f64)> = self
            .graph
            .neighbors(last)
            .filter(|&(_, weight)| weight != 0.0)
            .map(|(node, weight)| {
                let fluency = self.scorer.fluency(&join(&path.phrase, self.graph.word(node)));
                (node, 1.0 / weight + self.config.lambda * fluency / denominator)
            })
            .collect();

        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

fn join(phrase: &str, word: &str) -> String {
    if phrase.is_empty() {
        word.to_string()
    } else {
        format!("{} {}", phrase, word)
    }
}

fn extend(path: &PartialPath, node: NodeId, word: &str, score: f64) -> PartialPath {
    let mut nodes = Vec::with_capacity(path.nodes.len() + 1);
    nodes.extend_from_slice(&path.nodes);
    nodes.push(node);

    PartialPath {
        nodes,
        phrase: join(&path.phrase, word),
        score,
    }
}

/// Replace the lowest-scored queued path with `incoming` if it scores higher
fn evict_lowest(queue: &mut VecDeque<PartialPath>, incoming: PartialPath) -> bool {
    let lowest = queue
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.score.total_cmp(&b.1.score))
        .map(|(i, p)| (i, p.score));

    match lowest {
        Some((index, score)) if incoming.score > score => {
            queue.remove(index);
            queue.push_back(incoming);
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::graph::word_graph::WordGraph;
    use crate::types::{make_label, END_TOKEN, START_TOKEN};

    /// Scores every phrase the same
    struct FlatScorer;

    impl FluencyScorer for FlatScorer {
        fn fluency(&self, _sentence: &str) -> f64 {
            0.0
        }
    }

    /// Prefers phrases containing a given word
    struct LikesWord(&'static str);

    impl FluencyScorer for LikesWord {
        fn fluency(&self, sentence: &str) -> f64 {
            if sentence.split_whitespace().any(|w| w == self.0) {
                10.0
            } else {
                0.0
            }
        }
    }

    /// Remembers every phrase it scores and returns a fixed fluency
    struct RecordingScorer(Mutex<Vec<String>>);

    impl FluencyScorer for RecordingScorer {
        fn fluency(&self, sentence: &str) -> f64 {
            self.0.lock().unwrap().push(sentence.to_string());
            6.0
        }
    }

    /// START -> w0 -> ... -> w{n-1} -> END, every edge weighted 1.0
    fn chain(words: &[&str]) -> WordGraph {
        let mut graph = WordGraph::new();
        let mut ids = vec![graph.add_node(&make_label(START_TOKEN, START_TOKEN), START_TOKEN, (0, 0))];
        for (i, word) in words.iter().enumerate() {
            ids.push(graph.add_node(&make_label(word, "NN"), word, (0, i + 1)));
        }
        ids.push(graph.add_node(
            &make_label(END_TOKEN, END_TOKEN),
            END_TOKEN,
            (0, words.len() + 1),
        ));
        for pair in ids.windows(2) {
            graph.add_edge(pair[0], pair[1]);
            graph.set_edge_weight(pair[0], pair[1], 1.0);
        }
        graph
    }

    /// START -> {x, y} -> END
    fn fork() -> (WordGraph, NodeId, NodeId) {
        let mut graph = WordGraph::new();
        let start = graph.add_node(&make_label(START_TOKEN, START_TOKEN), START_TOKEN, (0, 0));
        let x = graph.add_node("x/-/NN", "x", (0, 1));
        let y = graph.add_node("y/-/NN", "y", (1, 1));
        let end = graph.add_node(&make_label(END_TOKEN, END_TOKEN), END_TOKEN, (0, 2));
        for (a, b) in [(start, x), (start, y), (x, end), (y, end)] {
            graph.add_edge(a, b);
            graph.set_edge_weight(a, b, 1.0);
        }
        (graph, x, y)
    }

    #[test]
    fn test_short_graph_yields_nothing() {
        let csr = CsrGraph::from_word_graph(&chain(&["a", "b", "c"]));
        let config = CompressionConfig::default();

        let outcome = PathSearch::new(&csr, &FlatScorer, &config).run();
        assert!(outcome.paths.is_empty());
        assert!(!outcome.truncated);
        assert_eq!(outcome.expansions, 4);
    }

    #[test]
    fn test_long_chain_accepted() {
        let csr = CsrGraph::from_word_graph(&chain(&["a", "b", "c", "d", "e", "f"]));
        let config = CompressionConfig::default();

        let outcome = PathSearch::new(&csr, &FlatScorer, &config).run();
        assert_eq!(outcome.paths.len(), 1);
        assert_eq!(outcome.paths[0].len(), 8);
        assert_eq!(outcome.paths[0][0], csr.start.unwrap());
        assert_eq!(*outcome.paths[0].last().unwrap(), csr.end.unwrap());
    }

    #[test]
    fn test_min_path_length_respected() {
        let (graph, _, _) = fork();
        let csr = CsrGraph::from_word_graph(&graph);

        let config = CompressionConfig::default().with_min_path_length(3);
        let outcome = PathSearch::new(&csr, &FlatScorer, &config).run();
        assert_eq!(outcome.paths.len(), 2);
        assert!(outcome.paths.iter().all(|p| p.len() >= 3));

        let config = CompressionConfig::default().with_min_path_length(4);
        let outcome = PathSearch::new(&csr, &FlatScorer, &config).run();
        assert!(outcome.paths.is_empty());
    }

    #[test]
    fn test_max_neighbors_keeps_best_successor() {
        let (graph, _, y) = fork();
        let csr = CsrGraph::from_word_graph(&graph);
        let config = CompressionConfig::default()
            .with_min_path_length(3)
            .with_max_neighbors(1);

        let outcome = PathSearch::new(&csr, &LikesWord("y"), &config).run();
        assert_eq!(outcome.paths.len(), 1);
        assert_eq!(outcome.paths[0][1], y);
    }

    #[test]
    fn test_zero_weight_edges_skipped() {
        let (mut graph, x, _) = fork();
        let start = graph.start().unwrap();
        graph.set_edge_weight(start, x, 0.0);
        let csr = CsrGraph::from_word_graph(&graph);
        let config = CompressionConfig::default().with_min_path_length(3);

        let outcome = PathSearch::new(&csr, &FlatScorer, &config).run();
        assert_eq!(outcome.paths.len(), 1);
        assert!(!outcome.paths[0].contains(&x));
    }

    #[test]
    fn test_full_queue_drops_incoming() {
        let (graph, _, _) = fork();
        let csr = CsrGraph::from_word_graph(&graph);
        let config = CompressionConfig::default()
            .with_min_path_length(3)
            .with_queue_size(1);

        let outcome = PathSearch::new(&csr, &FlatScorer, &config).run();
        assert!(outcome.truncated);
        assert_eq!(outcome.paths.len(), 1);
    }

    #[test]
    fn test_evict_lowest_replaces_weaker_path() {
        let mut queue = VecDeque::new();
        for (node, score) in [(1, 2.0), (2, 0.5), (3, 1.0)] {
            queue.push_back(PartialPath {
                nodes: vec![0, node],
                phrase: String::new(),
                score,
            });
        }
        let strong = PartialPath {
            nodes: vec![0, 4],
            phrase: String::new(),
            score: 1.5,
        };
        let weak = PartialPath {
            nodes: vec![0, 5],
            phrase: String::new(),
            score: 0.1,
        };

        assert!(evict_lowest(&mut queue, strong));
        assert!(!evict_lowest(&mut queue, weak));
        let tails: Vec<NodeId> = queue.iter().map(|p| p.nodes[1]).collect();
        assert_eq!(tails, vec![1, 3, 4]);
    }

    #[test]
    fn test_expansion_budget_truncates() {
        let csr = CsrGraph::from_word_graph(&chain(&["a", "b", "c", "d", "e", "f"]));
        let config = CompressionConfig::default().with_max_expansions(Some(3));

        let outcome = PathSearch::new(&csr, &FlatScorer, &config).run();
        assert!(outcome.truncated);
        assert_eq!(outcome.expansions, 3);
        assert!(outcome.paths.is_empty());
    }

    #[test]
    fn test_scored_phrase_spans_sentinels() {
        let csr = CsrGraph::from_word_graph(&chain(&["x"]));
        let config = CompressionConfig::default().with_min_path_length(3);
        let scorer = RecordingScorer(Mutex::new(Vec::new()));

        let outcome = PathSearch::new(&csr, &scorer, &config).run();
        assert_eq!(outcome.paths.len(), 1);
        assert_eq!(
            *scorer.0.lock().unwrap(),
            vec!["-start- x".to_string(), "-start- x -end-".to_string()]
        );
    }

    #[test]
    fn test_successor_score_normalized_by_phrase_tokens() {
        let csr = CsrGraph::from_word_graph(&chain(&["x"]));
        let config = CompressionConfig::default().with_lambda(1.0);
        let scorer = RecordingScorer(Mutex::new(Vec::new()));
        let search = PathSearch::new(&csr, &scorer, &config);
        let start = csr.start.unwrap();
        let end = csr.end.unwrap();

        let seed = PartialPath {
            nodes: vec![start],
            phrase: START_TOKEN.to_string(),
            score: 0.0,
        };
        let ranked = search.rank_successors(&seed);
        assert_eq!(ranked.len(), 1);
        assert!((ranked[0].1 - 3.0).abs() < 1e-10);

        let x = ranked[0].0;
        let step = extend(&seed, x, csr.word(x), ranked[0].1);
        assert_eq!(step.phrase, "-start- x");
        let ranked = search.rank_successors(&step);
        assert_eq!(ranked[0].0, end);
        assert!((ranked[0].1 - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_graph_without_sentinels() {
        let csr = CsrGraph::default();
        let config = CompressionConfig::default();

        let outcome = PathSearch::new(&csr, &FlatScorer, &config).run();
        assert!(outcome.paths.is_empty());
        assert_eq!(outcome.expansions, 0);
    }
}
