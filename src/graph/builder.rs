//! Word graph construction
//!
//! Sentences are merged one at a time. For each sentence a
//! [`MappingBuilder`] maps every token position to a node, then every mapped
//! node receives an edge to every later node of the same sentence, skipping
//! edges that would close a cycle. Once all sentences are merged, edges are
//! weighted from the term statistics.

use crate::graph::mapping::MappingBuilder;
use crate::graph::weighting::assign_weights;
use crate::graph::word_graph::{NodeId, WordGraph};
use crate::nlp::statistics::TermStatistics;
use crate::nlp::stopwords::StopwordFilter;
use crate::types::Sentence;

/// Builds a weighted word graph from a sentence cluster
#[derive(Debug, Clone, Copy)]
pub struct WordGraphBuilder<'a> {
    stopwords: &'a StopwordFilter,
}

impl<'a> WordGraphBuilder<'a> {
    /// Create a builder using `stopwords` for pass selection
    pub fn new(stopwords: &'a StopwordFilter) -> Self {
        Self { stopwords }
    }

    /// Merge all sentences and weight the edges
    pub fn build(&self, sentences: &[Sentence], stats: &TermStatistics) -> WordGraph {
        let mut graph = self.merge(sentences);
        assign_weights(&mut graph, stats);
        graph
    }

    /// Merge all sentences without weighting (all edge weights are 0.0)
    pub fn merge(&self, sentences: &[Sentence]) -> WordGraph {
        let total_tokens: usize = sentences.iter().map(Sentence::len).sum();
        let mut graph = WordGraph::with_capacity(total_tokens / 2 + 2);

        for sentence_id in 0..sentences.len() {
            let mapping = MappingBuilder::new(sentences, sentence_id, self.stopwords).run(&mut graph);
            insert_edges(&mut graph, &mapping);
        }

        graph
    }
}

/// Connect every node of a mapped sentence to every later node
///
/// Returns the number of edges refused because they would close a cycle.
pub fn insert_edges(graph: &mut WordGraph, mapping: &[NodeId]) -> usize {
    let mut refused = 0;
    for (pre, &from) in mapping.iter().enumerate() {
        for &to in &mapping[pre + 1..] {
            if !graph.add_edge(from, to) {
                refused += 1;
            }
        }
    }
    refused
}
