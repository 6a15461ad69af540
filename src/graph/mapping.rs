//! Per-sentence node mapping
//!
//! A [`MappingBuilder`] decides, for every token position of one sentence,
//! which graph node the position maps to. It runs four passes in order:
//!
//! 1. content words with zero or one candidate node
//! 2. content words with several candidate nodes (context overlap, then
//!    frequency)
//! 3. stopwords (context overlap over non-stopword neighbours, must be > 0)
//! 4. punctuation (full context overlap, must be > 1)
//!
//! Each pass reads the sentence, the stopword set and the graph built so far,
//! and writes its part of the mapping. No node ever receives two positions of
//! the same sentence.

use crate::graph::word_graph::{NodeId, WordGraph};
use crate::nlp::stopwords::StopwordFilter;
use crate::types::{Sentence, Token};

/// Which pass handles a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    /// Non-stopword, non-punctuation (sentinels included)
    Content,
    /// Listed in the stopword set
    Stopword,
    /// A single non-word character
    Punctuation,
}

/// Mapping state for the sentence being merged
#[derive(Debug)]
pub struct MappingBuilder<'a> {
    sentences: &'a [Sentence],
    stopwords: &'a StopwordFilter,
    sentence_id: usize,
    mapping: Vec<Option<NodeId>>,
}

impl<'a> MappingBuilder<'a> {
    /// Start mapping `sentences[sentence_id]`
    pub fn new(sentences: &'a [Sentence], sentence_id: usize, stopwords: &'a StopwordFilter) -> Self {
        let len = sentences[sentence_id].len();
        Self {
            sentences,
            stopwords,
            sentence_id,
            mapping: vec![None; len],
        }
    }

    /// Classify a token for pass selection
    pub fn classify(&self, token: &Token) -> TokenClass {
        if self.stopwords.is_stopword(&token.word) {
            TokenClass::Stopword
        } else if token.is_punctuation() {
            TokenClass::Punctuation
        } else {
            TokenClass::Content
        }
    }

    /// Mapping so far, one entry per token position
    pub fn mapping(&self) -> &[Option<NodeId>] {
        &self.mapping
    }

    /// Run all four passes and return the complete mapping
    pub fn run(mut self, graph: &mut WordGraph) -> Vec<NodeId> {
        self.map_unambiguous(graph);
        self.map_ambiguous(graph);
        self.map_stopwords(graph);
        self.map_punctuation(graph);
        self.finish()
    }

    /// Consume the builder and return the mapping
    ///
    /// Every position is mapped once the four passes have run.
    pub fn finish(self) -> Vec<NodeId> {
        debug_assert!(self.mapping.iter().all(Option::is_some));
        self.mapping.into_iter().flatten().collect()
    }

    fn sentence(&self) -> &'a Sentence {
        &self.sentences[self.sentence_id]
    }

    fn positions_of(&self, class: TokenClass) -> Vec<usize> {
        self.sentence()
            .tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| self.classify(t) == class)
            .map(|(j, _)| j)
            .collect()
    }

    fn create(&mut self, graph: &mut WordGraph, position: usize, label: &str) {
        let word = &self.sentence().tokens[position].word;
        let id = graph.add_node(label, word, (self.sentence_id, position));
        self.mapping[position] = Some(id);
    }

    fn assign(&mut self, graph: &mut WordGraph, position: usize, id: NodeId) {
        graph.attach(id, (self.sentence_id, position));
        self.mapping[position] = Some(id);
    }

    /// Pass 1: content words with no candidate or a single candidate
    pub fn map_unambiguous(&mut self, graph: &mut WordGraph) {
        for j in self.positions_of(TokenClass::Content) {
            let label = self.sentence().tokens[j].label();
            let (count, first) = {
                let candidates = graph.candidates(&label);
                (candidates.len(), candidates.first().copied())
            };
            match (count, first) {
                (0, _) => self.create(graph, j, &label),
                (1, Some(only)) => {
                    let taken = graph
                        .node(only)
                        .map_or(true, |n| n.contains_sentence(self.sentence_id));
                    if taken {
                        self.create(graph, j, &label);
                    } else {
                        self.assign(graph, j, only);
                    }
                }
                _ => {}
            }
        }
    }

    /// Pass 2: content words left unmapped by pass 1
    ///
    /// Candidates are ranked by context overlap, then by frequency; the first
    /// one not already holding this sentence wins.
    pub fn map_ambiguous(&mut self, graph: &mut WordGraph) {
        for j in self.positions_of(TokenClass::Content) {
            if self.mapping[j].is_some() {
                continue;
            }
            let label = self.sentence().tokens[j].label();

            let mut ranked: Vec<(usize, usize, NodeId)> = graph
                .candidates(&label)
                .iter()
                .map(|&id| {
                    let overlap = self.context_overlap(graph, id, j, false);
                    let frequency = graph.node(id).map_or(0, |n| n.frequency());
                    (overlap, frequency, id)
                })
                .collect();
            ranked.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));

            let chosen = ranked
                .iter()
                .map(|&(_, _, id)| id)
                .find(|&id| {
                    graph
                        .node(id)
                        .is_some_and(|n| !n.contains_sentence(self.sentence_id))
                });

            match chosen {
                Some(id) => self.assign(graph, j, id),
                None => self.create(graph, j, &label),
            }
        }
    }

    /// Pass 3: stopwords
    pub fn map_stopwords(&mut self, graph: &mut WordGraph) {
        for j in self.positions_of(TokenClass::Stopword) {
            self.map_by_context(graph, j, true, 0);
        }
    }

    /// Pass 4: punctuation
    pub fn map_punctuation(&mut self, graph: &mut WordGraph) {
        for j in self.positions_of(TokenClass::Punctuation) {
            self.map_by_context(graph, j, false, 1);
        }
    }

    /// Attach position `j` to the candidate with the largest context overlap
    /// if that overlap exceeds `threshold`, otherwise create a new node.
    fn map_by_context(&mut self, graph: &mut WordGraph, j: usize, skip_stopwords: bool, threshold: usize) {
        let label = self.sentence().tokens[j].label();

        let mut best: Option<(usize, NodeId)> = None;
        for &id in graph.candidates(&label) {
            let overlap = self.context_overlap(graph, id, j, skip_stopwords);
            if best.map_or(true, |(top, _)| overlap > top) {
                best = Some((overlap, id));
            }
        }

        match best {
            Some((overlap, id))
                if overlap > threshold
                    && graph
                        .node(id)
                        .is_some_and(|n| !n.contains_sentence(self.sentence_id)) =>
            {
                self.assign(graph, j, id)
            }
            _ => self.create(graph, j, &label),
        }
    }

    /// Count how often the neighbours of `candidate`'s occurrences match the
    /// neighbours of position `j` in the current sentence.
    ///
    /// Left neighbours are compared with the previous token, right neighbours
    /// with the next one. With `skip_stopwords`, stopword neighbours of the
    /// candidate are ignored.
    fn context_overlap(&self, graph: &WordGraph, candidate: NodeId, j: usize, skip_stopwords: bool) -> usize {
        let tokens = &self.sentence().tokens;
        let prev = j.checked_sub(1).and_then(|p| tokens.get(p));
        let next = tokens.get(j + 1);

        let Some(node) = graph.node(candidate) else {
            return 0;
        };

        let counts = |neighbour: Option<&Token>, target: Option<&Token>| -> usize {
            match (neighbour, target) {
                (Some(n), Some(t)) => {
                    let ignored = skip_stopwords && self.stopwords.is_stopword(&n.word);
                    usize::from(!ignored && n.word == t.word && n.pos == t.pos)
                }
                _ => 0,
            }
        };

        node.occurrences
            .iter()
            .map(|&(sid, off)| {
                let context = &self.sentences[sid].tokens;
                let left = off.checked_sub(1).and_then(|p| context.get(p));
                let right = context.get(off + 1);
                counts(left, prev) + counts(right, next)
            })
            .sum()
    }
}
