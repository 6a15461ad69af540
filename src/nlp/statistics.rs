//! Term statistics
//!
//! Per `word/-/POS` label: the number of distinct sentences containing it and
//! the summed weight of all its occurrences. Sentinel tokens are not part of
//! the statistics proper; their aggregate weight is tracked separately so
//! that edges leaving START or entering END can still be weighted.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::types::Sentence;

/// Aggregate statistics for one label
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TermEntry {
    /// Number of distinct sentences containing the label
    pub count: usize,
    /// Sum of token weights over every occurrence
    pub weight: f64,
}

/// Term statistics for a sentence cluster
#[derive(Debug, Clone, Default)]
pub struct TermStatistics {
    entries: FxHashMap<String, TermEntry>,
    sentinels: FxHashMap<String, TermEntry>,
}

impl TermStatistics {
    /// Aggregate statistics over a cluster
    pub fn from_sentences(sentences: &[Sentence]) -> Self {
        let mut stats = Self::default();
        let mut seen: FxHashSet<String> = FxHashSet::default();

        for sentence in sentences {
            seen.clear();
            for token in &sentence.tokens {
                let label = token.label();
                let table = if token.is_sentinel() {
                    &mut stats.sentinels
                } else {
                    &mut stats.entries
                };
                let entry = table.entry(label.clone()).or_default();
                entry.weight += token.weight;
                if seen.insert(label) {
                    entry.count += 1;
                }
            }
        }

        stats
    }

    /// Statistics of a non-sentinel label
    pub fn get(&self, label: &str) -> Option<&TermEntry> {
        self.entries.get(label)
    }

    /// Aggregate weight of a label, sentinels included
    ///
    /// Returns 0.0 for labels never seen.
    pub fn weight(&self, label: &str) -> f64 {
        self.entries
            .get(label)
            .or_else(|| self.sentinels.get(label))
            .map_or(0.0, |e| e.weight)
    }

    /// Number of distinct non-sentinel labels
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no non-sentinel labels
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over non-sentinel labels and their statistics
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TermEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
