//! Core types shared across the compression pipeline
//!
//! Tokens and sentences produced by the normalizer, the compression
//! configuration, and the scored candidates returned to callers.

use serde::{Deserialize, Serialize};

/// Word form and tag of the synthetic token opening every sentence.
pub const START_TOKEN: &str = "-start-";

/// Word form and tag of the synthetic token closing every sentence.
pub const END_TOKEN: &str = "-end-";

/// Separator placed between a word and its POS tag in graph labels.
pub const LABEL_SEPARATOR: &str = "/-/";

/// Build the `word/-/POS` label used to key nodes and term statistics.
pub fn make_label(word: &str, pos: &str) -> String {
    let mut label = String::with_capacity(word.len() + LABEL_SEPARATOR.len() + pos.len());
    label.push_str(word);
    label.push_str(LABEL_SEPARATOR);
    label.push_str(pos);
    label
}

/// A tagged, weighted token
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Lowercased surface form
    pub word: String,
    /// Part-of-speech tag as provided by the tagger
    pub pos: String,
    /// Token weight (1.0 for sentinels)
    pub weight: f64,
}

impl Token {
    /// Create a new token
    pub fn new(word: impl Into<String>, pos: impl Into<String>, weight: f64) -> Self {
        Self {
            word: word.into(),
            pos: pos.into(),
            weight,
        }
    }

    /// The START sentinel
    pub fn start() -> Self {
        Self::new(START_TOKEN, START_TOKEN, 1.0)
    }

    /// The END sentinel
    pub fn end() -> Self {
        Self::new(END_TOKEN, END_TOKEN, 1.0)
    }

    /// Check whether this is one of the two sentinel tokens
    pub fn is_sentinel(&self) -> bool {
        (self.word == START_TOKEN && self.pos == START_TOKEN)
            || (self.word == END_TOKEN && self.pos == END_TOKEN)
    }

    /// The `word/-/POS` label of this token
    pub fn label(&self) -> String {
        make_label(&self.word, &self.pos)
    }

    /// Check whether the token is a single non-word character
    ///
    /// A word character is alphanumeric or `_`.
    pub fn is_punctuation(&self) -> bool {
        let mut chars = self.word.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => !(c.is_alphanumeric() || c == '_'),
            _ => false,
        }
    }
}

/// A normalized sentence bounded by START and END sentinels
#[derive(Debug, Clone, PartialEq)]
pub struct Sentence {
    /// Index of the sentence within its cluster
    pub index: usize,
    /// Tokens, sentinels included
    pub tokens: Vec<Token>,
}

impl Sentence {
    /// Number of tokens, sentinels included
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// A sentence always holds at least its two sentinels
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of real (non-sentinel) tokens
    pub fn word_count(&self) -> usize {
        self.tokens.len().saturating_sub(2)
    }
}

/// What the search does with an expansion that finds the queue full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Drop the incoming path; queued paths are never displaced
    #[default]
    DropIncoming,
    /// Replace the lowest-scored queued path if the incoming one scores higher
    EvictLowest,
}

/// Configuration for graph construction and path search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Trade-off between structural path weight and fluency
    pub lambda: f64,
    /// Branching cap per expansion
    pub max_neighbors: usize,
    /// Hard cap on in-flight partial paths
    pub queue_size: usize,
    /// Number of top candidates to return
    pub result_count: usize,
    /// Minimum number of nodes (sentinels included) of a completed path
    pub min_path_length: usize,
    /// Separator between word, POS and weight in tagged input
    pub pos_separator: String,
    /// Sentences with fewer tokens are dropped before compression
    pub min_sentence_tokens: usize,
    /// Behaviour when the search queue is full
    pub overflow_policy: OverflowPolicy,
    /// Optional cap on the number of expanded paths
    pub max_expansions: Option<usize>,
    /// Decimal digits kept when formatting scores
    pub score_precision: usize,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            lambda: 1.0,
            max_neighbors: 5,
            queue_size: 1000,
            result_count: 50,
            min_path_length: 8,
            pos_separator: "/".to_string(),
            min_sentence_tokens: 0,
            overflow_policy: OverflowPolicy::DropIncoming,
            max_expansions: None,
            score_precision: 6,
        }
    }
}

impl CompressionConfig {
    /// Set lambda
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    /// Set the per-expansion branching cap
    pub fn with_max_neighbors(mut self, max_neighbors: usize) -> Self {
        self.max_neighbors = max_neighbors;
        self
    }

    /// Set the queue capacity
    pub fn with_queue_size(mut self, queue_size: usize) -> Self {
        self.queue_size = queue_size;
        self
    }

    /// Set the number of returned candidates
    pub fn with_result_count(mut self, result_count: usize) -> Self {
        self.result_count = result_count;
        self
    }

    /// Set the minimum completed path length
    pub fn with_min_path_length(mut self, min_path_length: usize) -> Self {
        self.min_path_length = min_path_length;
        self
    }

    /// Set the overflow policy
    pub fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    /// Set the expansion budget
    pub fn with_max_expansions(mut self, max_expansions: Option<usize>) -> Self {
        self.max_expansions = max_expansions;
        self
    }
}

/// A scored compression
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    /// Combined structural and fluency score (higher is better)
    pub score: f64,
    /// Plain-text compression
    pub text: String,
    /// Number of nodes in the path, sentinels included
    pub path_length: usize,
}

impl Candidate {
    /// Render as `score#text` with `precision` decimals
    pub fn format(&self, precision: usize) -> String {
        format!("{:.*}#{}", precision, self.score, self.text)
    }
}
