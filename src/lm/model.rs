//! Backoff n-gram model storage and loading
//!
//! The model file holds one n-gram per line:
//!
//! ```text
//! <log10 probability>\t<w1 [w2 [w3]]>\t[<log10 backoff>]
//! ```
//!
//! Lines with fewer than two tab-separated fields (ARPA headers, section
//! markers) are skipped with a warning. A later line for the same n-gram
//! replaces the earlier one.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rustc_hash::FxHashMap;

use crate::errors::{CompressionError, Result};

/// Probability and backoff weight of one n-gram (both log10)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NgramEntry {
    /// Log10 probability
    pub log_prob: f64,
    /// Log10 backoff weight (0.0 when absent)
    pub backoff: f64,
}

impl NgramEntry {
    /// Create an entry
    pub fn new(log_prob: f64, backoff: f64) -> Self {
        Self { log_prob, backoff }
    }
}

/// An immutable unigram/bigram/trigram table keyed by space-joined words
#[derive(Debug, Clone, Default)]
pub struct LanguageModel {
    ngrams: FxHashMap<String, NgramEntry>,
}

impl LanguageModel {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a model file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| CompressionError::resource(path, e))?;

        tracing::info!(path = %path.display(), "loading n-gram model");
        let model = Self::from_reader(BufReader::new(file), &path.display().to_string())?;
        tracing::info!(path = %path.display(), ngrams = model.len(), "n-gram model loaded");

        Ok(model)
    }

    /// Parse a model from any buffered reader
    ///
    /// `origin` names the source in error messages and warnings.
    pub fn from_reader<R: BufRead>(reader: R, origin: &str) -> Result<Self> {
        let mut model = Self::new();

        for (number, line) in reader.lines().enumerate() {
            let line_no = number + 1;
            let line = line.map_err(|e| CompressionError::parse(origin, Some(line_no), e.to_string()))?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 2 {
                tracing::warn!(origin, line = line_no, content = line, "fewer than 2 fields, ignoring line");
                continue;
            }

            let log_prob = parse_number(fields[0], origin, line_no, "probability")?;
            let backoff = match fields.get(2).map(|f| f.trim()) {
                Some(text) if !text.is_empty() => parse_number(text, origin, line_no, "backoff")?,
                _ => 0.0,
            };

            let ngram = fields[1].split_whitespace().collect::<Vec<_>>().join(" ");
            model.insert(ngram, NgramEntry::new(log_prob, backoff));
        }

        Ok(model)
    }

    /// Insert or replace an n-gram
    pub fn insert(&mut self, ngram: impl Into<String>, entry: NgramEntry) {
        self.ngrams.insert(ngram.into(), entry);
    }

    /// Look up an n-gram by its space-joined key
    pub fn get(&self, ngram: &str) -> Option<&NgramEntry> {
        self.ngrams.get(ngram)
    }

    /// Check whether an n-gram (or single word) is in the model
    pub fn contains(&self, ngram: &str) -> bool {
        self.ngrams.contains_key(ngram)
    }

    /// Number of stored n-grams
    pub fn len(&self) -> usize {
        self.ngrams.len()
    }

    /// Check if the model is empty
    pub fn is_empty(&self) -> bool {
        self.ngrams.is_empty()
    }
}

fn parse_number(text: &str, origin: &str, line: usize, what: &str) -> Result<f64> {
    text.trim().parse::<f64>().map_err(|_| {
        CompressionError::parse(origin, Some(line), format!("{} {:?} is not a number", what, text))
    })
}
