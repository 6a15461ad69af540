//! Sentence cluster files
//!
//! A cluster file groups tagged sentences under header lines:
//!
//! ```text
//! classes_0
//! turkish/JJ/2.3 warplanes/NNS/1.9 shot/VBN/1.6 ...
//! turkey/NNP/2.5 shot/VBD/1.6 ...
//! classes_1
//! ...
//! ```
//!
//! Results are written back in the same layout, each header followed by
//! that cluster's `score#sentence` lines.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use crate::errors::{CompressionError, Result};
use crate::types::Candidate;

/// Lines starting with this prefix open a new cluster
pub const CLUSTER_PREFIX: &str = "classes_";

/// A named group of raw tagged sentences
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cluster {
    /// Header line, e.g. `classes_3`
    pub name: String,
    /// Raw `word/POS/weight` sentences
    pub sentences: Vec<String>,
}

impl Cluster {
    /// Create an empty cluster
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sentences: Vec::new(),
        }
    }

    /// Drop sentences with fewer than `min_tokens` tagged tokens
    ///
    /// Returns the number of sentences removed.
    pub fn retain_min_tokens(&mut self, min_tokens: usize) -> usize {
        let before = self.sentences.len();
        self.sentences
            .retain(|s| s.split_whitespace().count() >= min_tokens);
        before - self.sentences.len()
    }
}

/// Read a cluster file
pub fn read_clusters(path: impl AsRef<Path>) -> Result<Vec<Cluster>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| CompressionError::resource(path, e))?;
    parse_clusters(BufReader::new(file), &path.display().to_string())
}

/// Parse clusters from a reader
///
/// Blank lines are ignored. Sentences before the first header belong to no
/// cluster and are dropped with a warning.
pub fn parse_clusters<R: BufRead>(reader: R, origin: &str) -> Result<Vec<Cluster>> {
    let mut clusters: Vec<Cluster> = Vec::new();
    let mut orphans = 0usize;

    for (number, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| CompressionError::parse(origin, Some(number + 1), e.to_string()))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with(CLUSTER_PREFIX) {
            clusters.push(Cluster::new(line));
        } else if let Some(current) = clusters.last_mut() {
            current.sentences.push(line.to_string());
        } else {
            orphans += 1;
        }
    }

    if orphans > 0 {
        tracing::warn!(origin, orphans, "sentences before the first cluster header were ignored");
    }
    Ok(clusters)
}

/// Write one cluster's header followed by its ranked candidates
pub fn write_cluster_results<W: Write>(
    out: &mut W,
    name: &str,
    candidates: &[Candidate],
    precision: usize,
) -> io::Result<()> {
    writeln!(out, "{}", name)?;
    for candidate in candidates {
        writeln!(out, "{}", candidate.format(precision))?;
    }
    Ok(())
}
