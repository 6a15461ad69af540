//! Compression run file.
//!
//! A [`CompressionSpec`] is the JSON configuration file accepted by the
//! command-line tool. It overrides selected [`CompressionConfig`] fields,
//! names the resources to load, and sets strictness. Specs are checked by
//! [`super::validation::ValidationEngine`] before use.
//!
//! # JSON shape
//!
//! ```json
//! {
//!   "v": 1,
//!   "search": { "lambda": 0.8, "max_neighbors": 4, "queue_size": 500 },
//!   "resources": { "model_path": "lm/news.txt", "language": "en" },
//!   "strict": false
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{CompressionError, Result};
use crate::types::{CompressionConfig, OverflowPolicy};

/// Top-level compression run file (v1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionSpec {
    /// Spec version (currently `1`).
    pub v: u32,

    /// Search parameter overrides. Omitted fields keep their defaults.
    #[serde(default)]
    pub search: SearchSpec,

    /// Resources to load.
    #[serde(default)]
    pub resources: ResourceSpec,

    /// If `true`, unrecognized fields are errors; if `false`, warnings.
    #[serde(default)]
    pub strict: bool,

    /// Captures any fields not recognized by the schema.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

/// Partial [`CompressionConfig`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchSpec {
    #[serde(default)]
    pub lambda: Option<f64>,

    #[serde(default)]
    pub max_neighbors: Option<usize>,

    #[serde(default)]
    pub queue_size: Option<usize>,

    #[serde(default)]
    pub result_count: Option<usize>,

    #[serde(default)]
    pub min_path_length: Option<usize>,

    #[serde(default)]
    pub pos_separator: Option<String>,

    #[serde(default)]
    pub min_sentence_tokens: Option<usize>,

    #[serde(default)]
    pub overflow_policy: Option<OverflowPolicy>,

    #[serde(default)]
    pub max_expansions: Option<usize>,

    #[serde(default)]
    pub score_precision: Option<usize>,

    /// Captures any fields not recognized by the schema.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

/// Language model and stopword locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceSpec {
    /// Tab-separated n-gram model file.
    #[serde(default)]
    pub model_path: Option<PathBuf>,

    /// Stopword list file; takes precedence over `language`.
    #[serde(default)]
    pub stopwords_path: Option<PathBuf>,

    /// Language code of a built-in stopword list (e.g. `"en"`).
    #[serde(default)]
    pub language: Option<String>,

    /// Captures any fields not recognized by the schema.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

impl Default for CompressionSpec {
    fn default() -> Self {
        Self {
            v: 1,
            search: SearchSpec::default(),
            resources: ResourceSpec::default(),
            strict: false,
            unknown_fields: HashMap::new(),
        }
    }
}

impl CompressionSpec {
    /// Read a spec from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| CompressionError::resource(path, e))?;
        Self::from_json(&text, &path.display().to_string())
    }

    /// Parse a spec from JSON text; `origin` names it in errors.
    pub fn from_json(text: &str, origin: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| CompressionError::parse(origin, Some(e.line()), e.to_string()))
    }

    /// Apply the search overrides on top of `base`.
    pub fn apply(&self, base: CompressionConfig) -> CompressionConfig {
        let s = &self.search;
        CompressionConfig {
            lambda: s.lambda.unwrap_or(base.lambda),
            max_neighbors: s.max_neighbors.unwrap_or(base.max_neighbors),
            queue_size: s.queue_size.unwrap_or(base.queue_size),
            result_count: s.result_count.unwrap_or(base.result_count),
            min_path_length: s.min_path_length.unwrap_or(base.min_path_length),
            pos_separator: s.pos_separator.clone().unwrap_or(base.pos_separator),
            min_sentence_tokens: s.min_sentence_tokens.unwrap_or(base.min_sentence_tokens),
            overflow_policy: s.overflow_policy.unwrap_or(base.overflow_policy),
            max_expansions: s.max_expansions.or(base.max_expansions),
            score_precision: s.score_precision.unwrap_or(base.score_precision),
        }
    }
}
