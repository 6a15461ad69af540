//! rapid-msc - multi-sentence compression over word graphs
//!
//! A cluster of redundant, POS-tagged sentences is merged into one directed
//! acyclic word graph; a fluency-guided, capacity-bounded breadth-first
//! search then reads short sentences off that graph and ranks them.
//!
//! # Architecture
//!
//! ```text
//! tagged sentences → Normalizer → Term Statistics → Word Graph → CSR → Path Search → Ranking
//!                                                                          ↑             ↑
//!                                                                   trigram fluency scorer
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use rapid_msc::{CompressionConfig, Compressor, LanguageModel, StopwordFilter};
//!
//! let model = LanguageModel::from_file("news.lm")?;
//! let compressor = Compressor::new(StopwordFilter::new("en"), &model, CompressionConfig::default());
//! let outcome = compressor.compress(&sentences)?;
//! for candidate in &outcome.candidates {
//!     println!("{}", candidate.format(6));
//! }
//! ```

pub mod cluster;
pub mod errors;
pub mod graph;
pub mod lm;
pub mod nlp;
pub mod pipeline;
pub mod search;
pub mod types;

pub use cluster::{parse_clusters, read_clusters, write_cluster_results, Cluster};
pub use errors::{CompressionError, Result};
pub use graph::builder::WordGraphBuilder;
pub use graph::csr::CsrGraph;
pub use graph::dot::write_dot;
pub use graph::word_graph::{NodeId, WordGraph};
pub use lm::{FluencyScorer, LanguageModel};
pub use nlp::normalizer::SentenceNormalizer;
pub use nlp::statistics::TermStatistics;
pub use nlp::stopwords::StopwordFilter;
pub use pipeline::runner::{ClusterOutcome, CompressionOutcome, Compressor};
pub use pipeline::spec::CompressionSpec;
pub use pipeline::validation::ValidationEngine;
pub use search::{rank_paths, PathSearch, SearchOutcome};
pub use types::{Candidate, CompressionConfig, OverflowPolicy, Sentence, Token};
