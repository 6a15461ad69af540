//! Word graph construction and representation
//!
//! [`builder`] merges a sentence cluster into a mutable, acyclic
//! [`word_graph::WordGraph`]; [`csr`] freezes the weighted result for search.

pub mod builder;
pub mod csr;
pub mod dot;
pub mod mapping;
pub mod weighting;
pub mod word_graph;
