//! Natural Language Processing components
//!
//! Sentence normalization, term statistics and stopword filtering.

pub mod normalizer;
pub mod statistics;
pub mod stopwords;
