//! Trigram language model used to rank compressions by fluency

pub mod model;
pub mod scorer;

pub use model::{LanguageModel, NgramEntry};
pub use scorer::FluencyScorer;
