//! Guided path search and final candidate ranking

pub mod bfs;
pub mod ranking;

pub use bfs::{PathSearch, SearchOutcome};
pub use ranking::{rank_paths, score_path};
