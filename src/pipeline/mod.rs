//! Compression pipeline: run file, validation, observation and the
//! stage runner.

pub mod observer;
pub mod runner;
pub mod spec;
pub mod validation;
