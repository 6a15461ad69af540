//! Compression observer: hooks for logging, profiling, and debugging.
//!
//! Observers receive notifications at stage boundaries without coupling to
//! stage logic. [`NoopObserver`] costs nothing; [`TimingObserver`] keeps a
//! [`StageReport`] per stage.

use std::time::{Duration, Instant};

pub const STAGE_NORMALIZE: &str = "normalize";
pub const STAGE_STATISTICS: &str = "statistics";
pub const STAGE_GRAPH: &str = "graph";
pub const STAGE_WEIGHTING: &str = "weighting";
pub const STAGE_SEARCH: &str = "search";
pub const STAGE_RANK: &str = "rank";

/// Wall-clock timer for one stage.
#[derive(Debug, Clone, Copy)]
pub struct StageClock(Instant);

impl StageClock {
    pub fn start() -> Self {
        Self(Instant::now())
    }

    pub fn elapsed(&self) -> Duration {
        self.0.elapsed()
    }
}

/// What a stage did and how long it took.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageReport {
    pub elapsed: Duration,
    /// Graph nodes after the stage, for graph stages
    pub nodes: Option<usize>,
    /// Graph edges after the stage, for graph stages
    pub edges: Option<usize>,
    /// Items produced (sentences, paths, candidates)
    pub items: Option<usize>,
}

impl StageReport {
    pub fn new(elapsed: Duration) -> Self {
        Self {
            elapsed,
            ..Self::default()
        }
    }

    pub fn with_graph(mut self, nodes: usize, edges: usize) -> Self {
        self.nodes = Some(nodes);
        self.edges = Some(edges);
        self
    }

    pub fn with_items(mut self, items: usize) -> Self {
        self.items = Some(items);
        self
    }
}

/// Receives stage boundary notifications.
pub trait CompressionObserver {
    fn on_stage_start(&mut self, _stage: &'static str) {}

    fn on_stage_end(&mut self, _stage: &'static str, _report: &StageReport) {}
}

/// Ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl CompressionObserver for NoopObserver {}

/// Records the report of every finished stage, in order.
#[derive(Debug, Clone, Default)]
pub struct TimingObserver {
    pub stages: Vec<(&'static str, StageReport)>,
}

impl TimingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report of `stage`, if it ran
    pub fn report(&self, stage: &str) -> Option<&StageReport> {
        self.stages.iter().find(|(s, _)| *s == stage).map(|(_, r)| r)
    }

    /// Sum of all stage durations
    pub fn total(&self) -> Duration {
        self.stages.iter().map(|(_, r)| r.elapsed).sum()
    }
}

impl CompressionObserver for TimingObserver {
    fn on_stage_end(&mut self, stage: &'static str, report: &StageReport) {
        self.stages.push((stage, report.clone()));
    }
}
