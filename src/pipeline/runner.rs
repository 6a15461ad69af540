//! Compression runner: orchestrates stage execution for one or many clusters.
//!
//! A [`Compressor`] owns the stopword set and configuration and borrows a
//! [`FluencyScorer`]. [`Compressor::compress`] runs the stages in order:
//!
//! 1. Normalize tagged sentences
//! 2. Aggregate term statistics
//! 3. Merge sentences into the word graph
//! 4. Weight edges and freeze the graph
//! 5. Search for START-to-END paths
//! 6. Rank completed paths
//!
//! Clusters share nothing but the read-only scorer and stopwords, so
//! [`Compressor::compress_clusters`] runs them in parallel with rayon.

use rayon::prelude::*;

use crate::cluster::Cluster;
use crate::errors::Result;
use crate::graph::builder::WordGraphBuilder;
use crate::graph::csr::CsrGraph;
use crate::graph::weighting::assign_weights;
use crate::lm::FluencyScorer;
use crate::nlp::normalizer::SentenceNormalizer;
use crate::nlp::statistics::TermStatistics;
use crate::nlp::stopwords::StopwordFilter;
use crate::pipeline::observer::{
    CompressionObserver, NoopObserver, StageClock, StageReport, STAGE_GRAPH, STAGE_NORMALIZE,
    STAGE_RANK, STAGE_SEARCH, STAGE_STATISTICS, STAGE_WEIGHTING,
};
use crate::search::{rank_paths, PathSearch};
use crate::types::{Candidate, CompressionConfig};

/// Enter a tracing span for a compression stage; it closes at the end of
/// the enclosing block.
macro_rules! trace_stage {
    ($name:expr) => {
        let _span = tracing::info_span!("compress_stage", stage = $name).entered();
    };
}

/// Result of compressing one sentence cluster
#[derive(Debug, Clone, Default)]
pub struct CompressionOutcome {
    /// Best candidates, highest score first
    pub candidates: Vec<Candidate>,
    /// Word graph size, sentinels included
    pub node_count: usize,
    pub edge_count: usize,
    /// Paths that reached END with the minimum length
    pub completed_paths: usize,
    /// Expansions were dropped (full queue) or the budget ran out
    pub truncated: bool,
    /// Frozen word graph, kept when requested with [`Compressor::keep_graph`]
    pub graph: Option<CsrGraph>,
}

/// Outcome of one cluster in a batch
#[derive(Debug)]
pub struct ClusterOutcome {
    pub name: String,
    /// Sentences removed by the minimum token filter
    pub dropped: usize,
    pub result: Result<CompressionOutcome>,
}

/// Multi-sentence compressor
pub struct Compressor<'a, S: FluencyScorer + ?Sized> {
    stopwords: StopwordFilter,
    scorer: &'a S,
    config: CompressionConfig,
    keep_graph: bool,
}

impl<'a, S: FluencyScorer + ?Sized> Compressor<'a, S> {
    pub fn new(stopwords: StopwordFilter, scorer: &'a S, config: CompressionConfig) -> Self {
        Self {
            stopwords,
            scorer,
            config,
            keep_graph: false,
        }
    }

    /// Keep the frozen graph in each [`CompressionOutcome`] (for DOT export)
    pub fn keep_graph(mut self, keep: bool) -> Self {
        self.keep_graph = keep;
        self
    }

    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    pub fn stopwords(&self) -> &StopwordFilter {
        &self.stopwords
    }

    /// Compress one cluster of raw `word/POS/weight` sentences
    pub fn compress<T: AsRef<str>>(&self, raw: &[T]) -> Result<CompressionOutcome> {
        self.compress_observed(raw, &mut NoopObserver)
    }

    /// [`Self::compress`] with stage notifications sent to `observer`
    pub fn compress_observed<T: AsRef<str>>(
        &self,
        raw: &[T],
        observer: &mut impl CompressionObserver,
    ) -> Result<CompressionOutcome> {
        let config = &self.config;

        let sentences = {
            trace_stage!(STAGE_NORMALIZE);
            observer.on_stage_start(STAGE_NORMALIZE);
            let clock = StageClock::start();
            let sentences = SentenceNormalizer::new(config.pos_separator.as_str()).normalize_all(raw)?;
            observer.on_stage_end(
                STAGE_NORMALIZE,
                &StageReport::new(clock.elapsed()).with_items(sentences.len()),
            );
            sentences
        };

        let stats = {
            trace_stage!(STAGE_STATISTICS);
            observer.on_stage_start(STAGE_STATISTICS);
            let clock = StageClock::start();
            let stats = TermStatistics::from_sentences(&sentences);
            observer.on_stage_end(
                STAGE_STATISTICS,
                &StageReport::new(clock.elapsed()).with_items(stats.len()),
            );
            stats
        };

        let mut graph = {
            trace_stage!(STAGE_GRAPH);
            observer.on_stage_start(STAGE_GRAPH);
            let clock = StageClock::start();
            let graph = WordGraphBuilder::new(&self.stopwords).merge(&sentences);
            observer.on_stage_end(
                STAGE_GRAPH,
                &StageReport::new(clock.elapsed()).with_graph(graph.node_count(), graph.edge_count()),
            );
            graph
        };

        let csr = {
            trace_stage!(STAGE_WEIGHTING);
            observer.on_stage_start(STAGE_WEIGHTING);
            let clock = StageClock::start();
            assign_weights(&mut graph, &stats);
            let csr = CsrGraph::from_word_graph(&graph);
            observer.on_stage_end(
                STAGE_WEIGHTING,
                &StageReport::new(clock.elapsed()).with_graph(csr.num_nodes, csr.num_edges()),
            );
            csr
        };
        drop(graph);

        let search = {
            trace_stage!(STAGE_SEARCH);
            observer.on_stage_start(STAGE_SEARCH);
            let clock = StageClock::start();
            let search = PathSearch::new(&csr, self.scorer, config).run();
            observer.on_stage_end(
                STAGE_SEARCH,
                &StageReport::new(clock.elapsed()).with_items(search.paths.len()),
            );
            search
        };

        let candidates = {
            trace_stage!(STAGE_RANK);
            observer.on_stage_start(STAGE_RANK);
            let clock = StageClock::start();
            let candidates = rank_paths(&csr, &search.paths, self.scorer, config.lambda, config.result_count);
            observer.on_stage_end(
                STAGE_RANK,
                &StageReport::new(clock.elapsed()).with_items(candidates.len()),
            );
            candidates
        };

        tracing::debug!(
            sentences = sentences.len(),
            nodes = csr.num_nodes,
            edges = csr.num_edges(),
            paths = search.paths.len(),
            expansions = search.expansions,
            truncated = search.truncated,
            "cluster compressed"
        );

        Ok(CompressionOutcome {
            candidates,
            node_count: csr.num_nodes,
            edge_count: csr.num_edges(),
            completed_paths: search.paths.len(),
            truncated: search.truncated,
            graph: self.keep_graph.then_some(csr),
        })
    }

    /// Compress independent clusters in parallel, preserving input order
    ///
    /// Sentences shorter than `min_sentence_tokens` are dropped first. A
    /// malformed cluster fails on its own without affecting the others.
    pub fn compress_clusters(&self, clusters: &[Cluster]) -> Vec<ClusterOutcome> {
        clusters
            .par_iter()
            .map(|cluster| {
                let _span = tracing::info_span!("cluster", name = %cluster.name).entered();
                let mut cluster = cluster.clone();
                let dropped = cluster.retain_min_tokens(self.config.min_sentence_tokens);
                if dropped > 0 {
                    tracing::debug!(dropped, "short sentences removed");
                }
                let result = self.compress(&cluster.sentences);
                if let Err(err) = &result {
                    tracing::warn!(error = %err, "cluster failed");
                }
                ClusterOutcome {
                    name: cluster.name,
                    dropped,
                    result,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CompressionError;
    use crate::pipeline::observer::TimingObserver;

    /// Counts words, so longer phrases read as more fluent
    struct WordCountScorer;

    impl FluencyScorer for WordCountScorer {
        fn fluency(&self, sentence: &str) -> f64 {
            sentence.split_whitespace().count() as f64
        }
    }

    const CLUSTER: &[&str] = &[
        "the/DT/1.2 cat/NN/2.0 sat/VBD/1.5 on/IN/1.0 the/DT/1.2 mat/NN/1.8 today/NN/1.1 ./PUNCT/1.0",
        "the/DT/1.2 cat/NN/2.0 slept/VBD/1.4 on/IN/1.0 the/DT/1.2 mat/NN/1.8 ./PUNCT/1.0",
        "a/DT/1.1 black/JJ/1.3 cat/NN/2.0 sat/VBD/1.5 on/IN/1.0 the/DT/1.2 mat/NN/1.8 ./PUNCT/1.0",
    ];

    fn compressor(scorer: &WordCountScorer) -> Compressor<'_, WordCountScorer> {
        Compressor::new(
            StopwordFilter::from_list(&["the", "a", "on"]),
            scorer,
            CompressionConfig::default().with_min_path_length(6),
        )
    }

    #[test]
    fn test_compress_produces_ranked_candidates() {
        let scorer = WordCountScorer;
        let outcome = compressor(&scorer).compress(CLUSTER).unwrap();

        assert!(!outcome.candidates.is_empty());
        assert!(outcome.completed_paths >= outcome.candidates.len());
        assert!(outcome.node_count > 2);
        assert!(outcome.graph.is_none());
        for pair in outcome.candidates.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        for candidate in &outcome.candidates {
            assert!(candidate.path_length >= 6);
            assert!(!candidate.text.contains("-start-"));
            assert!(!candidate.text.contains("-end-"));
        }
    }

    #[test]
    fn test_short_cluster_is_empty_not_error() {
        let scorer = WordCountScorer;
        let outcome = Compressor::new(StopwordFilter::empty(), &scorer, CompressionConfig::default())
            .compress(&["a/DT/1 b/NN/1 c/VB/1"])
            .unwrap();

        assert!(outcome.candidates.is_empty());
        assert_eq!(outcome.completed_paths, 0);
        assert_eq!(outcome.node_count, 5);
    }

    #[test]
    fn test_malformed_sentence_is_parse_error() {
        let scorer = WordCountScorer;
        let err = compressor(&scorer).compress(&["cat/NN"]).unwrap_err();
        assert!(matches!(err, CompressionError::Parse { .. }));
    }

    #[test]
    fn test_result_count_limits_output() {
        let scorer = WordCountScorer;
        let compressor = Compressor::new(
            StopwordFilter::from_list(&["the", "a", "on"]),
            &scorer,
            CompressionConfig::default()
                .with_min_path_length(6)
                .with_result_count(1),
        );

        let outcome = compressor.compress(CLUSTER).unwrap();
        assert_eq!(outcome.candidates.len(), 1);
    }

    #[test]
    fn test_observer_sees_every_stage() {
        let scorer = WordCountScorer;
        let mut observer = TimingObserver::new();
        compressor(&scorer)
            .keep_graph(true)
            .compress_observed(CLUSTER, &mut observer)
            .unwrap();

        let stages: Vec<_> = observer.stages.iter().map(|(s, _)| *s).collect();
        assert_eq!(
            stages,
            vec![
                STAGE_NORMALIZE,
                STAGE_STATISTICS,
                STAGE_GRAPH,
                STAGE_WEIGHTING,
                STAGE_SEARCH,
                STAGE_RANK
            ]
        );
        assert_eq!(observer.report(STAGE_NORMALIZE).unwrap().items, Some(3));
    }

    #[test]
    fn test_keep_graph() {
        let scorer = WordCountScorer;
        let outcome = compressor(&scorer).keep_graph(true).compress(CLUSTER).unwrap();

        let graph = outcome.graph.unwrap();
        assert_eq!(graph.num_nodes, outcome.node_count);
        assert_eq!(graph.num_edges(), outcome.edge_count);
    }

    #[test]
    fn test_compress_clusters_isolates_failures() {
        let scorer = WordCountScorer;
        let clusters = vec![
            Cluster {
                name: "classes_0".to_string(),
                sentences: CLUSTER.iter().map(|s| s.to_string()).collect(),
            },
            Cluster {
                name: "classes_1".to_string(),
                sentences: vec!["broken".to_string()],
            },
        ];

        let outcomes = compressor(&scorer).compress_clusters(&clusters);
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].name, "classes_0");
        assert!(outcomes[0].result.as_ref().unwrap().candidates.len() > 0);
        assert!(outcomes[1].result.is_err());
    }

    #[test]
    fn test_compress_clusters_applies_token_filter() {
        let scorer = WordCountScorer;
        let mut config = CompressionConfig::default().with_min_path_length(6);
        config.min_sentence_tokens = 8;
        let compressor = Compressor::new(StopwordFilter::empty(), &scorer, config);

        let clusters = vec![Cluster {
            name: "classes_0".to_string(),
            sentences: CLUSTER.iter().map(|s| s.to_string()).collect(),
        }];
        let outcomes = compressor.compress_clusters(&clusters);
        assert_eq!(outcomes[0].dropped, 1);
    }
}
