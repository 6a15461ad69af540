//! rapid-msc CLI - multi-sentence compression for clustered, tagged text
//!
//! Reads a cluster file, compresses every cluster in parallel and writes the
//! ranked `score#sentence` lines under each cluster header:
//!
//! 1. Configuration: JSON run file (optional) overridden by flags, then validated
//! 2. Resources: n-gram model and stopwords
//! 3. Compression: one word graph and guided search per cluster
//! 4. Output: results to stdout or a file, optional DOT graphs per cluster

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rapid_msc::pipeline::validation::ValidationEngine;
use rapid_msc::{
    read_clusters, write_cluster_results, write_dot, CompressionConfig, CompressionSpec,
    Compressor, LanguageModel, StopwordFilter,
};

/// Multi-sentence compression over word graphs
///
/// Merges each cluster of `word/POS/weight` sentences into a word graph and
/// searches it for short, fluent compressions ranked by path weight and a
/// trigram language model.
///
/// Examples:
///   rapid-msc --model news.lm clusters.txt
///   rapid-msc --model news.lm --language fr --results 10 -o out.txt clusters.txt
///   rapid-msc --config msc.json --dot-dir graphs/ clusters.txt
#[derive(Parser, Debug)]
#[command(name = "rapid-msc")]
#[command(version)]
#[command(about, long_about = None)]
pub struct Cli {
    /// Cluster file: `classes_*` header lines followed by tagged sentences
    #[arg(value_name = "CLUSTERS")]
    pub input: PathBuf,

    /// Tab-separated n-gram model (log10 probability, n-gram, backoff)
    #[arg(short, long, value_name = "FILE")]
    pub model: Option<PathBuf>,

    /// Stopword list, one word per line
    #[arg(long, value_name = "FILE", conflicts_with = "language")]
    pub stopwords: Option<PathBuf>,

    /// Built-in stopword list by language code (en, de, fr, es, ...)
    #[arg(long, value_name = "CODE")]
    pub language: Option<String>,

    /// JSON run file; flags override its values
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Weight of fluency against path weight
    #[arg(long)]
    pub lambda: Option<f64>,

    /// Successors kept per expansion
    #[arg(long)]
    pub max_neighbors: Option<usize>,

    /// Maximum number of partial paths in flight
    #[arg(long)]
    pub queue_size: Option<usize>,

    /// Candidates written per cluster
    #[arg(short = 'n', long)]
    pub results: Option<usize>,

    /// Write one Graphviz file per cluster into this directory
    #[arg(long, value_name = "DIR")]
    pub dot_dir: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    pub verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let spec = load_spec(&cli)?;
    let report = ValidationEngine::with_defaults().validate(&spec);
    for warning in report.warnings() {
        tracing::warn!("{warning}");
    }
    report.into_result().context("invalid configuration")?;
    let config = spec.apply(CompressionConfig::default());

    let model_path = spec
        .resources
        .model_path
        .as_ref()
        .context("no language model given; pass --model or set resources.model_path")?;
    let model = LanguageModel::from_file(model_path)
        .with_context(|| format!("loading language model {}", model_path.display()))?;

    let stopwords = match &spec.resources.stopwords_path {
        Some(path) => StopwordFilter::from_file(path)
            .with_context(|| format!("loading stopwords {}", path.display()))?,
        None => StopwordFilter::new(spec.resources.language.as_deref().unwrap_or("en")),
    };
    tracing::info!(stopwords = stopwords.len(), "stopwords ready");

    let clusters = read_clusters(&cli.input)
        .with_context(|| format!("reading clusters {}", cli.input.display()))?;
    tracing::info!(clusters = clusters.len(), input = %cli.input.display(), "compressing");

    let start = Instant::now();
    let precision = config.score_precision;
    let compressor = Compressor::new(stopwords, &model, config).keep_graph(cli.dot_dir.is_some());
    let outcomes = compressor.compress_clusters(&clusters);

    if let Some(dir) = &cli.dot_dir {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let mut out = open_output(cli.output.as_deref())?;
    let mut failures = 0usize;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(result) => {
                write_cluster_results(&mut out, &outcome.name, &result.candidates, precision)?;
                if result.truncated {
                    tracing::info!(cluster = %outcome.name, "search queue truncated expansions");
                }
                if let (Some(dir), Some(graph)) = (&cli.dot_dir, &result.graph) {
                    let path = dir.join(format!("{}.dot", file_stem(&outcome.name)));
                    let mut file = BufWriter::new(
                        File::create(&path).with_context(|| format!("creating {}", path.display()))?,
                    );
                    write_dot(graph, &mut file)?;
                    file.flush()?;
                }
            }
            Err(err) => {
                failures += 1;
                tracing::error!(cluster = %outcome.name, error = %err, "compression failed");
                write_cluster_results(&mut out, &outcome.name, &[], precision)?;
            }
        }
    }
    out.flush()?;

    tracing::info!(
        clusters = outcomes.len(),
        failures,
        elapsed = ?start.elapsed(),
        "done"
    );

    if failures > 0 {
        bail!("{} of {} clusters failed", failures, outcomes.len());
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// The JSON run file (or defaults) with command-line flags folded in
fn load_spec(cli: &Cli) -> Result<CompressionSpec> {
    let mut spec = match &cli.config {
        Some(path) => CompressionSpec::from_file(path)
            .with_context(|| format!("reading configuration {}", path.display()))?,
        None => CompressionSpec::default(),
    };

    let search = &mut spec.search;
    search.lambda = cli.lambda.or(search.lambda);
    search.max_neighbors = cli.max_neighbors.or(search.max_neighbors);
    search.queue_size = cli.queue_size.or(search.queue_size);
    search.result_count = cli.results.or(search.result_count);

    let resources = &mut spec.resources;
    if cli.model.is_some() {
        resources.model_path = cli.model.clone();
    }
    if cli.stopwords.is_some() {
        resources.stopwords_path = cli.stopwords.clone();
        resources.language = None;
    }
    if cli.language.is_some() {
        resources.language = cli.language.clone();
        resources.stopwords_path = None;
    }

    Ok(spec)
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

/// Cluster names become file names; keep them to a safe alphabet
fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect()
}
