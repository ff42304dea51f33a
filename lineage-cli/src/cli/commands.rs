//! Command implementations and argument parsing for the lineage CLI.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use lineage_core::{
    DEFAULT_INVALID_SENTINEL, DEFAULT_ITERATIONS, DEFAULT_PIPELINE_SEED, DEFAULT_SEED,
    GraphErrorCode, HiringGraph, LineageError, MonteCarloBuilder, MonteCarloResult, NodeStrength,
    PROFESSOR_COUNTS_FILE, PipelineBuilder, RandomStreams, RankingError, SignificanceErrorCode,
    SpringRank, TimeWindow, gini, node_strengths, spearman,
};
use lineage_providers_csv::{
    CsvProviderError, read_mapping_path, read_records_path, read_registry_path,
    write_professor_counts_path,
};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "lineage",
    about = "Build academic hiring networks and test them for hierarchy."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Resolve identities, canonicalize institutions and write hiring graphs.
    Build(BuildCommand),
    /// Test one hiring graph for hierarchy against randomized null graphs.
    Significance(SignificanceCommand),
    /// Report how unevenly faculty production and hiring are distributed.
    Inequality(InequalityCommand),
}

/// Options accepted by the `build` command.
#[derive(Debug, Args, Clone)]
pub struct BuildCommand {
    /// Raw faculty records (CSV).
    #[arg(long)]
    pub records: PathBuf,

    /// Curated institution mapping table (CSV).
    #[arg(long)]
    pub mapping: PathBuf,

    /// Canonical institution registry (CSV).
    #[arg(long)]
    pub registry: PathBuf,

    /// Directory receiving the graph artifacts and professor counts.
    #[arg(long = "out-dir")]
    pub out_dir: PathBuf,

    /// Windowed graph to build, as `start-end`. Repeatable; defaults to
    /// `2004-2024` and `2011-2020`.
    #[arg(long = "window")]
    pub windows: Vec<TimeWindow>,

    /// Seed for identifier generation.
    #[arg(long, default_value_t = DEFAULT_PIPELINE_SEED)]
    pub seed: u64,

    /// Mapping target marking institutions to drop.
    #[arg(long = "invalid-sentinel", default_value = DEFAULT_INVALID_SENTINEL)]
    pub invalid_sentinel: String,
}

/// Options accepted by the `significance` command.
#[derive(Debug, Args, Clone)]
pub struct SignificanceCommand {
    /// Graph artifact written by `build`.
    #[arg(long)]
    pub graph: PathBuf,

    /// Null graphs to draw.
    #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
    pub iterations: usize,

    /// Seed of the Monte Carlo random stream.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// How iterations draw randomness.
    #[arg(long, value_enum, default_value_t = StreamPolicy::Shared)]
    pub streams: StreamPolicy,

    /// SpringRank regularization strength.
    #[arg(long, default_value_t = 0.0)]
    pub alpha: f64,

    /// SpringRank regularizer resting score.
    #[arg(long, default_value_t = 1.0)]
    pub l0: f64,

    /// SpringRank spring rest length.
    #[arg(long, default_value_t = 1.0)]
    pub l1: f64,
}

/// Options accepted by the `inequality` command.
#[derive(Debug, Args, Clone)]
pub struct InequalityCommand {
    /// Graph artifact written by `build`.
    #[arg(long)]
    pub graph: PathBuf,
}

/// Command-line spelling of [`RandomStreams`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StreamPolicy {
    /// One sequential stream seeded once.
    Shared,
    /// A derived seed per iteration; iterations may run in parallel.
    Independent,
}

impl From<StreamPolicy> for RandomStreams {
    fn from(policy: StreamPolicy) -> Self {
        match policy {
            StreamPolicy::Shared => Self::Shared,
            StreamPolicy::Independent => Self::Independent,
        }
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Preparing the output directory failed.
    #[error("failed to create `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// Reading or writing a CSV table failed.
    #[error(transparent)]
    Provider(#[from] CsvProviderError),
    /// The ranking parameters were rejected.
    #[error(transparent)]
    Ranking(#[from] RankingError),
    /// A pipeline stage failed.
    #[error(transparent)]
    Core(#[from] LineageError),
}

impl CliError {
    /// The most specific stable error code, when the failure carries one.
    ///
    /// # Examples
    /// ```
    /// use lineage_cli::cli::CliError;
    /// use lineage_core::LineageError;
    ///
    /// let err = CliError::from(LineageError::EmptySentinel);
    /// assert_eq!(err.code(), Some("LINEAGE_EMPTY_SENTINEL"));
    /// ```
    #[must_use]
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::Provider(CsvProviderError::Schema(error)) | Self::Core(error) => {
                Some(lineage_code(error))
            }
            Self::Ranking(error) => Some(error.code().as_str()),
            Self::Io { .. } | Self::Provider(_) => None,
        }
    }
}

fn lineage_code(error: &LineageError) -> &'static str {
    error
        .graph_code()
        .map(GraphErrorCode::as_str)
        .or_else(|| error.significance_code().map(SignificanceErrorCode::as_str))
        .unwrap_or_else(|| error.code().as_str())
}

/// Outcome of one CLI command, rendered by [`super::render_summary`].
#[derive(Debug, Clone)]
pub enum CommandSummary {
    /// Result of `build`.
    Build(BuildSummary),
    /// Result of `significance`.
    Significance(SignificanceSummary),
    /// Result of `inequality`.
    Inequality(InequalitySummary),
}

/// Counters and files produced by `build`.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    /// Records read from the raw table.
    pub records: usize,
    /// Distinct professors after identity resolution.
    pub identities: usize,
    /// Canonical rows after mapping expansion.
    pub canonical_rows: usize,
    /// Expanded rows dropped for an invalid institution.
    pub dropped_invalid: usize,
    /// Canonical rows whose degree was granted abroad.
    pub international_rows: usize,
    /// Graph artifacts written, in write order.
    pub graphs: Vec<PathBuf>,
    /// Professor count table.
    pub counts: PathBuf,
}

/// Monte Carlo outcome for one graph.
#[derive(Debug, Clone)]
pub struct SignificanceSummary {
    /// Artifact that was tested.
    pub graph: PathBuf,
    /// Institutions in the graph.
    pub nodes: usize,
    /// Distinct edges in the graph.
    pub edges: usize,
    /// Observed statistic and null distribution.
    pub result: MonteCarloResult,
}

/// Placement inequality of one graph.
#[derive(Debug, Clone)]
pub struct InequalitySummary {
    /// Artifact that was summarised.
    pub graph: PathBuf,
    /// Per-institution placement totals in node order.
    pub strengths: Vec<NodeStrength>,
    /// Gini coefficient of faculty produced (weighted out-degree).
    pub produced_gini: Option<f64>,
    /// Gini coefficient of faculty hired (weighted in-degree).
    pub hired_gini: Option<f64>,
    /// Rank correlation between faculty produced and hired.
    pub produced_hired_spearman: Option<f64>,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when reading inputs, running a stage or writing
/// outputs fails.
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<CommandSummary, CliError> {
    let span = Span::current();
    match cli.command {
        Command::Build(command) => {
            span.record("command", "build");
            run_build(command).map(CommandSummary::Build)
        }
        Command::Significance(command) => {
            span.record("command", "significance");
            run_significance(command).map(CommandSummary::Significance)
        }
        Command::Inequality(command) => {
            span.record("command", "inequality");
            run_inequality(&command).map(CommandSummary::Inequality)
        }
    }
}

#[instrument(
    name = "cli.build",
    err,
    skip(command),
    fields(out_dir = %command.out_dir.display(), seed = command.seed),
)]
pub(super) fn run_build(command: BuildCommand) -> Result<BuildSummary, CliError> {
    let BuildCommand {
        records,
        mapping,
        registry,
        out_dir,
        windows,
        seed,
        invalid_sentinel,
    } = command;

    let mut builder = PipelineBuilder::new()
        .with_seed(seed)
        .with_sentinel(invalid_sentinel);
    if !windows.is_empty() {
        builder = builder.with_windows(windows);
    }
    let pipeline = builder.build()?;

    let raw = read_records_path(&records)?;
    let record_count = raw.len();
    let output = pipeline.run(
        raw,
        read_mapping_path(&mapping)?,
        read_registry_path(&registry)?,
    )?;

    create_out_dir(&out_dir)?;
    let graphs = output
        .graphs
        .write_graphs(&out_dir)
        .map_err(LineageError::from)?;
    let counts = out_dir.join(PROFESSOR_COUNTS_FILE);
    write_professor_counts_path(&counts, &output.graphs.professor_counts)?;

    info!(
        graphs = graphs.len(),
        counts_rows = output.graphs.professor_counts.len(),
        "build completed"
    );
    Ok(BuildSummary {
        records: record_count,
        identities: output.identity.identities,
        canonical_rows: output.records.len(),
        dropped_invalid: output.canonicalization.dropped_invalid,
        international_rows: output.canonicalization.international_rows,
        graphs,
        counts,
    })
}

fn create_out_dir(path: &Path) -> Result<(), CliError> {
    fs::create_dir_all(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[instrument(
    name = "cli.significance",
    err,
    skip(command),
    fields(
        graph = %command.graph.display(),
        iterations = command.iterations,
        streams = ?command.streams,
    ),
)]
pub(super) fn run_significance(
    command: SignificanceCommand,
) -> Result<SignificanceSummary, CliError> {
    let ranker = SpringRank::builder()
        .with_alpha(command.alpha)
        .with_l0(command.l0)
        .with_l1(command.l1)
        .build()?;
    let monte_carlo = MonteCarloBuilder::new()
        .with_iterations(command.iterations)
        .with_seed(command.seed)
        .with_streams(command.streams.into())
        .build()
        .map_err(LineageError::from)?;

    let graph = HiringGraph::read_json_file(&command.graph).map_err(LineageError::from)?;
    let result = monte_carlo
        .run(&graph, &ranker)
        .map_err(LineageError::from)?;
    Ok(SignificanceSummary {
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        graph: command.graph,
        result,
    })
}

#[instrument(name = "cli.inequality", err, skip(command), fields(graph = %command.graph.display()))]
pub(super) fn run_inequality(command: &InequalityCommand) -> Result<InequalitySummary, CliError> {
    let graph = HiringGraph::read_json_file(&command.graph).map_err(LineageError::from)?;
    let strengths = node_strengths(&graph);
    let produced: Vec<f64> = strengths
        .iter()
        .map(|strength| strength.out_strength as f64)
        .collect();
    let hired: Vec<f64> = strengths
        .iter()
        .map(|strength| strength.in_strength as f64)
        .collect();
    let summary = InequalitySummary {
        graph: command.graph.clone(),
        produced_gini: gini(&produced),
        hired_gini: gini(&hired),
        produced_hired_spearman: spearman(&produced, &hired),
        strengths,
    };
    info!(
        institutions = summary.strengths.len(),
        produced_gini = summary.produced_gini,
        hired_gini = summary.hired_gini,
        "inequality summary computed"
    );
    Ok(summary)
}
