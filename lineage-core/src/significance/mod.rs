//! Hierarchy strength and its Monte Carlo significance test.
//!
//! The hierarchy strength of a weighted graph under a rank assignment is the
//! share of edge weight running from a lower-ranked source to a
//! higher-ranked target. The test compares the observed strength with the
//! strengths of degree-preserving random graphs that reuse the observed
//! weights.

mod null_model;

use std::num::NonZeroUsize;

use rand::{SeedableRng, rngs::SmallRng, seq::SliceRandom};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::{
    error::{NullModelError, RankingError, SignificanceError},
    graph::HiringGraph,
    ranking::{Ranker, WeightedAdjacency, shift_to_zero_min},
};

pub use self::null_model::{DirectedConfigurationModel, NullModel};

/// Iterations run when none are configured.
pub const DEFAULT_ITERATIONS: usize = 1000;
/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 42;

/// SplitMix64 increment (the 64-bit golden ratio) used for per-iteration
/// seed derivation.
const ITERATION_SEED_SPACING: u64 = 0x9E37_79B9_7F4A_7C15;
const SPLITMIX_MULT_A: u64 = 0xBF58_476D_1CE4_E5B9;
const SPLITMIX_MULT_B: u64 = 0x94D0_49BB_1331_11EB;

/// How random draws are sourced across Monte Carlo iterations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RandomStreams {
    /// One generator seeded once drives every iteration in order, and one
    /// weight pool is reshuffled between iterations. Iterations run in
    /// sequence.
    #[default]
    Shared,
    /// Every iteration derives its own seed and shuffles its own copy of the
    /// weight pool, so iterations are independent and may run in parallel.
    Independent,
}

/// Computes the hierarchy strength of `graph` under `ranks`.
///
/// # Errors
/// Returns [`SignificanceError::RankLengthMismatch`] when `ranks` does not
/// hold one score per node.
///
/// # Examples
/// ```
/// use lineage_core::{FieldInfo, HiringEdge, HiringGraph, InstitutionNode, hierarchy_strength};
///
/// let mut graph = HiringGraph::new();
/// for id in ["A", "B", "C"] {
///     graph.add_node(InstitutionNode::new(id))?;
/// }
/// let field = FieldInfo::new(1, "f", 2, "g");
/// for (source, target, weight) in [("A", "B", 2), ("B", "C", 1), ("C", "A", 1)] {
///     graph.add_edge(source, target, HiringEdge { weight, field: field.clone(), base_year: None })?;
/// }
/// assert_eq!(hierarchy_strength(&graph, &[1.0, 2.0, 0.0])?, 0.75);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn hierarchy_strength(graph: &HiringGraph, ranks: &[f64]) -> Result<f64, SignificanceError> {
    if ranks.len() != graph.node_count() {
        return Err(SignificanceError::RankLengthMismatch {
            ranks: ranks.len(),
            nodes: graph.node_count(),
        });
    }
    Ok(weighted_strength(
        graph
            .edges()
            .map(|view| (view.source, view.target, view.edge.weight)),
        ranks,
    ))
}

/// Share of weight on edges whose source ranks strictly below the target.
/// Zero when there are no edges or no weight.
fn weighted_strength<I>(edges: I, ranks: &[f64]) -> f64
where
    I: IntoIterator<Item = (usize, usize, u64)>,
{
    let mut total = 0_u64;
    let mut upward = 0_u64;
    for (source, target, weight) in edges {
        total += weight;
        if let (Some(from), Some(to)) = (ranks.get(source), ranks.get(target)) {
            if from < to {
                upward += weight;
            }
        }
    }
    if total == 0 {
        return 0.0;
    }
    upward as f64 / total as f64
}

/// Ranks the nodes behind `adjacency` and shifts the scores to a zero minimum.
fn shifted_ranks<K: Ranker + ?Sized>(
    ranker: &K,
    adjacency: &WeightedAdjacency,
) -> Result<Vec<f64>, RankingError> {
    ranker.rank(adjacency).map(shift_to_zero_min)
}

/// Observed statistic plus the null distribution of one Monte Carlo run.
#[derive(Clone, Debug, PartialEq)]
pub struct MonteCarloResult {
    observed: f64,
    null_statistics: Vec<f64>,
    requested: usize,
    skipped: usize,
}

impl MonteCarloResult {
    /// Hierarchy strength of the observed graph.
    #[must_use]
    pub fn observed(&self) -> f64 {
        self.observed
    }

    /// Hierarchy strengths of the random graphs that were drawn successfully.
    #[must_use]
    pub fn null_statistics(&self) -> &[f64] {
        &self.null_statistics
    }

    /// Iterations requested.
    #[must_use]
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Iterations skipped after a failed draw.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Realized sample size; never larger than [`Self::requested`].
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.null_statistics.len()
    }

    /// Fraction of null statistics less than or equal to the observed one.
    ///
    /// This is the lower-tail empirical p-value. `None` when no draw
    /// succeeded.
    #[must_use]
    pub fn p_value(&self) -> Option<f64> {
        self.tail_fraction(|statistic| statistic <= self.observed)
    }

    /// Fraction of null statistics greater than or equal to the observed one.
    #[must_use]
    pub fn upper_tail_p_value(&self) -> Option<f64> {
        self.tail_fraction(|statistic| statistic >= self.observed)
    }

    /// Mean of the null statistics.
    #[must_use]
    pub fn null_mean(&self) -> Option<f64> {
        if self.null_statistics.is_empty() {
            return None;
        }
        let sum: f64 = self.null_statistics.iter().sum();
        Some(sum / self.null_statistics.len() as f64)
    }

    fn tail_fraction(&self, in_tail: impl Fn(f64) -> bool) -> Option<f64> {
        if self.null_statistics.is_empty() {
            return None;
        }
        let hits = self
            .null_statistics
            .iter()
            .filter(|&&statistic| in_tail(statistic))
            .count();
        Some(hits as f64 / self.null_statistics.len() as f64)
    }
}

/// Configures and constructs a [`MonteCarlo`] test.
///
/// # Examples
/// ```
/// use lineage_core::{MonteCarloBuilder, RandomStreams};
///
/// let test = MonteCarloBuilder::new()
///     .with_iterations(50)
///     .with_seed(7)
///     .with_streams(RandomStreams::Independent)
///     .build()?;
/// assert_eq!(test.iterations().get(), 50);
/// assert!(MonteCarloBuilder::new().with_iterations(0).build().is_err());
/// # Ok::<(), lineage_core::SignificanceError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonteCarloBuilder {
    iterations: usize,
    seed: u64,
    streams: RandomStreams,
}

impl Default for MonteCarloBuilder {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            seed: DEFAULT_SEED,
            streams: RandomStreams::Shared,
        }
    }
}

impl MonteCarloBuilder {
    /// Creates a builder with 1000 iterations, seed 42 and shared streams.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the number of iterations requested.
    #[must_use]
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Overrides the seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Selects how iterations source randomness.
    #[must_use]
    pub fn with_streams(mut self, streams: RandomStreams) -> Self {
        self.streams = streams;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns [`SignificanceError::InvalidIterations`] when zero iterations
    /// were requested.
    pub fn build(self) -> Result<MonteCarlo, SignificanceError> {
        let iterations = NonZeroUsize::new(self.iterations).ok_or(
            SignificanceError::InvalidIterations {
                got: self.iterations,
            },
        )?;
        Ok(MonteCarlo {
            iterations,
            seed: self.seed,
            streams: self.streams,
        })
    }
}

/// Degree sequences and weights extracted from the observed graph.
struct Observation {
    node_count: usize,
    in_degrees: Vec<usize>,
    out_degrees: Vec<usize>,
    weights: Vec<u64>,
}

/// Monte Carlo significance test of hierarchy strength.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonteCarlo {
    iterations: NonZeroUsize,
    seed: u64,
    streams: RandomStreams,
}

impl MonteCarlo {
    /// Iterations requested per run.
    #[must_use]
    pub fn iterations(&self) -> NonZeroUsize {
        self.iterations
    }

    /// Seed of the run.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Stream policy of the run.
    #[must_use]
    pub fn streams(&self) -> RandomStreams {
        self.streams
    }

    /// Runs the test with the [`DirectedConfigurationModel`].
    ///
    /// # Errors
    /// See [`MonteCarlo::run_with_model`].
    pub fn run<K: Ranker + ?Sized>(
        &self,
        graph: &HiringGraph,
        ranker: &K,
    ) -> Result<MonteCarloResult, SignificanceError> {
        self.run_with_model(graph, ranker, &DirectedConfigurationModel)
    }

    /// Runs the test with a custom null model.
    ///
    /// Draws that fail for any reason, including a ranking failure on the
    /// random graph, are skipped and counted in
    /// [`MonteCarloResult::skipped`].
    ///
    /// # Errors
    /// Returns [`SignificanceError::ObservedRanking`] when the observed graph
    /// cannot be ranked and [`SignificanceError::RankLengthMismatch`] when
    /// the ranker returns the wrong number of scores for it.
    #[instrument(
        name = "core.monte_carlo",
        err,
        skip(self, graph, ranker, model),
        fields(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            iterations = self.iterations.get(),
            seed = self.seed,
            streams = ?self.streams,
        ),
    )]
    pub fn run_with_model<K, M>(
        &self,
        graph: &HiringGraph,
        ranker: &K,
        model: &M,
    ) -> Result<MonteCarloResult, SignificanceError>
    where
        K: Ranker + ?Sized,
        M: NullModel,
    {
        let observed = observed_strength(graph, ranker)?;
        let observation = Observation {
            node_count: graph.node_count(),
            in_degrees: graph.in_degrees(),
            out_degrees: graph.out_degrees(),
            weights: graph.weights(),
        };

        let outcomes = match self.streams {
            RandomStreams::Shared => self.run_shared(&observation, ranker, model),
            RandomStreams::Independent => self.run_independent(&observation, ranker, model),
        };

        let requested = self.iterations.get();
        let mut null_statistics = Vec::with_capacity(requested);
        let mut skipped = 0_usize;
        for (iteration, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(statistic) => null_statistics.push(statistic),
                Err(error) => {
                    skipped += 1;
                    record_skip();
                    warn!(iteration, code = %error.code(), %error, "null model draw skipped");
                }
            }
        }
        let result = MonteCarloResult {
            observed,
            null_statistics,
            requested,
            skipped,
        };
        info!(
            observed = result.observed,
            samples = result.sample_count(),
            skipped = result.skipped,
            p_value = ?result.p_value(),
            "monte carlo test completed"
        );
        Ok(result)
    }

    fn run_shared<K, M>(
        &self,
        observation: &Observation,
        ranker: &K,
        model: &M,
    ) -> Vec<Result<f64, NullModelError>>
    where
        K: Ranker + ?Sized,
        M: NullModel,
    {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut pool = observation.weights.clone();
        pool.shuffle(&mut rng);
        (0..self.iterations.get())
            .map(|_| draw_statistic(observation, &mut pool, ranker, model, &mut rng))
            .collect()
    }

    fn run_independent<K, M>(
        &self,
        observation: &Observation,
        ranker: &K,
        model: &M,
    ) -> Vec<Result<f64, NullModelError>>
    where
        K: Ranker + ?Sized,
        M: NullModel,
    {
        let iteration = |index: usize| {
            let mut rng = SmallRng::seed_from_u64(mix_iteration_seed(self.seed, index));
            let mut pool = observation.weights.clone();
            pool.shuffle(&mut rng);
            draw_statistic(observation, &mut pool, ranker, model, &mut rng)
        };
        #[cfg(feature = "parallel")]
        {
            (0..self.iterations.get())
                .into_par_iter()
                .map(iteration)
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            (0..self.iterations.get()).map(iteration).collect()
        }
    }
}

fn observed_strength<K: Ranker + ?Sized>(
    graph: &HiringGraph,
    ranker: &K,
) -> Result<f64, SignificanceError> {
    if graph.has_no_edges() {
        return Ok(0.0);
    }
    let adjacency = graph
        .adjacency()
        .map_err(SignificanceError::ObservedRanking)?;
    let ranks = shifted_ranks(ranker, &adjacency).map_err(SignificanceError::ObservedRanking)?;
    hierarchy_strength(graph, &ranks)
}

/// Draws one random graph, weights it from `pool`, reshuffles the pool and
/// returns the graph's hierarchy strength.
fn draw_statistic<K, M>(
    observation: &Observation,
    pool: &mut [u64],
    ranker: &K,
    model: &M,
    rng: &mut SmallRng,
) -> Result<f64, NullModelError>
where
    K: Ranker + ?Sized,
    M: NullModel,
{
    let edges = model.generate(&observation.in_degrees, &observation.out_degrees, rng)?;
    if edges.len() != pool.len() {
        return Err(NullModelError::WeightPoolMismatch {
            edges: edges.len(),
            weights: pool.len(),
        });
    }
    let node_count = observation.node_count;
    let mut weighted = Vec::with_capacity(edges.len());
    for (&(source, target), &weight) in edges.iter().zip(pool.iter()) {
        for node in [source, target] {
            if node >= node_count {
                return Err(NullModelError::NodeOutOfRange { node, node_count });
            }
        }
        weighted.push((source, target, weight));
    }
    pool.shuffle(rng);

    if weighted.is_empty() {
        return Ok(0.0);
    }
    let adjacency = WeightedAdjacency::from_triplets(
        node_count,
        weighted
            .iter()
            .map(|&(source, target, weight)| (source, target, weight as f64)),
    )
    .map_err(NullModelError::Ranking)?;
    let ranks = shifted_ranks(ranker, &adjacency).map_err(NullModelError::Ranking)?;
    if ranks.len() != node_count {
        return Err(NullModelError::RankLengthMismatch {
            ranks: ranks.len(),
            nodes: node_count,
        });
    }
    Ok(weighted_strength(weighted, &ranks))
}

fn mix_iteration_seed(base_seed: u64, iteration: usize) -> u64 {
    splitmix64(base_seed ^ ((iteration as u64 + 1).wrapping_mul(ITERATION_SEED_SPACING)))
}

fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(ITERATION_SEED_SPACING);
    state = (state ^ (state >> 30)).wrapping_mul(SPLITMIX_MULT_A);
    state = (state ^ (state >> 27)).wrapping_mul(SPLITMIX_MULT_B);
    state ^ (state >> 31)
}

#[cfg(feature = "metrics")]
fn record_skip() {
    metrics::counter!("lineage_null_model_skips").increment(1);
}

#[cfg(not(feature = "metrics"))]
fn record_skip() {}

#[cfg(test)]
mod tests;
