//! SpringRank: minimum spring-energy ranking of a directed weighted graph.
//!
//! Scores solve the sparse symmetric system
//! `(alpha·I + D_out + D_in − (A + Aᵀ)) s = alpha·l0·1 + l1·(k_out − k_in)`
//! by conjugate gradient. With `alpha = 0` the operator is singular, one
//! null direction per weakly connected component, but the right-hand side
//! sums to zero on every component so the system stays consistent. Starting
//! from zero keeps every iterate orthogonal to that null space, which yields
//! the minimum-norm solution: scores centred on each component.

use tracing::debug;

use super::{Ranker, WeightedAdjacency};
use crate::error::RankingError;

const DEFAULT_TOLERANCE: f64 = 1e-10;
const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// Configured SpringRank solver.
///
/// # Examples
/// ```
/// use lineage_core::{Ranker, SpringRank, WeightedAdjacency};
///
/// // Node 0 places a graduate at node 1, node 1 places one at node 2.
/// let adjacency = WeightedAdjacency::from_triplets(3, [(0, 1, 1.0), (1, 2, 1.0)])?;
/// let scores = SpringRank::default().rank(&adjacency)?;
/// assert!(scores[0] > scores[1] && scores[1] > scores[2]);
/// # Ok::<(), lineage_core::RankingError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringRank {
    alpha: f64,
    l0: f64,
    l1: f64,
    tolerance: f64,
    max_iterations: usize,
}

impl Default for SpringRank {
    fn default() -> Self {
        Self {
            alpha: 0.0,
            l0: 1.0,
            l1: 1.0,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SpringRank {
    /// Starts a builder populated with the defaults `alpha = 0, l0 = 1, l1 = 1`.
    #[must_use]
    pub fn builder() -> SpringRankBuilder {
        SpringRankBuilder::default()
    }

    /// Regularization strength pulling scores towards `l0`.
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Resting score used by the regularizer.
    #[must_use]
    pub fn l0(&self) -> f64 {
        self.l0
    }

    /// Spring rest length between adjacent nodes.
    #[must_use]
    pub fn l1(&self) -> f64 {
        self.l1
    }

    /// Applies the system operator to `vector`.
    fn apply(&self, adjacency: &WeightedAdjacency, diagonal: &[f64], vector: &[f64]) -> Vec<f64> {
        let mut output: Vec<f64> = diagonal
            .iter()
            .zip(vector)
            .map(|(degree, value)| (self.alpha + degree) * value)
            .collect();
        for &(row, column, weight) in adjacency.entries() {
            let (Some(&from), Some(&to)) = (vector.get(row), vector.get(column)) else {
                continue;
            };
            if let Some(slot) = output.get_mut(row) {
                *slot -= weight * to;
            }
            if let Some(slot) = output.get_mut(column) {
                *slot -= weight * from;
            }
        }
        output
    }
}

impl Ranker for SpringRank {
    fn rank(&self, adjacency: &WeightedAdjacency) -> Result<Vec<f64>, RankingError> {
        let node_count = adjacency.node_count();
        let out_strength = adjacency.out_strength();
        let in_strength = adjacency.in_strength();
        let diagonal: Vec<f64> = out_strength
            .iter()
            .zip(&in_strength)
            .map(|(out, inward)| out + inward)
            .collect();
        let rhs: Vec<f64> = out_strength
            .iter()
            .zip(&in_strength)
            .map(|(out, inward)| self.alpha * self.l0 + self.l1 * (out - inward))
            .collect();

        let rhs_norm = norm(&rhs);
        let mut scores = vec![0.0; node_count];
        if rhs_norm == 0.0 {
            return Ok(scores);
        }

        let mut residual = rhs;
        let mut direction = residual.clone();
        let mut residual_sq = dot(&residual, &residual);
        for iteration in 0..self.max_iterations {
            let projected = self.apply(adjacency, &diagonal, &direction);
            let curvature = dot(&direction, &projected);
            if curvature <= 0.0 || !curvature.is_finite() {
                return Err(RankingError::DidNotConverge {
                    iterations: iteration,
                    residual: residual_sq.sqrt(),
                });
            }
            let step = residual_sq / curvature;
            axpy(step, &direction, &mut scores);
            axpy(-step, &projected, &mut residual);
            let next_sq = dot(&residual, &residual);
            if next_sq.sqrt() <= self.tolerance * rhs_norm {
                debug!(iterations = iteration + 1, nodes = node_count, "springrank converged");
                return Ok(scores);
            }
            let beta = next_sq / residual_sq;
            for (dir, res) in direction.iter_mut().zip(&residual) {
                *dir = res + beta * *dir;
            }
            residual_sq = next_sq;
        }
        Err(RankingError::DidNotConverge {
            iterations: self.max_iterations,
            residual: residual_sq.sqrt(),
        })
    }
}

/// Configures and validates a [`SpringRank`] solver.
///
/// # Examples
/// ```
/// use lineage_core::SpringRank;
///
/// let solver = SpringRank::builder().with_alpha(0.5).with_l1(2.0).build()?;
/// assert_eq!(solver.alpha(), 0.5);
/// assert_eq!(solver.l1(), 2.0);
/// assert!(SpringRank::builder().with_alpha(-1.0).build().is_err());
/// # Ok::<(), lineage_core::RankingError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringRankBuilder {
    config: SpringRank,
}

impl Default for SpringRankBuilder {
    fn default() -> Self {
        Self {
            config: SpringRank::default(),
        }
    }
}

impl SpringRankBuilder {
    /// Overrides the regularization strength.
    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.config.alpha = alpha;
        self
    }

    /// Overrides the regularizer's resting score.
    #[must_use]
    pub fn with_l0(mut self, l0: f64) -> Self {
        self.config.l0 = l0;
        self
    }

    /// Overrides the spring rest length.
    #[must_use]
    pub fn with_l1(mut self, l1: f64) -> Self {
        self.config.l1 = l1;
        self
    }

    /// Overrides the relative residual tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    /// Overrides the iteration cap.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Validates the parameters.
    ///
    /// # Errors
    /// Returns [`RankingError::InvalidParameter`] when `alpha` is negative or
    /// non-finite, `l0` or `l1` is non-finite, or the tolerance is not
    /// strictly positive.
    pub fn build(self) -> Result<SpringRank, RankingError> {
        let SpringRank {
            alpha,
            l0,
            l1,
            tolerance,
            ..
        } = self.config;
        if !alpha.is_finite() || alpha < 0.0 {
            return Err(RankingError::InvalidParameter {
                name: "alpha",
                value: alpha,
            });
        }
        for (name, value) in [("l0", l0), ("l1", l1)] {
            if !value.is_finite() {
                return Err(RankingError::InvalidParameter { name, value });
            }
        }
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(RankingError::InvalidParameter {
                name: "tolerance",
                value: tolerance,
            });
        }
        Ok(self.config)
    }
}

fn dot(left: &[f64], right: &[f64]) -> f64 {
    left.iter().zip(right).map(|(a, b)| a * b).sum()
}

fn norm(vector: &[f64]) -> f64 {
    dot(vector, vector).sqrt()
}

fn axpy(scale: f64, x: &[f64], y: &mut [f64]) {
    for (target, value) in y.iter_mut().zip(x) {
        *target += scale * value;
    }
}
