//! Node ranking over weighted adjacency matrices.
//!
//! A [`Ranker`] maps a [`WeightedAdjacency`] to one score per node. The
//! hierarchy statistic only compares scores, so any strictly monotonic
//! post-processing such as [`shift_to_zero_min`] leaves it unchanged.

mod spring;

use crate::error::RankingError;

pub use self::spring::{SpringRank, SpringRankBuilder};

/// Square, non-negative adjacency matrix in coalesced sparse form.
///
/// Entries are sorted by `(row, column)`; parallel edges are summed and zero
/// weights are omitted.
///
/// # Examples
/// ```
/// use lineage_core::WeightedAdjacency;
///
/// let adjacency = WeightedAdjacency::from_triplets(2, [(0, 1, 2.0), (0, 1, 1.0)])?;
/// assert_eq!(adjacency.entries(), &[(0, 1, 3.0)]);
/// assert_eq!(adjacency.out_strength(), vec![3.0, 0.0]);
/// # Ok::<(), lineage_core::RankingError>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WeightedAdjacency {
    node_count: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl WeightedAdjacency {
    /// Builds a matrix from `(row, column, weight)` triplets.
    ///
    /// # Errors
    /// Returns [`RankingError::IndexOutOfRange`] when a triplet references a
    /// node at or beyond `node_count`, and [`RankingError::InvalidWeight`]
    /// for negative or non-finite weights.
    pub fn from_triplets<I>(node_count: usize, triplets: I) -> Result<Self, RankingError>
    where
        I: IntoIterator<Item = (usize, usize, f64)>,
    {
        let mut entries = Vec::new();
        for (row, column, weight) in triplets {
            for index in [row, column] {
                if index >= node_count {
                    return Err(RankingError::IndexOutOfRange { index, node_count });
                }
            }
            if !weight.is_finite() || weight < 0.0 {
                return Err(RankingError::InvalidWeight { row, column });
            }
            if weight > 0.0 {
                entries.push((row, column, weight));
            }
        }
        entries.sort_by(|left, right| (left.0, left.1).cmp(&(right.0, right.1)));
        let mut coalesced: Vec<(usize, usize, f64)> = Vec::with_capacity(entries.len());
        for (row, column, weight) in entries {
            match coalesced.last_mut() {
                Some(last) if last.0 == row && last.1 == column => last.2 += weight,
                _ => coalesced.push((row, column, weight)),
            }
        }
        Ok(Self {
            node_count,
            entries: coalesced,
        })
    }

    /// Builds a matrix from dense rows.
    ///
    /// # Errors
    /// Returns [`RankingError::DimensionMismatch`] when a row length differs
    /// from the number of rows, and [`RankingError::InvalidWeight`] for
    /// negative or non-finite weights.
    pub fn from_dense(rows: &[Vec<f64>]) -> Result<Self, RankingError> {
        let node_count = rows.len();
        let mut triplets = Vec::new();
        for (row, values) in rows.iter().enumerate() {
            if values.len() != node_count {
                return Err(RankingError::DimensionMismatch {
                    row,
                    expected: node_count,
                    found: values.len(),
                });
            }
            triplets.extend(
                values
                    .iter()
                    .enumerate()
                    .map(|(column, weight)| (row, column, *weight)),
            );
        }
        Self::from_triplets(node_count, triplets)
    }

    /// Number of rows (and columns).
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Non-zero entries sorted by `(row, column)`.
    #[must_use]
    pub fn entries(&self) -> &[(usize, usize, f64)] {
        &self.entries
    }

    /// Row sums: total weight leaving each node.
    #[must_use]
    pub fn out_strength(&self) -> Vec<f64> {
        let mut strength = vec![0.0; self.node_count];
        for &(row, _, weight) in &self.entries {
            if let Some(slot) = strength.get_mut(row) {
                *slot += weight;
            }
        }
        strength
    }

    /// Column sums: total weight entering each node.
    #[must_use]
    pub fn in_strength(&self) -> Vec<f64> {
        let mut strength = vec![0.0; self.node_count];
        for &(_, column, weight) in &self.entries {
            if let Some(slot) = strength.get_mut(column) {
                *slot += weight;
            }
        }
        strength
    }
}

/// Computes one real score per node of a weighted adjacency matrix.
///
/// Implementations must accept disconnected graphs and return exactly
/// [`WeightedAdjacency::node_count`] scores in node order.
///
/// Closures with the matching signature implement the trait, which makes it
/// easy to plug in fixed scores:
///
/// ```
/// use lineage_core::{Ranker, RankingError, WeightedAdjacency};
///
/// let constant = |adjacency: &WeightedAdjacency| -> Result<Vec<f64>, RankingError> {
///     Ok(vec![1.0; adjacency.node_count()])
/// };
/// let adjacency = WeightedAdjacency::from_triplets(3, [])?;
/// assert_eq!(constant.rank(&adjacency)?, vec![1.0, 1.0, 1.0]);
/// # Ok::<(), RankingError>(())
/// ```
pub trait Ranker: Send + Sync {
    /// Ranks every node of `adjacency`.
    ///
    /// # Errors
    /// Returns a [`RankingError`] when the solver rejects its input or fails
    /// to converge.
    fn rank(&self, adjacency: &WeightedAdjacency) -> Result<Vec<f64>, RankingError>;
}

impl<F> Ranker for F
where
    F: Fn(&WeightedAdjacency) -> Result<Vec<f64>, RankingError> + Send + Sync,
{
    fn rank(&self, adjacency: &WeightedAdjacency) -> Result<Vec<f64>, RankingError> {
        self(adjacency)
    }
}

/// Shifts scores so the smallest becomes zero, keeping their relative order.
///
/// # Examples
/// ```
/// use lineage_core::shift_to_zero_min;
///
/// assert_eq!(shift_to_zero_min(vec![-1.5, 0.5, 2.0]), vec![0.0, 2.0, 3.5]);
/// assert!(shift_to_zero_min(Vec::new()).is_empty());
/// ```
#[must_use]
pub fn shift_to_zero_min(mut ranks: Vec<f64>) -> Vec<f64> {
    let minimum = ranks.iter().copied().fold(f64::INFINITY, f64::min);
    if minimum.is_finite() {
        for rank in &mut ranks {
            *rank -= minimum;
        }
    }
    ranks
}
