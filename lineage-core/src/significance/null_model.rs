//! Degree-preserving random graph generators.

use rand::{Rng, seq::SliceRandom};

use crate::error::NullModelError;

/// Generates random directed multigraphs with prescribed degree sequences.
///
/// Returned edges are `(source, target)` node positions in enumeration
/// order; the Monte Carlo loop assigns pooled weights by that order.
pub trait NullModel: Sync {
    /// Draws one random edge list realizing `in_degrees` and `out_degrees`.
    ///
    /// # Errors
    /// Returns a [`NullModelError`] when the sequences cannot be realized.
    /// Callers skip the draw.
    fn generate<R: Rng + ?Sized>(
        &self,
        in_degrees: &[usize],
        out_degrees: &[usize],
        rng: &mut R,
    ) -> Result<Vec<(usize, usize)>, NullModelError>;
}

/// Directed configuration model: pairs shuffled out-stubs with shuffled
/// in-stubs. Self-loops and parallel edges are kept, so every degree is
/// realized exactly.
///
/// # Examples
/// ```
/// use lineage_core::{DirectedConfigurationModel, NullModel};
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let mut rng = SmallRng::seed_from_u64(42);
/// let edges = DirectedConfigurationModel.generate(&[1, 1, 0], &[0, 1, 1], &mut rng)?;
/// assert_eq!(edges.len(), 2);
/// assert!(edges.iter().all(|&(source, _)| source != 0));
/// assert!(edges.iter().all(|&(_, target)| target != 2));
/// # Ok::<(), lineage_core::NullModelError>(())
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirectedConfigurationModel;

impl NullModel for DirectedConfigurationModel {
    fn generate<R: Rng + ?Sized>(
        &self,
        in_degrees: &[usize],
        out_degrees: &[usize],
        rng: &mut R,
    ) -> Result<Vec<(usize, usize)>, NullModelError> {
        if in_degrees.len() != out_degrees.len() {
            return Err(NullModelError::SequenceLengthMismatch {
                in_len: in_degrees.len(),
                out_len: out_degrees.len(),
            });
        }
        let in_total: usize = in_degrees.iter().sum();
        let out_total: usize = out_degrees.iter().sum();
        if in_total != out_total {
            return Err(NullModelError::DegreeSumMismatch {
                in_total,
                out_total,
            });
        }

        let mut out_stubs = stubs(out_degrees, out_total);
        let mut in_stubs = stubs(in_degrees, in_total);
        out_stubs.shuffle(rng);
        in_stubs.shuffle(rng);
        Ok(out_stubs.into_iter().zip(in_stubs).collect())
    }
}

fn stubs(degrees: &[usize], total: usize) -> Vec<usize> {
    let mut stubs = Vec::with_capacity(total);
    for (node, &degree) in degrees.iter().enumerate() {
        stubs.extend(std::iter::repeat_n(node, degree));
    }
    stubs
}
