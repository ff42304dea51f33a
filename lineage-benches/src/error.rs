//! Benchmark setup error type.
//!
//! Lets setup functions propagate failures with `?` instead of panicking
//! inside Criterion closures.

use lineage_core::{LineageError, RankingError, SignificanceError};

use crate::synthetic::{SyntheticError, SyntheticGraphError};

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Synthetic data generation failed.
    #[error("synthetic data generation failed: {0}")]
    Synthetic(#[from] SyntheticError),
    /// A synthetic graph could not be assembled.
    #[error("graph construction failed: {0}")]
    Graph(#[from] SyntheticGraphError),
    /// Ranking parameters were rejected.
    #[error("ranking setup failed: {0}")]
    Ranking(#[from] RankingError),
    /// Monte Carlo parameters were rejected.
    #[error("significance setup failed: {0}")]
    Significance(#[from] SignificanceError),
    /// Pipeline configuration was rejected.
    #[error("pipeline setup failed: {0}")]
    Pipeline(#[from] LineageError),
}
