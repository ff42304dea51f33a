//! Benchmark support crate for lineage.
//!
//! Generates reproducible synthetic faculty tables and hiring graphs for the
//! Criterion benchmarks of identity resolution, the full pipeline and the
//! Monte Carlo hierarchy test.

pub mod error;
pub mod synthetic;
