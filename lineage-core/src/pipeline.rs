//! End-to-end orchestration from raw records to hiring graphs.
//!
//! Chains identity resolution, anonymization, institution canonicalization
//! and graph construction under one seed so a whole run is reproducible.

use rand::{SeedableRng, rngs::SmallRng};
use tracing::{info, instrument};

use crate::{
    error::{LineageError, Result},
    graph::{GraphBuilder, GraphSet, TimeWindow},
    identity::{IdentityReport, resolve_identities},
    institution::{
        Canonicalization, CanonicalizationReport, Canonicalizer, DEFAULT_INVALID_SENTINEL,
        InstitutionRegistry, MappingTable,
    },
    record::{CanonicalRecord, RawRecord},
};

/// Seed used when none is configured.
pub const DEFAULT_PIPELINE_SEED: u64 = 42;

/// Configures and constructs a [`Pipeline`].
///
/// # Examples
/// ```
/// use lineage_core::{PipelineBuilder, TimeWindow};
///
/// let pipeline = PipelineBuilder::new()
///     .with_windows([TimeWindow::new(2011, 2020)?])
///     .with_seed(7)
///     .build()?;
/// assert_eq!(pipeline.windows().len(), 1);
/// assert_eq!(pipeline.seed(), 7);
/// assert_eq!(pipeline.sentinel(), "invalid");
/// assert!(PipelineBuilder::new().with_sentinel("  ").build().is_err());
/// # Ok::<(), lineage_core::LineageError>(())
/// ```
#[derive(Clone, Debug)]
pub struct PipelineBuilder {
    windows: Vec<TimeWindow>,
    seed: u64,
    sentinel: String,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self {
            windows: TimeWindow::defaults(),
            seed: DEFAULT_PIPELINE_SEED,
            sentinel: DEFAULT_INVALID_SENTINEL.to_owned(),
        }
    }
}

impl PipelineBuilder {
    /// Creates a builder with the default windows, seed 42 and the `invalid`
    /// sentinel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the windowed graphs to build. Repeated windows are built once.
    #[must_use]
    pub fn with_windows(mut self, windows: impl IntoIterator<Item = TimeWindow>) -> Self {
        self.windows.clear();
        for window in windows {
            if !self.windows.contains(&window) {
                self.windows.push(window);
            }
        }
        self
    }

    /// Overrides the seed driving identifier generation.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Overrides the invalid-institution sentinel.
    #[must_use]
    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns [`LineageError::EmptySentinel`] when the sentinel is blank.
    pub fn build(self) -> Result<Pipeline> {
        if self.sentinel.trim().is_empty() {
            return Err(LineageError::EmptySentinel);
        }
        Ok(Pipeline {
            windows: self.windows,
            seed: self.seed,
            sentinel: self.sentinel,
        })
    }
}

/// Everything one pipeline run produces.
#[derive(Clone, Debug)]
pub struct PipelineOutput {
    /// Identity resolution counters.
    pub identity: IdentityReport,
    /// Canonicalization counters.
    pub canonicalization: CanonicalizationReport,
    /// Anonymized canonical rows.
    pub records: Vec<CanonicalRecord>,
    /// Yearly and windowed graphs with professor counts.
    pub graphs: GraphSet,
}

/// Validated pipeline configuration.
#[derive(Clone, Debug)]
pub struct Pipeline {
    windows: Vec<TimeWindow>,
    seed: u64,
    sentinel: String,
}

impl Pipeline {
    /// Windows built on every run.
    #[must_use]
    pub fn windows(&self) -> &[TimeWindow] {
        &self.windows
    }

    /// Seed of every run.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Invalid-institution sentinel.
    #[must_use]
    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    /// Runs every stage over `records`.
    ///
    /// Row-level problems are counted in the reports; only configuration
    /// errors abort the run.
    ///
    /// # Errors
    /// Returns [`LineageError::EmptySentinel`] when the sentinel cannot be
    /// applied to the canonicalizer.
    #[instrument(
        name = "core.pipeline",
        err,
        skip_all,
        fields(records = records.len(), seed = self.seed, windows = self.windows.len()),
    )]
    pub fn run(
        &self,
        records: Vec<RawRecord>,
        mapping: MappingTable,
        registry: InstitutionRegistry,
    ) -> Result<PipelineOutput> {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let resolution = resolve_identities(&records, &mut rng);
        let identity = resolution.report().clone();
        let anonymized = resolution.anonymize(records);

        let canonicalizer =
            Canonicalizer::new(mapping, registry).with_sentinel(self.sentinel.as_str())?;
        let Canonicalization {
            records: canonical,
            report: canonicalization,
        } = canonicalizer.canonicalize(&anonymized);

        let graphs = GraphBuilder::new(canonicalizer.registry(), canonicalizer.sentinel())
            .build(&canonical, &self.windows);
        info!(
            identities = identity.identities,
            canonical_rows = canonical.len(),
            yearly_graphs = graphs.yearly.len(),
            windowed_graphs = graphs.windows.len(),
            "pipeline completed"
        );
        Ok(PipelineOutput {
            identity,
            canonicalization,
            records: canonical,
            graphs,
        })
    }
}
