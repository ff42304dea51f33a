//! Error types for the lineage core library.
//!
//! Fatal failures surface through the enums below, each paired with a stable
//! machine-readable code. Row-level problems (malformed identity keys,
//! unresolved institution mappings, invalid sentinel rows, failed null-model
//! draws) are not errors at this level: the stages count them in their reports
//! and keep going.

use std::{fmt, sync::Arc};

use thiserror::Error;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// Errors raised while reading or writing persisted graph artifacts.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum GraphError {
    /// An edge referenced a node id that the artifact does not declare.
    #[error("edge references unknown node `{id}`")]
    UnknownNode {
        /// Identifier that failed to resolve.
        id: String,
    },
    /// The artifact declared the same node twice.
    #[error("node `{id}` is declared more than once")]
    DuplicateNode {
        /// Identifier that was repeated.
        id: String,
    },
    /// Reading or writing the artifact failed.
    #[error("graph artifact i/o failed: {0}")]
    Io(#[from] std::io::Error),
    /// The artifact could not be encoded or decoded.
    #[error("graph artifact encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

define_error_codes! {
    /// Stable codes describing [`GraphError`] variants.
    enum GraphErrorCode for GraphError {
        /// An edge referenced a node id that the artifact does not declare.
        UnknownNode => UnknownNode { .. } => "GRAPH_UNKNOWN_NODE",
        /// The artifact declared the same node twice.
        DuplicateNode => DuplicateNode { .. } => "GRAPH_DUPLICATE_NODE",
        /// Reading or writing the artifact failed.
        Io => Io { .. } => "GRAPH_IO",
        /// The artifact could not be encoded or decoded.
        Json => Json { .. } => "GRAPH_ENCODING",
    }
}

/// Errors raised by a [`crate::Ranker`] implementation.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum RankingError {
    /// A dense adjacency row does not match the node count.
    #[error("adjacency row {row} has {found} entries but the matrix has {expected} nodes")]
    DimensionMismatch {
        /// Offending row.
        row: usize,
        /// Number of nodes.
        expected: usize,
        /// Entries found in the row.
        found: usize,
    },
    /// A sparse entry references a node outside the matrix.
    #[error("adjacency entry references node {index} outside {node_count} nodes")]
    IndexOutOfRange {
        /// The offending node position.
        index: usize,
        /// Number of nodes.
        node_count: usize,
    },
    /// The adjacency matrix contained a negative or non-finite weight.
    #[error("adjacency weight at ({row}, {column}) must be finite and non-negative")]
    InvalidWeight {
        /// Source node position.
        row: usize,
        /// Target node position.
        column: usize,
    },
    /// A solver parameter was outside its admissible range.
    #[error("ranking parameter `{name}` is out of range (got {value})")]
    InvalidParameter {
        /// Name of the rejected parameter.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// The iterative solver did not reach the requested tolerance.
    #[error("solver stopped after {iterations} iterations with residual {residual}")]
    DidNotConverge {
        /// Iterations performed before giving up.
        iterations: usize,
        /// Residual norm at the last iteration.
        residual: f64,
    },
}

define_error_codes! {
    /// Stable codes describing [`RankingError`] variants.
    enum RankingErrorCode for RankingError {
        /// A dense adjacency row does not match the node count.
        DimensionMismatch => DimensionMismatch { .. } => "RANKING_DIMENSION_MISMATCH",
        /// A sparse entry references a node outside the matrix.
        IndexOutOfRange => IndexOutOfRange { .. } => "RANKING_INDEX_OUT_OF_RANGE",
        /// The adjacency matrix contained a negative or non-finite weight.
        InvalidWeight => InvalidWeight { .. } => "RANKING_INVALID_WEIGHT",
        /// A solver parameter was outside its admissible range.
        InvalidParameter => InvalidParameter { .. } => "RANKING_INVALID_PARAMETER",
        /// The iterative solver did not reach the requested tolerance.
        DidNotConverge => DidNotConverge { .. } => "RANKING_DID_NOT_CONVERGE",
    }
}

/// Reasons a single null-model draw can fail.
///
/// The Monte Carlo loop treats every variant as a skipped iteration.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum NullModelError {
    /// In- and out-degree sequences describe a different number of stubs.
    #[error("in-degree total {in_total} does not match out-degree total {out_total}")]
    DegreeSumMismatch {
        /// Sum of the in-degree sequence.
        in_total: usize,
        /// Sum of the out-degree sequence.
        out_total: usize,
    },
    /// In- and out-degree sequences have different lengths.
    #[error("in-degree sequence has {in_len} entries but out-degree sequence has {out_len}")]
    SequenceLengthMismatch {
        /// Length of the in-degree sequence.
        in_len: usize,
        /// Length of the out-degree sequence.
        out_len: usize,
    },
    /// The generated graph does not have one edge per pooled weight.
    #[error("random graph has {edges} edges but the weight pool holds {weights}")]
    WeightPoolMismatch {
        /// Edge count of the generated graph.
        edges: usize,
        /// Number of pooled weights.
        weights: usize,
    },
    /// The generated graph referenced a node outside the degree sequence.
    #[error("random graph references node {node} outside {node_count} nodes")]
    NodeOutOfRange {
        /// The offending node position.
        node: usize,
        /// Number of nodes in the degree sequence.
        node_count: usize,
    },
    /// The ranker returned a score vector of the wrong length.
    #[error("ranker returned {ranks} scores for {nodes} nodes")]
    RankLengthMismatch {
        /// Number of scores returned.
        ranks: usize,
        /// Number of nodes ranked.
        nodes: usize,
    },
    /// Ranking the generated graph failed.
    #[error("ranking the random graph failed: {0}")]
    Ranking(#[source] RankingError),
}

define_error_codes! {
    /// Stable codes describing [`NullModelError`] variants.
    enum NullModelErrorCode for NullModelError {
        /// In- and out-degree sequences describe a different number of stubs.
        DegreeSumMismatch => DegreeSumMismatch { .. } => "NULL_MODEL_DEGREE_SUM_MISMATCH",
        /// In- and out-degree sequences have different lengths.
        SequenceLengthMismatch => SequenceLengthMismatch { .. } => "NULL_MODEL_SEQUENCE_LENGTH_MISMATCH",
        /// The generated graph does not have one edge per pooled weight.
        WeightPoolMismatch => WeightPoolMismatch { .. } => "NULL_MODEL_WEIGHT_POOL_MISMATCH",
        /// The generated graph referenced a node outside the degree sequence.
        NodeOutOfRange => NodeOutOfRange { .. } => "NULL_MODEL_NODE_OUT_OF_RANGE",
        /// The ranker returned a score vector of the wrong length.
        RankLengthMismatch => RankLengthMismatch { .. } => "NULL_MODEL_RANK_LENGTH_MISMATCH",
        /// Ranking the generated graph failed.
        Ranking => Ranking { .. } => "NULL_MODEL_RANKING",
    }
}

/// Errors raised when configuring or running the hierarchy significance test.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SignificanceError {
    /// The Monte Carlo test needs at least one iteration.
    #[error("iterations must be at least 1 (got {got})")]
    InvalidIterations {
        /// The rejected iteration count.
        got: usize,
    },
    /// A rank vector did not cover every node of the graph.
    #[error("rank vector has {ranks} entries but the graph has {nodes} nodes")]
    RankLengthMismatch {
        /// Number of supplied ranks.
        ranks: usize,
        /// Number of graph nodes.
        nodes: usize,
    },
    /// Ranking the observed graph failed, so no test statistic exists.
    #[error("ranking the observed graph failed: {0}")]
    ObservedRanking(#[source] RankingError),
}

define_error_codes! {
    /// Stable codes describing [`SignificanceError`] variants.
    enum SignificanceErrorCode for SignificanceError {
        /// The Monte Carlo test needs at least one iteration.
        InvalidIterations => InvalidIterations { .. } => "SIGNIFICANCE_INVALID_ITERATIONS",
        /// A rank vector did not cover every node of the graph.
        RankLengthMismatch => RankLengthMismatch { .. } => "SIGNIFICANCE_RANK_LENGTH_MISMATCH",
        /// Ranking the observed graph failed.
        ObservedRanking => ObservedRanking { .. } => "SIGNIFICANCE_OBSERVED_RANKING",
    }
}

/// Error type produced by the lineage pipeline stages.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum LineageError {
    /// An input table is missing columns a stage requires. The stage aborts.
    #[error("table `{table}` is missing required columns: {}", missing.join(", "))]
    SchemaMismatch {
        /// Name of the offending table.
        table: Arc<str>,
        /// Required columns absent from the table header.
        missing: Vec<String>,
    },
    /// A time window ends before it starts.
    #[error("time window {start}-{end} ends before it starts")]
    InvalidTimeWindow {
        /// First base year of the window.
        start: i32,
        /// Last base year of the window.
        end: i32,
    },
    /// A time window label is not of the form `start-end`.
    #[error("time window `{label}` must look like `2004-2024`")]
    MalformedTimeWindow {
        /// The rejected label.
        label: String,
    },
    /// The invalid-institution sentinel must be a non-empty string.
    #[error("the invalid-institution sentinel must not be empty")]
    EmptySentinel,
    /// Reading or writing a graph artifact failed.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// The significance test could not run.
    #[error(transparent)]
    Significance(#[from] SignificanceError),
}

define_error_codes! {
    /// Stable codes describing [`LineageError`] variants.
    enum LineageErrorCode for LineageError {
        /// An input table is missing columns a stage requires.
        SchemaMismatch => SchemaMismatch { .. } => "LINEAGE_SCHEMA_MISMATCH",
        /// A time window ends before it starts.
        InvalidTimeWindow => InvalidTimeWindow { .. } => "LINEAGE_INVALID_TIME_WINDOW",
        /// A time window label is not of the form `start-end`.
        MalformedTimeWindow => MalformedTimeWindow { .. } => "LINEAGE_MALFORMED_TIME_WINDOW",
        /// The invalid-institution sentinel must be a non-empty string.
        EmptySentinel => EmptySentinel => "LINEAGE_EMPTY_SENTINEL",
        /// Reading or writing a graph artifact failed.
        GraphFailure => Graph { .. } => "LINEAGE_GRAPH_FAILURE",
        /// The significance test could not run.
        SignificanceFailure => Significance { .. } => "LINEAGE_SIGNIFICANCE_FAILURE",
    }
}

impl LineageError {
    /// Retrieve the inner [`GraphErrorCode`] when the error came from a graph artifact.
    pub const fn graph_code(&self) -> Option<GraphErrorCode> {
        match self {
            Self::Graph(error) => Some(error.code()),
            _ => None,
        }
    }

    /// Retrieve the inner [`SignificanceErrorCode`] when the significance test failed.
    pub const fn significance_code(&self) -> Option<SignificanceErrorCode> {
        match self {
            Self::Significance(error) => Some(error.code()),
            _ => None,
        }
    }
}

/// Checks that `present` contains every column in `required`.
///
/// # Errors
/// Returns [`LineageError::SchemaMismatch`] listing the absent columns, in the
/// order they appear in `required`.
///
/// # Examples
/// ```
/// use lineage_core::{LineageError, require_columns};
///
/// require_columns("registry", &["abbr", "name"], &["abbr"])?;
/// let err = require_columns("registry", &["abbr"], &["abbr", "state"]).unwrap_err();
/// assert!(matches!(err, LineageError::SchemaMismatch { .. }));
/// # Ok::<(), LineageError>(())
/// ```
pub fn require_columns<S: AsRef<str>>(
    table: &str,
    present: &[S],
    required: &[&str],
) -> Result<()> {
    let missing: Vec<String> = required
        .iter()
        .filter(|column| !present.iter().any(|have| have.as_ref().trim() == **column))
        .map(|column| (*column).to_owned())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(LineageError::SchemaMismatch {
            table: Arc::from(table),
            missing,
        })
    }
}

/// Convenient alias for results returned by the pipeline stages.
pub type Result<T> = core::result::Result<T, LineageError>;
