use std::sync::Arc;

use lineage_core::{
    GraphError, GraphErrorCode, LineageError, LineageErrorCode, NullModelError,
    NullModelErrorCode, RankingError, RankingErrorCode, SignificanceError, SignificanceErrorCode,
};
use rstest::rstest;

#[rstest]
#[case(GraphError::UnknownNode { id: "X".into() }, GraphErrorCode::UnknownNode, "GRAPH_UNKNOWN_NODE")]
#[case(GraphError::DuplicateNode { id: "X".into() }, GraphErrorCode::DuplicateNode, "GRAPH_DUPLICATE_NODE")]
#[case(
    GraphError::Io(std::io::Error::other("disk full")),
    GraphErrorCode::Io,
    "GRAPH_IO",
)]
fn returns_expected_graph_code(
    #[case] error: GraphError,
    #[case] expected: GraphErrorCode,
    #[case] code: &str,
) {
    assert_eq!(error.code(), expected);
    assert_eq!(error.code().as_str(), code);
}

#[rstest]
#[case(
    RankingError::DimensionMismatch { row: 1, expected: 3, found: 2 },
    RankingErrorCode::DimensionMismatch,
)]
#[case(
    RankingError::IndexOutOfRange { index: 4, node_count: 3 },
    RankingErrorCode::IndexOutOfRange,
)]
#[case(RankingError::InvalidWeight { row: 0, column: 1 }, RankingErrorCode::InvalidWeight)]
#[case(
    RankingError::InvalidParameter { name: "alpha", value: -1.0 },
    RankingErrorCode::InvalidParameter,
)]
#[case(
    RankingError::DidNotConverge { iterations: 10, residual: 0.5 },
    RankingErrorCode::DidNotConverge,
)]
fn returns_expected_ranking_code(#[case] error: RankingError, #[case] expected: RankingErrorCode) {
    assert_eq!(error.code(), expected);
    assert!(error.code().as_str().starts_with("RANKING_"));
}

#[rstest]
#[case(
    NullModelError::DegreeSumMismatch { in_total: 1, out_total: 2 },
    NullModelErrorCode::DegreeSumMismatch,
)]
#[case(
    NullModelError::SequenceLengthMismatch { in_len: 1, out_len: 2 },
    NullModelErrorCode::SequenceLengthMismatch,
)]
#[case(
    NullModelError::WeightPoolMismatch { edges: 3, weights: 2 },
    NullModelErrorCode::WeightPoolMismatch,
)]
#[case(
    NullModelError::NodeOutOfRange { node: 5, node_count: 2 },
    NullModelErrorCode::NodeOutOfRange,
)]
#[case(
    NullModelError::RankLengthMismatch { ranks: 1, nodes: 2 },
    NullModelErrorCode::RankLengthMismatch,
)]
#[case(
    NullModelError::Ranking(RankingError::DidNotConverge { iterations: 1, residual: 1.0 }),
    NullModelErrorCode::Ranking,
)]
fn returns_expected_null_model_code(
    #[case] error: NullModelError,
    #[case] expected: NullModelErrorCode,
) {
    assert_eq!(error.code(), expected);
    assert!(error.code().as_str().starts_with("NULL_MODEL_"));
}

#[rstest]
fn observed_ranking_failure_keeps_its_source() {
    let error = SignificanceError::ObservedRanking(RankingError::DidNotConverge {
        iterations: 3,
        residual: 0.25,
    });
    assert_eq!(error.code(), SignificanceErrorCode::ObservedRanking);
    let source = std::error::Error::source(&error).expect("ranking error is the source");
    assert_eq!(
        source.to_string(),
        "solver stopped after 3 iterations with residual 0.25"
    );
}

#[rstest]
#[case(
    LineageError::SchemaMismatch { table: Arc::from("registry"), missing: vec!["state".into()] },
    LineageErrorCode::SchemaMismatch,
    None,
    None,
)]
#[case(
    LineageError::InvalidTimeWindow { start: 2020, end: 2011 },
    LineageErrorCode::InvalidTimeWindow,
    None,
    None,
)]
#[case(LineageError::EmptySentinel, LineageErrorCode::EmptySentinel, None, None)]
#[case(
    LineageError::Graph(GraphError::UnknownNode { id: "X".into() }),
    LineageErrorCode::GraphFailure,
    Some(GraphErrorCode::UnknownNode),
    None,
)]
#[case(
    LineageError::Significance(SignificanceError::InvalidIterations { got: 0 }),
    LineageErrorCode::SignificanceFailure,
    None,
    Some(SignificanceErrorCode::InvalidIterations),
)]
fn returns_expected_lineage_code(
    #[case] error: LineageError,
    #[case] expected: LineageErrorCode,
    #[case] graph: Option<GraphErrorCode>,
    #[case] significance: Option<SignificanceErrorCode>,
) {
    assert_eq!(error.code(), expected);
    assert_eq!(error.graph_code(), graph);
    assert_eq!(error.significance_code(), significance);
}

#[rstest]
fn schema_mismatch_lists_missing_columns() {
    let err = lineage_core::require_columns("registry", &["abbr", "name"], &["abbr", "state", "region"])
        .expect_err("columns are missing");
    assert_eq!(
        err.to_string(),
        "table `registry` is missing required columns: state, region"
    );
}
