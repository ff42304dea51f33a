use std::sync::atomic::{AtomicUsize, Ordering};

use rand::{Rng, SeedableRng, rngs::SmallRng};
use rstest::{fixture, rstest};

use super::*;
use crate::{
    error::{NullModelErrorCode, SignificanceErrorCode},
    graph::{HiringEdge, InstitutionNode},
    ranking::SpringRank,
    record::FieldInfo,
};

fn graph_of(nodes: &[&str], edges: &[(&str, &str, u64)]) -> HiringGraph {
    let mut graph = HiringGraph::new();
    for id in nodes {
        graph
            .add_node(InstitutionNode::new(*id))
            .expect("node ids are distinct");
    }
    for &(source, target, weight) in edges {
        graph
            .add_edge(
                source,
                target,
                HiringEdge {
                    weight,
                    field: FieldInfo::new(1, "field", 10, "big field"),
                    base_year: None,
                },
            )
            .expect("endpoints exist");
    }
    graph
}

#[fixture]
fn triangle() -> HiringGraph {
    graph_of(&["A", "B", "C"], &[("A", "B", 2), ("B", "C", 1), ("C", "A", 1)])
}

#[fixture]
fn hierarchy() -> HiringGraph {
    graph_of(
        &["A", "B", "C", "D", "E"],
        &[
            ("A", "B", 4),
            ("A", "C", 3),
            ("A", "D", 1),
            ("B", "C", 2),
            ("B", "E", 2),
            ("C", "D", 1),
            ("D", "E", 5),
            ("E", "A", 1),
            ("C", "C", 2),
        ],
    )
}

fn fixed_ranks(
    ranks: Vec<f64>,
) -> impl Fn(&WeightedAdjacency) -> Result<Vec<f64>, RankingError> + Send + Sync {
    move |_: &WeightedAdjacency| Ok(ranks.clone())
}

/// Fails on the listed draw numbers and delegates to the configuration
/// model otherwise.
struct FlakyModel {
    calls: AtomicUsize,
    failing: Vec<usize>,
}

impl FlakyModel {
    fn failing_on(failing: Vec<usize>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            failing,
        }
    }
}

impl NullModel for FlakyModel {
    fn generate<R: Rng + ?Sized>(
        &self,
        in_degrees: &[usize],
        out_degrees: &[usize],
        rng: &mut R,
    ) -> Result<Vec<(usize, usize)>, NullModelError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&call) {
            return Err(NullModelError::DegreeSumMismatch {
                in_total: 0,
                out_total: 1,
            });
        }
        DirectedConfigurationModel.generate(in_degrees, out_degrees, rng)
    }
}

#[rstest]
fn triangle_statistic_matches_hand_computation(triangle: HiringGraph) {
    let strength = hierarchy_strength(&triangle, &[1.0, 2.0, 0.0]).expect("ranks cover nodes");
    assert!((strength - 0.75).abs() < 1e-12);
}

#[rstest]
fn edgeless_graph_has_zero_strength() {
    let graph = graph_of(&["A", "B"], &[]);
    assert_eq!(hierarchy_strength(&graph, &[0.0, 1.0]), Ok(0.0));
}

#[rstest]
fn rank_vector_must_cover_every_node(triangle: HiringGraph) {
    let err = hierarchy_strength(&triangle, &[1.0]).expect_err("too few ranks");
    assert_eq!(err.code(), SignificanceErrorCode::RankLengthMismatch);
}

#[rstest]
fn equal_ranks_count_as_not_upward(triangle: HiringGraph) {
    assert_eq!(hierarchy_strength(&triangle, &[1.0, 1.0, 1.0]), Ok(0.0));
}

#[rstest]
fn failed_draws_shrink_the_sample(triangle: HiringGraph) {
    let test = MonteCarloBuilder::new()
        .with_iterations(10)
        .build()
        .expect("iterations are positive");
    let model = FlakyModel::failing_on(vec![1, 4, 8]);
    let result = test
        .run_with_model(&triangle, &fixed_ranks(vec![1.0, 2.0, 0.0]), &model)
        .expect("observed graph ranks");
    assert_eq!(result.requested(), 10);
    assert_eq!(result.skipped(), 3);
    assert_eq!(result.sample_count(), 7);
    assert!((result.observed() - 0.75).abs() < 1e-12);
}

#[rstest]
#[case::shared(RandomStreams::Shared)]
#[case::independent(RandomStreams::Independent)]
fn statistics_stay_within_unit_interval(hierarchy: HiringGraph, #[case] streams: RandomStreams) {
    let result = MonteCarloBuilder::new()
        .with_iterations(40)
        .with_seed(3)
        .with_streams(streams)
        .build()
        .expect("iterations are positive")
        .run(&hierarchy, &SpringRank::default())
        .expect("observed graph ranks");
    assert!(result.sample_count() <= result.requested());
    assert_eq!(result.sample_count() + result.skipped(), 40);
    assert!((0.0..=1.0).contains(&result.observed()));
    assert!(
        result
            .null_statistics()
            .iter()
            .all(|statistic| (0.0..=1.0).contains(statistic))
    );
    let p_value = result.p_value().expect("samples were drawn");
    assert!((0.0..=1.0).contains(&p_value));
}

#[rstest]
#[case::shared(RandomStreams::Shared)]
#[case::independent(RandomStreams::Independent)]
fn runs_are_reproducible_for_a_seed(hierarchy: HiringGraph, #[case] streams: RandomStreams) {
    let run = |seed| {
        MonteCarloBuilder::new()
            .with_iterations(25)
            .with_seed(seed)
            .with_streams(streams)
            .build()
            .expect("iterations are positive")
            .run(&hierarchy, &SpringRank::default())
            .expect("observed graph ranks")
    };
    assert_eq!(run(11), run(11));
}

#[rstest]
fn stream_policies_draw_different_samples(hierarchy: HiringGraph) {
    let run = |streams| {
        MonteCarloBuilder::new()
            .with_iterations(25)
            .with_streams(streams)
            .build()
            .expect("iterations are positive")
            .run(&hierarchy, &SpringRank::default())
            .expect("observed graph ranks")
    };
    let shared = run(RandomStreams::Shared);
    let independent = run(RandomStreams::Independent);
    assert_eq!(shared.observed(), independent.observed());
    assert_ne!(shared.null_statistics(), independent.null_statistics());
}

#[rstest]
fn null_ranking_failures_are_skipped(triangle: HiringGraph) {
    let calls = AtomicUsize::new(0);
    let first_only = |adjacency: &WeightedAdjacency| {
        if calls.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(vec![0.0; adjacency.node_count()])
        } else {
            Err(RankingError::DidNotConverge {
                iterations: 1,
                residual: 1.0,
            })
        }
    };
    let result = MonteCarloBuilder::new()
        .with_iterations(5)
        .build()
        .expect("iterations are positive")
        .run(&triangle, &first_only)
        .expect("observed graph ranks");
    assert_eq!(result.skipped(), 5);
    assert_eq!(result.sample_count(), 0);
    assert_eq!(result.p_value(), None);
    assert_eq!(result.null_mean(), None);
}

#[rstest]
fn observed_ranking_failure_is_fatal(triangle: HiringGraph) {
    let failing = |_: &WeightedAdjacency| -> Result<Vec<f64>, RankingError> {
        Err(RankingError::InvalidParameter {
            name: "alpha",
            value: -1.0,
        })
    };
    let err = MonteCarloBuilder::new()
        .build()
        .expect("defaults are valid")
        .run(&triangle, &failing)
        .expect_err("observed ranking fails");
    assert_eq!(err.code(), SignificanceErrorCode::ObservedRanking);
}

#[rstest]
fn edgeless_graph_yields_zero_everywhere() {
    let graph = graph_of(&["A", "B"], &[]);
    let result = MonteCarloBuilder::new()
        .with_iterations(4)
        .build()
        .expect("iterations are positive")
        .run(&graph, &SpringRank::default())
        .expect("nothing to rank");
    assert_eq!(result.observed(), 0.0);
    assert_eq!(result.null_statistics(), &[0.0; 4]);
    assert_eq!(result.p_value(), Some(1.0));
    assert_eq!(result.upper_tail_p_value(), Some(1.0));
}

#[rstest]
fn p_values_count_each_tail() {
    let result = MonteCarloResult {
        observed: 0.5,
        null_statistics: vec![0.25, 0.5, 0.75, 1.0],
        requested: 5,
        skipped: 1,
    };
    assert_eq!(result.p_value(), Some(0.5));
    assert_eq!(result.upper_tail_p_value(), Some(0.75));
    assert_eq!(result.null_mean(), Some(0.625));
}

#[rstest]
fn zero_iterations_are_rejected() {
    let err = MonteCarloBuilder::new()
        .with_iterations(0)
        .build()
        .expect_err("zero iterations");
    assert_eq!(err, SignificanceError::InvalidIterations { got: 0 });
}

#[rstest]
fn configuration_model_preserves_degrees() {
    let in_degrees = [2, 0, 3, 1, 1];
    let out_degrees = [1, 3, 0, 2, 1];
    let mut rng = SmallRng::seed_from_u64(9);
    for _ in 0..20 {
        let edges = DirectedConfigurationModel
            .generate(&in_degrees, &out_degrees, &mut rng)
            .expect("sums agree");
        let mut seen_in = [0_usize; 5];
        let mut seen_out = [0_usize; 5];
        for (source, target) in edges {
            seen_out[source] += 1;
            seen_in[target] += 1;
        }
        assert_eq!(seen_in, in_degrees);
        assert_eq!(seen_out, out_degrees);
    }
}

#[rstest]
#[case::sums(&[1, 1], &[2, 1], NullModelErrorCode::DegreeSumMismatch)]
#[case::lengths(&[1], &[0, 1], NullModelErrorCode::SequenceLengthMismatch)]
fn unrealizable_sequences_are_rejected(
    #[case] in_degrees: &[usize],
    #[case] out_degrees: &[usize],
    #[case] expected: NullModelErrorCode,
) {
    let mut rng = SmallRng::seed_from_u64(1);
    let err = DirectedConfigurationModel
        .generate(in_degrees, out_degrees, &mut rng)
        .expect_err("sequences disagree");
    assert_eq!(err.code(), expected);
}

#[rstest]
fn iteration_seeds_are_distinct() {
    let seeds: std::collections::HashSet<u64> =
        (0..1000).map(|index| mix_iteration_seed(DEFAULT_SEED, index)).collect();
    assert_eq!(seeds.len(), 1000);
}
