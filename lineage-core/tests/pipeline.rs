//! End-to-end behaviour of the record-to-graph pipeline.

mod common;

use lineage_core::{
    Canonicalizer, PipelineBuilder, RawRecord, TimeWindow, resolve_identities,
};
use lineage_test_support::tracing::RecordingLayer;
use rand::{SeedableRng, rngs::SmallRng};
use rstest::{fixture, rstest};
use tracing::Level;

use common::{mapping, raw, registry};

#[fixture]
fn five_records() -> Vec<RawRecord> {
    vec![
        raw("Ana Souza", Some("100"), ("Univ Federal X", "UFX"), ("Univ Federal Y", "UFY")),
        raw("ANA SOUZA", Some("100"), ("Univ Federal X", "UFX"), ("Univ Federal Y", "UFY")),
        raw("Bruno Lima", Some("200"), ("Univ Federal Y", "UFY"), ("Univ Federal Z", "UFZ")),
        raw("Carla Dias", Some("300"), ("Univ Federal Z", "UFZ"), ("Univ Federal X", "UFX")),
        raw("Davi Rocha", None, ("Univ Federal X", "UFX"), ("Univ Federal Z", "UFZ")),
    ]
}

#[rstest]
fn records_sharing_a_document_key_merge(five_records: Vec<RawRecord>) {
    let resolution = resolve_identities(&five_records, &mut SmallRng::seed_from_u64(42));
    assert_eq!(resolution.identity_count(), 4);
    let sizes: Vec<usize> = resolution.groups().iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![2, 1, 1, 1]);
    let ids = resolution.assignments();
    assert_eq!(ids[0], ids[1]);
    assert_eq!(resolution.report().merge_groups, 1);
    assert_eq!(resolution.report().document_rejected, 1);
}

#[rstest]
fn ambiguous_mapping_expands_into_every_candidate() {
    let record = raw("Eva Nunes", Some("500"), ("Fed Univ X", "FUX"), ("Univ Federal Z", "UFZ"));
    let resolution = resolve_identities(std::slice::from_ref(&record), &mut SmallRng::seed_from_u64(1));
    let anonymized = resolution.anonymize(vec![record]);
    let canonical = Canonicalizer::new(mapping(), registry()).canonicalize(&anonymized);

    let employers: Vec<_> = canonical
        .records
        .iter()
        .map(|row| row.employer.abbr.as_deref())
        .collect();
    assert_eq!(employers, vec![Some("UFX"), Some("UFY")]);
    assert!(canonical.records.iter().all(|row| {
        row.degree_granter.abbr.as_deref() == Some("UFZ")
            && row.professor_id == canonical.records[0].professor_id
    }));
    assert_eq!(canonical.report.expanded_rows, 2);
}

#[rstest]
fn pipeline_builds_graphs_from_raw_records(mut five_records: Vec<RawRecord>) {
    let mut abroad = raw("Fabio Reis", Some("600"), ("Univ Federal Y", "UFY"), ("Sorbonne", "P1"));
    abroad.degree_country = Some("FRANCA".to_owned());
    let closed = raw("Gil Paz", Some("700"), ("Closed College", "CC"), ("Univ Federal X", "UFX"));
    let mut later = raw("Bruno Lima", Some("200"), ("Univ Federal Z", "UFZ"), ("Univ Federal Z", "UFZ"));
    later.base_year = 2018;
    five_records.extend([abroad, closed, later]);

    let output = PipelineBuilder::new()
        .with_windows([TimeWindow::new(2011, 2020).expect("valid window")])
        .build()
        .expect("valid configuration")
        .run(five_records, mapping(), registry())
        .expect("pipeline runs");

    assert_eq!(output.identity.identities, 6);
    assert_eq!(output.canonicalization.dropped_invalid, 1);
    assert_eq!(output.canonicalization.international_rows, 1);
    assert_eq!(output.records.len(), 7);

    let graphs = &output.graphs;
    assert_eq!(graphs.yearly.keys().copied().collect::<Vec<_>>(), vec![2015, 2018]);
    let year = &graphs.yearly[&2015];
    assert_eq!(year.total_weight(), 6);
    let franca = year
        .node(year.position("FRANCA").expect("international node present"))
        .expect("node exists");
    assert!(franca.international);

    let window = &graphs.windows[0];
    assert_eq!(window.most_recent.total_weight(), 6);
    assert_eq!(window.first_appearance.total_weight(), 6);
    assert!(window.most_recent.position("FRANCA").is_some());
    let self_hire = |graph: &lineage_core::HiringGraph| {
        graph.edges().any(|view| view.source == view.target)
    };
    assert!(self_hire(&window.most_recent));
    assert!(!self_hire(&window.first_appearance));
}

#[rstest]
fn pipeline_is_reproducible_for_a_seed(five_records: Vec<RawRecord>) {
    let pipeline = PipelineBuilder::new().with_seed(9).build().expect("valid configuration");
    let first = pipeline
        .run(five_records.clone(), mapping(), registry())
        .expect("pipeline runs");
    let second = pipeline
        .run(five_records, mapping(), registry())
        .expect("pipeline runs");
    assert_eq!(first.records, second.records);
}

#[rstest]
fn pipeline_records_stage_spans(five_records: Vec<RawRecord>) {
    let pipeline = PipelineBuilder::new().build().expect("valid configuration");
    let layer = RecordingLayer::default();
    layer
        .capture(|| pipeline.run(five_records, mapping(), registry()))
        .expect("pipeline runs");

    let span = layer.span("core.pipeline").expect("pipeline span recorded");
    assert_eq!(span.field("records"), Some("5"));
    assert_eq!(span.field("seed"), Some("42"));
    for stage in ["core.resolve_identities", "core.canonicalize", "core.build_graphs"] {
        assert!(layer.span(stage).is_some(), "{stage} span missing");
    }
    let completed = layer.events_with_message(Level::INFO, "institution canonicalization completed");
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].field("output_rows"), Some("5"));
}
