use std::collections::HashSet;

use rstest::{fixture, rstest};

use super::*;
use crate::{
    error::{GraphErrorCode, LineageError, LineageErrorCode},
    institution::{InstitutionRegistry, RegistryEntry},
    record::{CanonicalRecord, ProfessorId, ResolvedInstitution},
};

fn professor(tag: u8) -> ProfessorId {
    ProfessorId::from_random_bytes([tag; 16])
}

fn domestic(abbr: &str) -> ResolvedInstitution {
    ResolvedInstitution {
        abbr: Some(abbr.to_owned()),
        name: Some(format!("Universidade {abbr}")),
        state: None,
        region: None,
    }
}

fn row(tag: u8, degree: &str, employer: &str, field_id: u32, year: i32) -> CanonicalRecord {
    CanonicalRecord {
        professor_id: professor(tag),
        employer: domestic(employer),
        degree_granter: domestic(degree),
        international: false,
        field: FieldInfo::new(field_id, format!("field {field_id}"), 100, "big"),
        base_year: year,
    }
}

fn abroad(tag: u8, country: &str, employer: &str, year: i32) -> CanonicalRecord {
    let mut record = row(tag, country, employer, 1, year);
    record.degree_granter = ResolvedInstitution {
        abbr: Some(country.to_owned()),
        name: Some(country.to_owned()),
        state: Some(country.to_owned()),
        region: Some(country.to_owned()),
    };
    record.international = true;
    record
}

#[fixture]
fn registry() -> InstitutionRegistry {
    InstitutionRegistry::from_entries(["UFX", "UFY", "UFZ"].map(|abbr| RegistryEntry {
        abbr: abbr.to_owned(),
        name: format!("Universidade {abbr}"),
        state: Some(format!("state of {abbr}")),
        region: Some("Sudeste".to_owned()),
    }))
}

#[rstest]
fn yearly_edges_aggregate_by_field(registry: InstitutionRegistry) {
    let records = vec![
        row(1, "UFX", "UFY", 1, 2010),
        row(2, "UFX", "UFY", 1, 2010),
        row(3, "UFX", "UFY", 2, 2010),
        row(4, "UFY", "UFZ", 1, 2011),
    ];
    let set = GraphBuilder::new(&registry, "invalid").build(&records, &[]);
    let graph = set.yearly.get(&2010).expect("2010 graph exists");
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 2);
    let weights: Vec<_> = graph
        .edges()
        .map(|view| (view.edge.field.field_id, view.edge.weight, view.edge.base_year))
        .collect();
    assert_eq!(weights, vec![(1, 2, None), (2, 1, None)]);
    let ufx = graph.position("UFX").expect("UFX is a node");
    let ufy = graph.position("UFY").expect("UFY is a node");
    assert!(graph.edges().all(|view| view.source == ufx && view.target == ufy));
    assert_eq!(set.yearly.len(), 2);
}

#[rstest]
fn rows_without_both_endpoints_or_with_sentinel_are_skipped(registry: InstitutionRegistry) {
    let mut missing = row(1, "UFX", "UFY", 1, 2010);
    missing.employer.abbr = None;
    let records = vec![
        missing,
        row(2, "INVALID", "UFY", 1, 2010),
        row(3, "UFX", "invalid", 1, 2010),
        row(4, "UFX", "UFZ", 1, 2010),
    ];
    let builder = GraphBuilder::new(&registry, "invalid");
    assert_eq!(builder.edge_rows(&records).len(), 1);
    let set = builder.build(&records, &[]);
    let graph = set.yearly.get(&2010).expect("graph exists");
    assert_eq!(graph.total_weight(), 1);
}

#[rstest]
fn node_attributes_come_from_registry_and_source_flags(registry: InstitutionRegistry) {
    let records = vec![
        abroad(1, "FRANCA", "UFX", 2010),
        row(2, "UFY", "UFX", 1, 2012),
    ];
    let set = GraphBuilder::new(&registry, "invalid").build(&records, &[]);
    let later = set.yearly.get(&2012).expect("2012 graph exists");
    let ufx = later
        .node(later.position("UFX").expect("UFX present"))
        .expect("node exists");
    assert!(!ufx.international);
    assert_eq!(ufx.state.as_deref(), Some("state of UFX"));

    let early = set.yearly.get(&2010).expect("2010 graph exists");
    let franca = early
        .node(early.position("FRANCA").expect("country node present"))
        .expect("node exists");
    assert!(franca.international);
    assert_eq!(franca.state, None);
    assert_eq!(franca.region, None);
}

#[rstest]
fn window_variants_pick_extreme_years(registry: InstitutionRegistry) {
    let records = vec![
        row(1, "UFX", "UFY", 1, 2003),
        row(1, "UFX", "UFY", 1, 2005),
        row(1, "UFX", "UFZ", 1, 2005),
        row(1, "UFX", "UFZ", 1, 2009),
        row(2, "UFY", "UFZ", 1, 2007),
    ];
    let builder = GraphBuilder::new(&registry, "invalid");
    let rows = builder.edge_rows(&records);
    let window = TimeWindow::new(2004, 2010).expect("valid window");
    let first = select_window_rows(&rows, window, WindowVariant::FirstAppearance);
    let latest = select_window_rows(&rows, window, WindowVariant::MostRecent);
    let years = |selected: &[&CanonicalRecord]| -> Vec<(u8, i32)> {
        selected
            .iter()
            .map(|r| (r.professor_id.as_uuid().as_bytes()[0], r.base_year))
            .collect()
    };
    assert_eq!(years(&first), vec![(1, 2005), (1, 2005), (2, 2007)]);
    assert_eq!(years(&latest), vec![(1, 2009), (2, 2007)]);

    let windowed = builder.windowed(&rows, &HashSet::new(), window);
    assert_eq!(windowed.first_appearance.total_weight(), 3);
    assert_eq!(windowed.most_recent.total_weight(), 2);
    assert!(
        windowed
            .most_recent
            .edges()
            .all(|view| view.edge.base_year.is_some())
    );
}

#[rstest]
fn counts_cover_three_granularities() {
    let records = [
        row(1, "UFX", "UFY", 1, 2010),
        row(1, "UFX", "UFY", 2, 2010),
        row(2, "UFX", "UFY", 2, 2010),
    ];
    let counts = professor_counts("2010", records.iter());
    let summary: Vec<_> = counts
        .iter()
        .map(|count| (count.granularity, count.field_id, count.professors))
        .collect();
    assert_eq!(
        summary,
        vec![
            (CountGranularity::Global, None, 2),
            (CountGranularity::BigField, None, 2),
            (CountGranularity::Field, Some(1), 1),
            (CountGranularity::Field, Some(2), 2),
        ]
    );
    assert!(counts.iter().all(|count| count.period == "2010"));
}

#[rstest]
fn graph_set_orders_counts_years_then_windows(registry: InstitutionRegistry) {
    let records = vec![row(1, "UFX", "UFY", 1, 2012), row(2, "UFX", "UFY", 1, 2011)];
    let windows = [TimeWindow::new(2011, 2020).expect("valid window")];
    let set = GraphBuilder::new(&registry, "invalid").build(&records, &windows);
    let periods: Vec<_> = set
        .professor_counts
        .iter()
        .filter(|count| count.granularity == CountGranularity::Global)
        .map(|count| (count.period.as_str(), count.professors))
        .collect();
    assert_eq!(periods, vec![("2011", 1), ("2012", 1), ("2011-2020", 2)]);
}

#[rstest]
fn artifact_round_trip_preserves_order_and_attributes(registry: InstitutionRegistry) {
    let records = vec![
        abroad(1, "ALEMANHA", "UFZ", 2015),
        row(2, "UFY", "UFX", 3, 2015),
        row(3, "UFY", "UFX", 1, 2015),
    ];
    let window = TimeWindow::new(2015, 2015).expect("valid window");
    let set = GraphBuilder::new(&registry, "invalid").build(&records, &[window]);
    let graph = &set.windows[0].most_recent;

    let mut buffer = Vec::new();
    graph.to_writer(&mut buffer).expect("graph serializes");
    let restored = HiringGraph::from_reader(buffer.as_slice()).expect("graph deserializes");
    assert_eq!(GraphArtifact::from(&restored), GraphArtifact::from(graph));
    let json: serde_json::Value = serde_json::from_slice(&buffer).expect("valid json");
    assert_eq!(json["edges"][0]["base_year"], 2015);
    assert!(json["nodes"][0].get("state").is_none());
}

#[rstest]
fn artifact_with_unknown_endpoint_is_rejected() {
    let json = r#"{"nodes":[{"id":"A","international":false}],
        "edges":[{"source":"A","target":"B","weight":1,"field_id":1,
        "field_name":"f","big_field_id":2,"big_field_name":"g"}]}"#;
    let err = HiringGraph::from_reader(json.as_bytes()).expect_err("B is undeclared");
    assert_eq!(err.code(), GraphErrorCode::UnknownNode);
}

#[rstest]
fn duplicate_nodes_are_rejected() {
    let mut graph = HiringGraph::new();
    graph
        .add_node(InstitutionNode::new("A"))
        .expect("first insert succeeds");
    let err = graph
        .add_node(InstitutionNode::new("A"))
        .expect_err("second insert fails");
    assert_eq!(err.code(), GraphErrorCode::DuplicateNode);
}

#[rstest]
#[case::reversed("2020-2011", LineageErrorCode::InvalidTimeWindow)]
#[case::no_dash("2020", LineageErrorCode::MalformedTimeWindow)]
#[case::not_numbers("a-b", LineageErrorCode::MalformedTimeWindow)]
fn malformed_windows_are_rejected(#[case] label: &str, #[case] expected: LineageErrorCode) {
    let err: LineageError = label.parse::<TimeWindow>().expect_err("label is invalid");
    assert_eq!(err.code(), expected);
}

#[rstest]
fn file_names_follow_period_labels() {
    let window = TimeWindow::new(2004, 2024).expect("valid window");
    assert_eq!(yearly_file_name(2019), "2019.json");
    assert_eq!(
        window_file_name(window, WindowVariant::FirstAppearance),
        "2004-2024-first-appearance.json"
    );
    assert_eq!(TimeWindow::defaults().len(), DEFAULT_TIME_WINDOWS.len());
}
