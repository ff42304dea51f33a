use std::io::Cursor;

use lineage_core::{InstitutionPair, LineageError, professor_counts};
use rstest::rstest;

use super::*;

fn records_csv(rows: &[&str]) -> String {
    let mut text = RECORD_COLUMNS.join(",");
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text.push('\n');
    text
}

#[rstest]
fn reads_records_with_missing_markers() {
    let csv = records_csv(&[
        "Ana Souza,nan,1970,,Univ X,UX,Univ Y,UY,BRASIL,11,physics,1,exact,2015",
        "Bruno,123,NULL,2001, , UZ ,Sorbonne,P1,FRANCA,11.0,physics,1.0,exact,2016.0",
    ]);
    let records = read_records(Cursor::new(csv)).expect("records parse");
    assert_eq!(records.len(), 2);

    let ana = &records[0];
    assert_eq!(ana.professor_name.as_deref(), Some("Ana Souza"));
    assert_eq!(ana.document_number, None);
    assert_eq!(ana.degree_year, None);
    assert_eq!(ana.field.field_id, 11);

    let bruno = &records[1];
    assert_eq!(bruno.birth_year, None);
    assert_eq!(bruno.employer, InstitutionPair::new(None, Some("UZ")));
    assert_eq!(bruno.degree_country.as_deref(), Some("FRANCA"));
    assert_eq!(bruno.field.big_field_id, 1);
    assert_eq!(bruno.base_year, 2016);
}

#[rstest]
fn uninformative_institution_cells_become_the_sentinel() {
    let csv = records_csv(&[
        "Ana,1,1970,1999,Nao Informado,X,Univ Y,123,BRASIL,11,physics,1,exact,2015",
        "Bia,2,1971,2000,Univ X,UX,--,Outro,BRASIL,11,physics,1,exact,2015",
        "Caio,3,1972,2001,Univ X,UX,nan,UY,BRASIL,11,physics,1,exact,2015",
    ]);
    let records = read_records(csv.as_bytes()).expect("records parse");
    assert_eq!(records.len(), 2);
    assert_eq!(
        records[0].employer,
        InstitutionPair::new(Some("invalid"), Some("invalid"))
    );
    assert_eq!(
        records[0].degree_granter,
        InstitutionPair::new(Some("Univ Y"), Some("invalid"))
    );
    assert_eq!(records[1].professor_name.as_deref(), Some("Caio"));
    assert_eq!(records[1].degree_granter, InstitutionPair::new(None, Some("UY")));
}

#[rstest]
fn column_order_does_not_matter() {
    let mut columns = RECORD_COLUMNS.to_vec();
    columns.reverse();
    let mut values = vec![
        "Ana", "1", "1970", "1999", "Univ X", "UX", "Univ Y", "UY", "BRASIL", "11", "physics", "1",
        "exact", "2015",
    ];
    values.reverse();
    let csv = format!("{},extra\n{},ignored\n", columns.join(","), values.join(","));
    let records = read_records(csv.as_bytes()).expect("records parse");
    assert_eq!(records[0].professor_name.as_deref(), Some("Ana"));
    assert_eq!(records[0].degree_granter.abbr.as_deref(), Some("UY"));
    assert_eq!(records[0].base_year, 2015);
}

#[rstest]
fn byte_order_mark_is_ignored() {
    let csv = format!("\u{feff}{}", "name,abbr,mapped_abbr\nUniv X,UX,UFX\n");
    let mapping = read_mapping(csv.as_bytes()).expect("mapping parses");
    assert_eq!(mapping.len(), 1);
}

#[rstest]
#[case("x")]
#[case("")]
#[case("20.5")]
fn rejects_non_integer_years(#[case] year: &str) {
    let csv = records_csv(&[&format!(
        "Ana,1,1970,1999,Univ X,UX,Univ Y,UY,BRASIL,11,physics,1,exact,{year}"
    )]);
    let error = read_records(csv.as_bytes()).expect_err("year must be numeric");
    match error {
        CsvProviderError::InvalidNumber {
            table,
            line,
            column,
            value,
        } => {
            assert_eq!(table, RECORDS_TABLE);
            assert_eq!(line, 2);
            assert_eq!(column, "base_year");
            assert_eq!(value, year);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[rstest]
fn missing_record_columns_are_reported() {
    let error = read_records("professor_name,base_year\nAna,2015\n".as_bytes())
        .expect_err("schema is incomplete");
    assert!(error.is_schema_mismatch());
    match error {
        CsvProviderError::Schema(LineageError::SchemaMismatch { table, missing }) => {
            assert_eq!(&*table, RECORDS_TABLE);
            assert_eq!(missing.len(), RECORD_COLUMNS.len() - 2);
            assert!(missing.iter().any(|column| column == "field_id"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[rstest]
fn registry_without_region_is_a_schema_error() {
    let error =
        read_registry("abbr,name,state\nUFX,Univ X,RJ\n".as_bytes()).expect_err("region missing");
    assert!(error.is_schema_mismatch());
    assert_eq!(
        error.to_string(),
        "table `registry` is missing required columns: region"
    );
}

#[rstest]
fn mapping_rows_aggregate_and_skip_incomplete_pairs() {
    let csv = "name,abbr,mapped_abbr\n\
               Fed Univ X,FUX,UFY\n\
               Fed Univ X,FUX,UFX\n\
               ,UX,UFX\n\
               Closed,CC,invalid\n\
               Gone,GN,\n";
    let mapping = read_mapping(csv.as_bytes()).expect("mapping parses");
    assert_eq!(mapping.len(), 3);
    let pair = InstitutionPair::new(Some("Fed Univ X"), Some("FUX"));
    assert_eq!(mapping.joined(&pair).as_deref(), Some("UFX/UFY"));
    let gone = InstitutionPair::new(Some("Gone"), Some("GN"));
    assert_eq!(mapping.candidates(&gone), None);
}

#[rstest]
fn registry_keeps_first_row_and_defaults_names() {
    let csv = "abbr,name,state,region\n\
               UFX,Univ X,RJ,Sudeste\n\
               UFX,Duplicate,SP,Sudeste\n\
               UFY,,MG,nan\n\
               ,Nameless,BA,Nordeste\n";
    let registry = read_registry(csv.as_bytes()).expect("registry parses");
    assert_eq!(registry.len(), 2);
    let first = registry.get("UFX").expect("UFX registered");
    assert_eq!(first.name, "Univ X");
    assert_eq!(first.state.as_deref(), Some("RJ"));
    let second = registry.get("UFY").expect("UFY registered");
    assert_eq!(second.name, "UFY");
    assert_eq!(second.region, None);
}

#[rstest]
fn counts_serialize_with_stable_header() {
    let mut buffer = Vec::new();
    write_professor_counts(&mut buffer, &professor_counts("2011-2020", std::iter::empty()))
        .expect("counts serialize");
    let text = String::from_utf8(buffer).expect("utf-8 output");
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("period,type,n_prof,big_field_id,big_field_name,field_id,field_name")
    );
    assert_eq!(lines.next(), Some("2011-2020,global,0,,,,"));
    assert_eq!(lines.next(), None);
}
