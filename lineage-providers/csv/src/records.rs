//! Raw faculty records.

use std::{fs::File, io::Read, path::Path};

use lineage_core::{
    DEFAULT_INVALID_SENTINEL, FieldInfo, InstitutionPair, RawRecord, is_valid_value,
    normalize_text,
};
use tracing::{debug, info, instrument};

use crate::{errors::CsvProviderError, table::Table};

/// Table name reported in schema errors.
pub const RECORDS_TABLE: &str = "records";

/// Columns the raw record table must provide, in the order they are read.
pub const RECORD_COLUMNS: [&str; 14] = [
    "professor_name",
    "professor_document_number",
    "professor_birth_year",
    "professor_degree_year",
    "institution_name",
    "institution_abbr",
    "degree_institution_name",
    "degree_institution_abbr",
    "degree_institution_country",
    "field_id",
    "field_name",
    "big_field_id",
    "big_field_name",
    "base_year",
];

/// Reads raw records from CSV text with a header row.
///
/// Missing markers (`""`, `nan`, `none`, `null`) become `None`. Numeric
/// columns must hold integers. Institution names and abbreviations that
/// carry no information (placeholders, single letters, digits only) are
/// replaced by the `invalid` sentinel, and rows whose degree institution
/// has neither a valid name nor a valid abbreviation are skipped.
///
/// # Errors
/// Returns [`CsvProviderError::Schema`] when a column is missing and
/// [`CsvProviderError::InvalidNumber`] for a malformed numeric cell.
///
/// # Examples
/// ```
/// use lineage_providers_csv::{RECORD_COLUMNS, read_records};
///
/// let csv = format!(
///     "{}\nAna,1,1970,1999,Univ X,UX,Univ Y,UY,BRASIL,11,physics,1,exact,2015\n",
///     RECORD_COLUMNS.join(","),
/// );
/// let records = read_records(csv.as_bytes())?;
/// assert_eq!(records[0].base_year, 2015);
/// assert_eq!(records[0].employer.abbr.as_deref(), Some("UX"));
/// # Ok::<(), lineage_providers_csv::CsvProviderError>(())
/// ```
pub fn read_records<R: Read>(reader: R) -> Result<Vec<RawRecord>, CsvProviderError> {
    let mut table = Table::open(RECORDS_TABLE, reader, &RECORD_COLUMNS)?;
    let mut records = Vec::new();
    let mut skipped = 0_usize;
    for row in table.rows() {
        let row = row?;
        let degree_granter = screen_institution(row.text(6), row.text(7));
        if !has_valid_member(&degree_granter) {
            debug!(line = row.line(), "skipping row without a valid degree institution");
            skipped += 1;
            continue;
        }
        records.push(RawRecord {
            professor_name: row.owned(0),
            document_number: row.owned(1),
            birth_year: row.owned(2),
            degree_year: row.owned(3),
            employer: screen_institution(row.text(4), row.text(5)),
            degree_granter,
            degree_country: row.owned(8),
            field: FieldInfo::new(
                row.integer(9, "field_id")?,
                row.owned(10).unwrap_or_default(),
                row.integer(11, "big_field_id")?,
                row.owned(12).unwrap_or_default(),
            ),
            base_year: row.integer(13, "base_year")?,
        });
    }
    info!(table = table.name(), rows = records.len(), skipped, "table loaded");
    Ok(records)
}

/// Replaces uninformative institution cells with the invalid sentinel.
fn screen_institution<'a>(name: Option<&'a str>, abbr: Option<&'a str>) -> InstitutionPair {
    let screen = |value: &'a str| -> &'a str {
        if is_valid_value(&normalize_text(value)) {
            value
        } else {
            DEFAULT_INVALID_SENTINEL
        }
    };
    InstitutionPair::new(name.map(screen), abbr.map(screen))
}

fn has_valid_member(pair: &InstitutionPair) -> bool {
    [&pair.name, &pair.abbr]
        .into_iter()
        .flatten()
        .any(|value| value != DEFAULT_INVALID_SENTINEL)
}

/// Reads raw records from a CSV file.
///
/// # Errors
/// See [`read_records`]; opening the file may also fail with
/// [`CsvProviderError::Io`].
#[instrument(name = "providers.read_records", skip_all, err)]
pub fn read_records_path(path: impl AsRef<Path>) -> Result<Vec<RawRecord>, CsvProviderError> {
    read_records(File::open(path)?)
}
