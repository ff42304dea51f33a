//! Curated mapping from raw institution pairs to canonical abbreviations.

use std::{fs::File, io::Read, path::Path};

use lineage_core::{MappingEntry, MappingTable};
use tracing::{debug, info, instrument};

use crate::{errors::CsvProviderError, table::Table};

/// Table name reported in schema errors.
pub const MAPPING_TABLE: &str = "mapping";

/// Columns the mapping table must provide.
pub const MAPPING_COLUMNS: [&str; 3] = ["name", "abbr", "mapped_abbr"];

/// Reads and aggregates the mapping table.
///
/// Rows without a raw name or abbreviation can never match a record and are
/// skipped.
///
/// # Errors
/// Returns [`CsvProviderError::Schema`] when a column is missing.
///
/// # Examples
/// ```
/// use lineage_core::InstitutionPair;
/// use lineage_providers_csv::read_mapping;
///
/// let csv = "name,abbr,mapped_abbr\nFed Univ X,FUX,UFX\nFed Univ X,FUX,UFY\n";
/// let table = read_mapping(csv.as_bytes())?;
/// let pair = InstitutionPair::new(Some("Fed Univ X"), Some("FUX"));
/// assert_eq!(table.joined(&pair).as_deref(), Some("UFX/UFY"));
/// # Ok::<(), lineage_providers_csv::CsvProviderError>(())
/// ```
pub fn read_mapping<R: Read>(reader: R) -> Result<MappingTable, CsvProviderError> {
    let mut table = Table::open(MAPPING_TABLE, reader, &MAPPING_COLUMNS)?;
    let mut entries = Vec::new();
    let mut skipped = 0_usize;
    for row in table.rows() {
        let row = row?;
        let (Some(name), Some(abbr)) = (row.owned(0), row.owned(1)) else {
            debug!(line = row.line(), "mapping row without a raw pair skipped");
            skipped += 1;
            continue;
        };
        entries.push(MappingEntry {
            name,
            abbr,
            mapped_abbr: row.owned(2),
        });
    }
    let rows = entries.len();
    let mapping = MappingTable::from_entries(entries);
    info!(
        table = table.name(),
        rows,
        skipped,
        pairs = mapping.len(),
        "table loaded"
    );
    Ok(mapping)
}

/// Reads the mapping table from a CSV file.
///
/// # Errors
/// See [`read_mapping`].
#[instrument(name = "providers.read_mapping", skip_all, err)]
pub fn read_mapping_path(path: impl AsRef<Path>) -> Result<MappingTable, CsvProviderError> {
    read_mapping(File::open(path)?)
}
