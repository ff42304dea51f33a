//! Canonical institution registry.

use std::{fs::File, io::Read, path::Path};

use lineage_core::{InstitutionRegistry, RegistryEntry};
use tracing::{info, instrument};

use crate::{errors::CsvProviderError, table::Table};

/// Table name reported in schema errors.
pub const REGISTRY_TABLE: &str = "registry";

/// Columns the registry must provide.
pub const REGISTRY_COLUMNS: [&str; 4] = ["abbr", "name", "state", "region"];

/// Reads the institution registry. Rows without an abbreviation are skipped
/// and the first row per abbreviation wins.
///
/// # Errors
/// Returns [`CsvProviderError::Schema`] when a column is missing, for
/// example a registry without `state`.
pub fn read_registry<R: Read>(reader: R) -> Result<InstitutionRegistry, CsvProviderError> {
    let mut table = Table::open(REGISTRY_TABLE, reader, &REGISTRY_COLUMNS)?;
    let mut entries = Vec::new();
    for row in table.rows() {
        let row = row?;
        let Some(abbr) = row.owned(0) else {
            continue;
        };
        entries.push(RegistryEntry {
            name: row.owned(1).unwrap_or_else(|| abbr.clone()),
            abbr,
            state: row.owned(2),
            region: row.owned(3),
        });
    }
    let rows = entries.len();
    let registry = InstitutionRegistry::from_entries(entries);
    info!(
        table = table.name(),
        rows,
        institutions = registry.len(),
        "table loaded"
    );
    Ok(registry)
}

/// Reads the registry from a CSV file.
///
/// # Errors
/// See [`read_registry`].
#[instrument(name = "providers.read_registry", skip_all, err)]
pub fn read_registry_path(path: impl AsRef<Path>) -> Result<InstitutionRegistry, CsvProviderError> {
    read_registry(File::open(path)?)
}
