//! Fixtures shared by the lineage-core integration suites.

use lineage_core::{
    FieldInfo, InstitutionPair, InstitutionRegistry, MappingEntry, MappingTable, RawRecord,
    RegistryEntry,
};

/// Raw record employed at `employer` with a degree from `degree`, keyed only
/// by name and document.
#[must_use]
pub fn raw(name: &str, document: Option<&str>, employer: (&str, &str), degree: (&str, &str)) -> RawRecord {
    RawRecord {
        professor_name: Some(name.to_owned()),
        document_number: document.map(ToOwned::to_owned),
        birth_year: None,
        degree_year: None,
        employer: InstitutionPair::new(Some(employer.0), Some(employer.1)),
        degree_granter: InstitutionPair::new(Some(degree.0), Some(degree.1)),
        degree_country: Some("BRASIL".to_owned()),
        field: FieldInfo::new(11, "physics", 1, "exact sciences"),
        base_year: 2015,
    }
}

#[must_use]
pub fn mapping() -> MappingTable {
    MappingTable::from_entries([
        entry("Fed Univ X", "FUX", "UFX/UFY"),
        entry("Univ Federal X", "UFX", "UFX"),
        entry("Univ Federal Y", "UFY", "UFY"),
        entry("Univ Federal Z", "UFZ", "UFZ"),
        entry("Closed College", "CC", "invalid"),
        entry("Sorbonne", "P1", "SORBONNE"),
    ])
}

#[must_use]
pub fn registry() -> InstitutionRegistry {
    InstitutionRegistry::from_entries(["UFX", "UFY", "UFZ"].map(|abbr| RegistryEntry {
        abbr: abbr.to_owned(),
        name: format!("Universidade Federal {abbr}"),
        state: Some("RJ".to_owned()),
        region: Some("Sudeste".to_owned()),
    }))
}

fn entry(name: &str, abbr: &str, mapped: &str) -> MappingEntry {
    MappingEntry {
        name: name.to_owned(),
        abbr: abbr.to_owned(),
        mapped_abbr: Some(mapped.to_owned()),
    }
}
