//! Institution canonicalization.
//!
//! Each anonymized record names two institutions by raw `(name, abbr)` pairs.
//! The [`MappingTable`] turns every pair into zero or more canonical
//! candidates; records with several candidates for a role are expanded into
//! the cross product of both roles' candidates. Unresolved roles pass through
//! as a single row without an abbreviation. Rows whose resolved abbreviation
//! is the invalid sentinel are then dropped, and the survivors are joined
//! against the [`InstitutionRegistry`]. Degree institutions missing from the
//! registry are reclassified as international, taking every attribute from
//! the raw country of degree.

mod mapping;
mod registry;

use std::collections::HashSet;

use tracing::{info, instrument, warn};

use crate::{
    error::{LineageError, Result},
    record::{AnonymizedRecord, CanonicalRecord, InstitutionPair, ResolvedInstitution},
};

pub use self::mapping::{CANDIDATE_DELIMITER, MappingEntry, MappingTable};
pub use self::registry::{InstitutionRegistry, RegistryEntry};

/// Abbreviation curators use to mark a raw pair as unusable.
pub const DEFAULT_INVALID_SENTINEL: &str = "invalid";

/// Counters describing one canonicalization run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CanonicalizationReport {
    /// Records supplied.
    pub input_rows: usize,
    /// Rows after candidate expansion, before the sentinel filter.
    pub expanded_rows: usize,
    /// Records whose employer pair had no mapping.
    pub unresolved_employers: usize,
    /// Records whose degree pair had no mapping.
    pub unresolved_degrees: usize,
    /// Expanded rows dropped because a role resolved to the sentinel.
    pub dropped_invalid: usize,
    /// Surviving rows whose degree institution is international.
    pub international_rows: usize,
    /// Distinct raw employer pairs in the input.
    pub employers_before: usize,
    /// Distinct raw degree pairs in the input.
    pub degree_institutions_before: usize,
    /// Distinct canonical employers in the output.
    pub employers_after: usize,
    /// Distinct canonical degree institutions in the output.
    pub degree_institutions_after: usize,
}

/// Output of [`Canonicalizer::canonicalize`].
#[derive(Clone, Debug)]
pub struct Canonicalization {
    /// Canonical rows in input order, expanded rows adjacent.
    pub records: Vec<CanonicalRecord>,
    /// Counters gathered during the run.
    pub report: CanonicalizationReport,
}

/// Resolves raw institution pairs to canonical institutions.
///
/// # Examples
/// ```
/// use lineage_core::{
///     Canonicalizer, InstitutionRegistry, MappingEntry, MappingTable, RegistryEntry,
/// };
///
/// let mapping = MappingTable::from_entries([MappingEntry {
///     name: "Fed Univ X".into(),
///     abbr: "FUX".into(),
///     mapped_abbr: Some("UFX".into()),
/// }]);
/// let registry = InstitutionRegistry::from_entries([RegistryEntry {
///     abbr: "UFX".into(),
///     name: "Universidade Federal X".into(),
///     state: Some("RJ".into()),
///     region: Some("Sudeste".into()),
/// }]);
/// let canonicalizer = Canonicalizer::new(mapping, registry);
/// assert_eq!(canonicalizer.sentinel(), "invalid");
/// ```
#[derive(Clone, Debug)]
pub struct Canonicalizer {
    mapping: MappingTable,
    registry: InstitutionRegistry,
    sentinel: String,
}

impl Canonicalizer {
    /// Creates a canonicalizer using the default `invalid` sentinel.
    #[must_use]
    pub fn new(mapping: MappingTable, registry: InstitutionRegistry) -> Self {
        Self {
            mapping,
            registry,
            sentinel: DEFAULT_INVALID_SENTINEL.to_owned(),
        }
    }

    /// Replaces the invalid sentinel.
    ///
    /// # Errors
    /// Returns [`LineageError::EmptySentinel`] when `sentinel` is blank.
    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Result<Self> {
        let sentinel = sentinel.into();
        if sentinel.trim().is_empty() {
            return Err(LineageError::EmptySentinel);
        }
        self.sentinel = sentinel;
        Ok(self)
    }

    /// Returns the invalid sentinel compared case-insensitively.
    #[must_use]
    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    /// Returns the domestic registry.
    #[must_use]
    pub fn registry(&self) -> &InstitutionRegistry {
        &self.registry
    }

    /// Returns the aggregated mapping table.
    #[must_use]
    pub fn mapping(&self) -> &MappingTable {
        &self.mapping
    }

    /// Expands one record into one row per pair of candidates.
    ///
    /// The sentinel filter and registry join are not applied here.
    #[must_use]
    pub fn expand(&self, record: &AnonymizedRecord) -> Vec<(Option<String>, Option<String>)> {
        let employers = self.role_candidates(&record.employer);
        let degrees = self.role_candidates(&record.degree_granter);
        let mut rows = Vec::with_capacity(employers.len() * degrees.len());
        for employer in &employers {
            for degree in &degrees {
                rows.push((employer.clone(), degree.clone()));
            }
        }
        rows
    }

    /// Canonicalizes every record.
    #[instrument(
        name = "core.canonicalize",
        skip_all,
        fields(records = records.len(), sentinel = %self.sentinel),
    )]
    pub fn canonicalize(&self, records: &[AnonymizedRecord]) -> Canonicalization {
        let mut report = CanonicalizationReport {
            input_rows: records.len(),
            ..CanonicalizationReport::default()
        };
        let mut employers_before: HashSet<&InstitutionPair> = HashSet::new();
        let mut degrees_before: HashSet<&InstitutionPair> = HashSet::new();
        let mut output = Vec::with_capacity(records.len());

        for record in records {
            employers_before.insert(&record.employer);
            degrees_before.insert(&record.degree_granter);
            if self.mapping.candidates(&record.employer).is_none() {
                report.unresolved_employers += 1;
            }
            if self.mapping.candidates(&record.degree_granter).is_none() {
                report.unresolved_degrees += 1;
            }

            let rows = self.expand(record);
            report.expanded_rows += rows.len();
            for (employer, degree) in rows {
                if self.is_sentinel(employer.as_deref()) || self.is_sentinel(degree.as_deref()) {
                    report.dropped_invalid += 1;
                    continue;
                }
                let resolved = self.resolve(record, employer, degree);
                if resolved.international {
                    report.international_rows += 1;
                }
                output.push(resolved);
            }
        }

        report.employers_before = employers_before.len();
        report.degree_institutions_before = degrees_before.len();
        report.employers_after = distinct_institutions(output.iter().map(|r| &r.employer));
        report.degree_institutions_after =
            distinct_institutions(output.iter().map(|r| &r.degree_granter));

        record_exploded_rows(report.expanded_rows.saturating_sub(report.input_rows));
        record_dropped_invalid(report.dropped_invalid);
        record_unresolved(report.unresolved_employers + report.unresolved_degrees);
        if report.unresolved_employers + report.unresolved_degrees > 0 {
            warn!(
                employers = report.unresolved_employers,
                degrees = report.unresolved_degrees,
                "institution pairs without a mapping passed through unresolved"
            );
        }
        info!(
            input_rows = report.input_rows,
            expanded_rows = report.expanded_rows,
            dropped_invalid = report.dropped_invalid,
            output_rows = output.len(),
            international_rows = report.international_rows,
            "institution canonicalization completed"
        );
        Canonicalization {
            records: output,
            report,
        }
    }

    fn role_candidates(&self, pair: &InstitutionPair) -> Vec<Option<String>> {
        match self.mapping.candidates(pair) {
            Some(candidates) => candidates.iter().cloned().map(Some).collect(),
            None => vec![None],
        }
    }

    fn is_sentinel(&self, abbr: Option<&str>) -> bool {
        abbr.is_some_and(|value| value.eq_ignore_ascii_case(&self.sentinel))
    }

    fn resolve(
        &self,
        record: &AnonymizedRecord,
        employer: Option<String>,
        degree: Option<String>,
    ) -> CanonicalRecord {
        let employer = self.domestic(employer);
        let domestic_degree = degree
            .as_deref()
            .filter(|abbr| self.registry.contains(abbr))
            .is_some();
        let (degree_granter, international) = if domestic_degree {
            (self.domestic(degree), false)
        } else {
            let country = record.degree_country.clone();
            (
                ResolvedInstitution {
                    abbr: country.clone(),
                    name: country.clone(),
                    state: country.clone(),
                    region: country,
                },
                true,
            )
        };
        CanonicalRecord {
            professor_id: record.professor_id,
            employer,
            degree_granter,
            international,
            field: record.field.clone(),
            base_year: record.base_year,
        }
    }

    fn domestic(&self, abbr: Option<String>) -> ResolvedInstitution {
        let entry = abbr.as_deref().and_then(|value| self.registry.get(value));
        ResolvedInstitution {
            name: entry.map(|e| e.name.clone()),
            state: entry.and_then(|e| e.state.clone()),
            region: entry.and_then(|e| e.region.clone()),
            abbr,
        }
    }
}

fn distinct_institutions<'a, I>(institutions: I) -> usize
where
    I: Iterator<Item = &'a ResolvedInstitution>,
{
    institutions
        .map(|institution| (institution.abbr.as_deref(), institution.name.as_deref()))
        .collect::<HashSet<_>>()
        .len()
}

#[cfg(feature = "metrics")]
fn record_exploded_rows(rows: usize) {
    metrics::counter!("lineage_rows_exploded").increment(rows as u64);
}

#[cfg(not(feature = "metrics"))]
fn record_exploded_rows(_rows: usize) {}

#[cfg(feature = "metrics")]
fn record_dropped_invalid(rows: usize) {
    metrics::counter!("lineage_rows_dropped_invalid").increment(rows as u64);
}

#[cfg(not(feature = "metrics"))]
fn record_dropped_invalid(_rows: usize) {}

#[cfg(feature = "metrics")]
fn record_unresolved(pairs: usize) {
    metrics::counter!("lineage_mappings_unresolved").increment(pairs as u64);
}

#[cfg(not(feature = "metrics"))]
fn record_unresolved(_pairs: usize) {}
