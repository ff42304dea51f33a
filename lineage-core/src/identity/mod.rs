//! Professor identity resolution.
//!
//! Each raw record yields up to two equivalence keys ([`KeyScheme`]). Records
//! sharing a key value are unioned in a [`DisjointSet`]; every resulting
//! component becomes one professor. Records without any usable key, or whose
//! keys are unique, end up as singleton identities, so the output always
//! partitions the input.
//!
//! The partition depends only on the input. Identifier values are drawn from
//! the caller's RNG, which makes a whole run reproducible for a fixed seed.

mod keys;
mod union_find;

use std::collections::HashMap;

use rand::RngCore;
use tracing::{debug, info, instrument};

use crate::record::{AnonymizedRecord, ProfessorId, RawRecord};

pub use self::keys::KeyScheme;
pub use self::union_find::DisjointSet;

/// Counters describing one identity-resolution run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdentityReport {
    /// Number of input records.
    pub records: usize,
    /// Records with a well-formed document key.
    pub document_keys: usize,
    /// Records whose document key was missing or malformed.
    pub document_rejected: usize,
    /// Distinct document key values.
    pub distinct_document_keys: usize,
    /// Records with a well-formed demographic key.
    pub demographic_keys: usize,
    /// Records whose demographic key was missing or malformed.
    pub demographic_rejected: usize,
    /// Distinct demographic key values.
    pub distinct_demographic_keys: usize,
    /// Key values shared by two or more records.
    pub merge_groups: usize,
    /// Number of professor identities produced.
    pub identities: usize,
}

/// Output of [`resolve_identities`].
#[derive(Clone, Debug)]
pub struct IdentityResolution {
    assignments: Vec<ProfessorId>,
    groups: Vec<Vec<usize>>,
    report: IdentityReport,
}

impl IdentityResolution {
    /// Identity of each input record, by input position.
    #[must_use]
    pub fn assignments(&self) -> &[ProfessorId] {
        &self.assignments
    }

    /// Record positions grouped by identity, ordered by smallest member.
    #[must_use]
    pub fn groups(&self) -> &[Vec<usize>] {
        &self.groups
    }

    /// Number of distinct identities.
    #[must_use]
    pub fn identity_count(&self) -> usize {
        self.groups.len()
    }

    /// Counters gathered during resolution.
    #[must_use]
    pub fn report(&self) -> &IdentityReport {
        &self.report
    }

    /// Drops the personal fields of `records` and tags each with its identity.
    ///
    /// `records` must be the slice that was resolved; extra records beyond the
    /// resolved length are discarded.
    #[must_use]
    pub fn anonymize(&self, records: Vec<RawRecord>) -> Vec<AnonymizedRecord> {
        records
            .into_iter()
            .zip(self.assignments.iter().copied())
            .map(|(record, professor_id)| AnonymizedRecord {
                professor_id,
                employer: record.employer,
                degree_granter: record.degree_granter,
                degree_country: record.degree_country,
                field: record.field,
                base_year: record.base_year,
            })
            .collect()
    }
}

/// Groups raw records into identities without assigning identifiers.
///
/// Returns the partition ordered by smallest member, with members ascending,
/// together with the key counters.
#[must_use]
pub fn partition_records(records: &[RawRecord]) -> (Vec<Vec<usize>>, IdentityReport) {
    let mut report = IdentityReport {
        records: records.len(),
        ..IdentityReport::default()
    };
    let mut set = DisjointSet::new(records.len());

    for scheme in KeyScheme::ALL {
        let mut first_seen: HashMap<String, usize> = HashMap::new();
        let mut group_sizes: HashMap<usize, usize> = HashMap::new();
        for (index, record) in records.iter().enumerate() {
            let Some(key) = scheme.key(record) else {
                match scheme {
                    KeyScheme::Document => report.document_rejected += 1,
                    KeyScheme::Demographic => report.demographic_rejected += 1,
                }
                continue;
            };
            match scheme {
                KeyScheme::Document => report.document_keys += 1,
                KeyScheme::Demographic => report.demographic_keys += 1,
            }
            let anchor = *first_seen.entry(key).or_insert(index);
            *group_sizes.entry(anchor).or_insert(0) += 1;
            if anchor != index {
                set.union(anchor, index);
            }
        }
        let distinct = first_seen.len();
        let merging = group_sizes.values().filter(|&&size| size >= 2).count();
        debug!(
            scheme = scheme.as_str(),
            distinct, merging, "identity keys grouped"
        );
        match scheme {
            KeyScheme::Document => report.distinct_document_keys = distinct,
            KeyScheme::Demographic => report.distinct_demographic_keys = distinct,
        }
        report.merge_groups += merging;
    }

    let mut groups: Vec<Vec<usize>> = set.groups().into_values().collect();
    groups.sort_unstable_by_key(|members| members.first().copied());
    report.identities = groups.len();
    (groups, report)
}

/// Resolves every record to exactly one [`ProfessorId`].
///
/// # Examples
/// ```
/// use lineage_core::{FieldInfo, InstitutionPair, RawRecord, resolve_identities};
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let record = |name: &str, document: &str| RawRecord {
///     professor_name: Some(name.into()),
///     document_number: Some(document.into()),
///     birth_year: None,
///     degree_year: None,
///     employer: InstitutionPair::default(),
///     degree_granter: InstitutionPair::default(),
///     degree_country: None,
///     field: FieldInfo::new(1, "math", 10, "exact"),
///     base_year: 2010,
/// };
/// let records = vec![record("Ana", "1"), record("ANA", "1"), record("Bia", "2")];
/// let resolution = resolve_identities(&records, &mut SmallRng::seed_from_u64(42));
/// assert_eq!(resolution.identity_count(), 2);
/// assert_eq!(resolution.assignments()[0], resolution.assignments()[1]);
/// ```
#[instrument(name = "core.resolve_identities", skip_all, fields(records = records.len()))]
pub fn resolve_identities<R: RngCore + ?Sized>(
    records: &[RawRecord],
    rng: &mut R,
) -> IdentityResolution {
    let (groups, report) = partition_records(records);
    let placeholder = ProfessorId::from_random_bytes([0; 16]);
    let mut assignments = vec![placeholder; records.len()];
    for members in &groups {
        let mut bytes = [0_u8; 16];
        rng.fill_bytes(&mut bytes);
        let id = ProfessorId::from_random_bytes(bytes);
        for &member in members {
            if let Some(slot) = assignments.get_mut(member) {
                *slot = id;
            }
        }
    }
    info!(
        records = report.records,
        document_keys = report.distinct_document_keys,
        demographic_keys = report.distinct_demographic_keys,
        identities = report.identities,
        "identity resolution completed"
    );
    IdentityResolution {
        assignments,
        groups,
        report,
    }
}
