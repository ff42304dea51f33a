//! Distinct professor counts per period at three granularities.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::record::{CanonicalRecord, ProfessorId};

/// Granularity of a [`ProfessorCount`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountGranularity {
    /// Every professor in the period.
    Global,
    /// Professors per big field.
    BigField,
    /// Professors per field.
    Field,
}

/// One row of the professor count table.
///
/// Serializes with the column names `period, type, n_prof, big_field_id,
/// big_field_name, field_id, field_name`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessorCount {
    /// Period label: a year or `start-end`.
    pub period: String,
    /// Granularity of the count.
    #[serde(rename = "type")]
    pub granularity: CountGranularity,
    /// Distinct professors.
    #[serde(rename = "n_prof")]
    pub professors: usize,
    /// Big field id for `big_field` and `field` rows.
    pub big_field_id: Option<u32>,
    /// Big field name for `big_field` and `field` rows.
    pub big_field_name: Option<String>,
    /// Field id for `field` rows.
    pub field_id: Option<u32>,
    /// Field name for `field` rows.
    pub field_name: Option<String>,
}

/// Counts distinct professors in `rows` globally, per big field and per
/// field, in that order. Groups are sorted by their identifiers.
///
/// # Examples
/// ```
/// use lineage_core::{CountGranularity, professor_counts};
///
/// let counts = professor_counts("2010", std::iter::empty());
/// assert_eq!(counts.len(), 1);
/// assert_eq!(counts[0].granularity, CountGranularity::Global);
/// assert_eq!(counts[0].professors, 0);
/// ```
#[must_use]
pub fn professor_counts<'a, I>(period: &str, rows: I) -> Vec<ProfessorCount>
where
    I: IntoIterator<Item = &'a CanonicalRecord>,
{
    let mut global: HashSet<ProfessorId> = HashSet::new();
    let mut by_big_field: BTreeMap<(u32, &str), HashSet<ProfessorId>> = BTreeMap::new();
    let mut by_field: BTreeMap<(u32, &str, u32, &str), HashSet<ProfessorId>> = BTreeMap::new();
    for row in rows {
        let field = &row.field;
        global.insert(row.professor_id);
        by_big_field
            .entry((field.big_field_id, field.big_field_name.as_str()))
            .or_default()
            .insert(row.professor_id);
        by_field
            .entry((
                field.field_id,
                field.field_name.as_str(),
                field.big_field_id,
                field.big_field_name.as_str(),
            ))
            .or_default()
            .insert(row.professor_id);
    }

    let mut counts = Vec::with_capacity(1 + by_big_field.len() + by_field.len());
    counts.push(ProfessorCount {
        period: period.to_owned(),
        granularity: CountGranularity::Global,
        professors: global.len(),
        big_field_id: None,
        big_field_name: None,
        field_id: None,
        field_name: None,
    });
    for ((big_field_id, big_field_name), professors) in by_big_field {
        counts.push(ProfessorCount {
            period: period.to_owned(),
            granularity: CountGranularity::BigField,
            professors: professors.len(),
            big_field_id: Some(big_field_id),
            big_field_name: Some(big_field_name.to_owned()),
            field_id: None,
            field_name: None,
        });
    }
    for ((field_id, field_name, big_field_id, big_field_name), professors) in by_field {
        counts.push(ProfessorCount {
            period: period.to_owned(),
            granularity: CountGranularity::Field,
            professors: professors.len(),
            big_field_id: Some(big_field_id),
            big_field_name: Some(big_field_name.to_owned()),
            field_id: Some(field_id),
            field_name: Some(field_name.to_owned()),
        });
    }
    counts
}
