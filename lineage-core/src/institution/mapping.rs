//! Many-to-many lookup from raw institution pairs to canonical abbreviations.

use std::collections::{BTreeSet, HashMap};

use crate::record::InstitutionPair;

/// Delimiter separating canonical candidates inside one mapped value.
pub const CANDIDATE_DELIMITER: char = '/';

/// One row of the mapping table as supplied by the curators.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MappingEntry {
    /// Raw institution name the row matches.
    pub name: String,
    /// Raw institution abbreviation the row matches.
    pub abbr: String,
    /// Canonical abbreviation, possibly several joined by `/`.
    pub mapped_abbr: Option<String>,
}

/// Aggregated mapping table keyed by the raw `(name, abbr)` pair.
///
/// Rows sharing a raw pair are merged into one sorted set of distinct
/// candidates. Mapped values that already hold several `/`-separated
/// candidates contribute each of them.
///
/// # Examples
/// ```
/// use lineage_core::{InstitutionPair, MappingEntry, MappingTable};
///
/// let table = MappingTable::from_entries([
///     MappingEntry { name: "Fed Univ X".into(), abbr: "FUX".into(), mapped_abbr: Some("UFY".into()) },
///     MappingEntry { name: "Fed Univ X".into(), abbr: "FUX".into(), mapped_abbr: Some("UFX".into()) },
/// ]);
/// let pair = InstitutionPair::new(Some("Fed Univ X"), Some("FUX"));
/// assert_eq!(table.joined(&pair).as_deref(), Some("UFX/UFY"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct MappingTable {
    entries: HashMap<(String, String), Vec<String>>,
}

impl MappingTable {
    /// Aggregates raw mapping rows.
    #[must_use]
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = MappingEntry>,
    {
        let mut grouped: HashMap<(String, String), BTreeSet<String>> = HashMap::new();
        for entry in entries {
            let candidates = grouped.entry((entry.name, entry.abbr)).or_default();
            let Some(mapped) = entry.mapped_abbr else {
                continue;
            };
            candidates.extend(
                mapped
                    .split(CANDIDATE_DELIMITER)
                    .map(str::trim)
                    .filter(|candidate| !candidate.is_empty())
                    .map(ToOwned::to_owned),
            );
        }
        Self {
            entries: grouped
                .into_iter()
                .map(|(key, candidates)| (key, candidates.into_iter().collect()))
                .collect(),
        }
    }

    /// Number of distinct raw pairs in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the table holds no raw pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the sorted candidates for `pair`.
    ///
    /// `None` means the pair is unresolved: either it has no row, one of its
    /// components is missing, or every row mapped it to nothing.
    #[must_use]
    pub fn candidates(&self, pair: &InstitutionPair) -> Option<&[String]> {
        let name = pair.name.as_deref()?;
        let abbr = pair.abbr.as_deref()?;
        self.entries
            .get(&(name.to_owned(), abbr.to_owned()))
            .map(Vec::as_slice)
            .filter(|candidates| !candidates.is_empty())
    }

    /// Returns the candidates of `pair` joined with `/`.
    #[must_use]
    pub fn joined(&self, pair: &InstitutionPair) -> Option<String> {
        let delimiter = CANDIDATE_DELIMITER.to_string();
        self.candidates(pair)
            .map(|candidates| candidates.join(delimiter.as_str()))
    }
}
