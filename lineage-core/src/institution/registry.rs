//! Domestic institution registry keyed by canonical abbreviation.

use std::collections::HashMap;

/// Canonical attributes of one domestic institution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistryEntry {
    /// Canonical abbreviation.
    pub abbr: String,
    /// Canonical display name.
    pub name: String,
    /// State the institution belongs to.
    pub state: Option<String>,
    /// Region the institution belongs to.
    pub region: Option<String>,
}

/// Lookup of domestic institutions. Duplicate abbreviations keep the first
/// entry supplied.
///
/// # Examples
/// ```
/// use lineage_core::{InstitutionRegistry, RegistryEntry};
///
/// let entry = |name: &str| RegistryEntry {
///     abbr: "UFX".into(),
///     name: name.into(),
///     state: Some("RJ".into()),
///     region: Some("Sudeste".into()),
/// };
/// let registry = InstitutionRegistry::from_entries([entry("first"), entry("second")]);
/// assert_eq!(registry.len(), 1);
/// assert_eq!(registry.get("UFX").map(|e| e.name.as_str()), Some("first"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct InstitutionRegistry {
    entries: HashMap<String, RegistryEntry>,
}

impl InstitutionRegistry {
    /// Builds the registry, keeping the first entry per abbreviation.
    #[must_use]
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = RegistryEntry>,
    {
        let mut map = HashMap::new();
        for entry in entries {
            map.entry(entry.abbr.clone()).or_insert(entry);
        }
        Self { entries: map }
    }

    /// Looks up `abbr`.
    #[must_use]
    pub fn get(&self, abbr: &str) -> Option<&RegistryEntry> {
        self.entries.get(abbr)
    }

    /// Returns `true` when `abbr` is a registered domestic institution.
    #[must_use]
    pub fn contains(&self, abbr: &str) -> bool {
        self.entries.contains_key(abbr)
    }

    /// Number of registered institutions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
