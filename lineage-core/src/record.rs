//! Record types flowing through the pipeline.
//!
//! Raw records enter identity resolution, leave it as [`AnonymizedRecord`]s
//! and come out of institution canonicalization as [`CanonicalRecord`]s.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A raw `(name, abbreviation)` pair naming an institution as it was typed
/// into the source data.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstitutionPair {
    /// Raw institution name.
    pub name: Option<String>,
    /// Raw institution abbreviation.
    pub abbr: Option<String>,
}

impl InstitutionPair {
    /// Builds a pair from optional raw values.
    ///
    /// # Examples
    /// ```
    /// use lineage_core::InstitutionPair;
    ///
    /// let pair = InstitutionPair::new(Some("fed univ x"), Some("fux"));
    /// assert_eq!(pair.abbr.as_deref(), Some("fux"));
    /// ```
    #[must_use]
    pub fn new(name: Option<&str>, abbr: Option<&str>) -> Self {
        Self {
            name: name.map(ToOwned::to_owned),
            abbr: abbr.map(ToOwned::to_owned),
        }
    }
}

/// Academic evaluation field of the program a professor was observed in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldInfo {
    /// Field identifier.
    pub field_id: u32,
    /// Field display name.
    pub field_name: String,
    /// Identifier of the enclosing big field.
    pub big_field_id: u32,
    /// Display name of the enclosing big field.
    pub big_field_name: String,
}

impl FieldInfo {
    /// Creates field metadata.
    #[must_use]
    pub fn new(
        field_id: u32,
        field_name: impl Into<String>,
        big_field_id: u32,
        big_field_name: impl Into<String>,
    ) -> Self {
        Self {
            field_id,
            field_name: field_name.into(),
            big_field_id,
            big_field_name: big_field_name.into(),
        }
    }
}

/// One professor-affiliation-year observation as read from the source.
///
/// Personal fields are kept verbatim; they only feed identity keys and are
/// discarded once every record has a [`ProfessorId`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawRecord {
    /// Professor name, not yet normalized.
    pub professor_name: Option<String>,
    /// Document number as typed.
    pub document_number: Option<String>,
    /// Birth year as typed.
    pub birth_year: Option<String>,
    /// Year the professor's degree was granted, as typed.
    pub degree_year: Option<String>,
    /// Institution employing the professor.
    pub employer: InstitutionPair,
    /// Institution that granted the professor's degree.
    pub degree_granter: InstitutionPair,
    /// Country of the degree-granting institution.
    pub degree_country: Option<String>,
    /// Evaluation field of the program.
    pub field: FieldInfo,
    /// Year of the observation.
    pub base_year: i32,
}

/// Opaque identifier shared by every record of one resolved professor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProfessorId(Uuid);

impl ProfessorId {
    /// Builds an identifier from sixteen random bytes.
    ///
    /// # Examples
    /// ```
    /// use lineage_core::ProfessorId;
    ///
    /// let id = ProfessorId::from_random_bytes([7; 16]);
    /// assert_eq!(id, ProfessorId::from_random_bytes([7; 16]));
    /// ```
    #[must_use]
    pub fn from_random_bytes(bytes: [u8; 16]) -> Self {
        Self(uuid::Builder::from_random_bytes(bytes).into_uuid())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ProfessorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A record stripped of personal fields and tagged with its professor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnonymizedRecord {
    /// Resolved professor identity.
    pub professor_id: ProfessorId,
    /// Institution employing the professor.
    pub employer: InstitutionPair,
    /// Institution that granted the professor's degree.
    pub degree_granter: InstitutionPair,
    /// Country of the degree-granting institution.
    pub degree_country: Option<String>,
    /// Evaluation field of the program.
    pub field: FieldInfo,
    /// Year of the observation.
    pub base_year: i32,
}

/// Institution attributes attached to one role of a [`CanonicalRecord`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedInstitution {
    /// Canonical abbreviation, or `None` when the raw pair had no mapping.
    pub abbr: Option<String>,
    /// Canonical display name.
    pub name: Option<String>,
    /// State the institution belongs to.
    pub state: Option<String>,
    /// Region the institution belongs to.
    pub region: Option<String>,
}

/// A record whose institution roles carry exactly one canonical candidate each.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalRecord {
    /// Resolved professor identity.
    pub professor_id: ProfessorId,
    /// Employing institution.
    pub employer: ResolvedInstitution,
    /// Degree-granting institution. For international degrees every field
    /// holds the raw country of degree.
    pub degree_granter: ResolvedInstitution,
    /// Whether the degree institution failed to resolve domestically.
    pub international: bool,
    /// Evaluation field of the program.
    pub field: FieldInfo,
    /// Year of the observation.
    pub base_year: i32,
}

impl CanonicalRecord {
    /// Returns the `(degree, employer)` abbreviations when both roles are
    /// present and neither equals `sentinel` (case-insensitive).
    ///
    /// Rows for which this returns `None` cannot become graph edges.
    #[must_use]
    pub fn edge_endpoints(&self, sentinel: &str) -> Option<(&str, &str)> {
        let degree = self.degree_granter.abbr.as_deref()?;
        let employer = self.employer.abbr.as_deref()?;
        if degree.eq_ignore_ascii_case(sentinel) || employer.eq_ignore_ascii_case(sentinel) {
            return None;
        }
        Some((degree, employer))
    }
}
