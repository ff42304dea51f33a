//! Equivalence keys used to group raw records for identity resolution.

use crate::{normalize::is_placeholder, normalize_text, record::RawRecord};

const KEY_SEPARATOR: char = '|';

/// The two independent key schemes built for every record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyScheme {
    /// Normalized name plus document number.
    Document,
    /// Normalized name plus birth year plus degree year.
    Demographic,
}

impl KeyScheme {
    /// Both schemes in evaluation order.
    pub const ALL: [Self; 2] = [Self::Document, Self::Demographic];

    /// Returns a short label for diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Demographic => "demographic",
        }
    }

    /// Builds this scheme's key for `record`, or `None` when a component is
    /// missing, a placeholder such as `invalid`, or malformed.
    ///
    /// # Examples
    /// ```
    /// use lineage_core::{FieldInfo, InstitutionPair, KeyScheme, RawRecord};
    ///
    /// let record = RawRecord {
    ///     professor_name: Some("Ana Souza".into()),
    ///     document_number: Some(" 123 ".into()),
    ///     birth_year: Some("1970".into()),
    ///     degree_year: None,
    ///     employer: InstitutionPair::default(),
    ///     degree_granter: InstitutionPair::default(),
    ///     degree_country: None,
    ///     field: FieldInfo::new(1, "math", 10, "exact"),
    ///     base_year: 2010,
    /// };
    /// assert_eq!(KeyScheme::Document.key(&record).as_deref(), Some("ana souza|123"));
    /// assert_eq!(KeyScheme::Demographic.key(&record), None);
    /// ```
    #[must_use]
    pub fn key(self, record: &RawRecord) -> Option<String> {
        let name = normalized_name(record)?;
        match self {
            Self::Document => {
                let document = key_component(record.document_number.as_deref())?;
                Some(join_key(&[&name, document]))
            }
            Self::Demographic => {
                let birth = key_component(record.birth_year.as_deref())?;
                let degree = key_component(record.degree_year.as_deref())?;
                Some(join_key(&[&name, birth, degree]))
            }
        }
    }
}

fn normalized_name(record: &RawRecord) -> Option<String> {
    let raw = key_component(record.professor_name.as_deref())?;
    let name = normalize_text(raw);
    (!name.is_empty()).then_some(name)
}

/// Trims a raw component and rejects placeholders and separator clashes.
fn key_component(raw: Option<&str>) -> Option<&str> {
    let trimmed = raw?.trim();
    if is_placeholder(trimmed) || trimmed.contains(KEY_SEPARATOR) {
        return None;
    }
    Some(trimmed)
}

fn join_key(parts: &[&str]) -> String {
    let mut key = String::new();
    for (position, part) in parts.iter().enumerate() {
        if position > 0 {
            key.push(KEY_SEPARATOR);
        }
        key.push_str(part);
    }
    key
}
