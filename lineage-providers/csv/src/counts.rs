//! Professor count table output.

use std::{fs::File, io::Write, path::Path};

use lineage_core::ProfessorCount;

use crate::errors::CsvProviderError;

/// Writes `counts` as CSV with the header `period, type, n_prof,
/// big_field_id, big_field_name, field_id, field_name`. Absent identifiers
/// are written as empty cells.
///
/// # Errors
/// Returns [`CsvProviderError::Csv`] when serialization fails.
///
/// # Examples
/// ```
/// use lineage_core::professor_counts;
/// use lineage_providers_csv::write_professor_counts;
///
/// let mut buffer = Vec::new();
/// write_professor_counts(&mut buffer, &professor_counts("2015", std::iter::empty()))?;
/// let text = String::from_utf8(buffer).expect("utf-8 output");
/// assert_eq!(
///     text,
///     "period,type,n_prof,big_field_id,big_field_name,field_id,field_name\n2015,global,0,,,,\n"
/// );
/// # Ok::<(), lineage_providers_csv::CsvProviderError>(())
/// ```
pub fn write_professor_counts<W: Write>(
    writer: W,
    counts: &[ProfessorCount],
) -> Result<(), CsvProviderError> {
    let mut writer = csv::Writer::from_writer(writer);
    for count in counts {
        writer.serialize(count)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the professor count table to `path`.
///
/// # Errors
/// See [`write_professor_counts`].
pub fn write_professor_counts_path(
    path: impl AsRef<Path>,
    counts: &[ProfessorCount],
) -> Result<(), CsvProviderError> {
    write_professor_counts(File::create(path)?, counts)
}
