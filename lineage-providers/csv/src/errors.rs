//! Error type shared by the CSV readers and writer.

use lineage_core::LineageError;
use thiserror::Error;

/// Errors raised while reading or writing lineage CSV tables.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CsvProviderError {
    /// The table header lacks required columns.
    #[error(transparent)]
    Schema(#[from] LineageError),
    /// A numeric cell could not be parsed.
    #[error("table `{table}` line {line}: column `{column}` must be an integer but found `{value}`")]
    InvalidNumber {
        /// Table being read.
        table: &'static str,
        /// One-based line of the offending row.
        line: u64,
        /// Column holding the value.
        column: &'static str,
        /// Raw cell contents.
        value: String,
    },
    /// The CSV reader or writer failed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    /// Opening or flushing the underlying file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl CsvProviderError {
    /// Returns `true` when the error is a missing-column schema failure.
    #[must_use]
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, Self::Schema(LineageError::SchemaMismatch { .. }))
    }
}
