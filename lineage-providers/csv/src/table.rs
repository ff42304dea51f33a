//! Header validation and cell access shared by every table reader.

use std::io::Read;

use csv::{ReaderBuilder, StringRecord, Trim};
use lineage_core::{is_missing_marker, require_columns};

use crate::errors::CsvProviderError;

/// CSV reader whose header has been checked against a required column list.
pub(crate) struct Table<R> {
    name: &'static str,
    reader: csv::Reader<R>,
    positions: Vec<usize>,
}

impl<R: Read> Table<R> {
    /// Opens `reader` and resolves the position of every `required` column.
    ///
    /// Extra columns are ignored.
    pub(crate) fn open(
        name: &'static str,
        reader: R,
        required: &[&'static str],
    ) -> Result<Self, CsvProviderError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|header| header.trim_start_matches('\u{feff}').to_owned())
            .collect();
        require_columns(name, &headers, required)?;
        let positions = required
            .iter()
            .filter_map(|column| headers.iter().position(|header| header == column))
            .collect();
        Ok(Self {
            name,
            reader,
            positions,
        })
    }

    pub(crate) fn name(&self) -> &'static str {
        self.name
    }

    /// Iterates the data rows in file order.
    pub(crate) fn rows(&mut self) -> impl Iterator<Item = Result<Row<'_>, CsvProviderError>> + '_ {
        let name = self.name;
        let positions = &self.positions;
        self.reader.records().map(move |record| {
            Ok(Row {
                table: name,
                record: record?,
                positions,
            })
        })
    }
}

/// One data row addressed by required-column index.
pub(crate) struct Row<'a> {
    table: &'static str,
    record: StringRecord,
    positions: &'a [usize],
}

impl Row<'_> {
    /// One-based line number of the row, or 0 when unknown.
    pub(crate) fn line(&self) -> u64 {
        self.record.position().map_or(0, csv::Position::line)
    }

    /// Cell of the `column`-th required column, `None` for missing markers.
    pub(crate) fn text(&self, column: usize) -> Option<&str> {
        self.positions
            .get(column)
            .and_then(|&position| self.record.get(position))
            .filter(|value| !is_missing_marker(value))
    }

    /// Owned copy of [`Row::text`].
    pub(crate) fn owned(&self, column: usize) -> Option<String> {
        self.text(column).map(ToOwned::to_owned)
    }

    /// Parses an integer cell, accepting exports such as `2015.0`.
    pub(crate) fn integer<T>(&self, column: usize, name: &'static str) -> Result<T, CsvProviderError>
    where
        T: std::str::FromStr,
    {
        let raw = self.text(column).unwrap_or_default();
        let digits = raw.strip_suffix(".0").unwrap_or(raw);
        digits.parse().map_err(|_| CsvProviderError::InvalidNumber {
            table: self.table,
            line: self.line(),
            column: name,
            value: raw.to_owned(),
        })
    }
}
