//! CSV ingestion of raw records, the mapping table and the institution
//! registry, plus the professor count writer.

mod counts;
mod errors;
mod mapping;
mod records;
mod registry;
mod table;

pub use counts::{write_professor_counts, write_professor_counts_path};
pub use errors::CsvProviderError;
pub use mapping::{MAPPING_COLUMNS, MAPPING_TABLE, read_mapping, read_mapping_path};
pub use records::{RECORD_COLUMNS, RECORDS_TABLE, read_records, read_records_path};
pub use registry::{REGISTRY_COLUMNS, REGISTRY_TABLE, read_registry, read_registry_path};

#[cfg(test)]
mod tests;
