//! CSV catalog reader.
//!
//! Reads a seller inventory export into [`CatalogRecord`]s. Expected CSV
//! columns (extra columns are ignored, missing ones become per-record
//! errors at validation time):
//!   fnsku, sales-price, longest-side, median-side, shortest-side,
//!   unit-of-dimension, item-package-weight, unit-of-weight, amazon-store

use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::models::CatalogRecord;

/// Load catalog records from a CSV reader.
///
/// `source_name` identifies the input in error messages.
pub fn load_catalog<R: Read>(reader: R, source_name: &str) -> EngineResult<Vec<CatalogRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (line_num, result) in csv_reader.deserialize().enumerate() {
        let record: CatalogRecord = result.map_err(|e| EngineError::CatalogError {
            source_name: source_name.to_string(),
            message: format!("CSV parse error at line {}: {}", line_num + 2, e),
        })?;
        records.push(record);
    }

    info!(source = source_name, records = records.len(), "Catalog loaded");
    Ok(records)
}

/// Load catalog records from a CSV file path.
pub fn load_catalog_file<P: AsRef<Path>>(path: P) -> EngineResult<Vec<CatalogRecord>> {
    let path = path.as_ref();
    let source_name = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|e| EngineError::CatalogError {
        source_name: source_name.clone(),
        message: format!("failed to open: {}", e),
    })?;
    load_catalog(file, &source_name)
}
