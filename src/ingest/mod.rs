//! Catalog and rate table ingestion.
//!
//! Both inputs are plain UTF-8 CSV read through the `csv` crate.

mod catalog;
mod rate_tables;

pub use catalog::{load_catalog, load_catalog_file};
pub use rate_tables::{
    CsvRateTables, InMemoryRateTables, RateTableProvider, load_channel_table, load_rate_table,
};
