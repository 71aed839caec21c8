//! Rate table sources.
//!
//! Fulfillment table columns: 时期, 商品价格 (or 国家), 商品尺寸, 发货重量, FBA费用.
//! Multi-channel table columns: 配送方式, 商品尺寸, 发货重量, 多渠道配送费.
//! English column names (period, bucket, size_category, weight_range, fee,
//! speed) are accepted as well.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::config::RegimeSource;
use crate::error::{EngineError, EngineResult};
use crate::models::{ChannelRateRow, RateTableRow};

/// Supplies the rate tables attached to each regime.
///
/// Implementations must tolerate regimes with no table by returning an
/// empty list.
pub trait RateTableProvider {
    /// Fulfillment fee rows for a regime, in table order.
    fn fulfillment_rows(&self, regime: &str) -> Vec<RateTableRow>;

    /// Multi-channel fee rows for a regime, in table order.
    fn channel_rows(&self, regime: &str) -> Vec<ChannelRateRow>;
}

fn load_rows<T: DeserializeOwned, R: Read>(reader: R, source_name: &str) -> EngineResult<Vec<T>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (line_num, result) in csv_reader.deserialize().enumerate() {
        let row: T = result.map_err(|e| EngineError::RateTableError {
            path: source_name.to_string(),
            message: format!("CSV parse error at line {}: {}", line_num + 2, e),
        })?;
        rows.push(row);
    }
    Ok(rows)
}

/// Load a fulfillment rate table from a CSV reader.
pub fn load_rate_table<R: Read>(reader: R, source_name: &str) -> EngineResult<Vec<RateTableRow>> {
    load_rows(reader, source_name)
}

/// Load a multi-channel rate table from a CSV reader.
pub fn load_channel_table<R: Read>(reader: R, source_name: &str) -> EngineResult<Vec<ChannelRateRow>> {
    load_rows(reader, source_name)
}

/// Loads a table file, degrading to an empty table on any failure.
fn load_file_or_empty<T: DeserializeOwned>(regime: &str, kind: &str, path: &Path) -> Vec<T> {
    let source_name = path.display().to_string();
    let result = std::fs::File::open(path)
        .map_err(|e| EngineError::RateTableError {
            path: source_name.clone(),
            message: e.to_string(),
        })
        .and_then(|file| load_rows(file, &source_name));

    match result {
        Ok(rows) => {
            info!(regime, table = kind, path = %source_name, rows = rows.len(), "Rate table loaded");
            rows
        }
        Err(e) => {
            warn!(regime, table = kind, error = %e, "Rate table unavailable, using an empty table");
            Vec::new()
        }
    }
}

/// Rate tables read from CSV files named in `engine.yaml`.
///
/// Tables are read once at construction. A missing or unreadable file
/// yields an empty table and a warning.
#[derive(Debug, Clone, Default)]
pub struct CsvRateTables {
    fulfillment: BTreeMap<String, Vec<RateTableRow>>,
    channel: BTreeMap<String, Vec<ChannelRateRow>>,
}

impl CsvRateTables {
    /// Reads every table referenced by `sources`, resolving paths against
    /// `base_dir`.
    pub fn from_sources(base_dir: &Path, sources: &[RegimeSource]) -> Self {
        let mut tables = Self::default();
        for source in sources {
            if let Some(file) = &source.fulfillment_table {
                let path: PathBuf = base_dir.join(file);
                tables
                    .fulfillment
                    .insert(source.id.clone(), load_file_or_empty(&source.id, "fulfillment", &path));
            }
            if let Some(file) = &source.channel_table {
                let path: PathBuf = base_dir.join(file);
                tables
                    .channel
                    .insert(source.id.clone(), load_file_or_empty(&source.id, "channel", &path));
            }
        }
        tables
    }
}

impl RateTableProvider for CsvRateTables {
    fn fulfillment_rows(&self, regime: &str) -> Vec<RateTableRow> {
        self.fulfillment.get(regime).cloned().unwrap_or_default()
    }

    fn channel_rows(&self, regime: &str) -> Vec<ChannelRateRow> {
        self.channel.get(regime).cloned().unwrap_or_default()
    }
}

/// Rate tables held in memory, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRateTables {
    fulfillment: BTreeMap<String, Vec<RateTableRow>>,
    channel: BTreeMap<String, Vec<ChannelRateRow>>,
}

impl InMemoryRateTables {
    /// Attaches a fulfillment table to a regime.
    pub fn with_fulfillment(mut self, regime: &str, rows: Vec<RateTableRow>) -> Self {
        self.fulfillment.insert(regime.to_string(), rows);
        self
    }

    /// Attaches a multi-channel table to a regime.
    pub fn with_channel(mut self, regime: &str, rows: Vec<ChannelRateRow>) -> Self {
        self.channel.insert(regime.to_string(), rows);
        self
    }
}

impl RateTableProvider for InMemoryRateTables {
    fn fulfillment_rows(&self, regime: &str) -> Vec<RateTableRow> {
        self.fulfillment.get(regime).cloned().unwrap_or_default()
    }

    fn channel_rows(&self, regime: &str) -> Vec<ChannelRateRow> {
        self.channel.get(regime).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULFILLMENT_CSV: &str = "\
时期,国家,商品尺寸,发货重量,FBA费用
2024Q1,德国,标准包裹,<=150g,€2.97
2024Q1,德国,标准包裹,\"(150,400]g\",€3.21
";

    const US_FULFILLMENT_CSV: &str = "\
时期,商品价格,商品尺寸,发货重量,FBA费用
2024Q1,\"[10,50]\",大号标准尺寸,\"(3,20]磅\",\"6.92+0.08*(发货重量-3)*2\"
";

    const CHANNEL_CSV: &str = "\
配送方式,商品尺寸,发货重量,多渠道配送费
标准,大号标准尺寸,<=1磅,$8.35
加急,大号标准尺寸,<=1磅,$11.15
";

    #[test]
    fn load_country_keyed_table() {
        let rows = load_rate_table(FULFILLMENT_CSV.as_bytes(), "eu").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].bucket, "德国");
        assert_eq!(rows[1].weight_range, "(150,400]g");
        assert_eq!(rows[1].fee, "€3.21");
    }

    #[test]
    fn load_price_keyed_table_keeps_formula_text() {
        let rows = load_rate_table(US_FULFILLMENT_CSV.as_bytes(), "us").unwrap();
        assert_eq!(rows[0].bucket, "[10,50]");
        assert_eq!(rows[0].fee, "6.92+0.08*(发货重量-3)*2");
    }

    #[test]
    fn load_english_headers() {
        let csv_data = "\
period,bucket,size_category,weight_range,fee
2024Q2,>50,小号标准尺寸,<=1,3.22
";
        let rows = load_rate_table(csv_data.as_bytes(), "en").unwrap();
        assert_eq!(rows[0].period, "2024Q2");
        assert_eq!(rows[0].fee, "3.22");
    }

    #[test]
    fn load_channel_rows() {
        let rows = load_channel_table(CHANNEL_CSV.as_bytes(), "mcf").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].speed, "加急");
    }

    #[test]
    fn missing_column_is_an_error() {
        let csv_data = "\
时期,国家,商品尺寸,FBA费用
2024Q1,德国,标准包裹,€2.97
";
        let result = load_rate_table(csv_data.as_bytes(), "broken");
        assert!(matches!(result, Err(EngineError::RateTableError { .. })));
    }

    #[test]
    fn missing_file_degrades_to_empty_table() {
        let sources = vec![RegimeSource {
            id: "EU".to_string(),
            rules: None,
            fulfillment_table: Some("does/not/exist.csv".to_string()),
            channel_table: None,
        }];
        let tables = CsvRateTables::from_sources(Path::new("/nonexistent"), &sources);
        assert!(tables.fulfillment_rows("EU").is_empty());
        assert!(tables.channel_rows("EU").is_empty());
    }

    #[test]
    fn in_memory_tables_are_per_regime() {
        let rows = load_rate_table(FULFILLMENT_CSV.as_bytes(), "eu").unwrap();
        let tables = InMemoryRateTables::default().with_fulfillment("EU", rows);
        assert_eq!(tables.fulfillment_rows("EU").len(), 2);
        assert!(tables.fulfillment_rows("US-2026").is_empty());
    }
}
