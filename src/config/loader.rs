//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the engine
//! configuration from a YAML directory and its referenced rate tables.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::ingest::{CsvRateTables, RateTableProvider};

use super::types::{EngineConfig, EngineMetadata, EngineSettings, Regime, RegimeRules};

/// Loads and provides access to the engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/fba/
/// ├── engine.yaml          # Metadata, default periods, regime list
/// ├── regimes/
/// │   └── eu.yaml          # Optional threshold table overrides
/// └── rates/
///     └── eu_fulfillment.csv
/// ```
///
/// Regimes listed without a `rules` file use the builtin table of the same
/// id. Rate tables that are missing or unreadable load as empty tables, so
/// every fee against them resolves to "unresolved" instead of failing.
///
/// # Example
///
/// ```no_run
/// use fba_fee_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/fba")?;
/// let regime = loader.regime("EU")?;
/// println!("{} fulfillment rows", regime.fulfillment_table.len());
/// # Ok::<(), fba_fee_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Errors
    ///
    /// Returns an error if `engine.yaml` or a referenced regime file is
    /// missing or invalid, or if a listed regime id has no builtin rules.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let settings = Self::load_yaml::<EngineSettings>(&path.join("engine.yaml"))?;
        let tables = CsvRateTables::from_sources(path, &settings.regimes);
        Self::from_settings(path, settings, &tables)
    }

    /// Builds configuration from parsed settings and a rate table provider.
    ///
    /// Regime rule files are resolved relative to `base_dir`.
    pub fn from_settings<P: RateTableProvider + ?Sized>(
        base_dir: &Path,
        settings: EngineSettings,
        tables: &P,
    ) -> EngineResult<Self> {
        let mut regimes = Vec::with_capacity(settings.regimes.len());

        for source in &settings.regimes {
            let rules = match &source.rules {
                Some(file) => Self::load_yaml::<RegimeRules>(&base_dir.join(file))?,
                None => RegimeRules::builtin(&source.id).ok_or_else(|| {
                    EngineError::RegimeNotFound {
                        id: source.id.clone(),
                    }
                })?,
            };

            if rules.id != source.id {
                return Err(EngineError::InvalidRegime {
                    id: source.id.clone(),
                    message: format!("rules file declares id '{}'", rules.id),
                });
            }

            let regime = Regime::new(rules)
                .with_fulfillment_table(tables.fulfillment_rows(&source.id))
                .with_channel_table(tables.channel_rows(&source.id));

            debug!(
                regime = %source.id,
                fulfillment_rows = regime.fulfillment_table.len(),
                channel_rows = regime.channel_table.len(),
                "Loaded regime"
            );
            regimes.push(regime);
        }

        let config = EngineConfig::new(
            settings.engine,
            settings.periods,
            settings.weight_placeholders,
            regimes,
        )?;

        info!(
            name = %config.metadata().name,
            regimes = config.regimes().len(),
            "Engine configuration loaded"
        );

        Ok(Self { config })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the engine metadata.
    pub fn metadata(&self) -> &EngineMetadata {
        self.config.metadata()
    }

    /// Gets a regime by id.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use fba_fee_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/fba")?;
    /// let regime = loader.regime("US-2026")?;
    /// assert!(regime.rules.removal.is_some());
    /// # Ok::<(), fba_fee_engine::error::EngineError>(())
    /// ```
    pub fn regime(&self, id: &str) -> EngineResult<&Regime> {
        self.config.regime(id)
    }
}
