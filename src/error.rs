//! Error types for the fee engine.
//!
//! Configuration and programming errors surface as [`EngineError`]. Data
//! problems inside a single catalog record never abort a batch; they are
//! reported per record through [`EngineError::InvalidRecord`] and friends.

use thiserror::Error;

/// The main error type for the fee engine.
///
/// # Example
///
/// ```
/// use fba_fee_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/engine.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/engine.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A regime id was requested that the configuration does not define.
    #[error("Regime not found: {id}")]
    RegimeNotFound {
        /// The regime id that was not found.
        id: String,
    },

    /// A regime threshold table is internally inconsistent.
    #[error("Invalid regime '{id}': {message}")]
    InvalidRegime {
        /// The regime id.
        id: String,
        /// What is wrong with it.
        message: String,
    },

    /// A rate table could not be read.
    #[error("Failed to read rate table '{path}': {message}")]
    RateTableError {
        /// The path of the rate table.
        path: String,
        /// A description of the read error.
        message: String,
    },

    /// A catalog could not be read as a whole.
    #[error("Failed to read catalog '{source_name}': {message}")]
    CatalogError {
        /// The catalog file or stream name.
        source_name: String,
        /// A description of the read error.
        message: String,
    },

    /// A single catalog record was missing or carried malformed attributes.
    #[error("Invalid record '{item_id}' field '{field}': {message}")]
    InvalidRecord {
        /// The catalog identifier of the record.
        item_id: String,
        /// The offending attribute.
        field: String,
        /// A description of the problem.
        message: String,
    },

    /// The record's marketplace has no pricing bucket under the regime.
    #[error("Unknown marketplace '{marketplace}' for regime '{regime}'")]
    UnknownMarketplace {
        /// The marketplace code as given (empty if absent).
        marketplace: String,
        /// The regime whose bucket policy rejected it.
        regime: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
