//! Application state for the fee engine API.

use std::sync::Arc;

use crate::config::ConfigLoader;

/// Shared application state.
///
/// Holds the loaded engine configuration: regimes, their rate tables, and
/// the default periods. It is immutable once the server starts.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigLoader>,
}

impl AppState {
    /// Creates a new application state with the given configuration loader.
    pub fn new(config: ConfigLoader) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EngineConfig, EngineMetadata, Regime, RegimeRules};

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_clones_share_configuration() {
        let config = EngineConfig::new(
            EngineMetadata {
                name: "state".to_string(),
                version: "1".to_string(),
                description: String::new(),
            },
            vec!["2024Q1".to_string()],
            vec!["发货重量".to_string()],
            vec![Regime::new(RegimeRules::eu())],
        )
        .unwrap();
        let state = AppState::new(ConfigLoader::from_config(config));
        let clone = state.clone();

        assert!(std::ptr::eq(state.config(), clone.config()));
        assert_eq!(clone.config().metadata().name, "state");
    }
}
