//! Server Configuration
//!
//! Layered settings: built-in defaults, then an optional config file, then
//! `RAINFALL_*` environment variables (`__` separates nested keys, e.g.
//! `RAINFALL_NARRATION__TIMEOUT_SECS=5`).

use crate::rate_limit::RateLimitConfig;
use config::{Config, ConfigError, Environment, File};
use narration::NarrationConfig;
use serde::{Deserialize, Serialize};
use storage::ArtifactPaths;

/// Config file consulted when `RAINFALL_CONFIG` is unset (extension optional)
pub const DEFAULT_CONFIG_FILE: &str = "config/rainfall";

/// Top-level server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Listen address
    pub bind_addr: String,
    /// Tracing level or filter directives (`info`, `warn,api=debug`)
    pub log_level: String,
    /// Load the model slots at startup instead of on the first request
    pub preload_models: bool,
    pub artifacts: ArtifactPaths,
    pub narration: NarrationConfig,
    /// Limits on the predict route
    pub rate_limit: RateLimitConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            log_level: "info".to_string(),
            preload_models: true,
            artifacts: ArtifactPaths::default(),
            narration: NarrationConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from the config file named by `RAINFALL_CONFIG` (or the default) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let file = std::env::var("RAINFALL_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let mut config = Self::from_sources(&file)?;
        config.apply_api_key_fallback(std::env::var("GOOGLE_API_KEY").ok());
        Ok(config)
    }

    fn from_sources(file: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(file).required(false))
            .add_source(
                Environment::with_prefix("RAINFALL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Use `key` for narration unless one is already configured
    fn apply_api_key_fallback(&mut self, key: Option<String>) {
        let configured = self.narration.api_key.as_deref().map_or(false, |k| !k.is_empty());
        if !configured {
            self.narration.api_key = key.filter(|k| !k.is_empty());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr, "0.0.0.0:5000");
        assert!(config.preload_models);
        assert_eq!(config.narration.timeout_secs, 10);
        assert_eq!(
            config.artifacts.sequence_model.to_str(),
            Some("model/lstm_model_rr.onnx")
        );
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::from_sources("does/not/exist/rainfall").unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.rate_limit.burst_size, RateLimitConfig::default().burst_size);
    }

    #[test]
    fn test_file_overrides_nested_keys() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "bind_addr = \"127.0.0.1:9000\"\n\
             preload_models = false\n\
             [artifacts]\n\
             dataset = \"fixtures/data.csv\"\n\
             [narration]\n\
             timeout_secs = 3"
        )
        .unwrap();

        let config = AppConfig::from_sources(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert!(!config.preload_models);
        assert_eq!(config.artifacts.dataset.to_str(), Some("fixtures/data.csv"));
        assert_eq!(
            config.artifacts.feature_scaler.to_str(),
            Some("scaler/scaler_features.json")
        );
        assert_eq!(config.narration.timeout_secs, 3);
        assert_eq!(config.narration.model, "gemma-3-4b-it");
    }

    #[test]
    fn test_api_key_fallback() {
        let mut config = AppConfig::default();
        config.apply_api_key_fallback(Some("from-env".to_string()));
        assert_eq!(config.narration.api_key.as_deref(), Some("from-env"));

        config.apply_api_key_fallback(Some("other".to_string()));
        assert_eq!(config.narration.api_key.as_deref(), Some("from-env"));

        let mut config = AppConfig::default();
        config.apply_api_key_fallback(Some(String::new()));
        assert!(config.narration.api_key.is_none());
    }
}
