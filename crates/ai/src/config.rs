//! Generation service configuration
//!
//! Loads configuration from environment variables with sensible defaults;
//! an optional TOML section can pre-seed everything but the API key.

use std::env;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Default hosted model; near-deterministic sampling keeps repeated
/// generations structurally similar.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TEMPERATURE: f32 = 0.1;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Configuration for the hosted generation service
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// API key; never stored in config files
    #[serde(skip)]
    pub api_key: String,

    /// Model identifier
    pub model: String,

    /// Service base URL (overridable for proxies and tests)
    pub base_url: String,

    /// Sampling temperature for guide generation
    pub temperature: f32,

    /// Coarse per-request timeout; the design otherwise enforces none
    pub request_timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl AiConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
            model: env::var("CASITA_AI_MODEL").unwrap_or(defaults.model),
            base_url: env::var("CASITA_AI_BASE_URL").unwrap_or(defaults.base_url),
            temperature: match env::var("CASITA_AI_TEMPERATURE") {
                Ok(raw) => raw
                    .parse()
                    .map_err(|_| Error::Config("Invalid CASITA_AI_TEMPERATURE".to_string()))?,
                Err(_) => defaults.temperature,
            },
            request_timeout_secs: match env::var("CASITA_AI_TIMEOUT_SECS") {
                Ok(raw) => raw
                    .parse()
                    .map_err(|_| Error::Config("Invalid CASITA_AI_TIMEOUT_SECS".to_string()))?,
                Err(_) => defaults.request_timeout_secs,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(Error::Config("model must not be empty".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(Error::Config(
                "temperature must be between 0.0 and 2.0".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AiConfig::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!((config.temperature - 0.1).abs() < f32::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_temperature() {
        let config = AiConfig {
            temperature: 5.0,
            ..AiConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_section_parses() {
        let config: AiConfig = toml::from_str(
            r#"
            model = "gemini-3-pro"
            temperature = 0.2
            "#,
        )
        .unwrap();
        assert_eq!(config.model, "gemini-3-pro");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.api_key.is_empty());
    }
}
