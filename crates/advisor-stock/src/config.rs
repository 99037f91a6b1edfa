//! Configuration for the advisor
//!
//! The API key is the only hard requirement: without it no page is allowed to
//! run, so provider construction fails before the session loop starts.
//! Everything else has a default.

use crate::error::{AdvisorError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default number of symbols rendered into one prompt
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Default trailing window of daily history, in days (~6 months)
pub const DEFAULT_HISTORY_DAYS: i64 = 180;

/// Configuration for advisor operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Hosted model identifier
    pub model: String,

    /// Maximum tokens per completion
    pub max_tokens: usize,

    /// Sampling temperature
    pub temperature: Option<f32>,

    /// Trailing window of daily price history, in days
    pub history_days: i64,

    /// Symbols per prompt batch
    pub batch_size: usize,

    /// Request timeout for market-data calls
    pub request_timeout: Duration,

    /// Path of the encrypted preference store file
    pub store_path: PathBuf,

    /// Passphrase protecting the preference store
    pub store_passphrase: String,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            max_tokens: 4096,
            temperature: None,
            history_days: DEFAULT_HISTORY_DAYS,
            batch_size: DEFAULT_BATCH_SIZE,
            request_timeout: Duration::from_secs(30),
            store_path: default_store_path(),
            store_passphrase: "advisor-preferences".to_string(),
        }
    }
}

/// Per-user data file, falling back to the working directory
fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("advisor")
        .join("preferences.enc")
}

impl AdvisorConfig {
    /// Create a new configuration builder
    pub fn builder() -> AdvisorConfigBuilder {
        AdvisorConfigBuilder::default()
    }

    /// Load overrides from the environment
    ///
    /// Honors `ADVISOR_MODEL`, `ADVISOR_STORE_PASSPHRASE` and
    /// `ADVISOR_STORE_PATH`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("ADVISOR_MODEL") {
            self.model = model;
        }
        if let Ok(passphrase) = std::env::var("ADVISOR_STORE_PASSPHRASE") {
            self.store_passphrase = passphrase;
        }
        if let Ok(path) = std::env::var("ADVISOR_STORE_PATH") {
            self.store_path = PathBuf::from(path);
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.is_empty() {
            return Err(AdvisorError::Config("model must not be empty".to_string()));
        }
        if self.batch_size == 0 {
            return Err(AdvisorError::Config(
                "batch_size must be greater than 0".to_string(),
            ));
        }
        if self.history_days <= 0 {
            return Err(AdvisorError::Config(
                "history_days must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`AdvisorConfig`]
#[derive(Debug, Default)]
pub struct AdvisorConfigBuilder {
    model: Option<String>,
    max_tokens: Option<usize>,
    temperature: Option<f32>,
    history_days: Option<i64>,
    batch_size: Option<usize>,
    request_timeout: Option<Duration>,
    store_path: Option<PathBuf>,
    store_passphrase: Option<String>,
}

impl AdvisorConfigBuilder {
    /// Set the hosted model identifier
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the maximum tokens per completion
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the trailing history window in days
    pub fn history_days(mut self, days: i64) -> Self {
        self.history_days = Some(days);
        self
    }

    /// Set the number of symbols per prompt batch
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Set the market-data request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the preference store file path
    pub fn store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = Some(path.into());
        self
    }

    /// Set the preference store passphrase
    pub fn store_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.store_passphrase = Some(passphrase.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AdvisorConfig> {
        let defaults = AdvisorConfig::default();

        let config = AdvisorConfig {
            model: self.model.unwrap_or(defaults.model),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.or(defaults.temperature),
            history_days: self.history_days.unwrap_or(defaults.history_days),
            batch_size: self.batch_size.unwrap_or(defaults.batch_size),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            store_path: self.store_path.unwrap_or(defaults.store_path),
            store_passphrase: self.store_passphrase.unwrap_or(defaults.store_passphrase),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AdvisorConfig::default();
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.history_days, 180);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = AdvisorConfig::builder()
            .model("gpt-4o-mini")
            .batch_size(3)
            .request_timeout(Duration::from_secs(60))
            .build()
            .unwrap();

        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.batch_size, 3);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_validation_rejects_zero_batch() {
        let result = AdvisorConfig::builder().batch_size(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_rejects_empty_model() {
        let result = AdvisorConfig::builder().model("").build();
        assert!(result.is_err());
    }
}
