//! Worker configuration.
//!
//! Settings are read from a YAML file, an optional `config/local.yaml`
//! override and `VISA_SYNC__`-prefixed environment variables
//! (`VISA_SYNC__ORACLE__API_KEY`, `VISA_SYNC__SYNC__INTERVAL_SECS`, ...).

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;
use validator::Validate;

/// What the synchronizer does when one category fails.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Record an `Error` entry for the category and continue with the next one.
    #[default]
    Isolate,
    /// Abort the whole pass on the first failing category.
    FailFast,
}

/// Top-level configuration for the `visa-sync` worker.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AppConfig {
    /// SQLite database path.
    #[validate(length(min = 1))]
    pub database_url: String,
    #[validate(nested)]
    pub sync: SyncConfig,
    #[validate(nested)]
    pub oracle: OracleConfig,
    #[validate(nested)]
    pub scraper: ScraperConfig,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SyncConfig {
    /// Pause between two passes of the periodic runner.
    #[validate(range(min = 1))]
    pub interval_secs: u64,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// OpenAI-compatible chat-completions endpoint backing the knowledge oracle.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OracleConfig {
    #[validate(url)]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[validate(length(min = 1))]
    pub model: String,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 2.0))]
    pub temperature: f32,
    #[validate(range(min = 1))]
    pub timeout_secs: u64,
    #[serde(default)]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_retry_backoff_ms() -> u64 {
    1_000
}

impl OracleConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Settings of the scrape-and-upsert bot.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ScraperConfig {
    #[validate(url)]
    pub source_url: String,
    /// CSS selector matching one table row per visa type.
    #[validate(length(min = 1))]
    pub row_selector: String,
    #[validate(range(min = 1))]
    pub timeout_secs: u64,
    /// Category used when a visa code matches no mapping.
    #[validate(length(min = 1))]
    pub fallback_category: String,
    /// Visa code prefix to category name. Empty means the built-in table.
    #[serde(default)]
    pub category_mappings: BTreeMap<String, String>,
}

impl ScraperConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(feature = "worker")]
mod loader {
    use std::path::Path;

    use thiserror::Error;
    use validator::{Validate, ValidationErrors};

    use super::AppConfig;

    #[derive(Debug, Error)]
    pub enum ConfigError {
        #[error("failed to load configuration: {0}")]
        Load(#[from] config::ConfigError),
        #[error("invalid configuration: {0}")]
        Invalid(#[from] ValidationErrors),
    }

    impl AppConfig {
        /// Load settings from `path`, `config/local.yaml` and the environment,
        /// then validate them.
        pub fn load(path: &Path) -> Result<Self, ConfigError> {
            let settings = config::Config::builder()
                .add_source(config::File::from(path))
                .add_source(config::File::with_name("config/local").required(false))
                .add_source(
                    config::Environment::with_prefix("VISA_SYNC")
                        .separator("__")
                        .try_parsing(true),
                )
                .build()?;

            let app_config: AppConfig = settings.try_deserialize()?;
            app_config.validate()?;
            Ok(app_config)
        }
    }
}

#[cfg(feature = "worker")]
pub use loader::ConfigError;

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> AppConfig {
        AppConfig {
            database_url: "visa_sync.db".into(),
            sync: SyncConfig {
                interval_secs: 3600,
                failure_policy: FailurePolicy::Isolate,
            },
            oracle: OracleConfig {
                base_url: "https://api.openai.com/v1".into(),
                api_key: String::new(),
                model: "gpt-4o-mini".into(),
                temperature: 0.0,
                timeout_secs: 60,
                max_retries: 2,
                retry_backoff_ms: 500,
            },
            scraper: ScraperConfig {
                source_url: "https://travel.state.gov/visa-types".into(),
                row_selector: "table tbody tr".into(),
                timeout_secs: 30,
                fallback_category: "Visit".into(),
                category_mappings: BTreeMap::new(),
            },
        }
    }

    #[test]
    fn sample_config_is_valid() {
        assert!(sample_config().validate().is_ok());
    }

    #[test]
    fn rejects_zero_interval() {
        let mut config = sample_config();
        config.sync.interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_malformed_oracle_url() {
        let mut config = sample_config();
        config.oracle.base_url = "openai".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn failure_policy_reads_snake_case() {
        let policy: FailurePolicy = serde_json::from_str("\"fail_fast\"").unwrap();
        assert_eq!(policy, FailurePolicy::FailFast);
    }
}
