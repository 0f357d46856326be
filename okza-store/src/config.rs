//! Configuration management.
//!
//! A JSON file at `<config_dir>/okza/config.json`. Every field has a
//! default, so a missing file or a partial one is always usable.

use std::path::{Path, PathBuf};
use std::time::Duration;

use okza_core::UnpricedPolicy;
use okza_fetch::SearchSettings;
use okza_fetch::client::DEFAULT_TIMEOUT_SECS;
use okza_fetch::context::{
    DEFAULT_BASE_URL, DEFAULT_LANGUAGE, DEFAULT_LOCATION, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_READY_THRESHOLD,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::persistence::{default_config_path, default_history_path};

/// Default number of history entries shown after a search.
pub const DEFAULT_DISPLAY_LIMIT: usize = 3;

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Provider settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Polling settings.
    #[serde(default)]
    pub polling: PollingConfig,
    /// Ranking settings.
    #[serde(default)]
    pub ranking: RankingConfig,
    /// History settings.
    #[serde(default)]
    pub history: HistoryConfig,
}

/// Provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Provider base URL.
    pub base_url: String,
    /// Location sent with every job.
    pub location: String,
    /// Language sent with every job.
    pub language: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            location: DEFAULT_LOCATION.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Polling settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Maximum number of status requests.
    pub max_attempts: u32,
    /// A job is ready once its item count is strictly above this.
    pub ready_threshold: u64,
    /// Seconds between status requests.
    pub interval_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            ready_threshold: DEFAULT_READY_THRESHOLD,
            interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

/// Ranking settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Placement of items without a usable price.
    pub unpriced: UnpricedPolicy,
}

/// History settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Ledger file; the platform data directory when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Entries shown after a search; `0` shows all.
    pub display_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: None,
            display_limit: DEFAULT_DISPLAY_LIMIT,
        }
    }
}

impl HistoryConfig {
    /// Returns the ledger path, resolving the default.
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(default_history_path)
    }

    /// Returns the display limit, `None` meaning all entries.
    pub fn limit(&self) -> Option<usize> {
        (self.display_limit > 0).then_some(self.display_limit)
    }
}

impl Config {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        default_config_path()
    }

    /// Loads configuration from the default path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, StoreError> {
        Self::load_from(&Self::default_path())
    }

    /// Loads configuration from a specific path; a missing file yields the
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| StoreError::Config(format!("{}: {e}", path.display())))?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Saves configuration to the default path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self) -> Result<(), StoreError> {
        self.save_to(&Self::default_path())
    }

    /// Saves configuration to a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Builds the search settings described by this configuration.
    pub fn to_search_settings(&self) -> SearchSettings {
        SearchSettings::builder()
            .base_url(&self.api.base_url)
            .location(&self.api.location)
            .language(&self.api.language)
            .timeout(Duration::from_secs(self.api.timeout_secs))
            .max_attempts(self.polling.max_attempts)
            .ready_threshold(self.polling.ready_threshold)
            .interval(Duration::from_secs(self.polling.interval_secs))
            .unpriced(self.ranking.unpriced)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.history.limit(), Some(3));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"polling": {"max_attempts": 5}, "ranking": {"unpriced": "last"}, "history": {"display_limit": 0}}"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.polling.max_attempts, 5);
        assert_eq!(config.polling.ready_threshold, 10);
        assert_eq!(config.api.location, "France");
        assert_eq!(config.ranking.unpriced, UnpricedPolicy::Last);
        assert_eq!(config.history.limit(), None);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert!(matches!(Config::load_from(&path), Err(StoreError::Config(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("okza").join("config.json");
        let mut config = Config::default();
        config.api.language = "English".into();
        config.history.path = Some(dir.path().join("h.csv"));

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_to_search_settings() {
        let mut config = Config::default();
        config.polling.interval_secs = 1;
        config.polling.max_attempts = 0;

        let settings = config.to_search_settings();
        assert_eq!(settings.poll.interval, Duration::from_secs(1));
        assert_eq!(settings.poll.max_attempts, 1);
        assert_eq!(settings.api.timeout, Duration::from_secs(30));
    }
}
