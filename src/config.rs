// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Application configuration management.
//!
//! Persistent configuration is stored in TOML format through `confy`.
//! Every field has a serde default so older or partial config files keep
//! loading. Command-line flags are layered on top in `main`.

use std::path::PathBuf;
use std::time::Duration;

use opensky_client::{FetcherConfig, StoreConfig, DEFAULT_API_URL, DEFAULT_MAX_RECORDS};
use serde::{Deserialize, Serialize};

/// Name used for the config directory, data directory and window title key.
pub const APP_NAME: &str = "flightwatch-desktop";

const CONFIG_NAME: &str = "config";

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Configuration schema version for migrations
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// OpenSky state-vector endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Seconds between scheduled refreshes
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Whole-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum number of flights kept per snapshot
    #[serde(default = "default_max_flights")]
    pub max_flights: usize,

    /// Ignore refresh results older than the one already displayed
    #[serde(default)]
    pub discard_stale_refreshes: bool,

    /// Initial map center latitude
    #[serde(default = "default_map_center_lat")]
    pub map_center_lat: f64,

    /// Initial map center longitude
    #[serde(default = "default_map_center_lon")]
    pub map_center_lon: f64,

    /// Initial map zoom level (2.0 - 12.0)
    #[serde(default = "default_zoom")]
    pub default_zoom: f32,

    /// Sidebar expanded on startup
    #[serde(default = "default_true")]
    pub sidebar_open: bool,

    /// Override for the watchlist storage file
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    1
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_refresh_interval_secs() -> u64 {
    15
}

fn default_request_timeout_secs() -> u64 {
    20
}

fn default_max_flights() -> usize {
    DEFAULT_MAX_RECORDS
}

fn default_map_center_lat() -> f64 {
    47.0
}

fn default_map_center_lon() -> f64 {
    2.0
}

fn default_zoom() -> f32 {
    5.0
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            api_url: default_api_url(),
            refresh_interval_secs: default_refresh_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            max_flights: default_max_flights(),
            discard_stale_refreshes: false,
            map_center_lat: default_map_center_lat(),
            map_center_lon: default_map_center_lon(),
            default_zoom: default_zoom(),
            sidebar_open: true,
            storage_path: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, creating it with defaults if missing
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load(APP_NAME, CONFIG_NAME)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    /// Refresh cadence, never shorter than one second
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    /// HTTP fetcher settings derived from this config
    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            url: self.api_url.clone(),
            max_records: self.max_flights,
            timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
            ..FetcherConfig::default()
        }
    }

    /// Store behavior derived from this config
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            discard_stale_refreshes: self.discard_stale_refreshes,
        }
    }

    /// Watchlist storage file: the explicit override, else the platform
    /// data directory, else the working directory
    pub fn resolve_storage_path(&self) -> PathBuf {
        self.storage_path
            .clone()
            .or_else(|| opensky_client::FileStore::default_path(APP_NAME))
            .unwrap_or_else(|| PathBuf::from("flightwatch-storage.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.refresh_interval(), Duration::from_secs(15));
        assert_eq!(config.max_flights, 500);
        assert!(!config.discard_stale_refreshes);
    }

    #[test]
    fn test_partial_config_keeps_overrides() {
        let config: AppConfig =
            serde_json::from_str(r#"{"refresh_interval_secs": 30, "sidebar_open": false}"#).unwrap();
        assert_eq!(config.refresh_interval(), Duration::from_secs(30));
        assert!(!config.sidebar_open);
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let config = AppConfig {
            refresh_interval_secs: 0,
            ..AppConfig::default()
        };
        assert_eq!(config.refresh_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_fetcher_config_mapping() {
        let config = AppConfig {
            api_url: "http://localhost:8080/states".to_string(),
            max_flights: 42,
            request_timeout_secs: 3,
            ..AppConfig::default()
        };
        let fetcher = config.fetcher_config();
        assert_eq!(fetcher.url, "http://localhost:8080/states");
        assert_eq!(fetcher.max_records, 42);
        assert_eq!(fetcher.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_storage_override_wins() {
        let config = AppConfig {
            storage_path: Some(PathBuf::from("/tmp/watch.json")),
            ..AppConfig::default()
        };
        assert_eq!(config.resolve_storage_path(), PathBuf::from("/tmp/watch.json"));
    }
}
