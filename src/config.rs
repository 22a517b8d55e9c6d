use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::sync::SeedPolicy;

const CONFIG_FILE_NAME: &str = "config.toml";
const DATABASE_FILE_NAME: &str = "lists.redb";
const APP_DIR: &str = "tripsync";

/// Overrides `remote.endpoint` when set and non-empty.
pub const REMOTE_URL_ENV: &str = "TRIPSYNC_REMOTE_URL";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub remote: RemoteConfig,
    pub storage: StorageConfig,
    pub sync: SyncConfig,
    pub trip: TripConfig,
}

/// Remote spreadsheet endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Endpoint URL; unset disables all remote behavior
    pub endpoint: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: 30,
        }
    }
}

impl RemoteConfig {
    /// Endpoint after applying the environment override.
    pub fn resolved_endpoint(&self) -> Option<String> {
        resolve_endpoint(self.endpoint.as_deref(), std::env::var(REMOTE_URL_ENV).ok())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn resolve_endpoint(from_file: Option<&str>, from_env: Option<String>) -> Option<String> {
    let non_empty = |s: &str| {
        let s = s.trim();
        (!s.is_empty()).then(|| s.to_string())
    };
    from_env
        .as_deref()
        .and_then(non_empty)
        .or_else(|| from_file.and_then(non_empty))
}

/// Local snapshot storage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Data directory (unset = platform data dir)
    pub data_dir: Option<String>,
    /// Prefix for every stored key
    pub key_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            key_prefix: "trip_".to_string(),
        }
    }
}

impl StorageConfig {
    pub fn database_path(&self) -> Result<PathBuf> {
        let dir = match &self.data_dir {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .context("Failed to get data directory")?
                .join(APP_DIR),
        };
        Ok(dir.join(DATABASE_FILE_NAME))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// "replace-if-non-empty" or "seed-empty-remote"
    pub seed_policy: SeedPolicy,
}

/// Trip details (informational)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TripConfig {
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Default for TripConfig {
    fn default() -> Self {
        Self {
            name: "Busan 2026".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 22),
            end_date: NaiveDate::from_ymd_opt(2026, 1, 28),
        }
    }
}

impl TripConfig {
    /// Whether `date` falls inside the trip. Open ends are unbounded.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date.map_or(true, |start| date >= start)
            && self.end_date.map_or(true, |end| date <= end)
    }

    /// Days from `today` until departure; negative once the trip started.
    pub fn days_until(&self, today: NaiveDate) -> Option<i64> {
        self.start_date.map(|start| (start - today).num_days())
    }
}

impl Config {
    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join(APP_DIR);

        fs::create_dir_all(&config_dir)
            .context("Failed to create config directory")?;

        Ok(config_dir.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from file, or create default if not exists
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)
                .context("Failed to read config file")?;

            let config: Config = toml::from_str(&contents)
                .context("Failed to parse config file")?;

            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        fs::write(&path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Generate example config content for documentation
    pub fn example_config() -> String {
        let mut config = Config::default();
        config.remote.endpoint = Some("https://script.google.com/macros/s/DEPLOYMENT_ID/exec".to_string());
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}
