//! TOML-based application configuration.
//!
//! Stores the pacing and source settings the revisions of this tool kept
//! disagreeing on:
//! - Scheduler pacing (cooldown, streak threshold, dismiss policy)
//! - Question server endpoint and polling cadence
//! - Presentation display window
//!
//! Configuration is stored at `~/.config/hangtube/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;
use crate::quiz::SchedulerConfig;

/// Quiz source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Content identifier polled when the CLI is not given one.
    #[serde(default)]
    pub video_id: String,
}

/// Presentation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenterConfig {
    /// How long a quiz stays on screen before it counts as dismissed.
    #[serde(default = "default_display_secs")]
    pub display_secs: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/hangtube/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub presenter: PresenterConfig,
}

// Default functions
fn default_endpoint() -> String {
    "http://127.0.0.1:5000".into()
}
fn default_poll_interval_secs() -> u64 {
    10
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_display_secs() -> u64 {
    5
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            poll_interval_secs: default_poll_interval_secs(),
            timeout_secs: default_timeout_secs(),
            video_id: String::new(),
        }
    }
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            display_secs: default_display_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            source: SourceConfig::default(),
            presenter: PresenterConfig::default(),
        }
    }
}

/// Every key `get`/`set` understands, dotted section-first.
pub const CONFIG_KEYS: &[&str] = &[
    "scheduler.cooldown_secs",
    "scheduler.severe_streak_threshold",
    "scheduler.requeue_on_dismiss",
    "source.endpoint",
    "source.poll_interval_secs",
    "source.timeout_secs",
    "source.video_id",
    "presenter.display_secs",
];

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|err| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/hangtube"),
            message: err.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|err| ConfigError::LoadFailed {
                path,
                message: err.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|err| ConfigError::SaveFailed {
            path: path.clone(),
            message: err.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|err| ConfigError::SaveFailed {
            path,
            message: err.to_string(),
        })
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Get a config value as string by dotted key.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "scheduler.cooldown_secs" => Some(self.scheduler.cooldown_secs.to_string()),
            "scheduler.severe_streak_threshold" => {
                Some(self.scheduler.severe_streak_threshold.to_string())
            }
            "scheduler.requeue_on_dismiss" => Some(self.scheduler.requeue_on_dismiss.to_string()),
            "source.endpoint" => Some(self.source.endpoint.clone()),
            "source.poll_interval_secs" => Some(self.source.poll_interval_secs.to_string()),
            "source.timeout_secs" => Some(self.source.timeout_secs.to_string()),
            "source.video_id" => Some(self.source.video_id.clone()),
            "presenter.display_secs" => Some(self.presenter.display_secs.to_string()),
            _ => None,
        }
    }

    /// Set a config value by key and persist. Returns an error if the key
    /// is unknown or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
        where
            T::Err: std::fmt::Display,
        {
            value.parse().map_err(|err: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                message: err.to_string(),
            })
        }

        match key {
            "scheduler.cooldown_secs" => self.scheduler.cooldown_secs = parse(key, value)?,
            "scheduler.severe_streak_threshold" => {
                self.scheduler.severe_streak_threshold = parse(key, value)?
            }
            "scheduler.requeue_on_dismiss" => {
                self.scheduler.requeue_on_dismiss = parse(key, value)?
            }
            "source.endpoint" => self.source.endpoint = value.to_string(),
            "source.poll_interval_secs" => self.source.poll_interval_secs = parse(key, value)?,
            "source.timeout_secs" => self.source.timeout_secs = parse(key, value)?,
            "source.video_id" => self.source.video_id = value.to_string(),
            "presenter.display_secs" => self.presenter.display_secs = parse(key, value)?,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        self.save()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.scheduler.cooldown_secs, 5);
        assert_eq!(parsed.source.poll_interval_secs, 10);
        assert_eq!(parsed.presenter.display_secs, 5);
    }

    #[test]
    fn config_default_values() {
        let cfg = Config::default();
        assert_eq!(cfg.scheduler.cooldown_secs, 5);
        assert_eq!(cfg.scheduler.severe_streak_threshold, 2);
        assert!(!cfg.scheduler.requeue_on_dismiss);
        assert_eq!(cfg.source.endpoint, "http://127.0.0.1:5000");
        assert_eq!(cfg.source.timeout_secs, 15);
        assert_eq!(cfg.presenter.display_secs, 5);
    }

    #[test]
    fn empty_toml_falls_back_to_defaults() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed.scheduler.severe_streak_threshold, 2);
        assert_eq!(parsed.source.poll_interval_secs, 10);
    }

    #[test]
    fn get_supports_every_listed_key() {
        let cfg = Config::default();
        for key in CONFIG_KEYS {
            assert!(cfg.get(key).is_some(), "missing key {key}");
        }
        assert!(cfg.get("scheduler.missing_key").is_none());
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("scheduler.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn set_rejects_unparsable_value() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("scheduler.cooldown_secs", "not_a_number"),
            Err(ConfigError::InvalidValue { .. })
        ));
        // Unchanged on error.
        assert_eq!(cfg.scheduler.cooldown_secs, 5);
    }
}
