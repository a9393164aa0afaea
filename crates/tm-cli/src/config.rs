//! Configuration loading and management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use tm_core::{DEFAULT_PRESET_MS, DEFAULT_TICK_INTERVAL, ShakeConfig};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Milliseconds between clock ticks.
    pub tick_interval_ms: u64,

    /// Countdown preset used until one is set explicitly.
    pub default_preset_ms: u64,

    /// Shake gesture tuning for motion input.
    #[serde(default)]
    pub shake: ShakeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_interval_ms: u64::try_from(DEFAULT_TICK_INTERVAL.as_millis()).unwrap_or(10),
            default_preset_ms: DEFAULT_PRESET_MS,
            shake: ShakeConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (TM_*, nested keys split on "__")
        figment = figment.merge(Env::prefixed("TM_").split("__"));

        figment.extract()
    }

    /// Tick interval as a [`Duration`], never shorter than one millisecond.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

/// Returns the platform-specific config directory for tm.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tm"))
}
