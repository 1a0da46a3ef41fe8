/// Player configuration
use crate::error::{CliError, Result};
use lectern_core::Preferences;
use lectern_playback::{DriverConfig, PlaybackConfig, PlaybackRate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "lectern.toml";

const MIN_TICK_INTERVAL_MS: u64 = 10;
const MAX_TICK_INTERVAL_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LecternConfig {
    #[serde(default = "default_player")]
    pub player: PlayerSettings,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlayerSettings {
    /// Wall-clock milliseconds between clock ticks
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Rate every loaded track starts at
    #[serde(default = "default_rate")]
    pub default_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_preferences_path")]
    pub preferences_path: PathBuf,
}

impl LecternConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist. Without one, `lectern.toml` in the
    /// working directory is used if present. `LECTERN_`-prefixed variables
    /// override both, with `__` between nesting levels
    /// (`LECTERN_PLAYER__TICK_INTERVAL_MS=100`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path).required(true));
            }
            None => {
                let config_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if config_path.exists() {
                    settings = settings.add_source(config::File::from(config_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("LECTERN")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| CliError::config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CliError::config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let tick = self.player.tick_interval_ms;
        if !(MIN_TICK_INTERVAL_MS..=MAX_TICK_INTERVAL_MS).contains(&tick) {
            return Err(CliError::config(format!(
                "player.tick_interval_ms must be between {} and {}, got {}",
                MIN_TICK_INTERVAL_MS, MAX_TICK_INTERVAL_MS, tick
            )));
        }

        if PlaybackRate::from_value(self.player.default_rate).is_none() {
            return Err(CliError::config(format!(
                "player.default_rate {} is not one of {}",
                self.player.default_rate,
                supported_rates()
            )));
        }

        if self.storage.preferences_path.as_os_str().is_empty() {
            return Err(CliError::config("storage.preferences_path is empty"));
        }

        Ok(())
    }

    /// Render as TOML, the same shape `load` accepts
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::config(e.to_string()))
    }

    /// Driver settings derived from `player`
    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            tick_interval: Duration::from_millis(self.player.tick_interval_ms),
        }
    }

    /// Manager settings derived from `player` plus restored preferences
    pub fn playback_config(&self, preferences: Preferences) -> PlaybackConfig {
        PlaybackConfig {
            preferences,
            default_rate: PlaybackRate::from_value(self.player.default_rate).unwrap_or_default(),
        }
    }
}

fn supported_rates() -> String {
    PlaybackRate::ALL
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// Default values
fn default_player() -> PlayerSettings {
    PlayerSettings {
        tick_interval_ms: default_tick_interval_ms(),
        default_rate: default_rate(),
    }
}

fn default_tick_interval_ms() -> u64 {
    250
}

fn default_rate() -> f64 {
    1.0
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        preferences_path: default_preferences_path(),
    }
}

fn default_preferences_path() -> PathBuf {
    PathBuf::from("./data/preferences.json")
}

impl Default for LecternConfig {
    fn default() -> Self {
        Self {
            player: default_player(),
            storage: default_storage(),
        }
    }
}
