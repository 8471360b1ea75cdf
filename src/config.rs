//! Application-level configuration loading, including lobby lifecycle knobs.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "BULLS_COWS_BACK_CONFIG_PATH";

/// Lobbies older than this are purged regardless of activity.
const DEFAULT_LOBBY_TTL_HOURS: u64 = 24;
/// How often the background sweep looks for expired lobbies.
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 3600;
/// Hard cap on players per lobby.
const DEFAULT_MAX_PLAYERS: usize = 8;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Maximum age of a lobby before the sweep evicts it.
    pub lobby_ttl: Duration,
    /// Interval between two background sweep runs.
    pub sweep_interval: Duration,
    /// Maximum number of players allowed to join a single lobby.
    pub max_players: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            lobby_ttl: Duration::from_secs(DEFAULT_LOBBY_TTL_HOURS * 3600),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            max_players: DEFAULT_MAX_PLAYERS,
        }
    }
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to baked-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        ttl_secs = config.lobby_ttl.as_secs(),
                        max_players = config.max_players,
                        "loaded configuration from file"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

/// Resolve the configuration path from the environment or the default.
fn resolve_config_path() -> PathBuf {
    env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[derive(Debug, Deserialize)]
/// On-disk configuration shape; every field is optional.
struct RawConfig {
    lobby_ttl_hours: Option<u64>,
    sweep_interval_secs: Option<u64>,
    max_players: Option<usize>,
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            lobby_ttl: raw
                .lobby_ttl_hours
                .map(|hours| Duration::from_secs(hours * 3600))
                .unwrap_or(defaults.lobby_ttl),
            sweep_interval: raw
                .sweep_interval_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.sweep_interval),
            max_players: raw.max_players.unwrap_or(defaults.max_players),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_config_overrides_only_present_fields() {
        let raw: RawConfig = serde_json::from_str(r#"{"lobby_ttl_hours": 1}"#).unwrap();
        let config: AppConfig = raw.into();
        assert_eq!(config.lobby_ttl, Duration::from_secs(3600));
        assert_eq!(config.sweep_interval, AppConfig::default().sweep_interval);
        assert_eq!(config.max_players, DEFAULT_MAX_PLAYERS);
    }
}
