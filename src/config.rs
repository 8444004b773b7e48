//! Application-level configuration loading: game catalog, countdown defaults and
//! client presentation settings.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    client::timer::{DEFAULT_TIMER_SECONDS, TIMER_PRESETS, TimerSettings},
    domain::{GameType, default_catalog},
};

/// Default location on disk where the binaries look for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "FUTQUIZ_CONFIG_PATH";
/// Environment variable that overrides the API base URL used by the client.
const API_URL_ENV: &str = "FUTQUIZ_API_URL";
const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_SKIN: &str = "classic";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    catalog: IndexMap<String, GameType>,
    timer_enabled: bool,
    timer_seconds: u32,
    allow_replay: bool,
    skin: String,
    api_url: String,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the baked-in catalog.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        games = app_config.catalog.len(),
                        "loaded game catalog from config"
                    );
                    app_config
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
        };

        config.with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Some(url) = env::var(API_URL_ENV).ok().filter(|url| !url.trim().is_empty()) {
            self.api_url = url;
        }
        self
    }

    /// Every game of the catalog in display order.
    pub fn games(&self) -> Vec<GameType> {
        self.catalog.values().cloned().collect()
    }

    /// Look a game up by identifier.
    pub fn game(&self, id: &str) -> Option<&GameType> {
        self.catalog.get(id)
    }

    /// Whether the countdown is enabled by default on the selection screen.
    pub fn timer_enabled(&self) -> bool {
        self.timer_enabled
    }

    /// Default countdown duration per question, in seconds.
    pub fn timer_seconds(&self) -> u32 {
        self.timer_seconds
    }

    /// Countdown settings a new session starts with.
    pub fn timer(&self) -> TimerSettings {
        if self.timer_enabled {
            TimerSettings::enabled(self.timer_seconds)
        } else {
            TimerSettings::disabled()
        }
    }

    /// Whether finished games may be replayed on the same day. Debug builds only; config can
    /// turn it off but never on.
    pub fn allow_replay(&self) -> bool {
        self.allow_replay
    }

    /// Name of the render skin used by the terminal client.
    pub fn skin(&self) -> &str {
        &self.skin
    }

    /// Base URL of the quiz API.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: index_catalog(default_catalog()),
            timer_enabled: false,
            timer_seconds: DEFAULT_TIMER_SECONDS,
            allow_replay: cfg!(debug_assertions),
            skin: DEFAULT_SKIN.into(),
            api_url: DEFAULT_API_URL.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    games: Option<Vec<GameType>>,
    #[serde(default)]
    timer: Option<RawTimer>,
    #[serde(default)]
    allow_replay: Option<bool>,
    #[serde(default)]
    skin: Option<String>,
    #[serde(default)]
    api_url: Option<String>,
}

#[derive(Debug, Deserialize)]
/// JSON representation of the countdown defaults.
struct RawTimer {
    #[serde(default)]
    enabled: bool,
    seconds: u32,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = Self::default();

        let catalog = match value.games {
            Some(games) if !games.is_empty() => index_catalog(games),
            Some(_) => {
                warn!("config declares an empty game catalog; keeping built-in games");
                defaults.catalog
            }
            None => defaults.catalog,
        };

        let (timer_enabled, timer_seconds) = match value.timer {
            Some(RawTimer { seconds: 0, .. }) => {
                warn!("timer duration must be positive; using default");
                (defaults.timer_enabled, defaults.timer_seconds)
            }
            Some(RawTimer { enabled, seconds }) => {
                if !TIMER_PRESETS.contains(&seconds) {
                    warn!(seconds, "timer duration is not one of the offered presets");
                }
                (enabled, seconds)
            }
            None => (defaults.timer_enabled, defaults.timer_seconds),
        };

        Self {
            catalog,
            timer_enabled,
            timer_seconds,
            allow_replay: defaults.allow_replay && value.allow_replay.unwrap_or(true),
            skin: value.skin.unwrap_or(defaults.skin),
            api_url: value.api_url.unwrap_or(defaults.api_url),
        }
    }
}

fn index_catalog(games: Vec<GameType>) -> IndexMap<String, GameType> {
    games
        .into_iter()
        .map(|game| (game.id.clone(), game))
        .collect()
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_config_overrides_catalog_and_timer() {
        let raw: RawConfig = serde_json::from_str(
            r#"{
                "games": [
                    {"id": "derby", "name": "Derby Day", "description": "Rivalries", "available": true}
                ],
                "timer": {"enabled": true, "seconds": 15},
                "allowReplay": false,
                "skin": "compact"
            }"#,
        )
        .unwrap();

        let config: AppConfig = raw.into();
        assert_eq!(config.games().len(), 1);
        assert!(config.game("derby").is_some());
        assert!(config.timer_enabled());
        assert_eq!(config.timer_seconds(), 15);
        assert!(!config.allow_replay());
        assert_eq!(config.skin(), "compact");
    }

    #[test]
    fn replay_cannot_be_enabled_in_release_builds() {
        let enabled: RawConfig = serde_json::from_str(r#"{"allowReplay": true}"#).unwrap();
        let config: AppConfig = enabled.into();
        assert_eq!(config.allow_replay(), cfg!(debug_assertions));

        let unset: AppConfig = serde_json::from_str::<RawConfig>("{}").unwrap().into();
        assert_eq!(unset.allow_replay(), cfg!(debug_assertions));
        if !cfg!(debug_assertions) {
            assert!(!config.allow_replay());
            assert!(!AppConfig::default().allow_replay());
        }
    }

    #[test]
    fn empty_catalog_and_zero_timer_fall_back() {
        let raw: RawConfig =
            serde_json::from_str(r#"{"games": [], "timer": {"seconds": 0}}"#).unwrap();
        let config: AppConfig = raw.into();
        assert_eq!(config.games().len(), default_catalog().len());
        assert_eq!(config.timer_seconds(), DEFAULT_TIMER_SECONDS);
    }

    #[test]
    fn catalog_keeps_declaration_order() {
        let config = AppConfig::default();
        let ids: Vec<_> = config.games().into_iter().map(|g| g.id).collect();
        assert_eq!(ids, vec!["daily-trivia", "player-guess", "club-quiz"]);
    }
}
