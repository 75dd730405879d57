//! Application-level configuration loading: bracket service endpoint and the
//! sync retry policy.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "MATCH_DESK_CONFIG_PATH";

const DEFAULT_BRACKET_BASE_URL: &str = "http://localhost:8081";
const DEFAULT_SYNC_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_SYNC_INITIAL_DELAY_MS: u64 = 1_000;
const DEFAULT_SYNC_MAX_DELAY_MS: u64 = 30_000;

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Where finalized results are propagated.
    pub bracket: BracketConfig,
    /// Retry policy of the sync worker.
    pub sync: SyncRetryConfig,
}

/// Endpoint of the external bracket-of-record service.
#[derive(Debug, Clone)]
pub struct BracketConfig {
    /// Base URL of the bracket service API.
    pub base_url: String,
    /// Bearer token, when the service requires one.
    pub token: Option<String>,
}

/// Backoff parameters for result propagation attempts.
#[derive(Debug, Clone)]
pub struct SyncRetryConfig {
    /// Attempts before a job is recorded as FAILED.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Cap for the doubling backoff.
    pub max_delay: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to baked-in
    /// defaults when the file is absent or unreadable.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(path = %path.display(), "loaded configuration");
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

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bracket: BracketConfig {
                base_url: DEFAULT_BRACKET_BASE_URL.to_owned(),
                token: None,
            },
            sync: SyncRetryConfig {
                max_attempts: DEFAULT_SYNC_MAX_ATTEMPTS,
                initial_delay: Duration::from_millis(DEFAULT_SYNC_INITIAL_DELAY_MS),
                max_delay: Duration::from_millis(DEFAULT_SYNC_MAX_DELAY_MS),
            },
        }
    }
}

/// JSON representation of the configuration file.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    bracket: Option<RawBracketConfig>,
    #[serde(default)]
    sync: Option<RawSyncConfig>,
}

#[derive(Debug, Deserialize)]
struct RawBracketConfig {
    base_url: Option<String>,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSyncConfig {
    max_attempts: Option<u32>,
    initial_delay_ms: Option<u64>,
    max_delay_ms: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = Self::default();
        let bracket = value.bracket.map_or_else(
            || defaults.bracket.clone(),
            |raw| BracketConfig {
                base_url: raw.base_url.unwrap_or(defaults.bracket.base_url.clone()),
                token: raw.token,
            },
        );
        let sync = value.sync.map_or_else(
            || defaults.sync.clone(),
            |raw| SyncRetryConfig {
                max_attempts: raw.max_attempts.unwrap_or(defaults.sync.max_attempts),
                initial_delay: raw
                    .initial_delay_ms
                    .map_or(defaults.sync.initial_delay, Duration::from_millis),
                max_delay: raw
                    .max_delay_ms
                    .map_or(defaults.sync.max_delay, Duration::from_millis),
            },
        );
        Self { bracket, sync }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
