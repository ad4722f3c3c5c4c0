//! Configuration for the homework watchbot: secrets from the environment and
//! optional YAML tunables.
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, instrument};

use crate::error::Error as WatchError;

pub const PRACTICUM_TOKEN: &str = "PRACTICUM_TOKEN";
pub const TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// The three credentials the bot cannot run without.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secrets {
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .finish_non_exhaustive()
    }
}

impl Secrets {
    /// Build secrets from an arbitrary key lookup; unset keys become empty.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            practicum_token: lookup(PRACTICUM_TOKEN).unwrap_or_default(),
            telegram_token: lookup(TELEGRAM_TOKEN).unwrap_or_default(),
            telegram_chat_id: lookup(TELEGRAM_CHAT_ID).unwrap_or_default(),
        }
    }

    /// Read secrets from the process environment, after loading `.env` if
    /// one exists in the working directory.
    pub fn from_env() -> Self {
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Names of the variables that are unset or blank.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (PRACTICUM_TOKEN, &self.practicum_token),
            (TELEGRAM_TOKEN, &self.telegram_token),
            (TELEGRAM_CHAT_ID, &self.telegram_chat_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// True when every required secret is present and non-empty.
pub fn check_tokens(secrets: &Secrets) -> bool {
    secrets.missing().is_empty()
}

/// Pass the secrets through when complete; otherwise log the fatal condition
/// and name every missing variable.
#[instrument(skip_all)]
pub fn ensure_secrets(secrets: Secrets) -> Result<Secrets, WatchError> {
    if check_tokens(&secrets) {
        return Ok(secrets);
    }
    let err = WatchError::MissingEnv(secrets.missing());
    error!(severity = "CRITICAL", "{}; check the .env file", err);
    Err(err)
}

/// Root of the optional YAML tunables file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub api: Api,
    pub poll: Poll,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Api {
    pub endpoint: String,
    /// Zero leaves the HTTP client's default in place.
    pub request_timeout_secs: u64,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Poll {
    pub retry_period_secs: u64,
    pub initial_lookback_secs: u64,
}

impl Default for Poll {
    fn default() -> Self {
        Self {
            retry_period_secs: 600,
            initial_lookback_secs: 30,
        }
    }
}

impl Config {
    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.api.endpoint)
            .map_err(|_| ConfigError::Invalid("api.endpoint must be a valid URL"))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(ConfigError::Invalid("api.endpoint must use http or https")),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        match self.api.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn retry_period(&self) -> Duration {
        Duration::from_secs(self.poll.retry_period_secs)
    }

    /// Cursor for the very first fetch: `now` minus the configured lookback.
    pub fn initial_cursor(&self, now: i64) -> i64 {
        now - self.poll.initial_lookback_secs as i64
    }
}

/// Load tunables from a YAML file and validate them.
/// - If `path` is None, built-in defaults are used.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let cfg = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            serde_yaml::from_str(&content)?
        }
        None => Config::default(),
    };
    validate(&cfg)?;
    Ok(cfg)
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.api.endpoint.trim().is_empty() {
        return Err(ConfigError::Invalid("api.endpoint must be non-empty"));
    }
    cfg.endpoint_url()?;
    if cfg.poll.retry_period_secs == 0 {
        return Err(ConfigError::Invalid("poll.retry_period_secs must be > 0"));
    }
    Ok(())
}

/// Example tunables file with the built-in defaults spelled out.
pub fn example() -> &'static str {
    r#"api:
  endpoint: "https://practicum.yandex.ru/api/user_api/homework_statuses/"
  request_timeout_secs: 30

poll:
  retry_period_secs: 600
  initial_lookback_secs: 30
"#
}
