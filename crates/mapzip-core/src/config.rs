//! Client configuration loaded with Figment.
//!
//! Merge order (later overrides earlier):
//! 1. Compiled defaults
//! 2. `$XDG_CONFIG_HOME/mapzip/config.toml`
//! 3. `MAPZIP_*` environment variables
//! 4. Explicit overrides from the caller (`with_*` builders)
//!
//! Keys are flat and match the variable names without the prefix, so
//! `MAPZIP_POLL_ATTEMPTS` and `poll_attempts = 3` in the file set the same
//! value. Empty variables count as unset.

use std::{path::PathBuf, time::Duration};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::{
    api::DEFAULT_BASE_URL,
    error::{MapzipError, Result, ResultExt},
    poll::PollPolicy,
};

/// Prefix of every environment variable the client reads.
pub const ENV_PREFIX: &str = "MAPZIP_";

/// File name looked up in the XDG config directories.
pub const CONFIG_FILE_NAME: &str = "config.toml";

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base_url: String,
    /// SQLite store location; `None` uses the XDG data directory.
    pub store_path: Option<PathBuf>,
    pub poll: PollPolicy,
    pub http_timeout: Duration,
    /// Sent verbatim as the `Cookie` header.
    pub session_cookie: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            store_path: None,
            poll: PollPolicy::default(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            session_cookie: None,
        }
    }
}

/// Flat settings as they appear in the file and the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct Settings {
    api_base_url: String,
    store_file: Option<PathBuf>,
    poll_attempts: u32,
    poll_interval_secs: u64,
    http_timeout_secs: u64,
    session_cookie: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let defaults = ClientConfig::default();
        Self {
            api_base_url: defaults.api_base_url,
            store_file: None,
            poll_attempts: defaults.poll.attempts,
            poll_interval_secs: defaults.poll.interval.as_secs(),
            http_timeout_secs: defaults.http_timeout.as_secs(),
            session_cookie: None,
        }
    }
}

impl TryFrom<Settings> for ClientConfig {
    type Error = MapzipError;

    fn try_from(settings: Settings) -> Result<Self> {
        if settings.poll_attempts == 0 {
            return Err(MapzipError::Configuration {
                message: "poll_attempts must be at least 1".to_string(),
            });
        }
        Ok(Self {
            api_base_url: settings.api_base_url,
            store_path: settings.store_file,
            poll: PollPolicy {
                attempts: settings.poll_attempts,
                interval: Duration::from_secs(settings.poll_interval_secs),
            },
            http_timeout: Duration::from_secs(settings.http_timeout_secs),
            session_cookie: settings.session_cookie.filter(|cookie| !cookie.trim().is_empty()),
        })
    }
}

/// `MAPZIP_*` variables, skipping the ones set to an empty string.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).filter(|key| {
        let name = format!("{ENV_PREFIX}{}", key.as_str().to_ascii_uppercase());
        std::env::var(name).is_ok_and(|value| !value.trim().is_empty())
    })
}

fn config_file() -> Option<PathBuf> {
    xdg::BaseDirectories::with_prefix("mapzip").find_config_file(CONFIG_FILE_NAME)
}

impl ClientConfig {
    /// Builds the layered Figment: defaults, the XDG config file when one
    /// exists, then the environment.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        if let Some(path) = config_file() {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(env_provider())
    }

    /// Defaults overlaid with the config file and `MAPZIP_*` variables.
    pub fn from_env() -> Result<Self> {
        Self::from_figment(&Self::figment())
    }

    /// Extracts a configuration from any Figment whose keys follow the
    /// flat layout above.
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        figment
            .extract::<Settings>()
            .with_context("invalid configuration")?
            .try_into()
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = Some(path.into());
        self
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }
}
