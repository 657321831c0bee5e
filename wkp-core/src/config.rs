use crate::poll::STATS_POLL_INTERVAL;
use std::env;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;
use wkp_client::ClientError;
use wkp_client::client::parse_base_url;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const API_URL_ENV: &str = "WKP_API_URL";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid API URL: {0}")]
    InvalidApiUrl(#[from] ClientError),

    #[error("Could not read env file: {0}")]
    EnvFile(#[from] dotenvy::Error),
}

/// Where the console talks to and how often it polls.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub api_url: Url,
    pub poll_interval: Duration,
}

impl ConsoleConfig {
    /// Resolves the backend URL: explicit flag, then `WKP_API_URL` (a `.env`
    /// file in the working directory is loaded first if present), then the
    /// local default.
    pub fn from_env(flag: Option<&str>) -> Result<Self, ConfigError> {
        // Missing .env is the normal case
        let _ = dotenvy::dotenv();
        // Non-UTF-8 entries are skipped
        let vars = env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)));
        Self::from_vars(flag, vars)
    }

    /// Same as [`ConsoleConfig::from_env`] but reads `WKP_API_URL` from the
    /// given env file without touching the process environment.
    pub fn from_env_file(flag: Option<&str>, path: &Path) -> Result<Self, ConfigError> {
        let vars = dotenvy::from_path_iter(path)?.collect::<Result<Vec<_>, _>>()?;
        Self::from_vars(flag, vars)
    }

    /// Resolves against a set of `KEY=value` pairs. The last `WKP_API_URL`
    /// wins.
    pub fn from_vars<I>(flag: Option<&str>, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let env_value = vars
            .into_iter()
            .filter(|(key, _)| key == API_URL_ENV)
            .map(|(_, value)| value)
            .last();
        Self::resolve(flag, env_value.as_deref())
    }

    pub fn resolve(flag: Option<&str>, env_value: Option<&str>) -> Result<Self, ConfigError> {
        let raw = [flag, env_value]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|value| !value.is_empty())
            .unwrap_or(DEFAULT_API_URL);

        Ok(Self {
            api_url: parse_base_url(raw)?,
            poll_interval: STATS_POLL_INTERVAL,
        })
    }
}
