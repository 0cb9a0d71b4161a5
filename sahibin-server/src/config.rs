//! Server settings read from the environment.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sahibin_core::stats::DEFAULT_HISTORY_LIMIT;
use sahibin_provider_vision::VisionConfig;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Invalid environment settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable could not be parsed.
    #[error("{name} has invalid value {value:?}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
    },
}

/// Settings for the HTTP server and its external backends.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address (`BIND_ADDR`).
    pub bind_addr: String,
    /// Listen port (`PORT`).
    pub port: u16,
    /// Directory holding the statistics document (`SAHIBIN_DATA_DIR`).
    pub data_dir: PathBuf,
    /// Scan records kept in the statistics document (`SAHIBIN_HISTORY_LIMIT`).
    pub history_limit: usize,
    /// Largest accepted image upload (`SAHIBIN_MAX_UPLOAD_BYTES`).
    pub max_upload_bytes: usize,
    /// Timeout for outbound requests (`SAHIBIN_HTTP_TIMEOUT_SECS`).
    pub http_timeout: Duration,
    /// Detection endpoint (`SAHIBIN_CLASSIFIER_URL`, `SAHIBIN_CLASSIFIER_API_KEY`).
    pub classifier: Option<VisionConfig>,
    /// Google Places key (`GOOGLE_MAPS_API_KEY`).
    pub google_maps_api_key: Option<String>,
}

impl ServerConfig {
    /// Read settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a numeric variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read settings through `lookup`, which returns the value of a variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a numeric variable cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let classifier = text("SAHIBIN_CLASSIFIER_URL").map(|endpoint| VisionConfig {
            endpoint,
            api_key: text("SAHIBIN_CLASSIFIER_API_KEY"),
        });

        Ok(Self {
            bind_addr: text("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned()),
            port: parse(&text, "PORT", DEFAULT_PORT)?,
            data_dir: text("SAHIBIN_DATA_DIR")
                .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from),
            history_limit: parse(&text, "SAHIBIN_HISTORY_LIMIT", DEFAULT_HISTORY_LIMIT)?,
            max_upload_bytes: parse(&text, "SAHIBIN_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            http_timeout: Duration::from_secs(parse(
                &text,
                "SAHIBIN_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
            classifier,
            google_maps_api_key: text("GOOGLE_MAPS_API_KEY"),
        })
    }
}

fn parse<T, F>(text: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match text(name) {
        Some(value) => value
            .parse()
            .map_err(|_parse_err| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
