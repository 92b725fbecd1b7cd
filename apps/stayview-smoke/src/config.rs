//! Environment-backed runtime configuration for `stayview-smoke`.

use std::{env, error::Error, fmt};

use url::Url;

use viewer_transport::DEFAULT_BASE_URL;

const DEFAULT_EVENT_BUFFER: usize = 16;

/// Runtime configuration used by the smoke binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmokeConfig {
    /// Base address of the apartment API.
    pub base_url: Url,
    /// Identifier to fetch. When unset, the binary only checks wiring.
    pub apartment_id: Option<String>,
    /// Event fan-out buffer size.
    pub event_buffer: usize,
}

impl SmokeConfig {
    /// Parse configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(mut lookup: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let base_url_raw = optional_trimmed_env("STAYVIEW_BASE_URL", &mut lookup)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let base_url = Url::parse(&base_url_raw).map_err(|err| ConfigError::InvalidValue {
            key: "STAYVIEW_BASE_URL",
            value: base_url_raw.clone(),
            reason: err.to_string(),
        })?;

        let apartment_id = optional_trimmed_env("STAYVIEW_APARTMENT_ID", &mut lookup);

        let event_buffer = match optional_trimmed_env("STAYVIEW_EVENT_BUFFER", &mut lookup) {
            None => DEFAULT_EVENT_BUFFER,
            Some(value) => value.parse::<usize>().map_err(|err| ConfigError::InvalidValue {
                key: "STAYVIEW_EVENT_BUFFER",
                value,
                reason: err.to_string(),
            })?,
        };
        if event_buffer == 0 {
            return Err(ConfigError::InvalidValue {
                key: "STAYVIEW_EVENT_BUFFER",
                value: "0".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }

        Ok(Self {
            base_url,
            apartment_id,
            event_buffer,
        })
    }
}

/// Errors produced while parsing runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable could not be parsed.
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { key, value, reason } => {
                write!(f, "invalid {key}='{value}': {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

fn optional_trimmed_env<F>(key: &'static str, lookup: &mut F) -> Option<String>
where
    F: FnMut(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
