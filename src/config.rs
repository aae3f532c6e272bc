//! Process configuration
//!
//! Everything is read once from the environment at startup. A missing
//! provider credential is fatal: the conversation client is never built
//! without one.

use crate::conversation::DEFAULT_QUERY_LABEL;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY is not set; refusing to start without a provider credential")]
    MissingApiKey,
    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Application configuration
#[derive(Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub base_url: String,
    pub default_model: String,
    pub request_timeout: Duration,
    pub port: u16,
    pub db_path: PathBuf,
    pub query_label: String,
}

// Hand-written so the credential never reaches a log line.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("request_timeout", &self.request_timeout)
            .field("port", &self.port)
            .field("db_path", &self.db_path)
            .field("query_label", &self.query_label)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup (the environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENAI_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let base_url = lookup("OPENAI_BASE_URL")
            .filter(|u| !u.trim().is_empty())
            .map_or_else(
                || DEFAULT_BASE_URL.to_string(),
                |u| u.trim_end_matches('/').to_string(),
            );

        let default_model = lookup("CONSAI_DEFAULT_MODEL")
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let timeout_secs = parse_var(&lookup, "CONSAI_REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "CONSAI_REQUEST_TIMEOUT_SECS",
                value: "0".to_string(),
            });
        }

        let port = parse_var(&lookup, "CONSAI_PORT", DEFAULT_PORT)?;

        let db_path = lookup("CONSAI_DB_PATH").map_or_else(
            || {
                let home = lookup("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(format!("{home}/.consai/settings.db"))
            },
            PathBuf::from,
        );

        let query_label =
            lookup("CONSAI_QUERY_LABEL").unwrap_or_else(|| DEFAULT_QUERY_LABEL.to_string());

        Ok(Self {
            api_key,
            base_url,
            default_model,
            request_timeout: Duration::from_secs(timeout_secs),
            port,
            db_path,
            query_label,
        })
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value: raw }),
    }
}
