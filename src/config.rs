use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::error::Result;

/// Engine configuration.
///
/// Defaults, then an optional YAML file, then `BITEBRIDGE_*` environment
/// variables, each layer overriding the previous one.
///
/// ```
/// use bitebridge_engine::MarketConfig;
///
/// let config = MarketConfig::from_yaml_str("port: 9000\nbackend_url: http://localhost:4000\n").unwrap();
/// assert_eq!(config.port, 9000);
/// assert_eq!(config.db_path, "bitebridge.db");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// SQLite file for the local demo store
    pub db_path: String,

    /// HTTP service port
    pub port: u16,

    /// Backend API base URL; without it only the demo store is used
    pub backend_url: Option<String>,

    /// Bearer token sent to the backend
    pub api_token: Option<String>,

    /// Backend request timeout
    pub request_timeout_secs: u64,

    /// Recommendations per advert
    pub recommendation_limit: usize,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            db_path: "bitebridge.db".to_string(),
            port: 8090,
            backend_url: None,
            api_token: None,
            request_timeout_secs: 30,
            recommendation_limit: 4,
        }
    }
}

impl MarketConfig {
    /// Defaults overridden by the environment
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// YAML file overridden by the environment
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::from_yaml_str(&content)?.with_env_overrides())
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(db_path) = env_var("BITEBRIDGE_DB_PATH") {
            self.db_path = db_path;
        }
        if let Some(port) = parse_env("BITEBRIDGE_PORT") {
            self.port = port;
        }
        if let Some(url) = env_var("BITEBRIDGE_BACKEND_URL") {
            self.backend_url = Some(url);
        }
        if let Some(token) = env_var("BITEBRIDGE_API_TOKEN") {
            self.api_token = Some(token);
        }
        if let Some(secs) = parse_env("BITEBRIDGE_TIMEOUT_SECS") {
            self.request_timeout_secs = secs;
        }
        if let Some(limit) = parse_env("BITEBRIDGE_RECOMMENDATION_LIMIT") {
            self.recommendation_limit = limit;
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn env_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Invalid values are logged and ignored
fn parse_env<T: FromStr>(key: &str) -> Option<T>
where
    T::Err: Display,
{
    let raw = env_var(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Invalid {} value '{}': {}, keeping current setting", key, raw, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MarketConfig::default();
        assert_eq!(config.port, 8090);
        assert_eq!(config.recommendation_limit, 4);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.backend_url.is_none());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = MarketConfig::from_yaml_str(
            "backend_url: https://api.example.com\nrequest_timeout_secs: 5\n",
        )
        .unwrap();
        assert_eq!(config.backend_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.db_path, "bitebridge.db");
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        assert!(MarketConfig::from_yaml_str("port: [not a number]").is_err());
    }

    #[test]
    fn test_env_overrides() {
        env::set_var("BITEBRIDGE_RECOMMENDATION_LIMIT", "3");
        env::set_var("BITEBRIDGE_TIMEOUT_SECS", "soon");
        let config = MarketConfig::default().with_env_overrides();
        env::remove_var("BITEBRIDGE_RECOMMENDATION_LIMIT");
        env::remove_var("BITEBRIDGE_TIMEOUT_SECS");

        assert_eq!(config.recommendation_limit, 3);
        assert_eq!(config.request_timeout_secs, 30);
    }
}
