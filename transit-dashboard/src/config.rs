//! Runtime configuration from the environment.

use std::net::SocketAddr;
use std::time::Duration;

use crate::map::MapConfig;
use crate::source::{ApiConfig, DEFAULT_BASE_URL};

/// Backend base URL.
pub const ENV_API_BASE: &str = "TRANSIT_API_BASE";
/// Request timeout in seconds.
pub const ENV_API_TIMEOUT: &str = "TRANSIT_API_TIMEOUT_SECS";
/// Listen address for the web surface.
pub const ENV_BIND: &str = "DASHBOARD_BIND";
/// Departures auto-refresh period in seconds; unset or 0 disables it.
pub const ENV_REFRESH: &str = "DEPARTURES_REFRESH_SECS";

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Errors reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds, got {value:?}")]
    InvalidSeconds { var: &'static str, value: String },

    #[error("{var} must be at least 1 second")]
    ZeroSeconds { var: &'static str },

    #[error("{var} is not a socket address: {value:?}")]
    InvalidAddress {
        var: &'static str,
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Everything the binary needs to start.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub api: ApiConfig,
    pub bind: SocketAddr,
    /// Departures auto-refresh period.
    pub refresh_every: Option<Duration>,
    pub map: MapConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            refresh_every: None,
            map: MapConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base = lookup(ENV_API_BASE).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut api = ApiConfig::new(base);
        match seconds(&lookup, ENV_API_TIMEOUT)? {
            Some(0) => return Err(ConfigError::ZeroSeconds { var: ENV_API_TIMEOUT }),
            Some(secs) => api = api.with_timeout(secs),
            None => {}
        }

        let bind_raw = lookup(ENV_BIND).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind_raw
            .trim()
            .parse()
            .map_err(|source| ConfigError::InvalidAddress {
                var: ENV_BIND,
                value: bind_raw.clone(),
                source,
            })?;

        let refresh_every = seconds(&lookup, ENV_REFRESH)?
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            api,
            bind,
            refresh_every,
            map: MapConfig::default(),
        })
    }

    /// Override the backend base URL.
    pub fn with_api_base(mut self, base_url: impl Into<String>) -> Self {
        self.api.base_url = ApiConfig::new(base_url).base_url;
        self
    }

    pub fn with_refresh_every(mut self, every: Option<Duration>) -> Self {
        self.refresh_every = every;
        self
    }
}

fn seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<u64>, ConfigError> {
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|_| ConfigError::InvalidSeconds { var, value: raw })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<DashboardConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DashboardConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.timeout_secs, 15);
        assert_eq!(config.bind.to_string(), "127.0.0.1:3000");
        assert!(config.refresh_every.is_none());
        assert_eq!(config.map.home_zoom, 12.0);
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            (ENV_API_BASE, "https://transit.example.org/"),
            (ENV_API_TIMEOUT, "5"),
            (ENV_BIND, "0.0.0.0:8080"),
            (ENV_REFRESH, "30"),
        ])
        .unwrap();

        assert_eq!(config.api.base_url, "https://transit.example.org");
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.refresh_every, Some(Duration::from_secs(30)));
    }

    #[test]
    fn zero_refresh_disables() {
        let config = config(&[(ENV_REFRESH, "0")]).unwrap();
        assert!(config.refresh_every.is_none());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = config(&[(ENV_API_TIMEOUT, "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroSeconds { var: ENV_API_TIMEOUT }));
        assert_eq!(err.to_string(), "TRANSIT_API_TIMEOUT_SECS must be at least 1 second");
    }

    #[test]
    fn rejects_bad_values() {
        let err = config(&[(ENV_API_TIMEOUT, "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSeconds { var: ENV_API_TIMEOUT, .. }));

        let err = config(&[(ENV_BIND, "localhost")]).unwrap_err();
        assert!(err.to_string().contains(ENV_BIND));
    }

    #[test]
    fn builder_overrides() {
        let config = DashboardConfig::default()
            .with_api_base("http://10.0.0.2:9000")
            .with_refresh_every(Some(Duration::from_secs(10)));
        assert_eq!(config.api.base_url, "http://10.0.0.2:9000");
        assert_eq!(config.api.timeout_secs, 15);
        assert_eq!(config.refresh_every, Some(Duration::from_secs(10)));
    }
}
