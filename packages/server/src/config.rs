//! Server configuration
//!
//! `ServerConfig` is built once at startup from environment variables and is
//! immutable afterwards. Reading goes through a lookup closure so tests can
//! supply values without touching the process environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `WBS_SERVER_HOST` | `127.0.0.1` |
//! | `WBS_SERVER_PORT` | `5000` |
//! | `CORS_ALLOW_ORIGIN` | local Vite ports, comma separated |
//! | `WBS_HIERARCHY_MODE` | `lenient` (`lenient` or `strict`) |
//! | `WBS_SEED_SAMPLE` | `true` |

use axum::http::HeaderValue;
use thiserror::Error;
use wbs_core::{HierarchyMode, ServiceConfig};

pub const HOST_VAR: &str = "WBS_SERVER_HOST";
pub const PORT_VAR: &str = "WBS_SERVER_PORT";
pub const CORS_VAR: &str = "CORS_ALLOW_ORIGIN";
pub const HIERARCHY_MODE_VAR: &str = "WBS_HIERARCHY_MODE";
pub const SEED_SAMPLE_VAR: &str = "WBS_SEED_SAMPLE";

const DEFAULT_PORT: u16 = 5000;

const DEFAULT_CORS_ORIGINS: [&str; 3] = [
    "http://localhost:5000",
    "http://localhost:5173", // Vite default
    "http://localhost:1420",
];

/// Configuration errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Runtime configuration of the HTTP server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Origins allowed by the CORS layer
    pub cors_origins: Vec<String>,

    /// Invariant checking applied by the service
    pub hierarchy_mode: HierarchyMode,

    /// Start from the sample project instead of an empty breakdown
    pub seed_sample_data: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
            hierarchy_mode: HierarchyMode::default(),
            seed_sample_data: true,
        }
    }
}

impl ServerConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for unset keys
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup(HOST_VAR) {
            config.host = host;
        }

        if let Some(port) = lookup(PORT_VAR) {
            config.port = port
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::invalid(PORT_VAR, port.as_str(), e.to_string()))?;
        }

        if let Some(origins) = lookup(CORS_VAR) {
            config.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Some(mode) = lookup(HIERARCHY_MODE_VAR) {
            config.hierarchy_mode = mode
                .parse()
                .map_err(|reason: String| ConfigError::invalid(HIERARCHY_MODE_VAR, mode.as_str(), reason))?;
        }

        if let Some(seed) = lookup(SEED_SAMPLE_VAR) {
            config.seed_sample_data = parse_bool(&seed)
                .ok_or_else(|| ConfigError::invalid(SEED_SAMPLE_VAR, seed.as_str(), "expected true or false"))?;
        }

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::invalid(HOST_VAR, self.host.as_str(), "host cannot be empty"));
        }

        if self.port == 0 {
            return Err(ConfigError::invalid(PORT_VAR, "0", "port must be greater than 0"));
        }

        if self.cors_origins.is_empty() {
            return Err(ConfigError::invalid(CORS_VAR, "", "at least one origin is required"));
        }

        for origin in &self.cors_origins {
            if !origin.starts_with("http://") && !origin.starts_with("https://") {
                return Err(ConfigError::invalid(
                    CORS_VAR,
                    origin.as_str(),
                    "origin must start with http:// or https://",
                ));
            }
            HeaderValue::from_str(origin)
                .map_err(|e| ConfigError::invalid(CORS_VAR, origin.as_str(), e.to_string()))?;
        }

        Ok(())
    }

    /// `host:port` string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Configuration handed to `WbsService`
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            hierarchy_mode: self.hierarchy_mode,
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address(), "127.0.0.1:5000");
        assert_eq!(config.cors_origins.len(), 3);
        assert_eq!(config.hierarchy_mode, HierarchyMode::Lenient);
        assert!(config.seed_sample_data);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_overrides_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            (HOST_VAR, "0.0.0.0"),
            (PORT_VAR, "8080"),
            (CORS_VAR, "http://localhost:3000, https://wbs.example.com"),
            (HIERARCHY_MODE_VAR, "strict"),
            (SEED_SAMPLE_VAR, "false"),
        ]))
        .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(
            config.cors_origins,
            vec!["http://localhost:3000", "https://wbs.example.com"]
        );
        assert!(config.service_config().hierarchy_mode.is_strict());
        assert!(!config.seed_sample_data);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_rejects_bad_values() {
        let bad_port = ServerConfig::from_lookup(lookup_from(&[(PORT_VAR, "http")]));
        assert!(matches!(
            bad_port,
            Err(ConfigError::InvalidValue { key: PORT_VAR, .. })
        ));

        let bad_mode = ServerConfig::from_lookup(lookup_from(&[(HIERARCHY_MODE_VAR, "loose")]));
        assert!(bad_mode.is_err());

        let bad_seed = ServerConfig::from_lookup(lookup_from(&[(SEED_SAMPLE_VAR, "maybe")]));
        assert!(bad_seed.is_err());
    }

    #[test]
    fn test_validation() {
        let mut config = ServerConfig::default();

        config.port = 0;
        assert!(config.validate().is_err());

        config.port = 5000;
        config.cors_origins = vec!["localhost:5173".to_string()];
        assert!(config.validate().is_err());

        config.cors_origins = Vec::new();
        assert!(config.validate().is_err());

        config.cors_origins = vec!["http://localhost:5173".to_string()];
        config.host = " ".to_string();
        assert!(config.validate().is_err());
    }
}
