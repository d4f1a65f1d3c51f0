//! Cloud API server configuration.
//!
//! Built once at startup and handed by reference to the constructors that
//! need it. Nothing below `main` reads the process environment.

use std::str::FromStr;

use crate::db::DatabaseConfig;
use crate::inference::bedrock::BedrockConfig;

/// Top-level API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Listen address (e.g., "0.0.0.0").
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Reference-table database settings.
    pub database: DatabaseConfig,
    /// Bedrock SQL generation settings.
    pub bedrock: BedrockConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl ApiConfig {
    /// Load config from environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load config through an arbitrary variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            host: lookup("HOST").unwrap_or_else(default_host),
            port: parse_var(&lookup, "PORT").unwrap_or_else(default_port),
            database: DatabaseConfig::from_vars(&lookup),
            bedrock: BedrockConfig::from_vars(&lookup),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database: DatabaseConfig::default(),
            bedrock: BedrockConfig::default(),
        }
    }
}

/// Parse a variable, ignoring it when absent or malformed.
pub(crate) fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    lookup(key).and_then(|raw| raw.trim().parse().ok())
}

/// Read a boolean flag ("true" or "1").
pub(crate) fn flag_var(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> bool {
    lookup(key)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false)
}
