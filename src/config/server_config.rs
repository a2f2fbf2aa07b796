//! HTTP server configuration parsing from environment variables.

use super::parse_var;
use anyhow::Result;

/// Server environment configuration
#[derive(Debug, Clone)]
pub struct ServerEnvConfig {
    pub host: String,
    pub port: u16,
    pub metrics_enabled: bool,
}

impl Default for ServerEnvConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            metrics_enabled: true,
        }
    }
}

impl ServerEnvConfig {
    pub fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            host: parse_var(lookup, "SERVER_HOST", defaults.host)?,
            port: parse_var(lookup, "SERVER_PORT", defaults.port)?,
            metrics_enabled: parse_var(lookup, "METRICS_ENABLED", defaults.metrics_enabled)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
