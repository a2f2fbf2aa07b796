//! Configuration module for coinscan.
//!
//! Configuration is loaded from environment variables, organized by concern:
//! Provider, Scanner and Server. Every sub-config can also be built from an
//! arbitrary key lookup so tests never touch the process environment.

mod provider_config;
mod scanner_config;
mod server_config;

pub use provider_config::ProviderEnvConfig;
pub use scanner_config::ScannerEnvConfig;
pub use server_config::ServerEnvConfig;

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Where market data comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Deterministic offline data
    Mock,
    Yahoo,
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mock" => Ok(Mode::Mock),
            "yahoo" => Ok(Mode::Yahoo),
            _ => anyhow::bail!("Invalid MODE: {}. Must be 'mock' or 'yahoo'", s),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub provider: ProviderEnvConfig,
    pub scanner: ScannerEnvConfig,
    pub server: ServerEnvConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = match lookup("MODE") {
            Some(raw) => Mode::from_str(&raw)?,
            None => Mode::Yahoo,
        };

        let provider =
            ProviderEnvConfig::from_lookup(&lookup).context("Failed to load provider config")?;
        let scanner =
            ScannerEnvConfig::from_lookup(&lookup).context("Failed to load scanner config")?;
        let server =
            ServerEnvConfig::from_lookup(&lookup).context("Failed to load server config")?;

        Ok(Self {
            mode,
            provider,
            scanner,
            server,
        })
    }
}

/// Parse `key` from `lookup`, falling back to `default` when it is unset or
/// blank. A value that is present but does not parse is an error.
pub(crate) fn parse_var<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Failed to parse {}", key)),
        _ => Ok(default),
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::lookup;
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup(&[])).expect("Should parse with defaults");
        assert_eq!(config.mode, Mode::Yahoo);
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.scanner.metadata_workers, 5);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(Mode::from_str("MOCK").unwrap(), Mode::Mock);
        assert_eq!(Mode::from_str(" yahoo ").unwrap(), Mode::Yahoo);
        assert!(Mode::from_str("alpaca").is_err());
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let err = Config::from_lookup(lookup(&[("MODE", "binance")])).unwrap_err();
        assert!(err.to_string().contains("Invalid MODE"));
    }

    #[test]
    fn test_parse_var() {
        let source = lookup(&[("A", "7"), ("B", "  "), ("C", "seven")]);
        assert_eq!(parse_var(&source, "A", 1u32).unwrap(), 7);
        assert_eq!(parse_var(&source, "B", 1u32).unwrap(), 1);
        assert_eq!(parse_var(&source, "MISSING", 1u32).unwrap(), 1);

        let err = parse_var(&source, "C", 1u32).unwrap_err();
        assert_eq!(err.to_string(), "Failed to parse C");
    }
}
