//! Market data provider configuration parsing from environment variables.

use super::parse_var;
use anyhow::{Context, Result};
use std::time::Duration;
use url::Url;

pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Provider environment configuration
#[derive(Debug, Clone)]
pub struct ProviderEnvConfig {
    pub base_url: Url,
    pub http_timeout: Duration,
    pub max_retries: u32,
    /// Per-symbol chart requests allowed in flight during one bulk call
    pub history_concurrency: usize,
}

impl ProviderEnvConfig {
    pub fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = parse_var(lookup, "YAHOO_BASE_URL", DEFAULT_YAHOO_BASE_URL.to_string())?;
        let base_url = Url::parse(&raw_url).context("Failed to parse YAHOO_BASE_URL")?;

        let history_concurrency = parse_var(lookup, "HISTORY_FETCH_CONCURRENCY", 8usize)?;
        if history_concurrency == 0 {
            anyhow::bail!("HISTORY_FETCH_CONCURRENCY must be at least 1");
        }

        Ok(Self {
            base_url,
            http_timeout: Duration::from_secs(parse_var(lookup, "HTTP_TIMEOUT_SECS", 30u64)?),
            max_retries: parse_var(lookup, "HTTP_MAX_RETRIES", 3u32)?,
            history_concurrency,
        })
    }
}
