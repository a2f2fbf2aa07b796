//! Scanner configuration parsing from environment variables.
//!
//! Covers the instrument universe, cache TTL and the worker/timeout budgets of
//! a scan cycle.

use super::parse_var;
use crate::application::scanner::ScanSettings;
use crate::domain::market::Instrument;
use anyhow::Result;
use std::time::Duration;

/// Scanner environment configuration
#[derive(Debug, Clone)]
pub struct ScannerEnvConfig {
    pub symbols: Vec<Instrument>,
    pub cache_ttl: Duration,
    pub metadata_workers: usize,
    pub metadata_timeout: Duration,
    pub history_timeout: Duration,
}

impl ScannerEnvConfig {
    pub fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let symbols = match lookup("SCAN_SYMBOLS") {
            Some(raw) if !raw.trim().is_empty() => Self::parse_symbols(&raw),
            _ => Instrument::default_universe(),
        };
        if symbols.is_empty() {
            anyhow::bail!("SCAN_SYMBOLS must name at least one instrument");
        }

        let metadata_workers = parse_var(lookup, "METADATA_WORKERS", 5usize)?;
        if metadata_workers == 0 {
            anyhow::bail!("METADATA_WORKERS must be at least 1");
        }

        Ok(Self {
            symbols,
            cache_ttl: Duration::from_secs(parse_var(lookup, "CACHE_TTL_SECS", 60u64)?),
            metadata_workers,
            metadata_timeout: Duration::from_secs(parse_var(lookup, "METADATA_TIMEOUT_SECS", 15u64)?),
            history_timeout: Duration::from_secs(parse_var(lookup, "HISTORY_TIMEOUT_SECS", 60u64)?),
        })
    }

    /// Comma separated tickers; blanks and duplicates are dropped, order kept
    fn parse_symbols(raw: &str) -> Vec<Instrument> {
        let mut symbols: Vec<Instrument> = Vec::new();
        for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let instrument = Instrument::new(part);
            if !symbols.contains(&instrument) {
                symbols.push(instrument);
            }
        }
        symbols
    }

    pub fn scan_settings(&self) -> ScanSettings {
        ScanSettings {
            metadata_workers: self.metadata_workers,
            metadata_timeout: self.metadata_timeout,
            history_timeout: self.history_timeout,
        }
    }
}
