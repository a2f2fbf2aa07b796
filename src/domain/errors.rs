use crate::domain::market::HistoryProfile;
use serde::Serialize;
use thiserror::Error;

/// Errors related to market data and connectivity
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("Request to {endpoint} failed: {reason}")]
    RequestFailed { endpoint: String, reason: String },

    #[error("{endpoint} returned HTTP {status}")]
    BadStatus { endpoint: String, status: u16 },

    #[error("Invalid market data for {symbol}: {reason}")]
    InvalidData { symbol: String, reason: String },

    #[error("No data returned for {symbol}")]
    NoData { symbol: String },
}

/// Failures of the bulk history step. Any of these aborts the scan cycle.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("History request for {profile} failed: {source}")]
    Provider {
        profile: HistoryProfile,
        #[source]
        source: anyhow::Error,
    },

    #[error("History request for {profile} timed out after {duration_ms}ms")]
    Timeout {
        profile: HistoryProfile,
        duration_ms: u64,
    },

    #[error("History returned no data for any of {requested} instruments")]
    Empty { requested: usize },
}

/// Why an instrument was left out of a scan
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    #[error("unusable metadata: price={price}, market_cap={market_cap}")]
    InvalidMetadata { price: f64, market_cap: f64 },

    #[error("metadata lookup timed out after {duration_ms}ms")]
    MetadataTimeout { duration_ms: u64 },

    #[error("metadata worker aborted: {message}")]
    WorkerFailed { message: String },

    #[error("indicator assembly failed: {message}")]
    ComputeFailed { message: String },
}

impl SkipReason {
    /// Stable short label, used for metrics
    pub fn label(&self) -> &'static str {
        match self {
            SkipReason::InvalidMetadata { .. } => "invalid_metadata",
            SkipReason::MetadataTimeout { .. } => "metadata_timeout",
            SkipReason::WorkerFailed { .. } => "worker_failed",
            SkipReason::ComputeFailed { .. } => "compute_failed",
        }
    }
}
