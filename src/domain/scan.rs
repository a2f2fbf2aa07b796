use crate::domain::errors::SkipReason;
use crate::domain::market::Instrument;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Which metadata tier produced the values of a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteSource {
    Fast,
    Detailed,
    Unresolved,
}

/// Raw metadata lookup outcome. Unresolved fields are zero.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataLookup {
    pub instrument: Instrument,
    pub price: f64,
    pub market_cap: f64,
    pub source: QuoteSource,
}

/// Metadata that passed the validity gate: positive price and market cap
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataRecord {
    pub instrument: Instrument,
    pub price: f64,
    pub market_cap: f64,
}

impl TryFrom<MetadataLookup> for MetadataRecord {
    type Error = SkipReason;

    fn try_from(lookup: MetadataLookup) -> Result<Self, Self::Error> {
        let usable = |v: f64| v.is_finite() && v > 0.0;
        if !usable(lookup.price) || !usable(lookup.market_cap) {
            return Err(SkipReason::InvalidMetadata {
                price: lookup.price,
                market_cap: lookup.market_cap,
            });
        }
        Ok(Self {
            instrument: lookup.instrument,
            price: lookup.price,
            market_cap: lookup.market_cap,
        })
    }
}

/// One row of the snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub symbol: String,
    pub ticker: String,
    pub price: f64,
    #[serde(rename = "mcap")]
    pub market_cap: f64,
    pub rsi_15m: f64,
    pub rsi_1h: f64,
    pub rsi_4h: f64,
    pub rsi_1d: f64,
}

/// Stages of one scan cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStage {
    Idle,
    FetchingMetadata,
    FetchingHistory,
    Computing,
    Done,
    Failed,
}

impl ScanStage {
    pub fn can_advance_to(self, next: ScanStage) -> bool {
        use ScanStage::*;
        matches!(
            (self, next),
            (Idle, FetchingMetadata)
                | (FetchingMetadata, FetchingHistory)
                | (FetchingMetadata, Done)
                | (FetchingMetadata, Failed)
                | (FetchingHistory, Computing)
                | (FetchingHistory, Failed)
                | (Computing, Done)
                | (Computing, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ScanStage::Done | ScanStage::Failed)
    }
}

impl fmt::Display for ScanStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// How a scan cycle ended
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanOutcome {
    Completed,
    NoValidInstruments,
    HistoryFailed { reason: String },
}

impl ScanOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ScanOutcome::Completed => "completed",
            ScanOutcome::NoValidInstruments => "no_valid_instruments",
            ScanOutcome::HistoryFailed { .. } => "history_failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedInstrument {
    pub ticker: String,
    pub reason: SkipReason,
}

/// Full diagnostic record of one scan cycle.
///
/// `results` is what the snapshot gets; `skipped` explains every instrument
/// of the universe that is not in it.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub scan_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub stages: Vec<ScanStage>,
    pub outcome: ScanOutcome,
    pub results: Vec<ScanResult>,
    pub skipped: Vec<SkippedInstrument>,
}

impl ScanReport {
    pub fn final_stage(&self) -> ScanStage {
        self.stages.last().copied().unwrap_or(ScanStage::Idle)
    }
}
