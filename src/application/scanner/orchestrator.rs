use crate::application::indicators::latest_rsi;
use crate::application::market_data::{BulkHistoryRetriever, MetadataFetcher};
use crate::application::scanner::worker_pool::WorkerPool;
use crate::domain::errors::SkipReason;
use crate::domain::market::{HistoryBundle, HistoryProfile, Instrument, Timeframe};
use crate::domain::ports::MarketDataProvider;
use crate::domain::scan::{
    MetadataRecord, ScanOutcome, ScanReport, ScanResult, ScanStage, SkippedInstrument,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Prices under this threshold keep 6 decimals instead of 2
const SMALL_PRICE_THRESHOLD: f64 = 0.1;

/// Tunables for one orchestrator
#[derive(Debug, Clone)]
pub struct ScanSettings {
    /// Metadata lookups allowed in flight at once
    pub metadata_workers: usize,
    /// Budget for one instrument's full metadata lookup (both tiers)
    pub metadata_timeout: Duration,
    /// Budget for each bulk history call
    pub history_timeout: Duration,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            metadata_workers: 5,
            metadata_timeout: Duration::from_secs(15),
            history_timeout: Duration::from_secs(60),
        }
    }
}

/// Runs full scan cycles over a fixed universe.
///
/// One cycle: metadata for every instrument on the worker pool, one bulk
/// history retrieval for the instruments that passed the validity gate, then
/// RSI assembly per instrument and a descending market-cap sort. Instrument
/// level problems only drop that instrument; a history failure ends the cycle
/// with no results.
pub struct ScanOrchestrator {
    universe: Vec<Instrument>,
    fetcher: Arc<MetadataFetcher>,
    history: BulkHistoryRetriever,
    pool: WorkerPool,
    metadata_timeout: Duration,
}

impl ScanOrchestrator {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        universe: Vec<Instrument>,
        settings: ScanSettings,
    ) -> Self {
        Self {
            universe,
            fetcher: Arc::new(MetadataFetcher::new(provider.clone())),
            history: BulkHistoryRetriever::new(provider, settings.history_timeout),
            pool: WorkerPool::new(settings.metadata_workers),
            metadata_timeout: settings.metadata_timeout,
        }
    }

    pub fn universe(&self) -> &[Instrument] {
        &self.universe
    }

    pub async fn run(&self) -> ScanReport {
        let mut cycle = ScanCycle::new();
        info!(
            "ScanOrchestrator[{}]: Scanning {} instruments",
            cycle.scan_id,
            self.universe.len()
        );

        cycle.advance(ScanStage::FetchingMetadata);
        let valid = self.fetch_metadata(&mut cycle).await;
        if valid.is_empty() {
            warn!(
                "ScanOrchestrator[{}]: No instrument passed the metadata gate",
                cycle.scan_id
            );
            cycle.advance(ScanStage::Done);
            return cycle.finish(ScanOutcome::NoValidInstruments, Vec::new());
        }

        cycle.advance(ScanStage::FetchingHistory);
        let instruments: Vec<Instrument> = valid.iter().map(|r| r.instrument.clone()).collect();
        let bundle = match self.history.retrieve(&instruments).await {
            Ok(bundle) => bundle,
            Err(e) => {
                error!(
                    "ScanOrchestrator[{}]: Bulk history failed, abandoning cycle: {}",
                    cycle.scan_id, e
                );
                cycle.advance(ScanStage::Failed);
                return cycle.finish(
                    ScanOutcome::HistoryFailed {
                        reason: e.to_string(),
                    },
                    Vec::new(),
                );
            }
        };

        cycle.advance(ScanStage::Computing);
        let mut results = Vec::with_capacity(valid.len());
        for record in &valid {
            match assemble_result(record, &bundle) {
                Ok(result) => results.push(result),
                Err(reason) => {
                    warn!(
                        "ScanOrchestrator[{}]: Skipping {}: {}",
                        cycle.scan_id, record.instrument, reason
                    );
                    cycle.skip(&record.instrument, reason);
                }
            }
        }

        // Stable: equal caps keep completion order
        results.sort_by(|a, b| b.market_cap.total_cmp(&a.market_cap));

        cycle.advance(ScanStage::Done);
        info!(
            "ScanOrchestrator[{}]: Scan complete, {} results, {} skipped",
            cycle.scan_id,
            results.len(),
            cycle.skipped.len()
        );
        cycle.finish(ScanOutcome::Completed, results)
    }

    /// Look up every instrument on the worker pool and keep the valid ones,
    /// in completion order.
    async fn fetch_metadata(&self, cycle: &mut ScanCycle) -> Vec<MetadataRecord> {
        let fetcher = Arc::clone(&self.fetcher);
        let timeout = self.metadata_timeout;

        let lookups = self
            .pool
            .run_unordered(self.universe.clone(), move |instrument: Instrument| {
                let fetcher = Arc::clone(&fetcher);
                async move { tokio::time::timeout(timeout, fetcher.fetch(&instrument)).await }
            })
            .await;

        let mut valid = Vec::with_capacity(lookups.len());
        for (instrument, joined) in lookups {
            let reason = match joined {
                Ok(Ok(lookup)) => match MetadataRecord::try_from(lookup) {
                    Ok(record) => {
                        valid.push(record);
                        continue;
                    }
                    Err(reason) => {
                        debug!("ScanOrchestrator: Dropping {}: {}", instrument, reason);
                        reason
                    }
                },
                Ok(Err(_elapsed)) => {
                    warn!(
                        "ScanOrchestrator: Metadata lookup for {} timed out after {:?}",
                        instrument, timeout
                    );
                    SkipReason::MetadataTimeout {
                        duration_ms: timeout.as_millis() as u64,
                    }
                }
                Err(join_error) => {
                    warn!(
                        "ScanOrchestrator: Metadata worker for {} aborted: {}",
                        instrument, join_error
                    );
                    SkipReason::WorkerFailed {
                        message: join_error.to_string(),
                    }
                }
            };
            cycle.skip(&instrument, reason);
        }

        info!(
            "ScanOrchestrator[{}]: {}/{} instruments passed the metadata gate",
            cycle.scan_id,
            valid.len(),
            self.universe.len()
        );
        valid
    }
}

/// Build one snapshot row from validated metadata and the retrieved history
pub fn assemble_result(
    record: &MetadataRecord,
    bundle: &HistoryBundle,
) -> Result<ScanResult, SkipReason> {
    let instrument = &record.instrument;
    let fine = bundle.series(HistoryProfile::Fine, instrument);
    let medium = bundle.series(HistoryProfile::Medium, instrument);
    let coarse = bundle.series(HistoryProfile::Coarse, instrument);

    let reading = |name: &str, value: f64| {
        round_dp(value, 2).ok_or_else(|| SkipReason::ComputeFailed {
            message: format!("{} is not representable: {}", name, value),
        })
    };

    let rsi_15m = reading("rsi_15m", latest_rsi(fine, None))?;
    let rsi_1h = reading("rsi_1h", latest_rsi(medium, None))?;
    let rsi_4h = reading("rsi_4h", latest_rsi(medium, Some(Timeframe::FourHour)))?;
    let rsi_1d = reading("rsi_1d", latest_rsi(coarse, None))?;

    let price_dp = if record.price.abs() < SMALL_PRICE_THRESHOLD { 6 } else { 2 };
    let price = round_dp(record.price, price_dp).ok_or_else(|| SkipReason::ComputeFailed {
        message: format!("price is not representable: {}", record.price),
    })?;

    Ok(ScanResult {
        symbol: instrument.display_symbol().to_string(),
        ticker: instrument.ticker().to_string(),
        price,
        market_cap: record.market_cap,
        rsi_15m,
        rsi_1h,
        rsi_4h,
        rsi_1d,
    })
}

/// Half-to-even rounding of the exact binary value of an f64; `None` for NaN,
/// infinities and magnitudes outside the decimal range.
fn round_dp(value: f64, dp: u32) -> Option<f64> {
    Decimal::from_f64_retain(value)?.round_dp(dp).to_f64()
}

/// Bookkeeping for one cycle: id, stage trail and skipped instruments
struct ScanCycle {
    scan_id: Uuid,
    started: Instant,
    started_at: DateTime<Utc>,
    stages: Vec<ScanStage>,
    skipped: Vec<SkippedInstrument>,
}

impl ScanCycle {
    fn new() -> Self {
        Self {
            scan_id: Uuid::new_v4(),
            started: Instant::now(),
            started_at: Utc::now(),
            stages: vec![ScanStage::Idle],
            skipped: Vec::new(),
        }
    }

    fn current(&self) -> ScanStage {
        self.stages.last().copied().unwrap_or(ScanStage::Idle)
    }

    fn advance(&mut self, next: ScanStage) {
        let current = self.current();
        if !current.can_advance_to(next) {
            warn!(
                "ScanOrchestrator[{}]: Unexpected transition {} -> {}",
                self.scan_id, current, next
            );
        }
        debug!("ScanOrchestrator[{}]: {} -> {}", self.scan_id, current, next);
        self.stages.push(next);
    }

    fn skip(&mut self, instrument: &Instrument, reason: SkipReason) {
        self.skipped.push(SkippedInstrument {
            ticker: instrument.ticker().to_string(),
            reason,
        });
    }

    fn finish(self, outcome: ScanOutcome, results: Vec<ScanResult>) -> ScanReport {
        ScanReport {
            scan_id: self.scan_id,
            started_at: self.started_at,
            duration_ms: self.started.elapsed().as_millis() as u64,
            stages: self.stages,
            outcome,
            results,
            skipped: self.skipped,
        }
    }
}
