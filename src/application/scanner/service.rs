use crate::application::scanner::orchestrator::ScanOrchestrator;
use crate::application::scanner::snapshot_cache::SnapshotCache;
use crate::domain::scan::{ScanReport, ScanResult};
use crate::infrastructure::observability::Metrics;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Market caps in the public contract are quoted in billions
const BILLION: f64 = 1e9;

/// Where a snapshot handed to a caller came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    /// Served from a cache entry younger than the TTL
    Cache,
    /// Produced by a scan this caller ran
    Fresh,
    /// Scan came back empty; the last good snapshot (or nothing) was served
    Stale,
    /// Another caller's scan finished while this one waited
    Coalesced,
}

impl SnapshotSource {
    pub fn label(&self) -> &'static str {
        match self {
            SnapshotSource::Cache => "cache",
            SnapshotSource::Fresh => "fresh",
            SnapshotSource::Stale => "stale",
            SnapshotSource::Coalesced => "coalesced",
        }
    }
}

/// Public face of the scanner: TTL cache, single-flight scans and the
/// market-cap filter.
///
/// At most one scan runs at a time. Callers that queue behind a running scan
/// get that scan's outcome instead of starting another one.
pub struct ScanService {
    orchestrator: Arc<ScanOrchestrator>,
    cache: SnapshotCache,
    // Holds the outcome of the last finished scan; locking it is the
    // single-flight gate
    in_flight: Mutex<Option<Arc<Vec<ScanResult>>>>,
    generation: AtomicU64,
    last_report: RwLock<Option<Arc<ScanReport>>>,
    metrics: Arc<Metrics>,
}

impl ScanService {
    pub fn new(orchestrator: Arc<ScanOrchestrator>, ttl: Duration, metrics: Arc<Metrics>) -> Self {
        Self {
            orchestrator,
            cache: SnapshotCache::new(ttl),
            in_flight: Mutex::new(None),
            generation: AtomicU64::new(0),
            last_report: RwLock::new(None),
            metrics,
        }
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    pub fn universe_size(&self) -> usize {
        self.orchestrator.universe().len()
    }

    /// Number of scan cycles this service has run
    pub fn scans_run(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Scan results with a market cap of at least `min_mcap_billion` billion.
    ///
    /// Negative and NaN thresholds are treated as zero.
    pub async fn scan(&self, min_mcap_billion: f64) -> Vec<ScanResult> {
        let billions = if min_mcap_billion.is_nan() {
            0.0
        } else {
            min_mcap_billion.max(0.0)
        };
        self.get(billions * BILLION).await
    }

    /// Snapshot rows with `market_cap >= min_market_cap` (raw units)
    pub async fn get(&self, min_market_cap: f64) -> Vec<ScanResult> {
        let (data, _) = self.snapshot().await;
        data.iter()
            .filter(|r| r.market_cap >= min_market_cap)
            .cloned()
            .collect()
    }

    /// The current unfiltered snapshot, scanning if the cache is stale
    pub async fn snapshot(&self) -> (Arc<Vec<ScanResult>>, SnapshotSource) {
        let (data, source) = self.resolve().await;
        self.metrics.inc_snapshot_requests(source.label());
        debug!(
            "ScanService: Serving {} rows from {}",
            data.len(),
            source.label()
        );
        (data, source)
    }

    async fn resolve(&self) -> (Arc<Vec<ScanResult>>, SnapshotSource) {
        if let Some(hit) = self.cache.fresh(Instant::now()) {
            return (hit, SnapshotSource::Cache);
        }

        let seen = self.generation.load(Ordering::SeqCst);
        let mut gate = self.in_flight.lock().await;

        if self.generation.load(Ordering::SeqCst) != seen
            && let Some(data) = gate.as_ref()
        {
            return (Arc::clone(data), SnapshotSource::Coalesced);
        }
        // Another caller may have refreshed the cache while we waited
        if let Some(hit) = self.cache.fresh(Instant::now()) {
            return (hit, SnapshotSource::Cache);
        }

        let started = Instant::now();
        let report = self.orchestrator.run().await;
        self.record(&report);

        let results = Arc::new(report.results.clone());
        let (data, source) = if self.cache.store(Arc::clone(&results), started) {
            (results, SnapshotSource::Fresh)
        } else {
            match self.cache.latest() {
                Some(previous) => {
                    warn!(
                        "ScanService: Scan {} produced no results, serving last snapshot ({} rows)",
                        report.scan_id,
                        previous.len()
                    );
                    (previous, SnapshotSource::Stale)
                }
                None => {
                    warn!(
                        "ScanService: Scan {} produced no results and nothing is cached",
                        report.scan_id
                    );
                    (results, SnapshotSource::Stale)
                }
            }
        };

        *gate = Some(Arc::clone(&data));
        self.generation.fetch_add(1, Ordering::SeqCst);
        (data, source)
    }

    fn record(&self, report: &ScanReport) {
        self.metrics.inc_scans(report.outcome.label());
        self.metrics
            .observe_scan_duration(report.duration_ms as f64 / 1000.0);
        for skipped in &report.skipped {
            self.metrics.inc_skipped(skipped.reason.label());
        }
        if !report.results.is_empty() {
            self.metrics.snapshot_size.set(report.results.len() as f64);
        }

        info!(
            "ScanService: Scan {} finished as {} in {}ms",
            report.scan_id,
            report.outcome.label(),
            report.duration_ms
        );

        let report = Arc::new(report.clone());
        match self.last_report.write() {
            Ok(mut guard) => *guard = Some(report),
            Err(poisoned) => {
                tracing::error!("ScanService: Report lock poisoned during write, recovering");
                *poisoned.into_inner() = Some(report);
            }
        }
    }

    /// Diagnostics for the most recent scan cycle
    pub fn last_report(&self) -> Option<Arc<ScanReport>> {
        match self.last_report.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::scanner::orchestrator::ScanSettings;
    use crate::domain::market::{
        DetailedInfo, FastQuote, HistoryFrame, HistoryProfile, Instrument, PricePoint,
    };
    use crate::domain::ports::MarketDataProvider;
    use crate::domain::scan::ScanOutcome;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicBool;

    /// Every instrument quotes price 2.0 and a cap keyed on its symbol;
    /// history is a short rising daily series.
    struct Counting {
        history_calls: AtomicU64,
        fail_history: AtomicBool,
        scan_delay: Duration,
    }

    impl Counting {
        fn new(scan_delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                history_calls: AtomicU64::new(0),
                fail_history: AtomicBool::new(false),
                scan_delay,
            })
        }
    }

    #[async_trait]
    impl MarketDataProvider for Counting {
        async fn fast_quote(&self, instrument: &Instrument) -> Result<FastQuote> {
            let cap = match instrument.display_symbol() {
                "BTC" => 2e12,
                "ETH" => 4e11,
                _ => 3e8,
            };
            Ok(FastQuote {
                price: Some(2.0),
                market_cap: Some(cap),
            })
        }

        async fn detailed_info(&self, _instrument: &Instrument) -> Result<DetailedInfo> {
            Ok(DetailedInfo::default())
        }

        async fn bulk_history(
            &self,
            instruments: &[Instrument],
            profile: HistoryProfile,
        ) -> Result<HistoryFrame> {
            if profile == HistoryProfile::Fine {
                self.history_calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(self.scan_delay).await;
            }
            if self.fail_history.load(Ordering::SeqCst) {
                return Err(anyhow!("provider down"));
            }
            let series: Vec<PricePoint> = (0..20)
                .map(|i| PricePoint::new(i * 86_400_000, 1.0 + i as f64))
                .collect();
            Ok(HistoryFrame::Keyed(
                instruments
                    .iter()
                    .map(|i| (i.clone(), series.clone()))
                    .collect::<HashMap<_, _>>(),
            ))
        }
    }

    fn service(provider: Arc<Counting>) -> Arc<ScanService> {
        let universe = ["BTC-USD", "ETH-USD", "XRP-USD"]
            .into_iter()
            .map(Instrument::new)
            .collect();
        let orchestrator = Arc::new(ScanOrchestrator::new(
            provider,
            universe,
            ScanSettings::default(),
        ));
        Arc::new(ScanService::new(
            orchestrator,
            Duration::from_secs(60),
            Arc::new(Metrics::new().unwrap()),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_call_within_ttl_hits_cache() {
        let provider = Counting::new(Duration::ZERO);
        let svc = service(provider.clone());

        let (_, first) = svc.snapshot().await;
        tokio::time::advance(Duration::from_secs(30)).await;
        let (_, second) = svc.snapshot().await;

        assert_eq!(first, SnapshotSource::Fresh);
        assert_eq!(second, SnapshotSource::Cache);
        assert_eq!(provider.history_calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(31)).await;
        let (_, third) = svc.snapshot().await;
        assert_eq!(third, SnapshotSource::Fresh);
        assert_eq!(provider.history_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_hit_never_suspends() {
        let svc = service(Counting::new(Duration::ZERO));
        svc.get(0.0).await;

        let mut hit = tokio_test::task::spawn(svc.snapshot());
        let (data, source) = tokio_test::assert_ready!(hit.poll());
        assert_eq!(source, SnapshotSource::Cache);
        assert_eq!(data.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_threshold_is_in_billions() {
        let svc = service(Counting::new(Duration::ZERO));

        assert_eq!(svc.scan(0.0).await.len(), 3);
        assert_eq!(svc.scan(0.5).await.len(), 2);
        assert_eq!(svc.scan(1000.0).await.len(), 1);
        assert_eq!(svc.scan(-4.0).await.len(), 3);
        assert_eq!(svc.scan(f64::NAN).await.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_scan_serves_previous_snapshot() {
        let provider = Counting::new(Duration::ZERO);
        let svc = service(provider.clone());

        let good = svc.get(0.0).await;
        assert_eq!(good.len(), 3);

        provider.fail_history.store(true, Ordering::SeqCst);
        tokio::time::advance(Duration::from_secs(61)).await;
        let (data, source) = svc.snapshot().await;

        assert_eq!(source, SnapshotSource::Stale);
        assert_eq!(*data, good);
        let report = svc.last_report().unwrap();
        assert!(matches!(report.outcome, ScanOutcome::HistoryFailed { .. }));

        // The stale timestamp was not reset, so the next call scans again
        let _ = svc.snapshot().await;
        assert_eq!(provider.history_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_first_scan_serves_empty() {
        let provider = Counting::new(Duration::ZERO);
        provider.fail_history.store(true, Ordering::SeqCst);
        let svc = service(provider);

        assert!(svc.get(0.0).await.is_empty());
        assert!(svc.cache().latest().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_one_scan() {
        let provider = Counting::new(Duration::from_secs(5));
        provider.fail_history.store(true, Ordering::SeqCst);
        let svc = service(provider.clone());

        let calls: Vec<_> = (0..4)
            .map(|_| {
                let svc = svc.clone();
                tokio::spawn(async move { svc.snapshot().await.1 })
            })
            .collect();

        let mut sources = Vec::new();
        for call in calls {
            sources.push(call.await.unwrap());
        }

        assert_eq!(provider.history_calls.load(Ordering::SeqCst), 1);
        assert_eq!(svc.scans_run(), 1);
        assert_eq!(
            sources
                .iter()
                .filter(|s| **s == SnapshotSource::Coalesced)
                .count(),
            3
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_metrics_follow_requests() {
        let svc = service(Counting::new(Duration::ZERO));
        svc.get(0.0).await;
        svc.get(0.0).await;

        let rendered = svc.metrics.render();
        assert!(rendered.contains("coinscan_snapshot_requests_total{source=\"fresh\"} 1"));
        assert!(rendered.contains("coinscan_snapshot_requests_total{source=\"cache\"} 1"));
        assert!(rendered.contains("coinscan_scans_total{outcome=\"completed\"} 1"));
        assert!(rendered.contains("coinscan_snapshot_size 3"));
    }
}
