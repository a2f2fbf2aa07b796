//! Prometheus metrics definitions for coinscan
//!
//! All metrics use the `coinscan_` prefix and are read-only.

use prometheus::{
    CounterVec, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
    core::{AtomicF64, GenericGauge},
};
use std::sync::Arc;

/// Prometheus metrics for the scanner
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Completed scan cycles by outcome
    pub scans_total: CounterVec,
    /// Snapshot requests by where the data came from
    pub snapshot_requests_total: CounterVec,
    /// Instruments left out of a scan, by reason
    pub instruments_skipped_total: CounterVec,
    /// Wall time of a full scan cycle
    pub scan_duration_seconds: Histogram,
    /// Rows in the cached snapshot
    pub snapshot_size: GenericGauge<AtomicF64>,
}

impl Metrics {
    /// Create a new Metrics instance with all gauges and counters registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let scans_total = CounterVec::new(
            Opts::new("coinscan_scans_total", "Completed scan cycles by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(scans_total.clone()))?;

        let snapshot_requests_total = CounterVec::new(
            Opts::new(
                "coinscan_snapshot_requests_total",
                "Snapshot requests by data source (cache, fresh, stale, coalesced)",
            ),
            &["source"],
        )?;
        registry.register(Box::new(snapshot_requests_total.clone()))?;

        let instruments_skipped_total = CounterVec::new(
            Opts::new(
                "coinscan_instruments_skipped_total",
                "Instruments dropped from a scan by reason",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(instruments_skipped_total.clone()))?;

        let scan_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "coinscan_scan_duration_seconds",
                "Full scan cycle duration in seconds",
            )
            .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 40.0, 80.0, 160.0]),
        )?;
        registry.register(Box::new(scan_duration_seconds.clone()))?;

        let snapshot_size = Gauge::with_opts(Opts::new(
            "coinscan_snapshot_size",
            "Number of rows in the cached snapshot",
        ))?;
        registry.register(Box::new(snapshot_size.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            scans_total,
            snapshot_requests_total,
            instruments_skipped_total,
            scan_duration_seconds,
            snapshot_size,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    pub fn inc_scans(&self, outcome: &str) {
        self.scans_total.with_label_values(&[outcome]).inc();
    }

    pub fn inc_snapshot_requests(&self, source: &str) {
        self.snapshot_requests_total
            .with_label_values(&[source])
            .inc();
    }

    pub fn inc_skipped(&self, reason: &str) {
        self.instruments_skipped_total
            .with_label_values(&[reason])
            .inc();
    }

    pub fn observe_scan_duration(&self, seconds: f64) {
        self.scan_duration_seconds.observe(seconds);
    }
}
