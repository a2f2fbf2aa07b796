//! Shared test doubles for the integration suites
#![allow(dead_code)]

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use coinscan::application::scanner::{ScanOrchestrator, ScanService, ScanSettings};
use coinscan::domain::market::{
    DetailedInfo, FastQuote, HistoryFrame, HistoryProfile, HistorySeries, Instrument, PricePoint,
};
use coinscan::domain::ports::MarketDataProvider;
use coinscan::infrastructure::observability::Metrics;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const DAY_MS: i64 = 86_400_000;
pub const HOUR_MS: i64 = 3_600_000;

/// `n` strictly increasing closes spaced `step_ms` apart
pub fn rising(n: usize, step_ms: i64) -> HistorySeries {
    (0..n)
        .map(|i| PricePoint::new(i as i64 * step_ms, 10.0 + i as f64))
        .collect()
}

/// Alternating closes, which keep RSI strictly between 0 and 100
pub fn choppy(n: usize, step_ms: i64) -> HistorySeries {
    (0..n)
        .map(|i| {
            let close = if i % 3 == 0 { 100.0 - i as f64 * 0.1 } else { 100.0 + i as f64 * 0.2 };
            PricePoint::new(i as i64 * step_ms, close)
        })
        .collect()
}

/// Scriptable provider that counts every call it receives
#[derive(Default)]
pub struct StubProvider {
    fast: Mutex<HashMap<Instrument, FastQuote>>,
    detailed: Mutex<HashMap<Instrument, DetailedInfo>>,
    history: Mutex<HashMap<HistoryProfile, HashMap<Instrument, HistorySeries>>>,
    fail_history: AtomicBool,
    quote_delay: Mutex<Duration>,

    pub fast_calls: AtomicUsize,
    pub detailed_calls: AtomicUsize,
    pub history_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
}

impl StubProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_quote(&self, ticker: &str, price: Option<f64>, market_cap: Option<f64>) -> &Self {
        self.fast
            .lock()
            .unwrap()
            .insert(Instrument::new(ticker), FastQuote { price, market_cap });
        self
    }

    pub fn with_detailed(&self, ticker: &str, info: DetailedInfo) -> &Self {
        self.detailed
            .lock()
            .unwrap()
            .insert(Instrument::new(ticker), info);
        self
    }

    pub fn with_history(&self, ticker: &str, profile: HistoryProfile, series: HistorySeries) -> &Self {
        self.history
            .lock()
            .unwrap()
            .entry(profile)
            .or_default()
            .insert(Instrument::new(ticker), series);
        self
    }

    pub fn set_quote_delay(&self, delay: Duration) {
        *self.quote_delay.lock().unwrap() = delay;
    }

    pub fn fail_history(&self, fail: bool) {
        self.fail_history.store(fail, Ordering::SeqCst);
    }

    /// Number of completed scan cycles that reached the history step
    pub fn history_rounds(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst) / HistoryProfile::ALL.len()
    }
}

#[async_trait]
impl MarketDataProvider for StubProvider {
    async fn fast_quote(&self, instrument: &Instrument) -> Result<FastQuote> {
        self.fast_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.quote_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.fast
            .lock()
            .unwrap()
            .get(instrument)
            .copied()
            .ok_or_else(|| anyhow!("no quote for {}", instrument))
    }

    async fn detailed_info(&self, instrument: &Instrument) -> Result<DetailedInfo> {
        self.detailed_calls.fetch_add(1, Ordering::SeqCst);
        self.detailed
            .lock()
            .unwrap()
            .get(instrument)
            .copied()
            .ok_or_else(|| anyhow!("no info for {}", instrument))
    }

    async fn bulk_history(
        &self,
        instruments: &[Instrument],
        profile: HistoryProfile,
    ) -> Result<HistoryFrame> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_history.load(Ordering::SeqCst) {
            return Err(anyhow!("history endpoint unavailable"));
        }

        let stored = self.history.lock().unwrap();
        let by_instrument = stored.get(&profile).cloned().unwrap_or_default();
        if let [only] = instruments {
            return Ok(HistoryFrame::Single(
                by_instrument.get(only).cloned().unwrap_or_default(),
            ));
        }
        Ok(HistoryFrame::Keyed(
            instruments
                .iter()
                .filter_map(|i| by_instrument.get(i).map(|s| (i.clone(), s.clone())))
                .collect(),
        ))
    }
}

pub fn universe(tickers: &[&str]) -> Vec<Instrument> {
    tickers.iter().map(|t| Instrument::new(*t)).collect()
}

pub fn orchestrator(provider: Arc<StubProvider>, tickers: &[&str]) -> ScanOrchestrator {
    ScanOrchestrator::new(provider, universe(tickers), ScanSettings::default())
}

pub fn service(provider: Arc<StubProvider>, tickers: &[&str]) -> ScanService {
    ScanService::new(
        Arc::new(orchestrator(provider, tickers)),
        Duration::from_secs(60),
        Arc::new(Metrics::new().expect("metrics")),
    )
}
